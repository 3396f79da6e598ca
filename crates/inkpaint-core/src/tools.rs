//! Tool system.
//!
//! Turns begin/update/end pointer input (already in document coordinates)
//! into a finished [`Gesture`]. The tool manager never touches the
//! document; the editor decides what a gesture means.

use crate::document::{Stroke, StrokeId};
use crate::geometry::{MIN_ELLIPSE_SEGMENTS, rect_outline, tessellate_ellipse};
use kurbo::{Point, Rect, Vec2};
use std::time::{SystemTime, UNIX_EPOCH};

/// Default eraser diameter.
pub const DEFAULT_ERASER_WIDTH: f64 = 20.0;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ToolKind {
    #[default]
    Brush,
    Eraser,
    Line,
    Rectangle,
    Ellipse,
    Select,
    Fill,
}

impl ToolKind {
    /// Single-key shortcut, case-insensitive.
    pub fn from_shortcut(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            'b' => Some(ToolKind::Brush),
            'e' => Some(ToolKind::Eraser),
            'l' => Some(ToolKind::Line),
            'r' => Some(ToolKind::Rectangle),
            'o' => Some(ToolKind::Ellipse),
            's' => Some(ToolKind::Select),
            'f' => Some(ToolKind::Fill),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Brush => "brush",
            ToolKind::Eraser => "eraser",
            ToolKind::Line => "line",
            ToolKind::Rectangle => "rect",
            ToolKind::Ellipse => "ellipse",
            ToolKind::Select => "select",
            ToolKind::Fill => "fill",
        }
    }
}

/// The path swept by an eraser drag.
///
/// Backed by an ephemeral, colorless stroke with an `eraser_<millis>` id
/// that is never added to a layer.
#[derive(Debug, Clone, PartialEq)]
pub struct EraserPath {
    buffer: Stroke,
}

impl EraserPath {
    pub fn new(width: f64) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        Self {
            buffer: Stroke::eraser(StrokeId::ephemeral(millis), width),
        }
    }

    pub fn id(&self) -> &StrokeId {
        &self.buffer.id
    }

    pub fn points(&self) -> &[Point] {
        &self.buffer.points
    }

    pub fn width(&self) -> f64 {
        self.buffer.width
    }

    /// Hit radius, half the eraser width.
    pub fn radius(&self) -> f64 {
        self.buffer.width / 2.0
    }

    pub fn push(&mut self, point: Point) {
        self.buffer.points.push(point);
    }

    pub fn as_stroke(&self) -> &Stroke {
        &self.buffer
    }
}

/// A completed tool interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    /// New stroke geometry from the brush or a shape tool.
    Stroke(Vec<Point>),
    Erase(EraserPath),
    /// Rubber-band selection, normalized.
    SelectRect(Rect),
    /// Drag of the current selection.
    Move(Vec2),
    FillAt(Point),
}

/// State of a tool interaction.
#[derive(Debug, Clone, Default)]
pub enum ToolState {
    #[default]
    Idle,
    Active {
        start: Point,
        current: Point,
    },
    /// Dragging an existing selection.
    Moving {
        start: Point,
        current: Point,
    },
}

/// Manages the current tool and its state.
#[derive(Debug, Clone)]
pub struct ToolManager {
    pub current_tool: ToolKind,
    pub state: ToolState,
    /// Diameter of new eraser paths.
    pub eraser_width: f64,
    brush_points: Vec<Point>,
    eraser: Option<EraserPath>,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            state: ToolState::default(),
            eraser_width: DEFAULT_ERASER_WIDTH,
            brush_points: Vec::new(),
            eraser: None,
        }
    }
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool, abandoning any interaction in progress.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.cancel();
    }

    /// Begin a tool interaction.
    pub fn begin(&mut self, point: Point) {
        self.brush_points.clear();
        self.eraser = None;
        match self.current_tool {
            ToolKind::Brush => self.brush_points.push(point),
            ToolKind::Eraser => {
                let mut path = EraserPath::new(self.eraser_width);
                path.push(point);
                self.eraser = Some(path);
            }
            _ => {}
        }
        self.state = ToolState::Active { start: point, current: point };
    }

    /// Begin dragging the current selection instead of drawing a new
    /// selection rectangle.
    pub fn begin_move(&mut self, point: Point) {
        self.cancel();
        self.state = ToolState::Moving { start: point, current: point };
    }

    /// Update the current interaction.
    pub fn update(&mut self, point: Point) {
        match &mut self.state {
            ToolState::Idle => return,
            ToolState::Active { current, .. } | ToolState::Moving { current, .. } => *current = point,
        }
        if matches!(self.state, ToolState::Active { .. }) {
            match self.current_tool {
                ToolKind::Brush => self.brush_points.push(point),
                ToolKind::Eraser => {
                    if let Some(path) = &mut self.eraser {
                        path.push(point);
                    }
                }
                _ => {}
            }
        }
    }

    /// End the current interaction and return the finished gesture.
    pub fn end(&mut self, point: Point) -> Option<Gesture> {
        let state = std::mem::take(&mut self.state);
        let gesture = match state {
            ToolState::Idle => None,
            ToolState::Moving { start, .. } => Some(Gesture::Move(point - start)),
            ToolState::Active { start, .. } => self.finish(start, point),
        };
        self.brush_points.clear();
        self.eraser = None;
        gesture
    }

    fn finish(&mut self, start: Point, end: Point) -> Option<Gesture> {
        match self.current_tool {
            ToolKind::Brush => Some(Gesture::Stroke(std::mem::take(&mut self.brush_points))),
            ToolKind::Eraser => self.eraser.take().map(Gesture::Erase),
            ToolKind::Line => Some(Gesture::Stroke(vec![start, end])),
            ToolKind::Rectangle => Some(Gesture::Stroke(rect_outline(start, end))),
            ToolKind::Ellipse => {
                let center = start.midpoint(end);
                let rx = (end.x - start.x).abs() / 2.0;
                let ry = (end.y - start.y).abs() / 2.0;
                Some(Gesture::Stroke(tessellate_ellipse(center, rx, ry, MIN_ELLIPSE_SEGMENTS)))
            }
            ToolKind::Select => Some(Gesture::SelectRect(Rect::from_points(start, end))),
            ToolKind::Fill => Some(Gesture::FillAt(start)),
        }
    }

    /// Cancel the current interaction.
    pub fn cancel(&mut self) {
        self.state = ToolState::Idle;
        self.brush_points.clear();
        self.eraser = None;
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state, ToolState::Idle)
    }

    /// Points collected so far by the brush, for live preview.
    pub fn brush_points(&self) -> &[Point] {
        &self.brush_points
    }

    /// The eraser path collected so far.
    pub fn eraser_path(&self) -> Option<&EraserPath> {
        self.eraser.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(manager: &mut ToolManager, points: &[Point]) -> Option<Gesture> {
        let (last, rest) = points.split_last()?;
        manager.begin(rest[0]);
        for p in &rest[1..] {
            manager.update(*p);
        }
        manager.end(*last)
    }

    #[test]
    fn test_tool_selection() {
        let mut manager = ToolManager::new();
        assert_eq!(manager.current_tool, ToolKind::Brush);
        manager.set_tool(ToolKind::Ellipse);
        assert_eq!(manager.current_tool, ToolKind::Ellipse);
        assert_eq!(ToolKind::from_shortcut('O'), Some(ToolKind::Ellipse));
        assert_eq!(ToolKind::from_shortcut('x'), None);
    }

    #[test]
    fn test_brush_accumulates_points() {
        let mut manager = ToolManager::new();
        let pts = [Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 1.0), Point::new(9.0, 9.0)];
        let gesture = drag(&mut manager, &pts);
        assert_eq!(gesture, Some(Gesture::Stroke(pts[..3].to_vec())));
        assert!(!manager.is_active());
        assert!(manager.brush_points().is_empty());
    }

    #[test]
    fn test_shape_tools() {
        let mut manager = ToolManager::new();
        let a = Point::new(10.0, 10.0);
        let b = Point::new(30.0, 20.0);

        manager.set_tool(ToolKind::Line);
        manager.begin(a);
        assert_eq!(manager.end(b), Some(Gesture::Stroke(vec![a, b])));

        manager.set_tool(ToolKind::Rectangle);
        manager.begin(b);
        assert_eq!(manager.end(a), Some(Gesture::Stroke(rect_outline(a, b))));

        manager.set_tool(ToolKind::Ellipse);
        manager.begin(a);
        match manager.end(b) {
            Some(Gesture::Stroke(points)) => {
                assert_eq!(points.len(), MIN_ELLIPSE_SEGMENTS + 1);
                assert!((points[0].x - 30.0).abs() < 1e-9);
                assert!((points[0].y - 15.0).abs() < 1e-9);
            }
            other => panic!("expected stroke, got {other:?}"),
        }
    }

    #[test]
    fn test_eraser_path_is_ephemeral() {
        let mut manager = ToolManager::new();
        manager.set_tool(ToolKind::Eraser);
        manager.eraser_width = 10.0;
        let gesture = drag(&mut manager, &[Point::new(0.0, 0.0), Point::new(5.0, 0.0), Point::new(6.0, 0.0)]);
        let Some(Gesture::Erase(path)) = gesture else {
            panic!("expected erase gesture");
        };
        assert!(path.id().is_ephemeral());
        assert_eq!(path.as_stroke().color, None);
        assert_eq!(path.points().len(), 2);
        assert_eq!(path.radius(), 5.0);
    }

    #[test]
    fn test_select_and_move() {
        let mut manager = ToolManager::new();
        manager.set_tool(ToolKind::Select);
        manager.begin(Point::new(10.0, 10.0));
        manager.update(Point::new(5.0, 2.0));
        assert_eq!(
            manager.end(Point::new(0.0, 0.0)),
            Some(Gesture::SelectRect(Rect::new(0.0, 0.0, 10.0, 10.0)))
        );

        manager.begin_move(Point::new(1.0, 1.0));
        manager.update(Point::new(2.0, 2.0));
        assert_eq!(manager.end(Point::new(4.0, 0.0)), Some(Gesture::Move(Vec2::new(3.0, -1.0))));
    }

    #[test]
    fn test_fill_uses_press_point() {
        let mut manager = ToolManager::new();
        manager.set_tool(ToolKind::Fill);
        manager.begin(Point::new(3.0, 4.0));
        assert_eq!(manager.end(Point::new(8.0, 8.0)), Some(Gesture::FillAt(Point::new(3.0, 4.0))));
    }

    #[test]
    fn test_cancel_interaction() {
        let mut manager = ToolManager::new();
        manager.begin(Point::ZERO);
        assert!(manager.is_active());
        manager.cancel();
        assert!(!manager.is_active());
        assert_eq!(manager.end(Point::ZERO), None);
    }
}
