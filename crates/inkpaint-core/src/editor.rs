//! Editing session: one document, its undo log, the current layer, the
//! selection and the active tool.

use crate::color::Color;
use crate::document::{Direction, Document, Layer, LayerId, Stroke, StrokeId};
use crate::geometry::{bounding_box, distance_sq, hit_test_stroke, point_in_polygon, points_in_rect, translate};
use crate::history::{History, MoveEntry, Operation};
use crate::inkscript::{self, DEFAULT_STROKE_COLOR, FormatError};
use crate::tools::{DEFAULT_ERASER_WIDTH, Gesture, ToolKind, ToolManager};
use kurbo::{Point, Rect, Vec2};

/// Default brush color for new strokes.
pub const DEFAULT_BRUSH_COLOR: Color = Color::WHITE;
/// Default brush width for new strokes.
pub const DEFAULT_BRUSH_WIDTH: f64 = 3.0;

/// Runtime drawing settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorSettings {
    /// Color of new strokes; also the color applied by the fill tool.
    pub brush_color: Color,
    pub brush_width: f64,
    /// Eraser diameter; hits are tested against half of it.
    pub eraser_width: f64,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            brush_color: DEFAULT_BRUSH_COLOR,
            brush_width: DEFAULT_BRUSH_WIDTH,
            eraser_width: DEFAULT_ERASER_WIDTH,
        }
    }
}

/// An editing session.
#[derive(Debug, Clone)]
pub struct Editor {
    document: Document,
    history: History,
    current_layer: Option<LayerId>,
    selection: Vec<StrokeId>,
    tools: ToolManager,
    pub settings: EditorSettings,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    /// A fresh session on a document with one empty layer.
    pub fn new() -> Self {
        Self::with_document(Document::with_default_layer())
    }

    pub fn with_document(document: Document) -> Self {
        let current_layer = document.layers.first().map(|l| l.id);
        Self {
            document,
            history: History::new(),
            current_layer,
            selection: Vec::new(),
            tools: ToolManager::new(),
            settings: EditorSettings::default(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Point-in-time copy for background serialization.
    pub fn snapshot(&self) -> Document {
        self.document.clone()
    }

    /// Serialize the current document.
    pub fn to_text(&self) -> String {
        inkscript::serialize(&self.document)
    }

    /// Replace the session with a document parsed from `text`. On error the
    /// current document, history and selection are left untouched.
    pub fn load_text(&mut self, text: &str) -> Result<(), FormatError> {
        let document = inkscript::parse(text)?;
        log::info!(
            "Loaded document with {} layers and {} strokes",
            document.layers.len(),
            document.stroke_count()
        );
        self.replace_document(document);
        Ok(())
    }

    /// Start over with a fresh single-layer document.
    pub fn new_document(&mut self) {
        self.replace_document(Document::with_default_layer());
    }

    fn replace_document(&mut self, document: Document) {
        self.current_layer = document.layers.first().map(|l| l.id);
        self.document = document;
        self.history.clear();
        self.selection.clear();
        self.tools.cancel();
    }

    // --- Layers ---

    pub fn current_layer(&self) -> Option<LayerId> {
        self.current_layer
    }

    pub fn set_current_layer(&mut self, id: LayerId) -> bool {
        if self.document.find_layer(id).is_none() {
            return false;
        }
        if self.current_layer != Some(id) {
            self.selection.clear();
        }
        self.current_layer = Some(id);
        true
    }

    /// Add a topmost layer and make it current. `None` if no layer id is
    /// left.
    pub fn add_layer(&mut self, name: Option<&str>) -> Option<LayerId> {
        let Some(id) = self.document.add_layer(name).map(|l| l.id) else {
            log::warn!("No layer ids left");
            return None;
        };
        self.current_layer = Some(id);
        self.selection.clear();
        Some(id)
    }

    /// Remove the current layer. The layer at the same position (or the new
    /// last one) becomes current.
    pub fn remove_current_layer(&mut self) -> Option<Layer> {
        let id = self.current_layer?;
        let index = self.document.layer_index(id)?;
        let removed = self.document.remove_layer(id)?;
        let next = index.min(self.document.layers.len().saturating_sub(1));
        self.current_layer = self.document.layers.get(next).map(|l| l.id);
        self.selection.clear();
        log::debug!("Removed layer {} '{}'", removed.id, removed.name);
        Some(removed)
    }

    pub fn move_current_layer(&mut self, direction: Direction) -> bool {
        self.current_layer
            .is_some_and(|id| self.document.reorder_layer(id, direction))
    }

    /// Flip visibility of the current layer, returning the new state.
    pub fn toggle_current_layer_visibility(&mut self) -> Option<bool> {
        let layer = self.document.find_layer_mut(self.current_layer?)?;
        layer.visible = !layer.visible;
        Some(layer.visible)
    }

    pub fn rename_current_layer(&mut self, name: &str) -> bool {
        self.current_layer
            .is_some_and(|id| self.document.rename_layer(id, name))
    }

    /// Erase every live stroke of the current layer as a single undoable
    /// step. Returns how many strokes were erased.
    pub fn clear_current_layer(&mut self) -> usize {
        let Some(layer) = self.current_layer_ref() else {
            return 0;
        };
        let ids: Vec<StrokeId> = layer.live_strokes().map(|s| s.id.clone()).collect();
        self.erase_ids(ids).len()
    }

    fn current_layer_ref(&self) -> Option<&Layer> {
        self.document.find_layer(self.current_layer?)
    }

    // --- Editing operations ---

    /// Add a stroke with the current brush settings to the current layer.
    pub fn commit_stroke(&mut self, points: Vec<Point>) -> Option<StrokeId> {
        if points.is_empty() {
            return None;
        }
        let layer = self.current_layer?;
        self.document.find_layer(layer)?;

        let Some(id) = self.document.next_stroke_id() else {
            log::warn!("No stroke ids left");
            return None;
        };
        let stroke = Stroke::new(id.clone(), self.settings.brush_color, self.settings.brush_width, points);
        log::debug!("Stroke added: {} pts={}", id, stroke.points.len());
        self.history
            .apply(Operation::AddStroke { layer, stroke }, &mut self.document)
            .then_some(id)
    }

    /// Erase every live stroke of the current layer that comes within
    /// `radius` of the path. All hits form one undo entry.
    pub fn erase_along(&mut self, path: &[Point], radius: f64) -> Vec<StrokeId> {
        let Some(layer) = self.current_layer_ref() else {
            return Vec::new();
        };
        let hits: Vec<StrokeId> = layer
            .live_strokes()
            .filter(|s| hit_test_stroke(s, path, radius))
            .map(|s| s.id.clone())
            .collect();
        if hits.is_empty() {
            log::debug!("Eraser: nothing hit");
        }
        self.erase_ids(hits)
    }

    fn erase_ids(&mut self, ids: Vec<StrokeId>) -> Vec<StrokeId> {
        let Some(layer) = self.current_layer else {
            return Vec::new();
        };
        if ids.is_empty() {
            return ids;
        }
        self.selection.retain(|s| !ids.contains(s));
        let op = Operation::EraseStrokes { layer, ids: ids.clone() };
        if self.history.apply(op, &mut self.document) {
            log::debug!("Erased {} stroke(s)", ids.len());
            ids
        } else {
            Vec::new()
        }
    }

    /// Select the live strokes of the current layer with at least one point
    /// inside `rect` (edges included). Replaces the previous selection.
    pub fn select_in_rect(&mut self, rect: Rect) -> usize {
        self.selection = self
            .current_layer_ref()
            .map(|layer| {
                layer
                    .live_strokes()
                    .filter(|s| points_in_rect(&s.points, rect))
                    .map(|s| s.id.clone())
                    .collect()
            })
            .unwrap_or_default();
        self.selection.len()
    }

    pub fn selection(&self) -> &[StrokeId] {
        &self.selection
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Bounding box of all selected strokes.
    pub fn selection_bounds(&self) -> Option<Rect> {
        let layer = self.current_layer_ref()?;
        self.selection
            .iter()
            .filter_map(|id| layer.find_stroke(id.as_str()))
            .filter_map(|s| bounding_box(&s.points))
            .reduce(|a, b| a.union(b))
    }

    /// Translate the selection by `delta` as one undoable step.
    pub fn move_selection(&mut self, delta: Vec2) -> bool {
        if delta == Vec2::ZERO {
            return false;
        }
        let Some(layer) = self.current_layer_ref() else {
            return false;
        };
        let entries: Vec<MoveEntry> = self
            .selection
            .iter()
            .filter_map(|id| layer.find_stroke(id.as_str()))
            .filter(|s| s.is_live())
            .map(|s| MoveEntry {
                id: s.id.clone(),
                old_points: s.points.clone(),
                new_points: translate(&s.points, delta),
            })
            .collect();
        if entries.is_empty() {
            return false;
        }
        let layer = layer.id;
        log::debug!("Moved {} stroke(s)", entries.len());
        self.history
            .apply(Operation::MoveStrokes { layer, entries }, &mut self.document)
    }

    /// Fill the topmost live stroke of the current layer whose polygon
    /// contains `point` with the brush color.
    pub fn fill_at(&mut self, point: Point) -> Option<StrokeId> {
        let layer = self.current_layer_ref()?;
        let Some(target) = layer
            .live_strokes()
            .filter(|s| s.points.len() >= 3)
            .filter(|s| point_in_polygon(point, &s.points))
            .last()
        else {
            log::debug!("No closed shape found to fill");
            return None;
        };
        let op = Operation::SetFill {
            layer: layer.id,
            stroke: target.id.clone(),
            old_fill: target.fill,
            new_fill: Some(self.settings.brush_color),
        };
        let id = target.id.clone();
        self.history.apply(op, &mut self.document).then_some(id)
    }

    /// Eyedropper. Color of the topmost visible live stroke with a point
    /// within half its width (at least 1) of `point`, else the background.
    pub fn pick_color(&self, point: Point) -> Color {
        self.document
            .layers
            .iter()
            .filter(|l| l.visible)
            .flat_map(|l| l.strokes.iter().rev())
            .filter(|s| s.is_live())
            .find(|s| {
                let reach = (s.width / 2.0).max(1.0);
                s.points.iter().any(|p| distance_sq(*p, point) <= reach * reach)
            })
            .map_or(self.document.background, |s| s.color.unwrap_or(DEFAULT_STROKE_COLOR))
    }

    /// Pick a color and make it the brush color.
    pub fn pick_brush_color(&mut self, point: Point) -> Color {
        let color = self.pick_color(point);
        self.settings.brush_color = color;
        color
    }

    pub fn undo(&mut self) -> bool {
        let undone = self.history.undo(&mut self.document);
        if undone {
            self.prune_selection();
        } else {
            log::debug!("Nothing to undo");
        }
        undone
    }

    pub fn redo(&mut self) -> bool {
        let redone = self.history.redo(&mut self.document);
        if redone {
            self.prune_selection();
        } else {
            log::debug!("Nothing to redo");
        }
        redone
    }

    fn prune_selection(&mut self) {
        let document = &self.document;
        self.selection
            .retain(|id| document.find_stroke(id.as_str()).is_some_and(|(_, s)| s.is_live()));
    }

    // --- Tool input ---

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.set_tool(tool);
    }

    pub fn tool_manager(&self) -> &ToolManager {
        &self.tools
    }

    /// Pointer pressed at `point` (document coordinates).
    pub fn begin_gesture(&mut self, point: Point) {
        self.tools.eraser_width = self.settings.eraser_width;
        let grabs_selection = self.tools.current_tool == ToolKind::Select
            && self
                .selection_bounds()
                .is_some_and(|b| b.x0 <= point.x && point.x <= b.x1 && b.y0 <= point.y && point.y <= b.y1);
        if grabs_selection {
            self.tools.begin_move(point);
        } else {
            self.tools.begin(point);
        }
    }

    pub fn update_gesture(&mut self, point: Point) {
        self.tools.update(point);
    }

    /// Pointer released. Returns true if the document changed.
    pub fn end_gesture(&mut self, point: Point) -> bool {
        let Some(gesture) = self.tools.end(point) else {
            return false;
        };
        match gesture {
            Gesture::Stroke(points) => self.commit_stroke(points).is_some(),
            Gesture::Erase(path) => !self.erase_along(path.points(), path.radius()).is_empty(),
            Gesture::SelectRect(rect) => {
                let count = self.select_in_rect(rect);
                log::debug!("Selected {count} stroke(s)");
                false
            }
            Gesture::Move(delta) => self.move_selection(delta),
            Gesture::FillAt(at) => self.fill_at(at).is_some(),
        }
    }
}
