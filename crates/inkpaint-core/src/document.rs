//! Document model: layers of strokes plus the id counters that keep undo
//! references stable.

use crate::color::Color;
use kurbo::Point;
use std::fmt;

/// Default canvas width in document units.
pub const DEFAULT_CANVAS_WIDTH: u32 = 1000;
/// Default canvas height in document units.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 700;
/// Default background, a dark near-black.
pub const DEFAULT_BACKGROUND: Color = Color::new(0x0b, 0x0d, 0x12);

const SEQUENTIAL_PREFIX: &str = "stroke_";
const EPHEMERAL_PREFIX: &str = "eraser_";

/// Layer identifier, unique and stable within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub u32);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stroke identifier, unique across the whole document.
///
/// Persisted strokes use the sequential family `stroke_<n>`; in-progress
/// eraser buffers use `eraser_<millis>` and never reach a layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrokeId(String);

impl StrokeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn sequential(n: u64) -> Self {
        Self(format!("{SEQUENTIAL_PREFIX}{n}"))
    }

    pub fn ephemeral(millis: u128) -> Self {
        Self(format!("{EPHEMERAL_PREFIX}{millis}"))
    }

    /// The `<n>` of a `stroke_<n>` id.
    pub fn sequence_number(&self) -> Option<u64> {
        self.0.strip_prefix(SEQUENTIAL_PREFIX)?.parse().ok()
    }

    pub fn is_ephemeral(&self) -> bool {
        self.0.starts_with(EPHEMERAL_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StrokeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StrokeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl PartialEq<str> for StrokeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StrokeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A single drawable path with its own style.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    pub id: StrokeId,
    /// Outline color. `None` only for working eraser buffers.
    pub color: Option<Color>,
    /// Line width for polylines, diameter for single-point dots.
    pub width: f64,
    /// Path vertices in drawing order.
    pub points: Vec<Point>,
    /// Fill color; only meaningful with three or more points.
    pub fill: Option<Color>,
    /// Non-destructive erase marker.
    pub erased: bool,
}

impl Stroke {
    pub fn new(id: StrokeId, color: Color, width: f64, points: Vec<Point>) -> Self {
        Self {
            id,
            color: Some(color),
            width,
            points,
            fill: None,
            erased: false,
        }
    }

    /// A colorless working buffer for an eraser gesture.
    pub fn eraser(id: StrokeId, width: f64) -> Self {
        Self {
            id,
            color: None,
            width,
            points: Vec::new(),
            fill: None,
            erased: false,
        }
    }

    pub fn with_fill(mut self, fill: Option<Color>) -> Self {
        self.fill = fill;
        self
    }

    /// True if the stroke participates in rendering and hit-testing.
    pub fn is_live(&self) -> bool {
        !self.erased && !self.points.is_empty()
    }

    /// Vertices to fill, if the stroke is a filled polygon.
    pub fn fill_polygon(&self) -> Option<(&[Point], Color)> {
        match self.fill {
            Some(fill) if self.points.len() >= 3 => Some((&self.points, fill)),
            _ => None,
        }
    }
}

/// An ordered, independently visible collection of strokes.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub visible: bool,
    /// Strokes in creation order, oldest first.
    pub strokes: Vec<Stroke>,
}

impl Layer {
    pub fn new(id: LayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            visible: true,
            strokes: Vec::new(),
        }
    }

    pub fn find_stroke(&self, id: &str) -> Option<&Stroke> {
        self.strokes.iter().find(|s| s.id == id)
    }

    pub fn find_stroke_mut(&mut self, id: &str) -> Option<&mut Stroke> {
        self.strokes.iter_mut().find(|s| s.id == id)
    }

    /// Remove a stroke outright (not a soft erase).
    pub fn remove_stroke(&mut self, id: &str) -> Option<Stroke> {
        let index = self.strokes.iter().position(|s| s.id == id)?;
        Some(self.strokes.remove(index))
    }

    /// Strokes that are not erased, in paint order.
    pub fn live_strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.strokes.iter().filter(|s| s.is_live())
    }
}

/// Direction for [`Document::reorder_layer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards index 0, i.e. visually on top.
    Up,
    /// Towards the end of the list, i.e. visually below.
    Down,
}

/// An InkScript document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub background: Color,
    /// Layers front-to-back: index 0 is topmost and painted last.
    pub layers: Vec<Layer>,
    /// `None` once the last representable id has been handed out.
    next_layer_id: Option<u32>,
    next_stroke_sequence: Option<u64>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with default canvas settings and no layers.
    pub fn new() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            background: DEFAULT_BACKGROUND,
            layers: Vec::new(),
            next_layer_id: Some(1),
            next_stroke_sequence: Some(1),
        }
    }

    /// Create a document holding a single empty layer, as a fresh editor does.
    pub fn with_default_layer() -> Self {
        let mut doc = Self::new();
        doc.add_layer(None);
        doc
    }

    pub fn next_layer_id(&self) -> Option<u32> {
        self.next_layer_id
    }

    pub fn next_stroke_sequence(&self) -> Option<u64> {
        self.next_stroke_sequence
    }

    /// Allocate a fresh `stroke_<n>` id, or `None` once the sequence is
    /// exhausted.
    pub fn next_stroke_id(&mut self) -> Option<StrokeId> {
        let n = self.next_stroke_sequence?;
        self.next_stroke_sequence = n.checked_add(1);
        Some(StrokeId::sequential(n))
    }

    /// Allocate a fresh layer id, or `None` once the id space is exhausted.
    pub fn allocate_layer_id(&mut self) -> Option<LayerId> {
        let n = self.next_layer_id?;
        self.next_layer_id = n.checked_add(1);
        Some(LayerId(n))
    }

    /// Advance the stroke counter past `id` if it is sequential. Returns false
    /// for the last representable sequence number, which no fresh id can
    /// follow; the counter is left unchanged.
    pub fn note_stroke_id(&mut self, id: &StrokeId) -> bool {
        let Some(n) = id.sequence_number() else {
            return true;
        };
        let Some(after) = n.checked_add(1) else {
            return false;
        };
        if self.next_stroke_sequence.is_some_and(|next| after > next) {
            self.next_stroke_sequence = Some(after);
        }
        true
    }

    /// Advance the layer counter past `id`. Returns false for `u32::MAX`.
    pub fn note_layer_id(&mut self, id: LayerId) -> bool {
        let Some(after) = id.0.checked_add(1) else {
            return false;
        };
        if self.next_layer_id.is_some_and(|next| after > next) {
            self.next_layer_id = Some(after);
        }
        true
    }

    /// Add a new topmost layer. `None` names it `Layer <id>`. Returns `None`
    /// if no layer id is left.
    pub fn add_layer(&mut self, name: Option<&str>) -> Option<&mut Layer> {
        let id = self.allocate_layer_id()?;
        let name = name.map_or_else(|| format!("Layer {id}"), str::to_string);
        self.layers.insert(0, Layer::new(id, name));
        self.layers.first_mut()
    }

    /// Remove a layer and all its strokes.
    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        let index = self.layer_index(id)?;
        Some(self.layers.remove(index))
    }

    /// Swap a layer with its neighbour. Returns false at the boundaries or if
    /// the layer does not exist.
    pub fn reorder_layer(&mut self, id: LayerId, direction: Direction) -> bool {
        let Some(index) = self.layer_index(id) else {
            return false;
        };
        match direction {
            Direction::Up if index > 0 => {
                self.layers.swap(index, index - 1);
                true
            }
            Direction::Down if index + 1 < self.layers.len() => {
                self.layers.swap(index, index + 1);
                true
            }
            _ => false,
        }
    }

    pub fn layer_index(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    pub fn find_layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn find_layer_mut(&mut self, id: LayerId) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Find a stroke anywhere in the document.
    pub fn find_stroke(&self, id: &str) -> Option<(&Layer, &Stroke)> {
        self.layers
            .iter()
            .find_map(|layer| layer.find_stroke(id).map(|stroke| (layer, stroke)))
    }

    /// Find a stroke anywhere in the document, mutably.
    pub fn find_stroke_mut(&mut self, id: &str) -> Option<(LayerId, &mut Stroke)> {
        self.layers.iter_mut().find_map(|layer| {
            let layer_id = layer.id;
            layer.find_stroke_mut(id).map(|stroke| (layer_id, stroke))
        })
    }

    pub fn contains_stroke(&self, id: &str) -> bool {
        self.find_stroke(id).is_some()
    }

    /// Destroy every stroke of a layer. Returns how many were removed.
    pub fn clear_layer(&mut self, id: LayerId) -> usize {
        self.find_layer_mut(id).map_or(0, |layer| {
            let count = layer.strokes.len();
            layer.strokes.clear();
            count
        })
    }

    pub fn set_layer_visible(&mut self, id: LayerId, visible: bool) -> bool {
        self.find_layer_mut(id).map(|l| l.visible = visible).is_some()
    }

    pub fn rename_layer(&mut self, id: LayerId, name: impl Into<String>) -> bool {
        self.find_layer_mut(id).map(|l| l.name = name.into()).is_some()
    }

    /// Total number of strokes, erased ones included.
    pub fn stroke_count(&self) -> usize {
        self.layers.iter().map(|l| l.strokes.len()).sum()
    }

    /// True if the document has no strokes at all.
    pub fn is_empty(&self) -> bool {
        self.stroke_count() == 0
    }
}
