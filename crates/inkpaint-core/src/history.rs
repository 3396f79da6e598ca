//! Invertible editing operations and the linear undo log.

use crate::color::Color;
use crate::document::{Document, LayerId, Stroke, StrokeId};
use kurbo::Point;

/// Maximum number of operations kept on the undo stack.
pub const MAX_UNDO_HISTORY: usize = 50;

/// Before/after geometry of one stroke in a [`Operation::MoveStrokes`].
#[derive(Debug, Clone, PartialEq)]
pub struct MoveEntry {
    pub id: StrokeId,
    pub old_points: Vec<Point>,
    pub new_points: Vec<Point>,
}

/// A recorded edit. Each variant carries enough state to replay itself in
/// both directions.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    AddStroke {
        layer: LayerId,
        stroke: Stroke,
    },
    EraseStrokes {
        layer: LayerId,
        ids: Vec<StrokeId>,
    },
    MoveStrokes {
        layer: LayerId,
        entries: Vec<MoveEntry>,
    },
    SetFill {
        layer: LayerId,
        stroke: StrokeId,
        old_fill: Option<Color>,
        new_fill: Option<Color>,
    },
}

impl Operation {
    pub fn layer(&self) -> LayerId {
        match self {
            Operation::AddStroke { layer, .. }
            | Operation::EraseStrokes { layer, .. }
            | Operation::MoveStrokes { layer, .. }
            | Operation::SetFill { layer, .. } => *layer,
        }
    }

    /// Apply the forward effect. Returns false if nothing in the document
    /// matched (the layer or every target stroke is gone).
    pub fn apply(&self, doc: &mut Document) -> bool {
        self.replay(doc, true)
    }

    /// Apply the inverse effect.
    pub fn revert(&self, doc: &mut Document) -> bool {
        self.replay(doc, false)
    }

    fn replay(&self, doc: &mut Document, forward: bool) -> bool {
        let Some(layer) = doc.find_layer_mut(self.layer()) else {
            log::debug!("operation targets missing layer {}", self.layer());
            return false;
        };

        match self {
            Operation::AddStroke { stroke, .. } => {
                if forward {
                    if layer.find_stroke(stroke.id.as_str()).is_some() {
                        return false;
                    }
                    layer.strokes.push(stroke.clone());
                    true
                } else {
                    layer.remove_stroke(stroke.id.as_str()).is_some()
                }
            }
            Operation::EraseStrokes { ids, .. } => {
                let mut touched = false;
                for id in ids {
                    if let Some(stroke) = layer.find_stroke_mut(id.as_str()) {
                        stroke.erased = forward;
                        touched = true;
                    }
                }
                touched
            }
            Operation::MoveStrokes { entries, .. } => {
                let mut touched = false;
                for entry in entries {
                    if let Some(stroke) = layer.find_stroke_mut(entry.id.as_str()) {
                        let points = if forward { &entry.new_points } else { &entry.old_points };
                        stroke.points.clone_from(points);
                        touched = true;
                    }
                }
                touched
            }
            Operation::SetFill {
                stroke,
                old_fill,
                new_fill,
                ..
            } => match layer.find_stroke_mut(stroke.as_str()) {
                Some(target) => {
                    target.fill = if forward { *new_fill } else { *old_fill };
                    true
                }
                None => false,
            },
        }
    }
}

/// Linear undo/redo history. Branching is not supported: recording a new
/// operation discards everything that could have been redone.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<Operation>,
    redo_stack: Vec<Operation>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `op` to `doc` and record it if it changed anything.
    pub fn apply(&mut self, op: Operation, doc: &mut Document) -> bool {
        if !op.apply(doc) {
            return false;
        }
        self.record(op);
        true
    }

    /// Record an operation whose forward effect is already in the document.
    pub fn record(&mut self, op: Operation) {
        self.undo_stack.push(op);
        self.redo_stack.clear();

        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the most recent operation.
    /// Returns true if an entry was undone, false if there was nothing to undo.
    pub fn undo(&mut self, doc: &mut Document) -> bool {
        let Some(op) = self.undo_stack.pop() else {
            return false;
        };
        if !op.revert(doc) {
            log::debug!("undo of {op:?} found nothing to restore");
        }
        self.redo_stack.push(op);
        true
    }

    /// Redo the most recently undone operation.
    /// Returns true if an entry was redone, false if there was nothing to redo.
    pub fn redo(&mut self, doc: &mut Document) -> bool {
        let Some(op) = self.redo_stack.pop() else {
            return false;
        };
        if !op.apply(doc) {
            log::debug!("redo of {op:?} found nothing to reapply");
        }
        self.undo_stack.push(op);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Forget all history, e.g. after loading a different document.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
