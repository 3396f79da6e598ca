//! InkPaint Core Library
//!
//! The InkScript document engine: document model, `.inks` parser and
//! serializer, invertible editing operations with an undo log, geometry
//! kernel and render-command compiler. Performs no pixel work and, outside
//! of [`storage`], no I/O.

pub mod color;
pub mod document;
pub mod editor;
pub mod geometry;
pub mod history;
pub mod inkscript;
pub mod render;
pub mod storage;
pub mod tools;

pub use color::{Color, ColorParseError};
pub use document::{Direction, Document, Layer, LayerId, Stroke, StrokeId};
pub use editor::{Editor, EditorSettings};
pub use history::{History, MoveEntry, Operation};
pub use inkscript::{FormatError, parse, serialize};
pub use render::{RenderCommand, Scene, compile};
pub use storage::{AutoSaveManager, FileStorage, MemoryStorage, Storage, StorageError, StorageResult};
pub use tools::{EraserPath, Gesture, ToolKind, ToolManager};

pub use kurbo::{Point, Rect, Vec2};
