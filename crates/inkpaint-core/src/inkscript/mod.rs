//! InkScript (`.inks`) text format.
//!
//! ```text
//! inkscript 1.0
//!
//! canvas 1000 700
//! background #0b0d12
//!
//! layer id=1 name="Layer 1" visible=true {
//!   draw path id=stroke_1 {
//!     move 10.00 20.00
//!     line 30.00 40.00
//!   } stroke=#ffffff strokeWidth=3
//! }
//! ```

mod parser;
mod tokens;
mod writer;

pub use parser::{DEFAULT_STROKE_COLOR, DEFAULT_STROKE_WIDTH, parse};
pub use writer::serialize;

use thiserror::Error;

/// First token of every InkScript file.
pub const HEADER_KEYWORD: &str = "inkscript";
/// Version written by [`serialize`].
pub const FORMAT_VERSION: &str = "1.0";

/// Fatal parse errors. Everything else is recovered from and logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("document is empty")]
    Empty,
    #[error("line {line}: expected `inkscript` header, found `{found}`")]
    MissingHeader { line: usize, found: String },
}

impl FormatError {
    /// 1-based line number the error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            FormatError::Empty => None,
            FormatError::MissingHeader { line, .. } => Some(*line),
        }
    }
}
