//! InkPaint Render Library
//!
//! Rasterizer abstraction and a CPU implementation that turns the render
//! commands compiled by `inkpaint-core` into RGBA pixels and PNG files.

mod cpu;
mod renderer;

pub use cpu::{CpuRasterizer, MAX_FRAME_DIMENSION};
pub use renderer::{Frame, RenderResult, Rasterizer, RendererError};

use inkpaint_core::{Document, Scene};

/// Rasterize a document on the CPU and encode it as PNG.
pub fn render_png(document: &Document) -> RenderResult<Vec<u8>> {
    let scene = Scene::from_document(document);
    let frame = CpuRasterizer::new().render(&scene)?;
    frame.to_png()
}
