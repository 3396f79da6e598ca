//! Rasterizer trait abstraction.

use inkpaint_core::Scene;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Invalid frame size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("PNG encoding failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// A backend that paints a [`Scene`] into pixels.
pub trait Rasterizer {
    /// Paint the background and every command, in order.
    fn render(&mut self, scene: &Scene) -> RenderResult<Frame>;
}

/// A rendered image: straight (non-premultiplied) RGBA8, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    /// RGBA of the pixel at `(x, y)`, or `None` outside the frame.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let px = self.pixels.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Encode the frame as an RGBA8 PNG.
    pub fn to_png(&self) -> RenderResult<Vec<u8>> {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);

            let mut writer = encoder
                .write_header()
                .map_err(|e| RendererError::Encode(format!("Failed to write PNG header: {e}")))?;
            writer
                .write_image_data(&self.pixels)
                .map_err(|e| RendererError::Encode(format!("Failed to write PNG data: {e}")))?;
        }
        log::debug!("Encoded {}x{} PNG, {} bytes", self.width, self.height, png_data.len());
        Ok(png_data)
    }
}
