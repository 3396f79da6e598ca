//! Render-command compiler.
//!
//! Flattens a document into the ordered list of primitives a rasterizer
//! paints. No pixel work happens here.

use crate::color::Color;
use crate::document::{Document, Stroke};
use crate::inkscript::DEFAULT_STROKE_COLOR;
use kurbo::Point;

/// A single paint primitive, in document coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Filled polygon; the ring is implicitly closed.
    FillPolygon { points: Vec<Point>, color: Color },
    /// Open polyline through every point in order.
    StrokePolyline { points: Vec<Point>, color: Color, width: f64 },
    /// Filled circle of the given diameter.
    Dot { center: Point, color: Color, diameter: f64 },
}

/// Compile a document into paint order: back layer first, strokes in
/// creation order, fills before their outline.
pub fn compile(doc: &Document) -> Vec<RenderCommand> {
    let mut commands = Vec::new();
    for layer in doc.layers.iter().rev().filter(|l| l.visible) {
        for stroke in layer.live_strokes() {
            compile_stroke(stroke, &mut commands);
        }
    }
    commands
}

fn compile_stroke(stroke: &Stroke, out: &mut Vec<RenderCommand>) {
    let color = stroke.color.unwrap_or(DEFAULT_STROKE_COLOR);
    if let Some((points, fill)) = stroke.fill_polygon() {
        out.push(RenderCommand::FillPolygon {
            points: points.to_vec(),
            color: fill,
        });
    }
    match stroke.points.as_slice() {
        [] => {}
        [center] => out.push(RenderCommand::Dot {
            center: *center,
            color,
            diameter: stroke.width,
        }),
        points => out.push(RenderCommand::StrokePolyline {
            points: points.to_vec(),
            color,
            width: stroke.width,
        }),
    }
}

/// Everything a rasterizer needs to produce one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    pub commands: Vec<RenderCommand>,
}

impl Scene {
    pub fn from_document(doc: &Document) -> Self {
        Self {
            width: doc.canvas_width,
            height: doc.canvas_height,
            background: doc.background,
            commands: compile(doc),
        }
    }
}
