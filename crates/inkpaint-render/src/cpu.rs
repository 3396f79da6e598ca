//! CPU rasterizer built on tiny-skia.

use crate::renderer::{Frame, Rasterizer, RenderResult, RendererError};
use inkpaint_core::{Color, RenderCommand, Scene};
use kurbo::Point;
use tiny_skia::{FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Largest width or height the CPU rasterizer will allocate.
pub const MAX_FRAME_DIMENSION: u32 = 16_384;

/// Software rasterizer. Document units map 1:1 to pixels.
#[derive(Debug, Clone)]
pub struct CpuRasterizer {
    pub anti_alias: bool,
}

impl Default for CpuRasterizer {
    fn default() -> Self {
        Self { anti_alias: true }
    }
}

impl CpuRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn paint(&self, color: Color) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, 255);
        paint.anti_alias = self.anti_alias;
        paint
    }

    fn draw(&self, pixmap: &mut Pixmap, command: &RenderCommand) {
        match command {
            RenderCommand::FillPolygon { points, color } => {
                let Some(path) = polyline_path(points, true) else {
                    return;
                };
                pixmap.fill_path(&path, &self.paint(*color), FillRule::EvenOdd, Transform::identity(), None);
            }
            RenderCommand::StrokePolyline { points, color, width } => {
                let Some(path) = polyline_path(points, false) else {
                    return;
                };
                let stroke = Stroke {
                    width: *width as f32,
                    line_cap: LineCap::Round,
                    line_join: LineJoin::Round,
                    ..Stroke::default()
                };
                pixmap.stroke_path(&path, &self.paint(*color), &stroke, Transform::identity(), None);
            }
            RenderCommand::Dot { center, color, diameter } => {
                let radius = (diameter / 2.0).max(1.0) as f32;
                let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, radius) else {
                    return;
                };
                pixmap.fill_path(&path, &self.paint(*color), FillRule::Winding, Transform::identity(), None);
            }
        }
    }
}

impl Rasterizer for CpuRasterizer {
    fn render(&mut self, scene: &Scene) -> RenderResult<Frame> {
        let invalid = || RendererError::InvalidSize {
            width: scene.width,
            height: scene.height,
        };
        if scene.width > MAX_FRAME_DIMENSION || scene.height > MAX_FRAME_DIMENSION {
            return Err(invalid());
        }
        let mut pixmap = Pixmap::new(scene.width, scene.height).ok_or_else(invalid)?;
        let bg = scene.background;
        pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, 255));

        for command in &scene.commands {
            self.draw(&mut pixmap, command);
        }
        log::debug!(
            "Rasterized {} commands into {}x{}",
            scene.commands.len(),
            scene.width,
            scene.height
        );

        let pixels = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();
        Ok(Frame {
            width: scene.width,
            height: scene.height,
            pixels,
        })
    }
}

fn polyline_path(points: &[Point], close: bool) -> Option<tiny_skia::Path> {
    let (first, rest) = points.split_first()?;
    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for p in rest {
        pb.line_to(p.x as f32, p.y as f32);
    }
    if close {
        pb.close();
    }
    pb.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Color = Color::new(0x0b, 0x0d, 0x12);

    fn rgba(c: Color) -> [u8; 4] {
        [c.r, c.g, c.b, 255]
    }

    fn scene(commands: Vec<RenderCommand>) -> Scene {
        Scene {
            width: 64,
            height: 48,
            background: BG,
            commands,
        }
    }

    #[test]
    fn test_background_only() {
        let frame = CpuRasterizer::new().render(&scene(vec![])).unwrap();
        assert_eq!((frame.width, frame.height), (64, 48));
        assert_eq!(frame.pixels.len(), 64 * 48 * 4);
        assert_eq!(frame.pixel(0, 0), Some(rgba(BG)));
        assert_eq!(frame.pixel(63, 47), Some(rgba(BG)));
    }

    #[test]
    fn test_zero_size_is_error() {
        let mut empty = scene(vec![]);
        empty.width = 0;
        assert!(matches!(
            CpuRasterizer::new().render(&empty),
            Err(RendererError::InvalidSize { width: 0, height: 48 })
        ));
    }

    #[test]
    fn test_oversized_frame_is_error() {
        let mut huge = scene(vec![]);
        huge.width = 200_000;
        huge.height = 200_000;
        assert!(matches!(
            CpuRasterizer::new().render(&huge),
            Err(RendererError::InvalidSize {
                width: 200_000,
                height: 200_000
            })
        ));

        let mut edge = scene(vec![]);
        edge.width = MAX_FRAME_DIMENSION;
        edge.height = 1;
        assert!(CpuRasterizer::new().render(&edge).is_ok());
    }

    #[test]
    fn test_fill_then_outline() {
        let red = Color::new(255, 0, 0);
        let white = Color::WHITE;
        let square = vec![
            Point::new(10.0, 10.0),
            Point::new(40.0, 10.0),
            Point::new(40.0, 40.0),
            Point::new(10.0, 40.0),
        ];
        let frame = CpuRasterizer::new()
            .render(&scene(vec![
                RenderCommand::FillPolygon {
                    points: square.clone(),
                    color: red,
                },
                RenderCommand::StrokePolyline {
                    points: square,
                    color: white,
                    width: 4.0,
                },
            ]))
            .unwrap();

        assert_eq!(frame.pixel(25, 25), Some(rgba(red)));
        assert_eq!(frame.pixel(25, 10), Some(rgba(white)));
        assert_eq!(frame.pixel(50, 25), Some(rgba(BG)));
    }

    #[test]
    fn test_even_odd_fill() {
        // A pentagram: the centre pentagon is covered twice and stays empty.
        let star: Vec<Point> = (0..5)
            .map(|i| {
                let t = std::f64::consts::TAU * (i * 2) as f64 / 5.0 - std::f64::consts::FRAC_PI_2;
                Point::new(32.0 + 20.0 * t.cos(), 24.0 + 20.0 * t.sin())
            })
            .collect();
        let blue = Color::new(0, 0, 255);
        let frame = CpuRasterizer::new()
            .render(&scene(vec![RenderCommand::FillPolygon { points: star, color: blue }]))
            .unwrap();

        assert_eq!(frame.pixel(32, 24), Some(rgba(BG)));
        // Tip of the top point.
        assert_eq!(frame.pixel(32, 8), Some(rgba(blue)));
    }

    #[test]
    fn test_dot_has_minimum_radius() {
        let green = Color::new(0, 255, 0);
        let mut rasterizer = CpuRasterizer { anti_alias: false };
        let frame = rasterizer
            .render(&scene(vec![
                RenderCommand::Dot {
                    center: Point::new(20.5, 20.5),
                    color: green,
                    diameter: 0.5,
                },
                RenderCommand::Dot {
                    center: Point::new(40.5, 20.5),
                    color: green,
                    diameter: 10.0,
                },
            ]))
            .unwrap();

        assert_eq!(frame.pixel(20, 20), Some(rgba(green)));
        assert_eq!(frame.pixel(22, 20), Some(rgba(BG)));
        assert_eq!(frame.pixel(44, 20), Some(rgba(green)));
        assert_eq!(frame.pixel(47, 20), Some(rgba(BG)));
    }

    #[test]
    fn test_single_point_polyline_is_skipped() {
        let frame = CpuRasterizer::new()
            .render(&scene(vec![RenderCommand::StrokePolyline {
                points: vec![Point::new(5.0, 5.0)],
                color: Color::WHITE,
                width: 3.0,
            }]))
            .unwrap();
        assert!(frame.pixels.chunks(4).all(|p| p == rgba(BG)));
    }
}
