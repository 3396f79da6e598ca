//! Geometry kernel.
//!
//! Pure functions over point lists. Nothing here knows about rendering
//! surfaces; hit tests and fill detection run directly on document
//! coordinates.
//!
//! Point-in-polygon boundary convention: the ray-casting test is half-open.
//! A point lying exactly on an edge at the polygon's minimum x or minimum y
//! side is inside, one lying on the maximum x or maximum y side is outside.
//! For the square `(0,0)-(10,10)`: `(0,5)` and `(5,0)` are inside, `(10,5)`
//! and `(5,10)` are outside.

use crate::document::Stroke;
use kurbo::{Point, Rect, Vec2};

/// Edges whose vertical extent is below this contribute no ray crossing.
const HORIZONTAL_EPSILON: f64 = 1e-12;

/// Default lower bound on ellipse tessellation segments.
pub const MIN_ELLIPSE_SEGMENTS: usize = 12;

/// Upper bound on ellipse tessellation segments, whatever the radius.
pub const MAX_ELLIPSE_SEGMENTS: usize = 4096;

/// Ray-casting point-in-polygon test.
///
/// `vertices` is treated as a closed ring; the edge from the last vertex back
/// to the first is implicit. Fewer than three vertices is never "inside".
pub fn point_in_polygon(point: Point, vertices: &[Point]) -> bool {
    if vertices.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[j];
        j = i;

        let dy = b.y - a.y;
        if dy.abs() < HORIZONTAL_EPSILON {
            continue;
        }
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = a.x + (b.x - a.x) * (point.y - a.y) / dy;
            if point.x < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

/// Squared euclidean distance between two points.
pub fn distance_sq(a: Point, b: Point) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    dx * dx + dy * dy
}

/// True iff some point of `path` lies within `radius` (inclusive) of some
/// point of `points`.
pub fn points_within(points: &[Point], path: &[Point], radius: f64) -> bool {
    let Some(bounds) = bounding_box(points) else {
        return false;
    };
    let reach = bounds.inflate(radius, radius);
    let radius_sq = radius * radius;

    path.iter()
        .filter(|p| contains_inclusive(reach, **p))
        .any(|p| points.iter().any(|q| distance_sq(*p, *q) <= radius_sq))
}

/// Eraser hit test: exact minimum pairwise distance between the eraser path
/// and the stroke's points, compared against `radius` (boundary-inclusive).
pub fn hit_test_stroke(stroke: &Stroke, path: &[Point], radius: f64) -> bool {
    points_within(&stroke.points, path, radius)
}

/// Sample an axis-aligned ellipse into a closed polyline.
///
/// Uses `max(min_segments, round(24 * max(rx, ry) / 100))` segments, capped
/// at [`MAX_ELLIPSE_SEGMENTS`]; the result has one more point than segments
/// and its last point is exactly the first.
pub fn tessellate_ellipse(center: Point, radius_x: f64, radius_y: f64, min_segments: usize) -> Vec<Point> {
    let rx = radius_x.abs();
    let ry = radius_y.abs();
    let scaled = (24.0 * rx.max(ry) / 100.0).round() as usize;
    let segments = min_segments.max(scaled).clamp(1, MAX_ELLIPSE_SEGMENTS);

    let mut points: Vec<Point> = (0..segments)
        .map(|i| {
            let t = std::f64::consts::TAU * i as f64 / segments as f64;
            Point::new(center.x + rx * t.cos(), center.y + ry * t.sin())
        })
        .collect();
    points.push(points[0]);
    points
}

/// Closed 5-point outline of the axis-aligned rectangle spanned by two
/// opposite corners, starting at the minimum corner.
pub fn rect_outline(p0: Point, p1: Point) -> Vec<Point> {
    let rect = Rect::from_points(p0, p1);
    vec![
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
        Point::new(rect.x0, rect.y0),
    ]
}

/// Axis-aligned bounding box, or `None` for an empty point list.
pub fn bounding_box(points: &[Point]) -> Option<Rect> {
    let first = *points.first()?;
    let rect = points
        .iter()
        .fold(Rect::from_points(first, first), |acc, p| acc.union_pt(*p));
    Some(rect)
}

/// True if any point lies inside `rect`, edges included.
pub fn points_in_rect(points: &[Point], rect: Rect) -> bool {
    let rect = rect.abs();
    points.iter().any(|p| contains_inclusive(rect, *p))
}

/// Offset every point by `delta`.
pub fn translate(points: &[Point], delta: Vec2) -> Vec<Point> {
    points.iter().map(|p| *p + delta).collect()
}

fn contains_inclusive(rect: Rect, p: Point) -> bool {
    p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
}
