//! Geometry kernel: coordinate transforms and polygon tests.
//!
//! Two coordinate systems meet here:
//!
//! - **Image space**: the raster's own pixels. Origin top-left, Y down.
//!   Everything persisted in a map document lives in image space.
//! - **Render space**: the paint surface. Origin bottom-left, Y up.
//!   Pointer events arrive in render space.
//!
//! The only difference is the vertical flip, so both transforms need the
//! document height and nothing else.

use serde::{Deserialize, Serialize};

/// Polygons need at least this many vertices to enclose an area.
pub const MIN_POLYGON_POINTS: usize = 3;

/// Tolerance for treating two vertices as the same point.
pub const EPSILON: f64 = 1e-9;

/// A position in image space (origin top-left, Y down).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}

impl ImagePoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Whether both coordinates are within `EPSILON` of `other`.
    pub fn approx_eq(&self, other: &ImagePoint) -> bool {
        (self.x - other.x).abs() <= EPSILON && (self.y - other.y).abs() <= EPSILON
    }

    pub fn distance_to(&self, other: &ImagePoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// JSON has no NaN or infinity, so only finite points can be persisted.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A position in render space (origin bottom-left, Y up).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderPoint {
    pub x: f64,
    pub y: f64,
}

impl RenderPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Image space → render space.
pub fn to_render_space(point: ImagePoint, document_height: f64) -> RenderPoint {
    RenderPoint {
        x: point.x,
        y: document_height - point.y,
    }
}

/// Render space → image space. Exact inverse of [`to_render_space`].
pub fn to_image_space(point: RenderPoint, document_height: f64) -> ImagePoint {
    ImagePoint {
        x: point.x,
        y: document_height - point.y,
    }
}

/// Even-odd ray-cast containment test in image space.
///
/// A horizontal ray is cast from `point` towards +X and edge crossings are
/// counted. Zero-length edges (repeated consecutive vertices, or a closing
/// vertex equal to the first) are skipped. Each edge is treated as half-open
/// in Y, so a point lying exactly on a boundary always lands on the same
/// side for identical inputs.
///
/// Self-intersecting polygons get whatever the parity rule yields; no
/// validation is done here.
pub fn point_in_polygon(point: ImagePoint, polygon: &[ImagePoint]) -> bool {
    if polygon.len() < MIN_POLYGON_POINTS {
        return false;
    }

    let mut inside = false;
    let mut prev = polygon[polygon.len() - 1];
    for &curr in polygon {
        let (a, b) = (curr, prev);
        prev = curr;

        if a.approx_eq(&b) {
            continue;
        }

        // Straddle check; also guarantees a.y != b.y below.
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

/// A polygon is valid when it has at least [`MIN_POLYGON_POINTS`] vertices,
/// all finite.
///
/// Self-intersection is not checked.
pub fn is_valid_polygon(points: &[ImagePoint]) -> bool {
    points.len() >= MIN_POLYGON_POINTS && points.iter().all(ImagePoint::is_finite)
}

/// Vertex mean of a point set. Used to anchor region labels.
pub fn centroid(points: &[ImagePoint]) -> Option<ImagePoint> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sx, sy) = points
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(ImagePoint::new(sx / n, sy / n))
}
