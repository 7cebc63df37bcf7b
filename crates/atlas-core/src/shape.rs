//! Region shapes.
//!
//! Each region kind is its own struct implementing [`RegionGeometry`].
//! Everything downstream (hit testing, painting, commit validation) goes
//! through that trait, so adding a kind means adding a struct and an enum
//! arm here, and nothing in the interaction code.

use crate::geometry::{
    ImagePoint, RenderPoint, centroid, is_valid_polygon, point_in_polygon, to_render_space,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Capabilities every region kind provides.
pub trait RegionGeometry {
    /// Image-space containment test.
    fn contains_point(&self, point: ImagePoint) -> bool;

    /// Number of control points that define the shape.
    fn point_count(&self) -> usize;

    /// Whether the shape may be committed to a document.
    fn is_valid(&self) -> bool;

    /// Render-space outline for the paint surface.
    fn to_render_shape(&self, document_height: f64) -> RenderShape;

    /// Image-space anchor for the region's label.
    fn label_anchor(&self) -> Option<ImagePoint>;
}

/// The drawable kinds of region. Used to pick a drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionKind {
    Polygon,
    Circle,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionKind::Polygon => f.write_str("polygon"),
            RegionKind::Circle => f.write_str("circle"),
        }
    }
}

/// Closed polygon, vertices in image space.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolygonShape {
    pub points: Vec<ImagePoint>,
}

impl RegionGeometry for PolygonShape {
    fn contains_point(&self, point: ImagePoint) -> bool {
        point_in_polygon(point, &self.points)
    }

    fn point_count(&self) -> usize {
        self.points.len()
    }

    fn is_valid(&self) -> bool {
        is_valid_polygon(&self.points)
    }

    fn to_render_shape(&self, document_height: f64) -> RenderShape {
        RenderShape::Polygon(
            self.points
                .iter()
                .map(|p| to_render_space(*p, document_height))
                .collect(),
        )
    }

    fn label_anchor(&self) -> Option<ImagePoint> {
        centroid(&self.points)
    }
}

/// Circle in image space.
///
/// Declared by the persisted format. There is no drawing tool for it yet;
/// loaded circles are hit-tested and painted like any other region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CircleShape {
    pub center: ImagePoint,
    pub radius: f64,
}

impl RegionGeometry for CircleShape {
    fn contains_point(&self, point: ImagePoint) -> bool {
        self.center.distance_to(&point) <= self.radius
    }

    fn point_count(&self) -> usize {
        1
    }

    fn is_valid(&self) -> bool {
        self.center.is_finite() && self.radius.is_finite() && self.radius > 0.0
    }

    fn to_render_shape(&self, document_height: f64) -> RenderShape {
        RenderShape::Circle {
            center: to_render_space(self.center, document_height),
            radius: self.radius,
        }
    }

    fn label_anchor(&self) -> Option<ImagePoint> {
        Some(self.center)
    }
}

/// Geometry of a region, tagged by `type` in the persisted form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RegionShape {
    Polygon(PolygonShape),
    Circle(CircleShape),
}

impl RegionShape {
    pub fn polygon(points: Vec<ImagePoint>) -> Self {
        Self::Polygon(PolygonShape { points })
    }

    pub fn circle(center: ImagePoint, radius: f64) -> Self {
        Self::Circle(CircleShape { center, radius })
    }

    pub fn kind(&self) -> RegionKind {
        match self {
            Self::Polygon(_) => RegionKind::Polygon,
            Self::Circle(_) => RegionKind::Circle,
        }
    }

    /// The shape behind its capability trait.
    pub fn geometry(&self) -> &dyn RegionGeometry {
        match self {
            Self::Polygon(p) => p,
            Self::Circle(c) => c,
        }
    }
}

/// Render-space outline produced by [`RegionGeometry::to_render_shape`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderShape {
    Polygon(Vec<RenderPoint>),
    Circle { center: RenderPoint, radius: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_render_shape_flips_every_vertex() {
        let shape = RegionShape::polygon(vec![
            ImagePoint::new(0.0, 0.0),
            ImagePoint::new(10.0, 0.0),
            ImagePoint::new(10.0, 10.0),
        ]);
        let RenderShape::Polygon(points) = shape.geometry().to_render_shape(100.0) else {
            panic!("expected polygon");
        };
        assert_eq!(
            points,
            vec![
                RenderPoint::new(0.0, 100.0),
                RenderPoint::new(10.0, 100.0),
                RenderPoint::new(10.0, 90.0),
            ]
        );
    }

    #[test]
    fn circle_containment_and_validity() {
        let shape = RegionShape::circle(ImagePoint::new(50.0, 50.0), 10.0);
        let geo = shape.geometry();
        assert!(geo.contains_point(ImagePoint::new(55.0, 55.0)));
        assert!(!geo.contains_point(ImagePoint::new(70.0, 50.0)));
        assert!(geo.is_valid());
        assert!(!RegionShape::circle(ImagePoint::new(0.0, 0.0), 0.0).geometry().is_valid());
        assert!(!RegionShape::circle(ImagePoint::new(f64::NAN, 0.0), 5.0).geometry().is_valid());
    }

    #[test]
    fn two_point_polygon_is_invalid() {
        let shape = RegionShape::polygon(vec![ImagePoint::new(0.0, 0.0), ImagePoint::new(1.0, 1.0)]);
        assert_eq!(shape.geometry().point_count(), 2);
        assert!(!shape.geometry().is_valid());
    }

    #[test]
    fn shape_serializes_with_type_tag() {
        let shape = RegionShape::circle(ImagePoint::new(1.0, 2.0), 3.0);
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["type"], "circle");
        assert_eq!(json["radius"], 3.0);
        let back: RegionShape = serde_json::from_value(json).unwrap();
        assert_eq!(back, shape);
    }
}
