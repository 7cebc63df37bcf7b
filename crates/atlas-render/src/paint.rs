//! Map document → paint primitives.
//!
//! Produces plain render-space data in paint order: image layers, then
//! regions, then pin markers. A `PaintSurface` adapter pushes the list onto
//! whatever drawing technology the host uses.

use crate::color::Color;
use crate::hit::pin_footprint;
use atlas_core::config::EngineConfig;
use atlas_core::geometry::{RenderPoint, to_render_space};
use atlas_core::host::ImageResolver;
use atlas_core::id::AnnotationId;
use atlas_core::model::MapDocument;
use atlas_core::shape::RenderShape;
use kurbo::{BezPath, Circle, Point, Rect};

/// Outline of a region on the paint surface.
#[derive(Debug, Clone, PartialEq)]
pub enum Outline {
    Path(BezPath),
    Circle(Circle),
}

/// One drawable item at known render-space coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// A raster layer covering the whole map extent.
    Image {
        layer_id: String,
        uri: String,
        bounds: Rect,
        opacity: f32,
    },
    Region {
        id: AnnotationId,
        outline: Outline,
        color: Color,
        label: Option<(String, Point)>,
    },
    Marker {
        id: AnnotationId,
        anchor: Point,
        footprint: Rect,
        icon: String,
        color: Color,
        label: Option<String>,
    },
    /// Open polyline for a polygon still being drawn.
    Polyline { points: Vec<Point> },
}

fn to_kurbo(p: RenderPoint) -> Point {
    Point::new(p.x, p.y)
}

fn outline_of(shape: RenderShape) -> Outline {
    match shape {
        RenderShape::Polygon(points) => {
            let mut path = BezPath::new();
            let mut iter = points.into_iter().map(to_kurbo);
            if let Some(first) = iter.next() {
                path.move_to(first);
                for p in iter {
                    path.line_to(p);
                }
                path.close_path();
            }
            Outline::Path(path)
        }
        RenderShape::Circle { center, radius } => Outline::Circle(Circle::new(to_kurbo(center), radius)),
    }
}

/// Paint the whole document. Hidden layers and layers whose image cannot be
/// resolved are left out.
pub fn paint_document(
    doc: &MapDocument,
    config: &EngineConfig,
    images: &dyn ImageResolver,
) -> Vec<Primitive> {
    let height = doc.render_height();
    let extent = Rect::new(0.0, 0.0, doc.width() as f64, height);
    let mut out = Vec::with_capacity(doc.layers.len() + doc.regions.len() + doc.pins.len());

    for layer in doc.layers_in_paint_order() {
        if !layer.visible {
            continue;
        }
        let Some(uri) = images.resolve_image(&layer.image_ref) else {
            log::debug!("layer {} image {:?} did not resolve", layer.id, layer.image_ref);
            continue;
        };
        log::trace!("PAINT layer {} z={}", layer.id, layer.z_index);
        out.push(Primitive::Image {
            layer_id: layer.id.clone(),
            uri,
            bounds: extent,
            opacity: layer.opacity,
        });
    }

    for region in &doc.regions {
        let geo = region.geometry();
        let label = region.label.clone().zip(
            geo.label_anchor()
                .map(|a| to_kurbo(to_render_space(a, height))),
        );
        log::trace!("PAINT region {} ({})", region.id, region.shape.kind());
        out.push(Primitive::Region {
            id: region.id,
            outline: outline_of(geo.to_render_shape(height)),
            color: Color::resolve(region.color.as_deref(), &config.default_region_color),
            label,
        });
    }

    for pin in &doc.pins {
        let anchor = to_render_space(pin.position(), height);
        log::trace!("PAINT pin {} at ({}, {})", pin.id, anchor.x, anchor.y);
        out.push(Primitive::Marker {
            id: pin.id,
            anchor: to_kurbo(anchor),
            footprint: pin_footprint(pin, height, config.pin_marker),
            icon: pin
                .icon
                .clone()
                .unwrap_or_else(|| config.default_pin_icon.clone()),
            color: Color::resolve(pin.color.as_deref(), &config.default_pin_color),
            label: pin.label.clone(),
        });
    }

    out
}

/// Live feedback for an in-progress polygon: the accepted points as an open
/// polyline, plus a trailing segment to the cursor when one is given.
pub fn paint_drawing_preview(points: &[RenderPoint], cursor: Option<RenderPoint>) -> Option<Primitive> {
    if points.is_empty() {
        return None;
    }
    let points = points
        .iter()
        .copied()
        .chain(cursor)
        .map(to_kurbo)
        .collect();
    Some(Primitive::Polyline { points })
}

// ─── Surface adapter ─────────────────────────────────────────────────────────

/// Minimal contract of a paint target: add a primitive, get a handle back,
/// remove it later by handle.
pub trait PaintSurface {
    type Handle: Copy;

    fn add_primitive(&mut self, primitive: &Primitive) -> Self::Handle;

    fn remove_primitive(&mut self, handle: Self::Handle);
}

/// Keeps a `PaintSurface` in step with the latest primitive list.
///
/// The document layer is rebuilt only when the primitives actually change,
/// so hosts that reset pan/zoom on rebuild are not disturbed by no-op
/// refreshes. The drawing preview is tracked separately because it changes
/// on every click.
pub struct SurfaceSync<H> {
    painted: Vec<Primitive>,
    handles: Vec<H>,
    preview: Option<H>,
}

impl<H: Copy> Default for SurfaceSync<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: Copy> SurfaceSync<H> {
    pub fn new() -> Self {
        Self {
            painted: Vec::new(),
            handles: Vec::new(),
            preview: None,
        }
    }

    /// Replace the document primitives. Returns `false` when nothing changed.
    pub fn repaint<S>(&mut self, surface: &mut S, primitives: Vec<Primitive>) -> bool
    where
        S: PaintSurface<Handle = H>,
    {
        if primitives == self.painted {
            return false;
        }
        for handle in self.handles.drain(..) {
            surface.remove_primitive(handle);
        }
        self.handles = primitives.iter().map(|p| surface.add_primitive(p)).collect();
        self.painted = primitives;
        true
    }

    /// Show, replace, or (with `None`) clear the drawing preview.
    pub fn set_preview<S>(&mut self, surface: &mut S, preview: Option<Primitive>)
    where
        S: PaintSurface<Handle = H>,
    {
        if let Some(old) = self.preview.take() {
            surface.remove_primitive(old);
        }
        self.preview = preview.map(|p| surface.add_primitive(&p));
    }

    /// Remove everything this adapter added.
    pub fn clear<S>(&mut self, surface: &mut S)
    where
        S: PaintSurface<Handle = H>,
    {
        self.set_preview(surface, None);
        for handle in self.handles.drain(..) {
            surface.remove_primitive(handle);
        }
        self.painted.clear();
    }

    pub fn painted(&self) -> &[Primitive] {
        &self.painted
    }
}
