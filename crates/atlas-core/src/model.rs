//! Map annotation document model.
//!
//! A `MapDocument` is a raster extent plus three collections: image layers,
//! point pins, and shaped regions. Pins and regions may link to a narrative
//! page, to another map, or to both. Links are stored as human titles and
//! resolved to paths only when the user acts on them.

use crate::error::{MapError, Result};
use crate::geometry::ImagePoint;
use crate::id::AnnotationId;
use crate::shape::{RegionGeometry, RegionShape};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeSet;
use std::fmt;

// ─── Links ──────────────────────────────────────────────────────────────

/// What a link points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Page,
    Map,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Page => f.write_str("Page"),
            TargetKind::Map => f.write_str("Map"),
        }
    }
}

/// A single navigable link, still in title form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub kind: TargetKind,
    pub title: String,
}

/// The optional page and map links carried by pins and regions.
///
/// Both may be set at once: the location is then a narrative page *and* a
/// zoomable sub-map, and the user must be asked which one to open.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Targets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_map: Option<String>,
}

impl Targets {
    pub fn page(title: impl Into<String>) -> Self {
        Self {
            target_page: Some(title.into()),
            target_map: None,
        }
    }

    pub fn map(title: impl Into<String>) -> Self {
        Self {
            target_page: None,
            target_map: Some(title.into()),
        }
    }

    pub fn both(page: impl Into<String>, map: impl Into<String>) -> Self {
        Self {
            target_page: Some(page.into()),
            target_map: Some(map.into()),
        }
    }

    /// Links in menu order: page first, then map.
    pub fn list(&self) -> SmallVec<[Target; 2]> {
        let mut out = SmallVec::new();
        if let Some(title) = &self.target_page {
            out.push(Target {
                kind: TargetKind::Page,
                title: title.clone(),
            });
        }
        if let Some(title) = &self.target_map {
            out.push(Target {
                kind: TargetKind::Map,
                title: title.clone(),
            });
        }
        out
    }

    pub fn len(&self) -> usize {
        self.target_page.is_some() as usize + self.target_map.is_some() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Blank titles count as no link.
    pub fn normalize(&mut self) {
        for slot in [&mut self.target_page, &mut self.target_map] {
            *slot = slot
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string);
        }
    }
}

// ─── Layers ─────────────────────────────────────────────────────────────

/// A raster image stacked under the annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub id: String,
    /// Opaque reference handed to the host's image resolver.
    #[serde(rename = "image", alias = "imageRef")]
    pub image_ref: String,
    /// Paint order; ties fall back to list order.
    #[serde(default)]
    pub z_index: i32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
}

fn default_visible() -> bool {
    true
}

fn default_opacity() -> f32 {
    1.0
}

impl Layer {
    pub fn new(id: impl Into<String>, image_ref: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            image_ref: image_ref.into(),
            z_index: 0,
            visible: true,
            opacity: 1.0,
        }
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() {
            1.0
        } else {
            opacity.clamp(0.0, 1.0)
        };
    }
}

// ─── Pins ───────────────────────────────────────────────────────────────

/// A point annotation drawn as a fixed-size marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    #[serde(default)]
    pub id: AnnotationId,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub targets: Targets,
}

impl Pin {
    /// New pin with a fresh id at an image-space position.
    pub fn new(at: ImagePoint) -> Self {
        Self {
            id: AnnotationId::new(),
            x: at.x,
            y: at.y,
            icon: None,
            color: None,
            label: None,
            targets: Targets::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_targets(mut self, targets: Targets) -> Self {
        self.targets = targets;
        self
    }

    pub fn position(&self) -> ImagePoint {
        ImagePoint::new(self.x, self.y)
    }

    /// Reject positions that cannot be written back to disk.
    pub fn validate(&self) -> Result<()> {
        if self.position().is_finite() {
            Ok(())
        } else {
            Err(MapError::InvalidGeometry(format!(
                "pin {} has non-finite position ({}, {})",
                self.id, self.x, self.y
            )))
        }
    }
}

/// Partial update of a pin. `None` leaves a field alone; `Some(None)` clears
/// an optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinPatch {
    pub position: Option<ImagePoint>,
    pub icon: Option<Option<String>>,
    pub color: Option<Option<String>>,
    pub label: Option<Option<String>>,
    pub target_page: Option<Option<String>>,
    pub target_map: Option<Option<String>>,
}

impl PinPatch {
    /// Apply to `pin`. A non-finite position is rejected and the pin is left
    /// untouched.
    pub fn apply(self, pin: &mut Pin) -> Result<()> {
        if let Some(p) = self.position
            && !p.is_finite()
        {
            return Err(MapError::InvalidGeometry(format!(
                "pin {} cannot move to ({}, {})",
                pin.id, p.x, p.y
            )));
        }
        if let Some(p) = self.position {
            pin.x = p.x;
            pin.y = p.y;
        }
        if let Some(icon) = self.icon {
            pin.icon = icon;
        }
        if let Some(color) = self.color {
            pin.color = color;
        }
        if let Some(label) = self.label {
            pin.label = label;
        }
        if let Some(page) = self.target_page {
            pin.targets.target_page = page;
        }
        if let Some(map) = self.target_map {
            pin.targets.target_map = map;
        }
        pin.targets.normalize();
        Ok(())
    }
}

// ─── Regions ────────────────────────────────────────────────────────────

/// An area annotation. Geometry lives in `shape`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    #[serde(default)]
    pub id: AnnotationId,
    #[serde(flatten)]
    pub shape: RegionShape,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub targets: Targets,
}

impl Region {
    pub fn new(shape: RegionShape) -> Self {
        Self {
            id: AnnotationId::new(),
            shape,
            color: None,
            label: None,
            targets: Targets::default(),
        }
    }

    pub fn polygon(points: Vec<ImagePoint>) -> Self {
        Self::new(RegionShape::polygon(points))
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_targets(mut self, targets: Targets) -> Self {
        self.targets = targets;
        self
    }

    pub fn geometry(&self) -> &dyn RegionGeometry {
        self.shape.geometry()
    }

    /// Reject shapes that cannot be committed.
    pub fn validate(&self) -> Result<()> {
        let geo = self.geometry();
        if geo.is_valid() {
            Ok(())
        } else {
            Err(MapError::InvalidGeometry(format!(
                "{} region {} is not a valid shape ({} point(s))",
                self.shape.kind(),
                self.id,
                geo.point_count()
            )))
        }
    }
}

/// Partial update of a region; same conventions as [`PinPatch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionPatch {
    pub shape: Option<RegionShape>,
    pub color: Option<Option<String>>,
    pub label: Option<Option<String>>,
    pub target_page: Option<Option<String>>,
    pub target_map: Option<Option<String>>,
}

impl RegionPatch {
    /// Apply to `region`. A replacement shape is validated first and the
    /// region is left untouched if it is rejected.
    pub fn apply(self, region: &mut Region) -> Result<()> {
        if let Some(shape) = self.shape {
            let mut candidate = Region::new(shape);
            candidate.id = region.id;
            candidate.validate()?;
            region.shape = candidate.shape;
        }
        if let Some(color) = self.color {
            region.color = color;
        }
        if let Some(label) = self.label {
            region.label = label;
        }
        if let Some(page) = self.target_page {
            region.targets.target_page = page;
        }
        if let Some(map) = self.target_map {
            region.targets.target_map = map;
        }
        region.targets.normalize();
        Ok(())
    }
}

/// Which annotation an action refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationHandle {
    Pin(AnnotationId),
    Region(AnnotationId),
}

// ─── Document ───────────────────────────────────────────────────────────

/// Root aggregate of a map file.
///
/// `width`/`height` are fixed at creation; there is no setter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapDocument {
    #[serde(default)]
    pub title: String,
    width: u32,
    height: u32,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub pins: Vec<Pin>,
    #[serde(default, rename = "shapes", alias = "regions")]
    pub regions: Vec<Region>,
}

impl MapDocument {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MapError::InvalidDocument(format!(
                "extent must be positive, got {width}x{height}"
            )));
        }
        Ok(Self {
            title: String::new(),
            width,
            height,
            layers: Vec::new(),
            pins: Vec::new(),
            regions: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Height as used by the coordinate transforms.
    pub fn render_height(&self) -> f64 {
        self.height as f64
    }

    // ─── Lookup ─────────────────────────────────────────────────────────

    pub fn pin(&self, id: AnnotationId) -> Option<&Pin> {
        self.pins.iter().find(|p| p.id == id)
    }

    pub fn pin_mut(&mut self, id: AnnotationId) -> Option<&mut Pin> {
        self.pins.iter_mut().find(|p| p.id == id)
    }

    pub fn region(&self, id: AnnotationId) -> Option<&Region> {
        self.regions.iter().find(|r| r.id == id)
    }

    pub fn region_mut(&mut self, id: AnnotationId) -> Option<&mut Region> {
        self.regions.iter_mut().find(|r| r.id == id)
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Layers sorted by `z_index`, stable so ties keep list order.
    pub fn layers_in_paint_order(&self) -> Vec<&Layer> {
        let mut layers: Vec<&Layer> = self.layers.iter().collect();
        layers.sort_by_key(|l| l.z_index);
        layers
    }

    // ─── Edits ──────────────────────────────────────────────────────────

    pub fn insert_pin(&mut self, mut pin: Pin) -> Result<()> {
        pin.validate()?;
        if self.pin(pin.id).is_some() {
            return Err(MapError::Duplicate {
                kind: "pin",
                id: pin.id.to_string(),
            });
        }
        pin.targets.normalize();
        self.pins.push(pin);
        Ok(())
    }

    pub fn remove_pin(&mut self, id: AnnotationId) -> Result<Pin> {
        let pos = self
            .pins
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| MapError::not_found("pin", id))?;
        Ok(self.pins.remove(pos))
    }

    /// Append a region. Invalid geometry is rejected here, at commit time.
    pub fn insert_region(&mut self, mut region: Region) -> Result<()> {
        region.validate()?;
        if self.region(region.id).is_some() {
            return Err(MapError::Duplicate {
                kind: "region",
                id: region.id.to_string(),
            });
        }
        region.targets.normalize();
        self.regions.push(region);
        Ok(())
    }

    pub fn remove_region(&mut self, id: AnnotationId) -> Result<Region> {
        let pos = self
            .regions
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| MapError::not_found("region", id))?;
        Ok(self.regions.remove(pos))
    }

    // ─── Links ──────────────────────────────────────────────────────────

    /// Distinct page titles linked from pins and regions, compared
    /// case-insensitively and returned lower-cased.
    pub fn linked_pages(&self) -> BTreeSet<String> {
        self.linked(|t| t.target_page.as_deref())
    }

    /// Distinct map titles linked from pins and regions.
    pub fn linked_maps(&self) -> BTreeSet<String> {
        self.linked(|t| t.target_map.as_deref())
    }

    fn linked<'a>(&'a self, pick: impl Fn(&'a Targets) -> Option<&'a str>) -> BTreeSet<String> {
        self.pins
            .iter()
            .map(|p| &p.targets)
            .chain(self.regions.iter().map(|r| &r.targets))
            .filter_map(pick)
            .map(str::to_lowercase)
            .collect()
    }
}
