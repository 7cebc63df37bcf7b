//! Document mutations.
//!
//! Every edit the engine persists is expressed as a `DocumentMutation`, so
//! the commit path is the same regardless of which UI gesture produced it.

use atlas_core::error::{MapError, Result};
use atlas_core::id::AnnotationId;
use atlas_core::model::{MapDocument, Pin, PinPatch, Region, RegionPatch};

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentMutation {
    AddPin {
        pin: Pin,
    },
    UpdatePin {
        id: AnnotationId,
        patch: PinPatch,
    },
    RemovePin {
        id: AnnotationId,
    },
    /// Append a region. The shape is validated on apply.
    AddRegion {
        region: Region,
    },
    UpdateRegion {
        id: AnnotationId,
        patch: RegionPatch,
    },
    RemoveRegion {
        id: AnnotationId,
    },
    SetLayerVisibility {
        layer_id: String,
        visible: bool,
    },
    /// Opacity is clamped to [0, 1].
    SetLayerOpacity {
        layer_id: String,
        opacity: f32,
    },
}

impl DocumentMutation {
    /// Apply to `doc`. On error `doc` may be partially modified; callers
    /// apply to a scratch copy.
    pub fn apply(self, doc: &mut MapDocument) -> Result<()> {
        match self {
            DocumentMutation::AddPin { pin } => doc.insert_pin(pin),
            DocumentMutation::UpdatePin { id, patch } => {
                let pin = doc
                    .pin_mut(id)
                    .ok_or_else(|| MapError::not_found("pin", id))?;
                patch.apply(pin)
            }
            DocumentMutation::RemovePin { id } => doc.remove_pin(id).map(drop),
            DocumentMutation::AddRegion { region } => doc.insert_region(region),
            DocumentMutation::UpdateRegion { id, patch } => {
                let region = doc
                    .region_mut(id)
                    .ok_or_else(|| MapError::not_found("region", id))?;
                patch.apply(region)
            }
            DocumentMutation::RemoveRegion { id } => doc.remove_region(id).map(drop),
            DocumentMutation::SetLayerVisibility { layer_id, visible } => {
                let layer = doc
                    .layer_mut(&layer_id)
                    .ok_or_else(|| MapError::not_found("layer", &layer_id))?;
                layer.visible = visible;
                Ok(())
            }
            DocumentMutation::SetLayerOpacity { layer_id, opacity } => {
                let layer = doc
                    .layer_mut(&layer_id)
                    .ok_or_else(|| MapError::not_found("layer", &layer_id))?;
                layer.set_opacity(opacity);
                Ok(())
            }
        }
    }

    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            DocumentMutation::AddPin { pin } => format!("add pin {}", pin.id),
            DocumentMutation::UpdatePin { id, .. } => format!("update pin {id}"),
            DocumentMutation::RemovePin { id } => format!("remove pin {id}"),
            DocumentMutation::AddRegion { region } => {
                format!("add {} region {}", region.shape.kind(), region.id)
            }
            DocumentMutation::UpdateRegion { id, .. } => format!("update region {id}"),
            DocumentMutation::RemoveRegion { id } => format!("remove region {id}"),
            DocumentMutation::SetLayerVisibility { layer_id, visible } => {
                format!("set layer {layer_id} visible={visible}")
            }
            DocumentMutation::SetLayerOpacity { layer_id, opacity } => {
                format!("set layer {layer_id} opacity={opacity}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::geometry::ImagePoint;
    use atlas_core::model::Layer;
    use pretty_assertions::assert_eq;

    fn doc() -> MapDocument {
        let mut doc = MapDocument::new(100, 100).unwrap();
        doc.layers.push(Layer::new("base", "base.png"));
        doc
    }

    #[test]
    fn update_unknown_pin_is_not_found() {
        let mut doc = doc();
        let err = DocumentMutation::UpdatePin {
            id: AnnotationId::new(),
            patch: PinPatch::default(),
        }
        .apply(&mut doc)
        .unwrap_err();
        assert!(matches!(err, MapError::NotFound { kind: "pin", .. }));
    }

    #[test]
    fn add_then_remove_pin() {
        let mut doc = doc();
        let pin = Pin::new(ImagePoint::new(1.0, 1.0));
        let id = pin.id;
        DocumentMutation::AddPin { pin }.apply(&mut doc).unwrap();
        assert!(doc.pin(id).is_some());
        DocumentMutation::RemovePin { id }.apply(&mut doc).unwrap();
        assert!(doc.pins.is_empty());
    }

    #[test]
    fn add_region_with_two_points_is_rejected() {
        let mut doc = doc();
        let region = Region::polygon(vec![ImagePoint::new(0.0, 0.0), ImagePoint::new(1.0, 1.0)]);
        let err = DocumentMutation::AddRegion { region }.apply(&mut doc).unwrap_err();
        assert!(matches!(err, MapError::InvalidGeometry(_)));
        assert!(doc.regions.is_empty());
    }

    #[test]
    fn layer_toggle_and_opacity() {
        let mut doc = doc();
        DocumentMutation::SetLayerVisibility {
            layer_id: "base".into(),
            visible: false,
        }
        .apply(&mut doc)
        .unwrap();
        DocumentMutation::SetLayerOpacity {
            layer_id: "base".into(),
            opacity: 3.0,
        }
        .apply(&mut doc)
        .unwrap();
        let layer = doc.layer("base").unwrap();
        assert!(!layer.visible);
        assert_eq!(layer.opacity, 1.0);

        let err = DocumentMutation::SetLayerVisibility {
            layer_id: "nope".into(),
            visible: true,
        }
        .apply(&mut doc)
        .unwrap_err();
        assert!(matches!(err, MapError::NotFound { kind: "layer", .. }));
    }

    #[test]
    fn describe_names_the_target() {
        let m = DocumentMutation::SetLayerOpacity {
            layer_id: "base".into(),
            opacity: 0.5,
        };
        assert_eq!(m.describe(), "set layer base opacity=0.5");
    }
}
