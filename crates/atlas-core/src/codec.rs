//! Persisted form of a map document: JSON text ↔ `MapDocument`.
//!
//! Parsing is lenient about individual regions: a region that fails to
//! decode, or whose geometry is invalid, is dropped with a warning and the
//! rest of the document still loads. Everything else is strict.

use crate::id::AnnotationId;
use crate::model::{Layer, MapDocument, Pin, Region};
use serde::Deserialize;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("malformed map document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("map extent must be positive, got {width}x{height}")]
    Extent { width: u32, height: u32 },
}

/// Top-level shape with regions left undecoded so each can fail on its own.
///
/// A `null` title or collection reads the same as a missing one.
#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    title: Option<String>,
    width: u32,
    height: u32,
    #[serde(default)]
    layers: Option<Vec<Layer>>,
    #[serde(default)]
    pins: Option<Vec<Pin>>,
    #[serde(default, rename = "shapes", alias = "regions")]
    regions: Option<Vec<serde_json::Value>>,
}

/// Parse and normalise a persisted map document.
pub fn parse_document(text: &str) -> Result<MapDocument, CodecError> {
    let raw: RawDocument = serde_json::from_str(text)?;

    let mut doc = MapDocument::new(raw.width, raw.height).map_err(|_| CodecError::Extent {
        width: raw.width,
        height: raw.height,
    })?;
    doc.title = raw.title.unwrap_or_default();

    let mut seen_ids = HashSet::new();

    doc.layers = raw.layers.unwrap_or_default();
    for layer in &mut doc.layers {
        layer.set_opacity(layer.opacity);
    }

    for mut pin in raw.pins.unwrap_or_default() {
        if !seen_ids.insert(pin.id) {
            let fresh = AnnotationId::new();
            log::warn!("duplicate pin id {}; reassigned to {fresh}", pin.id);
            pin.id = fresh;
            seen_ids.insert(fresh);
        }
        pin.targets.normalize();
        doc.pins.push(pin);
    }

    for (index, value) in raw.regions.unwrap_or_default().into_iter().enumerate() {
        let mut region: Region = match serde_json::from_value(value) {
            Ok(region) => region,
            Err(e) => {
                log::warn!("skipping malformed region #{index}: {e}");
                continue;
            }
        };
        if let Err(e) = region.validate() {
            log::warn!("skipping region #{index}: {e}");
            continue;
        }
        if !seen_ids.insert(region.id) {
            let fresh = AnnotationId::new();
            log::warn!("duplicate region id {}; reassigned to {fresh}", region.id);
            region.id = fresh;
            seen_ids.insert(fresh);
        }
        region.targets.normalize();
        doc.regions.push(region);
    }

    log::debug!(
        "parsed map {}x{}: {} layer(s), {} pin(s), {} region(s)",
        doc.width(),
        doc.height(),
        doc.layers.len(),
        doc.pins.len(),
        doc.regions.len()
    );
    Ok(doc)
}

/// Serialise a document for writing back to disk.
pub fn emit_document(doc: &MapDocument, pretty: bool) -> Result<String, CodecError> {
    let text = if pretty {
        serde_json::to_string_pretty(doc)?
    } else {
        serde_json::to_string(doc)?
    };
    Ok(text)
}

/// Compact, formatting-independent form used to detect structural no-ops.
pub fn structural_form(doc: &MapDocument) -> Result<String, CodecError> {
    Ok(serde_json::to_string(doc)?)
}
