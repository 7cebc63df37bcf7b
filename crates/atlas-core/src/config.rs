//! Engine configuration.

use serde::{Deserialize, Serialize};

/// Size of a pin marker on the paint surface, in render units.
///
/// The marker is anchored bottom-centre: its tip sits on the pin's
/// position and the body extends upward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerSize {
    pub width: f64,
    pub height: f64,
}

impl Default for MarkerSize {
    fn default() -> Self {
        Self {
            width: 25.0,
            height: 41.0,
        }
    }
}

/// Configuration shared by the resolver, painter, and persistence gateway.
///
/// Every field has a default, so a partial JSON object is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Pin hit area and painted footprint.
    pub pin_marker: MarkerSize,

    /// Offer edit-mode actions (create, draw, edit, delete) in context menus.
    /// Default: **true**.
    pub authoring: bool,

    /// Glyph used for pins without an explicit `icon`.
    pub default_pin_icon: String,

    pub default_pin_color: String,

    pub default_region_color: String,

    /// Pretty-print the JSON written back to disk. Default: **true**.
    pub pretty_print: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pin_marker: MarkerSize::default(),
            authoring: true,
            default_pin_icon: "marker".to_string(),
            default_pin_color: "#E74C3C".to_string(),
            default_region_color: "#3388FF".to_string(),
            pretty_print: true,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON configuration object.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Read-only variant: navigation only, no edit actions.
    pub fn read_only() -> Self {
        Self {
            authoring: false,
            ..Self::default()
        }
    }
}
