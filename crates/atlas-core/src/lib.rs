pub mod codec;
pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod id;
pub mod model;
pub mod shape;

pub use codec::{CodecError, emit_document, parse_document, structural_form};
pub use config::{EngineConfig, MarkerSize};
pub use error::{IoFailure, MapError, Result};
pub use geometry::{ImagePoint, RenderPoint, to_image_space, to_render_space};
pub use host::{DocumentIo, ImageResolver, TitleIndex, TitleResolver};
pub use id::AnnotationId;
pub use model::*;
pub use shape::{RegionGeometry, RegionKind, RegionShape, RenderShape};
