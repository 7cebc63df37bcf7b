//! Collaborators supplied by the host application.
//!
//! The engine never touches the filesystem, the vault index, or image
//! assets directly. It talks to them through these traits.

use crate::error::IoFailure;
use crate::model::TargetKind;
use std::collections::HashMap;

/// Whole-file read/write of map documents.
///
/// Implementations may suspend; the engine is single-threaded and does not
/// require the futures to be `Send`.
#[allow(async_fn_in_trait)]
pub trait DocumentIo {
    async fn read_document(&self, path: &str) -> Result<String, IoFailure>;

    /// Overwrite the whole file with `content`.
    async fn write_document(&self, path: &str, content: &str) -> Result<(), IoFailure>;
}

/// Turns a layer's image reference into something the paint surface can load.
pub trait ImageResolver {
    fn resolve_image(&self, image_ref: &str) -> Option<String>;
}

impl<F> ImageResolver for F
where
    F: Fn(&str) -> Option<String>,
{
    fn resolve_image(&self, image_ref: &str) -> Option<String> {
        self(image_ref)
    }
}

/// Vault-wide title lookup. Called when the user acts on a link, never at
/// load time, so renamed pages resolve without the engine tracking renames.
pub trait TitleResolver {
    fn resolve_title(&self, kind: TargetKind, title: &str) -> Option<String>;
}

/// In-memory title index keyed by lower-cased title.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    pages: HashMap<String, String>,
    maps: HashMap<String, String>,
}

impl TitleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, kind: TargetKind, title: &str, path: impl Into<String>) {
        let table = match kind {
            TargetKind::Page => &mut self.pages,
            TargetKind::Map => &mut self.maps,
        };
        table.insert(title.to_lowercase(), path.into());
    }

    pub fn with(mut self, kind: TargetKind, title: &str, path: impl Into<String>) -> Self {
        self.insert(kind, title, path);
        self
    }
}

impl TitleResolver for TitleIndex {
    fn resolve_title(&self, kind: TargetKind, title: &str) -> Option<String> {
        let table = match kind {
            TargetKind::Page => &self.pages,
            TargetKind::Map => &self.maps,
        };
        table.get(&title.to_lowercase()).cloned()
    }
}
