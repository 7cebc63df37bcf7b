//! Persistence gateway and engine façade.
//!
//! `MapEngine` owns the document cache and talks to the host's I/O. Every
//! edit goes through [`MapEngine::commit`]:
//!
//! 1. take the path's lock (commits to one path run one at a time),
//! 2. read the live cache entry *now*, after any earlier commit published,
//! 3. apply the mutation to a copy,
//! 4. serialise and write the whole file,
//! 5. publish to the cache only if the write succeeded.
//!
//! A failed read leaves an existing entry in place; a failed write leaves
//! the cache exactly as it was.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

use atlas_core::codec::{emit_document, parse_document};
use atlas_core::config::EngineConfig;
use atlas_core::error::{MapError, Result};
use atlas_core::host::{DocumentIo, ImageResolver, TitleResolver};
use atlas_core::id::AnnotationId;
use atlas_core::model::{MapDocument, Pin, PinPatch, Region, RegionPatch};
use atlas_render::paint::{Primitive, paint_document};
use tokio::sync::Mutex;

use crate::cache::{DocumentCache, Listener, SubscriptionId};
use crate::input::PointerEvent;
use crate::mutation::DocumentMutation;
use crate::resolve::{self, Resolution};
use crate::view::MapView;

/// A listener registration plus the document as of opening.
#[derive(Clone)]
pub struct Subscription {
    pub path: String,
    pub id: SubscriptionId,
    pub document: Arc<MapDocument>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("path", &self.path)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

pub struct MapEngine<Io> {
    io: Io,
    titles: Box<dyn TitleResolver>,
    config: EngineConfig,
    cache: RefCell<DocumentCache>,
    locks: RefCell<HashMap<String, Rc<Mutex<()>>>>,
}

impl<Io: DocumentIo> MapEngine<Io> {
    pub fn new(io: Io, titles: impl TitleResolver + 'static, config: EngineConfig) -> Self {
        Self {
            io,
            titles: Box::new(titles),
            config,
            cache: RefCell::new(DocumentCache::new()),
            locks: RefCell::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn io(&self) -> &Io {
        &self.io
    }

    /// Cached document for `path`, without touching I/O.
    pub fn document(&self, path: &str) -> Option<Arc<MapDocument>> {
        self.cache.borrow().get(path)
    }

    fn lock_for(&self, path: &str) -> Rc<Mutex<()>> {
        Rc::clone(self.locks.borrow_mut().entry(path.to_string()).or_default())
    }

    // ─── Cache ──────────────────────────────────────────────────────────

    /// Publish `document` for `path` and notify listeners if it changed.
    /// Returns the document now cached.
    pub fn publish(&self, path: &str, document: MapDocument) -> Result<Arc<MapDocument>> {
        let notification = self.cache.borrow_mut().publish(path, document)?;
        if let Some(notification) = notification {
            notification.deliver();
        }
        self.document(path)
            .ok_or_else(|| MapError::InvalidState(format!("{path} vanished from the cache")))
    }

    /// Register `listener` for `path`, loading the document on first use.
    ///
    /// When this call triggers the load, the listener is also notified of it.
    pub async fn open_document(&self, path: &str, listener: Listener) -> Result<Subscription> {
        let id = self.cache.borrow_mut().subscribe(path, listener);
        let document = match self.document(path) {
            Some(doc) => doc,
            None => match self.load(path).await {
                Ok(doc) => doc,
                Err(err) => {
                    self.cache.borrow_mut().unsubscribe(path, id);
                    return Err(err);
                }
            },
        };
        log::debug!("opened {path}");
        Ok(Subscription {
            path: path.to_string(),
            id,
            document,
        })
    }

    pub fn unsubscribe(&self, subscription: &Subscription) -> bool {
        self.cache
            .borrow_mut()
            .unsubscribe(&subscription.path, subscription.id)
    }

    // ─── Gateway ────────────────────────────────────────────────────────

    /// Read and parse `path` into the cache.
    pub async fn load(&self, path: &str) -> Result<Arc<MapDocument>> {
        let lock = self.lock_for(path);
        let _guard = lock.lock().await;
        self.load_unlocked(path).await
    }

    async fn load_unlocked(&self, path: &str) -> Result<Arc<MapDocument>> {
        log::debug!("load {path}");
        let load_error = |reason: String| {
            log::warn!("load {path} failed: {reason}");
            MapError::Load {
                path: path.to_string(),
                reason,
            }
        };
        let text = self
            .io
            .read_document(path)
            .await
            .map_err(|e| load_error(e.to_string()))?;
        let document = parse_document(&text).map_err(|e| load_error(e.to_string()))?;
        self.publish(path, document)
    }

    /// Apply `mutate` to the live document for `path`, write it, and publish.
    ///
    /// Nothing is written or published if `mutate` fails.
    pub async fn commit<F>(&self, path: &str, mutate: F) -> Result<Arc<MapDocument>>
    where
        F: FnOnce(&mut MapDocument) -> Result<()>,
    {
        let lock = self.lock_for(path);
        let _guard = lock.lock().await;

        let base = match self.document(path) {
            Some(doc) => doc,
            None => self.load_unlocked(path).await?,
        };
        let mut next = MapDocument::clone(&base);
        mutate(&mut next)?;

        let text = emit_document(&next, self.config.pretty_print)
            .map_err(|e| MapError::InvalidDocument(e.to_string()))?;
        if let Err(source) = self.io.write_document(path, &text).await {
            log::warn!("write {path} failed: {source}");
            return Err(MapError::Write {
                path: path.to_string(),
                source,
            });
        }
        log::debug!("wrote {path} ({} bytes)", text.len());
        self.publish(path, next)
    }

    pub async fn apply(&self, path: &str, mutation: DocumentMutation) -> Result<Arc<MapDocument>> {
        self.commit(path, |doc| {
            log::debug!("{path}: {}", mutation.describe());
            mutation.apply(doc)
        })
        .await
    }

    // ─── Edits ──────────────────────────────────────────────────────────

    pub async fn add_pin(&self, path: &str, pin: Pin) -> Result<AnnotationId> {
        let id = pin.id;
        self.apply(path, DocumentMutation::AddPin { pin }).await?;
        Ok(id)
    }

    pub async fn update_pin(&self, path: &str, id: AnnotationId, patch: PinPatch) -> Result<()> {
        self.apply(path, DocumentMutation::UpdatePin { id, patch })
            .await
            .map(drop)
    }

    pub async fn delete_pin(&self, path: &str, id: AnnotationId) -> Result<()> {
        self.apply(path, DocumentMutation::RemovePin { id })
            .await
            .map(drop)
    }

    /// Commit a finished region. Geometry with fewer than three points is
    /// rejected here.
    pub async fn add_region(&self, path: &str, region: Region) -> Result<AnnotationId> {
        let id = region.id;
        self.apply(path, DocumentMutation::AddRegion { region }).await?;
        Ok(id)
    }

    pub async fn update_region(
        &self,
        path: &str,
        id: AnnotationId,
        patch: RegionPatch,
    ) -> Result<()> {
        self.apply(path, DocumentMutation::UpdateRegion { id, patch })
            .await
            .map(drop)
    }

    pub async fn delete_region(&self, path: &str, id: AnnotationId) -> Result<()> {
        self.apply(path, DocumentMutation::RemoveRegion { id })
            .await
            .map(drop)
    }

    pub async fn toggle_layer(&self, path: &str, layer_id: &str, visible: bool) -> Result<()> {
        self.apply(
            path,
            DocumentMutation::SetLayerVisibility {
                layer_id: layer_id.to_string(),
                visible,
            },
        )
        .await
        .map(drop)
    }

    pub async fn set_layer_opacity(&self, path: &str, layer_id: &str, opacity: f32) -> Result<()> {
        self.apply(
            path,
            DocumentMutation::SetLayerOpacity {
                layer_id: layer_id.to_string(),
                opacity,
            },
        )
        .await
        .map(drop)
    }

    // ─── Interaction & paint ────────────────────────────────────────────

    /// Resolve a pointer event on `view` against the document it shows.
    ///
    /// A view with no document, or whose document is not cached yet,
    /// ignores the event.
    pub fn resolve_interaction(&self, view: &mut MapView, event: &PointerEvent) -> Resolution {
        let Some(document) = view.path().and_then(|p| self.document(p)) else {
            return Resolution::Ignored;
        };
        resolve::resolve_interaction(
            &document,
            view.session_mut(),
            event,
            &self.config,
            self.titles.as_ref(),
        )
    }

    /// Paint primitives for the cached document at `path`.
    pub fn paint(&self, path: &str, images: &dyn ImageResolver) -> Option<Vec<Primitive>> {
        self.document(path)
            .map(|doc| paint_document(&doc, &self.config, images))
    }
}
