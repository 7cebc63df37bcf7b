//! Document cache: path → last known good document, shared by every view.
//!
//! The cache is an owned registry held by the engine. Entries are created on
//! first load and replaced only by successful loads and commits; a failed
//! read or write never touches them.
//!
//! Publishing compares the structural form of the new document with the
//! last one published for the path. Identical content is a no-op and
//! produces no notification, so hosts that reset pan/zoom on rebuild are not
//! disturbed by redundant refreshes.

use atlas_core::codec::structural_form;
use atlas_core::error::{MapError, Result};
use atlas_core::model::MapDocument;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

/// Change callback: `(path, new document)`.
pub type Listener = Rc<dyn Fn(&str, &Arc<MapDocument>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct CacheEntry {
    document: Option<Arc<MapDocument>>,
    last_serialized: Option<String>,
    subscribers: Vec<(SubscriptionId, Listener)>,
}

/// Listeners to call for one publish.
///
/// Returned by [`DocumentCache::publish`] instead of being called in place so
/// the caller can release its borrow of the cache first; listeners are free
/// to read the cache again.
#[must_use = "listeners are only called by `deliver`"]
pub struct Notification {
    path: String,
    document: Arc<MapDocument>,
    listeners: Vec<Listener>,
}

impl Notification {
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn deliver(self) {
        log::debug!(
            "notify {} listener(s) of {}",
            self.listeners.len(),
            self.path
        );
        for listener in &self.listeners {
            listener(&self.path, &self.document);
        }
    }
}

#[derive(Default)]
pub struct DocumentCache {
    entries: HashMap<String, CacheEntry>,
    next_subscription: u64,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current document for `path`, if one has been loaded.
    pub fn get(&self, path: &str) -> Option<Arc<MapDocument>> {
        self.entries.get(path)?.document.clone()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Register a listener. Subscribing before the first load is allowed.
    pub fn subscribe(&mut self, path: &str, listener: Listener) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.entries
            .entry(path.to_string())
            .or_default()
            .subscribers
            .push((id, listener));
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&mut self, path: &str, id: SubscriptionId) -> bool {
        let Some(entry) = self.entries.get_mut(path) else {
            return false;
        };
        let before = entry.subscribers.len();
        entry.subscribers.retain(|(sid, _)| *sid != id);
        entry.subscribers.len() != before
    }

    pub fn subscriber_count(&self, path: &str) -> usize {
        self.entries.get(path).map_or(0, |e| e.subscribers.len())
    }

    /// Store `document` for `path`.
    ///
    /// Returns `None` when the document is structurally identical to the one
    /// already published; the entry is left as it was.
    pub fn publish(&mut self, path: &str, document: MapDocument) -> Result<Option<Notification>> {
        let form =
            structural_form(&document).map_err(|e| MapError::InvalidDocument(e.to_string()))?;
        let entry = self.entries.entry(path.to_string()).or_default();
        if entry.document.is_some() && entry.last_serialized.as_deref() == Some(form.as_str()) {
            log::debug!("publish {path}: unchanged");
            return Ok(None);
        }

        let document = Arc::new(document);
        entry.document = Some(Arc::clone(&document));
        entry.last_serialized = Some(form);
        log::debug!("publish {path}: updated");
        Ok(Some(Notification {
            path: path.to_string(),
            document,
            listeners: entry.subscribers.iter().map(|(_, l)| Rc::clone(l)).collect(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::geometry::ImagePoint;
    use atlas_core::model::Pin;
    use std::cell::Cell;

    fn counting(cache: &mut DocumentCache, path: &str) -> Rc<Cell<usize>> {
        let hits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&hits);
        cache.subscribe(path, Rc::new(move |_: &str, _: &Arc<MapDocument>| seen.set(seen.get() + 1)));
        hits
    }

    #[test]
    fn identical_publish_is_a_noop() {
        let mut cache = DocumentCache::new();
        let hits = counting(&mut cache, "a.cmap");
        let doc = MapDocument::new(10, 10).unwrap();

        cache.publish("a.cmap", doc.clone()).unwrap().unwrap().deliver();
        assert!(cache.publish("a.cmap", doc).unwrap().is_none());
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn changed_publish_replaces_entry() {
        let mut cache = DocumentCache::new();
        let hits = counting(&mut cache, "a.cmap");
        let mut doc = MapDocument::new(10, 10).unwrap();
        cache.publish("a.cmap", doc.clone()).unwrap().unwrap().deliver();

        doc.insert_pin(Pin::new(ImagePoint::new(1.0, 1.0))).unwrap();
        cache.publish("a.cmap", doc).unwrap().unwrap().deliver();
        assert_eq!(hits.get(), 2);
        assert_eq!(cache.get("a.cmap").unwrap().pins.len(), 1);
    }

    #[test]
    fn paths_are_independent() {
        let mut cache = DocumentCache::new();
        let a = counting(&mut cache, "a.cmap");
        let b = counting(&mut cache, "b.cmap");
        cache
            .publish("a.cmap", MapDocument::new(10, 10).unwrap())
            .unwrap()
            .unwrap()
            .deliver();
        assert_eq!((a.get(), b.get()), (1, 0));
        assert!(cache.get("b.cmap").is_none());
    }

    #[test]
    fn unsubscribed_listener_is_not_called() {
        let mut cache = DocumentCache::new();
        let hits = Rc::new(Cell::new(0));
        let seen = Rc::clone(&hits);
        let id = cache.subscribe("a.cmap", Rc::new(move |_: &str, _: &Arc<MapDocument>| seen.set(seen.get() + 1)));
        assert!(cache.unsubscribe("a.cmap", id));
        assert!(!cache.unsubscribe("a.cmap", id));

        let note = cache
            .publish("a.cmap", MapDocument::new(10, 10).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(note.listener_count(), 0);
        note.deliver();
        assert_eq!(hits.get(), 0);
    }
}
