//! In-memory host collaborators shared by the integration tests.

#![allow(dead_code)]

use atlas_core::error::IoFailure;
use atlas_core::host::{DocumentIo, TitleIndex};
use atlas_core::model::{MapDocument, TargetKind};
use atlas_core::EngineConfig;
use atlas_editor::{Listener, MapEngine};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

pub const HARBOR: &str = "maps/harbor.cmap";

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// File store that yields before every read and write, so concurrent
/// commits interleave at the I/O boundary.
#[derive(Default)]
pub struct MemoryIo {
    files: RefCell<HashMap<String, String>>,
    failing_reads: RefCell<HashSet<String>>,
    failing_writes: RefCell<HashSet<String>>,
    writes: Cell<usize>,
}

impl MemoryIo {
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.put(path, content);
        self
    }

    pub fn put(&self, path: &str, content: &str) {
        self.files
            .borrow_mut()
            .insert(path.to_string(), content.to_string());
    }

    pub fn file(&self, path: &str) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }

    pub fn fail_reads(&self, path: &str) {
        self.failing_reads.borrow_mut().insert(path.to_string());
    }

    pub fn fail_writes(&self, path: &str) {
        self.failing_writes.borrow_mut().insert(path.to_string());
    }

    pub fn write_count(&self) -> usize {
        self.writes.get()
    }
}

impl DocumentIo for MemoryIo {
    async fn read_document(&self, path: &str) -> Result<String, IoFailure> {
        tokio::task::yield_now().await;
        if self.failing_reads.borrow().contains(path) {
            return Err(IoFailure::new("permission denied"));
        }
        self.file(path)
            .ok_or_else(|| IoFailure::new(format!("no such file: {path}")))
    }

    async fn write_document(&self, path: &str, content: &str) -> Result<(), IoFailure> {
        tokio::task::yield_now().await;
        if self.failing_writes.borrow().contains(path) {
            return Err(IoFailure::new("disk full"));
        }
        self.put(path, content);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

pub fn titles() -> TitleIndex {
    TitleIndex::new()
        .with(TargetKind::Page, "Harbor Notes", "pages/harbor-notes.md")
        .with(TargetKind::Page, "Lighthouse", "pages/lighthouse.md")
        .with(TargetKind::Map, "Lighthouse Grounds", "maps/lighthouse.cmap")
}

pub fn engine() -> MapEngine<MemoryIo> {
    init_logger();
    let io = MemoryIo::default().with_file(HARBOR, include_str!("../fixtures/harbor.cmap"));
    MapEngine::new(io, titles(), EngineConfig::default())
}

pub fn ignore() -> Listener {
    Rc::new(|_: &str, _: &Arc<MapDocument>| {})
}

/// Listener that counts how often it is called.
pub fn counter() -> (Listener, Rc<Cell<usize>>) {
    let hits = Rc::new(Cell::new(0));
    let seen = Rc::clone(&hits);
    let listener: Listener = Rc::new(move |_: &str, _: &Arc<MapDocument>| seen.set(seen.get() + 1));
    (listener, hits)
}
