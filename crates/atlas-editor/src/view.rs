//! Per-view state: which document is shown, plus the drawing session.
//!
//! I/O is not cancellable, so a view may get a result for a document it has
//! already closed or replaced. Each `show` hands out a [`PathToken`]; results
//! are passed back through [`MapView::accept`], which drops anything whose
//! token is no longer current.

use atlas_core::error::{MapError, Result};
use atlas_core::geometry::RenderPoint;
use atlas_core::host::DocumentIo;
use atlas_core::shape::RegionKind;
use atlas_render::paint::Primitive;

use crate::engine::MapEngine;
use crate::session::{DrawMode, DrawingSession, RegionDraft};

/// Proof that a request was issued while the view showed `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathToken {
    path: String,
    generation: u64,
}

impl PathToken {
    pub fn path(&self) -> &str {
        &self.path
    }
}

#[derive(Debug, Default)]
pub struct MapView {
    path: Option<String>,
    generation: u64,
    session: DrawingSession,
}

impl MapView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Switch to `path`. Any drawing in progress is discarded.
    pub fn show(&mut self, path: &str) -> PathToken {
        self.generation += 1;
        self.path = Some(path.to_string());
        self.session.cancel();
        log::debug!("view shows {path} (generation {})", self.generation);
        PathToken {
            path: path.to_string(),
            generation: self.generation,
        }
    }

    pub fn close(&mut self) {
        self.generation += 1;
        self.path = None;
        self.session.cancel();
    }

    pub fn is_current(&self, token: &PathToken) -> bool {
        token.generation == self.generation && self.path.as_deref() == Some(token.path.as_str())
    }

    /// Pass `result` through if `token` is still current; otherwise drop it
    /// and report `Closed`.
    pub fn accept<T>(&self, token: &PathToken, result: Result<T>) -> Result<T> {
        if self.is_current(token) {
            result
        } else {
            log::warn!("ignoring late result for {}", token.path);
            Err(MapError::Closed {
                path: token.path.clone(),
            })
        }
    }

    // ─── Drawing ────────────────────────────────────────────────────────

    pub fn draw_mode(&self) -> DrawMode {
        self.session.mode()
    }

    pub fn start_draw(&mut self, kind: RegionKind) -> Result<()> {
        if self.path.is_none() {
            return Err(MapError::InvalidState("no document is shown".to_string()));
        }
        self.session.start(kind)
    }

    /// Add a clicked render-space point; returns the number buffered.
    pub fn add_draw_point(&mut self, point: RenderPoint) -> Result<usize> {
        self.session.add_point(point)
    }

    pub fn track_draw_cursor(&mut self, point: RenderPoint) {
        self.session.track_cursor(point);
    }

    /// Finish the polygon using the height of the document as cached right
    /// now.
    pub fn finish_draw<Io: DocumentIo>(&mut self, engine: &MapEngine<Io>) -> Result<RegionDraft> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| MapError::InvalidState("no document is shown".to_string()))?;
        let document = engine
            .document(path)
            .ok_or_else(|| MapError::InvalidState(format!("{path} is not loaded")))?;
        self.session.finish(document.render_height())
    }

    pub fn cancel_draw(&mut self) -> bool {
        self.session.cancel()
    }

    pub fn draw_preview(&self) -> Option<Primitive> {
        self.session.preview()
    }

    pub(crate) fn session_mut(&mut self) -> &mut DrawingSession {
        &mut self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_path_invalidates_old_token() {
        let mut view = MapView::new();
        let first = view.show("a.cmap");
        assert!(view.is_current(&first));
        let second = view.show("b.cmap");
        assert!(!view.is_current(&first));
        assert!(view.is_current(&second));

        let late = view.accept(&first, Ok(1));
        assert!(matches!(late, Err(MapError::Closed { ref path }) if path == "a.cmap"));
        assert_eq!(view.accept(&second, Ok(2)).unwrap(), 2);
    }

    #[test]
    fn reshowing_same_path_still_invalidates() {
        let mut view = MapView::new();
        let first = view.show("a.cmap");
        view.close();
        let _ = view.show("a.cmap");
        assert!(!view.is_current(&first));
    }

    #[test]
    fn drawing_needs_a_document() {
        let mut view = MapView::new();
        assert!(matches!(
            view.start_draw(RegionKind::Polygon),
            Err(MapError::InvalidState(_))
        ));
        view.show("a.cmap");
        view.start_draw(RegionKind::Polygon).unwrap();
        view.add_draw_point(RenderPoint::new(1.0, 1.0)).unwrap();
        assert!(view.draw_preview().is_some());
        view.show("b.cmap");
        assert_eq!(view.draw_mode(), DrawMode::Idle);
    }
}
