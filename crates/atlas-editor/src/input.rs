//! Input abstraction layer.
//!
//! The host's paint surface reports pointer activity in render space; it is
//! normalised into a `PointerEvent` before reaching the resolver.

use atlas_core::geometry::RenderPoint;

/// What kind of gesture produced the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// Primary button click.
    Click,
    /// Double click. Finishes a polygon while drawing, otherwise ignored.
    DoubleClick,
    /// Pointer resting over the map.
    Hover,
    /// Secondary button / long press.
    Context,
}

/// A pointer event at a render-space position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    pub kind: InteractionKind,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64, kind: InteractionKind) -> Self {
        Self { x, y, kind }
    }

    pub fn click(x: f64, y: f64) -> Self {
        Self::new(x, y, InteractionKind::Click)
    }

    pub fn double_click(x: f64, y: f64) -> Self {
        Self::new(x, y, InteractionKind::DoubleClick)
    }

    pub fn hover(x: f64, y: f64) -> Self {
        Self::new(x, y, InteractionKind::Hover)
    }

    pub fn context(x: f64, y: f64) -> Self {
        Self::new(x, y, InteractionKind::Context)
    }

    pub fn position(&self) -> RenderPoint {
        RenderPoint::new(self.x, self.y)
    }
}
