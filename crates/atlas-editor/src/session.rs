//! Drawing session: the click-by-click polygon tool.
//!
//! ```text
//!   Idle ──start──▶ Collecting ──finish (≥3 points)──▶ Idle + RegionDraft
//!    ▲                  │  ▲
//!    └─────cancel───────┘  └── add_point / finish (<3 points)
//! ```
//!
//! Points are buffered in render space exactly as the user clicked them and
//! converted to image space only on finish, using the document height at
//! that moment rather than one captured when drawing started.

use atlas_core::error::{MapError, Result};
use atlas_core::geometry::{MIN_POLYGON_POINTS, RenderPoint, to_image_space};
use atlas_core::model::Region;
use atlas_core::shape::{RegionKind, RegionShape};
use atlas_render::paint::{Primitive, paint_drawing_preview};

use crate::input::{InteractionKind, PointerEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    Idle,
    Collecting,
}

#[derive(Debug, Clone, PartialEq)]
enum State {
    Idle,
    Collecting {
        kind: RegionKind,
        points: Vec<RenderPoint>,
    },
}

/// Geometry yielded by a finished session, waiting for the creation flow to
/// attach a label and links and commit it.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionDraft {
    pub shape: RegionShape,
}

impl RegionDraft {
    /// A region with a fresh id and no label or links.
    pub fn into_region(self) -> Region {
        Region::new(self.shape)
    }
}

/// What the session did with a pointer event.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawFeedback {
    PointAdded { count: usize },
    CursorMoved,
    /// Finish requested with too few points; still collecting.
    NeedMorePoints { have: usize },
    Finished(RegionDraft),
    Cancelled,
}

/// One in-progress drawing per view. Not shared, not locked.
#[derive(Debug, Clone)]
pub struct DrawingSession {
    state: State,
    cursor: Option<RenderPoint>,
}

impl Default for DrawingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl DrawingSession {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            cursor: None,
        }
    }

    pub fn mode(&self) -> DrawMode {
        match self.state {
            State::Idle => DrawMode::Idle,
            State::Collecting { .. } => DrawMode::Collecting,
        }
    }

    pub fn is_collecting(&self) -> bool {
        self.mode() == DrawMode::Collecting
    }

    pub fn kind(&self) -> Option<RegionKind> {
        match &self.state {
            State::Idle => None,
            State::Collecting { kind, .. } => Some(*kind),
        }
    }

    /// Buffered points in render space.
    pub fn points(&self) -> &[RenderPoint] {
        match &self.state {
            State::Idle => &[],
            State::Collecting { points, .. } => points,
        }
    }

    pub fn start(&mut self, kind: RegionKind) -> Result<()> {
        if self.is_collecting() {
            return Err(MapError::InvalidState(
                "a drawing session is already in progress".to_string(),
            ));
        }
        if kind != RegionKind::Polygon {
            return Err(MapError::Unsupported(format!("drawing {kind} regions")));
        }
        log::debug!("drawing session started ({kind})");
        self.state = State::Collecting {
            kind,
            points: Vec::new(),
        };
        self.cursor = None;
        Ok(())
    }

    /// Append a clicked point. A click landing on the previous point (the
    /// second half of a double click) is not counted again.
    pub fn add_point(&mut self, point: RenderPoint) -> Result<usize> {
        let State::Collecting { points, .. } = &mut self.state else {
            return Err(MapError::InvalidState(
                "add_point called with no drawing in progress".to_string(),
            ));
        };
        if points.last() != Some(&point) {
            points.push(point);
        }
        Ok(points.len())
    }

    /// Track the pointer for the rubber-band segment of the preview.
    pub fn track_cursor(&mut self, point: RenderPoint) {
        if self.is_collecting() {
            self.cursor = Some(point);
        }
    }

    /// Complete the polygon.
    ///
    /// `document_height` must be the height of the document as it is *now*.
    /// With fewer than three points the session keeps collecting and
    /// `InvalidGeometry` is returned.
    pub fn finish(&mut self, document_height: f64) -> Result<RegionDraft> {
        let not_drawing = || MapError::InvalidState("finish called with no drawing in progress".to_string());
        if !self.is_collecting() {
            return Err(not_drawing());
        }
        let have = self.points().len();
        if have < MIN_POLYGON_POINTS {
            return Err(MapError::InvalidGeometry(format!(
                "a region needs at least {MIN_POLYGON_POINTS} points, have {have}"
            )));
        }

        let State::Collecting { points, .. } = std::mem::replace(&mut self.state, State::Idle) else {
            return Err(not_drawing());
        };
        self.cursor = None;
        let image_points = points
            .into_iter()
            .map(|p| to_image_space(p, document_height))
            .collect::<Vec<_>>();
        log::debug!("drawing session finished with {} points", image_points.len());
        Ok(RegionDraft {
            shape: RegionShape::polygon(image_points),
        })
    }

    /// Drop the session. Valid in any state; returns whether anything was
    /// discarded.
    pub fn cancel(&mut self) -> bool {
        self.cursor = None;
        let was_collecting = self.is_collecting();
        self.state = State::Idle;
        if was_collecting {
            log::debug!("drawing session cancelled");
        }
        was_collecting
    }

    /// Open polyline of the buffered points plus the cursor segment.
    pub fn preview(&self) -> Option<Primitive> {
        paint_drawing_preview(self.points(), self.cursor)
    }

    /// Route a pointer event while collecting: click adds, double click
    /// finishes, context cancels, hover moves the rubber band.
    ///
    /// Returns `None` when idle, meaning the event is not for the session.
    pub fn handle(&mut self, event: &PointerEvent, document_height: f64) -> Option<DrawFeedback> {
        if !self.is_collecting() {
            return None;
        }
        let feedback = match event.kind {
            InteractionKind::Click => match self.add_point(event.position()) {
                Ok(count) => DrawFeedback::PointAdded { count },
                Err(_) => return None,
            },
            InteractionKind::DoubleClick => {
                // The double click's own position is usually already in the
                // buffer from the click that preceded it.
                if let Err(e) = self.add_point(event.position()) {
                    log::warn!("double click lost its point: {e}");
                    return None;
                }
                match self.finish(document_height) {
                    Ok(draft) => DrawFeedback::Finished(draft),
                    Err(_) => DrawFeedback::NeedMorePoints {
                        have: self.points().len(),
                    },
                }
            }
            InteractionKind::Hover => {
                self.track_cursor(event.position());
                DrawFeedback::CursorMoved
            }
            InteractionKind::Context => {
                self.cancel();
                DrawFeedback::Cancelled
            }
        };
        Some(feedback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atlas_core::geometry::ImagePoint;

    fn started() -> DrawingSession {
        let mut s = DrawingSession::new();
        s.start(RegionKind::Polygon).unwrap();
        s
    }

    #[test]
    fn start_twice_is_invalid_state() {
        let mut s = started();
        assert!(matches!(
            s.start(RegionKind::Polygon),
            Err(MapError::InvalidState(_))
        ));
        assert!(s.is_collecting());
    }

    #[test]
    fn circle_drawing_is_unsupported() {
        let mut s = DrawingSession::new();
        assert!(matches!(
            s.start(RegionKind::Circle),
            Err(MapError::Unsupported(_))
        ));
        assert_eq!(s.mode(), DrawMode::Idle);
    }

    #[test]
    fn add_point_while_idle_is_invalid_state() {
        let mut s = DrawingSession::new();
        assert!(matches!(
            s.add_point(RenderPoint::new(1.0, 1.0)),
            Err(MapError::InvalidState(_))
        ));
    }

    #[test]
    fn finish_needs_three_points() {
        let mut s = started();
        s.add_point(RenderPoint::new(0.0, 100.0)).unwrap();
        s.add_point(RenderPoint::new(10.0, 100.0)).unwrap();

        let err = s.finish(100.0).unwrap_err();
        assert!(matches!(err, MapError::InvalidGeometry(_)));
        assert_eq!(s.mode(), DrawMode::Collecting);
        assert_eq!(s.points().len(), 2);

        s.add_point(RenderPoint::new(10.0, 90.0)).unwrap();
        let draft = s.finish(100.0).unwrap();
        assert_eq!(s.mode(), DrawMode::Idle);
        assert!(draft.shape.geometry().is_valid());
    }

    #[test]
    fn finish_converts_with_height_at_finish_time() {
        let mut s = started();
        s.add_point(RenderPoint::new(0.0, 50.0)).unwrap();
        s.add_point(RenderPoint::new(10.0, 50.0)).unwrap();
        s.add_point(RenderPoint::new(10.0, 40.0)).unwrap();
        let RegionShape::Polygon(poly) = s.finish(200.0).unwrap().shape else {
            panic!("expected polygon");
        };
        assert_eq!(
            poly.points,
            vec![
                ImagePoint::new(0.0, 150.0),
                ImagePoint::new(10.0, 150.0),
                ImagePoint::new(10.0, 160.0),
            ]
        );
    }

    #[test]
    fn cancel_discards_from_any_state() {
        let mut s = started();
        s.add_point(RenderPoint::new(1.0, 1.0)).unwrap();
        assert!(s.cancel());
        assert_eq!(s.mode(), DrawMode::Idle);
        assert!(s.points().is_empty());
        assert!(!s.cancel());
    }

    #[test]
    fn repeated_click_is_not_a_new_vertex() {
        let mut s = started();
        assert_eq!(s.add_point(RenderPoint::new(3.0, 3.0)).unwrap(), 1);
        assert_eq!(s.add_point(RenderPoint::new(3.0, 3.0)).unwrap(), 1);
    }

    #[test]
    fn preview_follows_points_and_cursor() {
        let mut s = started();
        assert!(s.preview().is_none());
        s.add_point(RenderPoint::new(0.0, 0.0)).unwrap();
        s.track_cursor(RenderPoint::new(4.0, 4.0));
        let Some(Primitive::Polyline { points }) = s.preview() else {
            panic!("expected polyline");
        };
        assert_eq!(points.len(), 2);
    }

    #[test]
    fn double_click_finishes_via_handle() {
        let mut s = started();
        for (x, y) in [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)] {
            s.handle(&PointerEvent::click(x, y), 100.0);
        }
        let fb = s.handle(&PointerEvent::double_click(10.0, 10.0), 100.0);
        assert!(matches!(fb, Some(DrawFeedback::Finished(_))));
        assert!(s.handle(&PointerEvent::click(0.0, 0.0), 100.0).is_none());
    }

    #[test]
    fn early_double_click_keeps_collecting() {
        let mut s = started();
        s.handle(&PointerEvent::click(0.0, 0.0), 100.0);
        let fb = s.handle(&PointerEvent::double_click(0.0, 0.0), 100.0);
        assert_eq!(fb, Some(DrawFeedback::NeedMorePoints { have: 1 }));
        assert!(s.is_collecting());
    }
}
