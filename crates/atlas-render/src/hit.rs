//! Hit testing: pointer position → annotations under it.
//!
//! Pins paint above regions, so they are tested first and win outright.
//! A pin is hit through its marker footprint in render space, not through
//! its exact position. Regions are tested geometrically in image space and
//! every containing region is returned, in document order.

use atlas_core::config::MarkerSize;
use atlas_core::geometry::{ImagePoint, RenderPoint, to_image_space, to_render_space};
use atlas_core::model::{AnnotationHandle, MapDocument, Pin, Region, Targets};
use kurbo::{Point, Rect};

/// An annotation found under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Candidate<'a> {
    Pin(&'a Pin),
    Region(&'a Region),
}

impl<'a> Candidate<'a> {
    pub fn handle(&self) -> AnnotationHandle {
        match self {
            Candidate::Pin(p) => AnnotationHandle::Pin(p.id),
            Candidate::Region(r) => AnnotationHandle::Region(r.id),
        }
    }

    pub fn targets(&self) -> &'a Targets {
        match self {
            Candidate::Pin(p) => &p.targets,
            Candidate::Region(r) => &r.targets,
        }
    }

    pub fn label(&self) -> Option<&'a str> {
        match self {
            Candidate::Pin(p) => p.label.as_deref(),
            Candidate::Region(r) => r.label.as_deref(),
        }
    }

    /// Label, or a generic name when the annotation has none.
    pub fn display_name(&self) -> String {
        match (self.label(), self) {
            (Some(label), _) => label.to_string(),
            (None, Candidate::Pin(_)) => "Unnamed pin".to_string(),
            (None, Candidate::Region(_)) => "Unnamed region".to_string(),
        }
    }
}

/// Render-space marker footprint of a pin, anchored bottom-centre.
pub fn pin_footprint(pin: &Pin, document_height: f64, marker: MarkerSize) -> Rect {
    let anchor = to_render_space(pin.position(), document_height);
    let half = marker.width / 2.0;
    Rect::new(
        anchor.x - half,
        anchor.y,
        anchor.x + half,
        anchor.y + marker.height,
    )
}

/// Topmost pin whose footprint contains `at`. Later pins paint over earlier
/// ones, so the list is walked in reverse.
pub fn hit_test_pin(doc: &MapDocument, marker: MarkerSize, at: RenderPoint) -> Option<&Pin> {
    let height = doc.render_height();
    let p = Point::new(at.x, at.y);
    let hit = doc
        .pins
        .iter()
        .rev()
        .find(|pin| pin_footprint(pin, height, marker).contains(p));
    if let Some(pin) = hit {
        log::trace!("hit pin {} at ({}, {})", pin.id, at.x, at.y);
    }
    hit
}

/// Every region containing `at`, in document order.
pub fn hit_test_regions(doc: &MapDocument, at: ImagePoint) -> Vec<&Region> {
    doc.regions
        .iter()
        .filter(|r| r.geometry().contains_point(at))
        .collect()
}

/// Candidates under a render-space pointer position.
///
/// A pin hit yields exactly that pin; otherwise every containing region.
pub fn candidates_at(doc: &MapDocument, marker: MarkerSize, at: RenderPoint) -> Vec<Candidate<'_>> {
    if let Some(pin) = hit_test_pin(doc, marker, at) {
        return vec![Candidate::Pin(pin)];
    }
    let image_point = to_image_space(at, doc.render_height());
    hit_test_regions(doc, image_point)
        .into_iter()
        .map(Candidate::Region)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn doc_with_overlap() -> MapDocument {
        let mut doc = MapDocument::new(100, 100).unwrap();
        doc.insert_region(
            Region::polygon(vec![
                ImagePoint::new(0.0, 0.0),
                ImagePoint::new(10.0, 0.0),
                ImagePoint::new(10.0, 10.0),
                ImagePoint::new(0.0, 10.0),
            ])
            .with_label("West"),
        )
        .unwrap();
        doc.insert_region(
            Region::polygon(vec![
                ImagePoint::new(2.0, 2.0),
                ImagePoint::new(20.0, 2.0),
                ImagePoint::new(20.0, 20.0),
                ImagePoint::new(2.0, 20.0),
            ])
            .with_label("East"),
        )
        .unwrap();
        doc
    }

    #[test]
    fn footprint_sits_above_the_anchor() {
        let pin = Pin::new(ImagePoint::new(50.0, 30.0));
        let rect = pin_footprint(&pin, 100.0, MarkerSize { width: 10.0, height: 20.0 });
        assert_eq!(rect, Rect::new(45.0, 70.0, 55.0, 90.0));
    }

    #[test]
    fn overlapping_regions_keep_document_order() {
        let doc = doc_with_overlap();
        let hits = hit_test_regions(&doc, ImagePoint::new(5.0, 5.0));
        let labels: Vec<_> = hits.iter().filter_map(|r| r.label.as_deref()).collect();
        assert_eq!(labels, vec!["West", "East"]);
    }

    #[test]
    fn pin_hides_regions_underneath() {
        let mut doc = doc_with_overlap();
        let pin = Pin::new(ImagePoint::new(5.0, 5.0)).with_targets(Targets::page("Inn"));
        let pin_id = pin.id;
        doc.insert_pin(pin).unwrap();

        // Pin anchor in render space is (5, 95); click just above it.
        let hits = candidates_at(&doc, MarkerSize::default(), RenderPoint::new(5.0, 100.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].handle(), AnnotationHandle::Pin(pin_id));
    }

    #[test]
    fn topmost_pin_wins() {
        let mut doc = MapDocument::new(100, 100).unwrap();
        let below = Pin::new(ImagePoint::new(50.0, 50.0));
        let above = Pin::new(ImagePoint::new(52.0, 50.0));
        let above_id = above.id;
        doc.insert_pin(below).unwrap();
        doc.insert_pin(above).unwrap();
        let hit = hit_test_pin(&doc, MarkerSize::default(), RenderPoint::new(51.0, 55.0));
        assert_eq!(hit.map(|p| p.id), Some(above_id));
    }

    #[test]
    fn region_candidates_use_image_space() {
        let doc = doc_with_overlap();
        // Render (5, 95) is image (5, 5): inside both.
        assert_eq!(
            candidates_at(&doc, MarkerSize::default(), RenderPoint::new(5.0, 95.0)).len(),
            2
        );
        // Render (5, 5) is image (5, 95): outside both.
        assert!(candidates_at(&doc, MarkerSize::default(), RenderPoint::new(5.0, 5.0)).is_empty());
    }

    #[test]
    fn unnamed_candidates_get_generic_names() {
        let region = Region::polygon(vec![
            ImagePoint::new(0.0, 0.0),
            ImagePoint::new(1.0, 0.0),
            ImagePoint::new(1.0, 1.0),
        ]);
        assert_eq!(Candidate::Region(&region).display_name(), "Unnamed region");
    }
}
