//! Integration tests: persisted map files → `MapDocument` and back.
//!
//! Uses a hand-written fixture in the legacy id format to check that
//! normalisation, lenient region loading, and re-emission hold together.

use atlas_core::*;
use pretty_assertions::assert_eq;

fn load_fixture() -> MapDocument {
    parse_document(include_str!("fixtures/continent.cmap")).expect("fixture should parse")
}

#[test]
fn fixture_loads_with_invalid_region_dropped() {
    let doc = load_fixture();
    assert_eq!(doc.title, "Continent of Varos");
    assert_eq!(doc.pins.len(), 3);
    assert_eq!(doc.regions.len(), 2, "two-point region must be skipped");
    assert!(doc.regions.iter().all(|r| r.label.as_deref() != Some("Unfinished")));
}

#[test]
fn layer_defaults_and_paint_order() {
    let doc = load_fixture();
    let order: Vec<&str> = doc
        .layers_in_paint_order()
        .iter()
        .map(|l| l.id.as_str())
        .collect();
    assert_eq!(order, vec!["terrain", "roads", "politics"]);

    let terrain = doc.layer("terrain").unwrap();
    assert!(terrain.visible);
    assert_eq!(terrain.opacity, 1.0);
    assert!(!doc.layer("roads").unwrap().visible);
}

#[test]
fn legacy_ids_survive_reemission() {
    let doc = load_fixture();
    let text = emit_document(&doc, false).unwrap();
    let again = parse_document(&text).unwrap();
    let ids: Vec<AnnotationId> = doc.pins.iter().map(|p| p.id).collect();
    let ids_again: Vec<AnnotationId> = again.pins.iter().map(|p| p.id).collect();
    assert_eq!(ids, ids_again);
    assert_eq!(
        AnnotationId::from_persisted("1699999999001"),
        doc.pins[0].id
    );
}

#[test]
fn region_containment_over_fixture() {
    let doc = load_fixture();
    let overlap = ImagePoint::new(525.0, 425.0);
    let hits: Vec<&str> = doc
        .regions
        .iter()
        .filter(|r| r.geometry().contains_point(overlap))
        .filter_map(|r| r.label.as_deref())
        .collect();
    assert_eq!(hits, vec!["Kingdom of Ael", "Marches"]);
}

#[test]
fn linked_titles_feed_backlinks() {
    let doc = load_fixture();
    assert_eq!(
        doc.linked_pages().into_iter().collect::<Vec<_>>(),
        vec!["aldmoor", "frostgate", "kingdom of ael"]
    );
    assert_eq!(
        doc.linked_maps().into_iter().collect::<Vec<_>>(),
        vec!["aldmoor city", "the marches"]
    );
}
