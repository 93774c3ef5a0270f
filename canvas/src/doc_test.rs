#![allow(clippy::float_cmp)]

use std::f64::consts::PI;

use serde_json::json;

use super::*;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn segment(x1: f64, y1: f64, x2: f64, y2: f64, label: &str) -> PathSegment {
    PathSegment::new(Polyline::segment(pt(x1, y1), pt(x2, y2)), label)
}

fn label(id: ElementId, text: &str) -> Label {
    Label { id, x: 5.0, y: 6.0, text: text.into() }
}

fn pipe(id: ElementId) -> ShapeElement {
    ShapeElement::Pipe(Pipe { id, x: 50.0, y: 50.0, width: 80.0, height: 20.0, rotation: 0.0 })
}

fn dotted(id: ElementId) -> ShapeElement {
    ShapeElement::DottedLine(DottedLine { id, x1: 0.0, y1: 0.0, x2: 40.0, y2: 0.0, rotation: 0.0 })
}

// =============================================================
// Serde shapes
// =============================================================

#[test]
fn path_segment_wire_shape() {
    let json = serde_json::to_value(segment(10.0, 10.0, 50.0, 10.0, "Beam 1")).unwrap();
    assert_eq!(json, json!({ "path": "M10,10 L50,10", "label": "Beam 1" }));
}

#[test]
fn path_segment_missing_label_defaults_empty() {
    let seg: PathSegment = serde_json::from_value(json!({ "path": "M0,0 L1,1" })).unwrap();
    assert_eq!(seg.label, "");
}

#[test]
fn path_segment_list_roundtrip_is_lossless() {
    let list = vec![
        segment(0.0, 0.0, 100.0, 0.0, "Ridge"),
        segment(1.5, 2.25, -3.0, 4.0, ""),
        PathSegment { path: PathData::Unparsed("bogus".into()), label: "kept".into() },
    ];
    let text = serde_json::to_string(&list).unwrap();
    let back: Vec<PathSegment> = serde_json::from_str(&text).unwrap();
    assert_eq!(back, list);
}

#[test]
fn shape_element_tagged_pipe() {
    let json = serde_json::to_value(pipe(7)).unwrap();
    assert_eq!(
        json,
        json!({ "type": "pipe", "id": 7, "x": 50.0, "y": 50.0, "width": 80.0, "height": 20.0, "rotation": 0.0 })
    );
}

#[test]
fn shape_element_tagged_dotted_line() {
    let json = serde_json::to_value(dotted(9)).unwrap();
    assert_eq!(json["type"], "dottedLine");
    let back: ShapeElement = serde_json::from_value(json).unwrap();
    assert_eq!(back, dotted(9));
}

#[test]
fn shape_kind_serde_names() {
    assert_eq!(serde_json::to_string(&ShapeKind::Pipe).unwrap(), "\"pipe\"");
    assert_eq!(serde_json::to_string(&ShapeKind::DottedLine).unwrap(), "\"dottedLine\"");
}

// =============================================================
// Element geometry
// =============================================================

#[test]
fn element_accessors() {
    let p = pipe(1);
    assert_eq!(p.id(), 1);
    assert_eq!(p.kind(), ShapeKind::Pipe);
    assert_eq!(p.center(), pt(50.0, 50.0));
    let d = dotted(2);
    assert_eq!(d.kind(), ShapeKind::DottedLine);
    assert_eq!(d.center(), pt(20.0, 0.0));
}

#[test]
fn dotted_line_effective_endpoints_follow_rotation() {
    let line = DottedLine { id: 1, x1: 0.0, y1: 0.0, x2: 40.0, y2: 0.0, rotation: PI };
    let (a, b) = line.effective_endpoints();
    assert!((a.x - 40.0).abs() < 1e-9 && a.y.abs() < 1e-9);
    assert!(b.x.abs() < 1e-9 && b.y.abs() < 1e-9);
    assert_eq!(line.length(), 40.0);
}

// =============================================================
// IdGen
// =============================================================

#[test]
fn id_gen_uses_clock_when_ahead() {
    let mut ids = IdGen::default();
    assert_eq!(ids.next_at(1_000), 1_000);
    assert_eq!(ids.next_at(2_000), 2_000);
}

#[test]
fn id_gen_bumps_on_same_millisecond() {
    let mut ids = IdGen::default();
    let a = ids.next_at(500);
    let b = ids.next_at(500);
    let c = ids.next_at(499);
    assert!(a < b && b < c);
}

#[test]
fn id_gen_observe_moves_floor() {
    let mut ids = IdGen::default();
    ids.observe(9_000);
    assert_eq!(ids.next_at(10), 9_001);
}

#[test]
fn id_gen_wall_clock_ids_are_unique() {
    let mut ids = IdGen::default();
    let mut seen: Vec<ElementId> = (0..100).map(|_| ids.next_id()).collect();
    seen.dedup();
    assert_eq!(seen.len(), 100);
}

// =============================================================
// Store: paths
// =============================================================

#[test]
fn new_store_is_empty() {
    let store = SketchStore::new();
    assert!(store.paths().is_empty() && store.labels().is_empty() && store.elements().is_empty());
    assert!(store.current_path().is_none());
    assert_eq!(store.revision(), 0);
}

#[test]
fn append_path_commits_and_bumps_revision() {
    let mut store = SketchStore::new();
    assert!(store.append_path(segment(0.0, 0.0, 1.0, 0.0, "a")));
    assert_eq!(store.paths().len(), 1);
    assert_eq!(store.revision(), 1);
}

#[test]
fn append_path_refuses_zero_length() {
    let mut store = SketchStore::new();
    let dot = PathSegment::new(Polyline::new(pt(3.0, 3.0)), "");
    assert!(!store.append_path(dot));
    assert!(store.paths().is_empty());
    assert_eq!(store.revision(), 0);
}

#[test]
fn remove_last_path_pops_most_recent() {
    let mut store = SketchStore::new();
    store.append_path(segment(0.0, 0.0, 1.0, 0.0, "first"));
    store.append_path(segment(0.0, 0.0, 2.0, 0.0, "second"));
    let popped = store.remove_last_path().unwrap();
    assert_eq!(popped.label, "second");
    assert_eq!(store.paths().len(), 1);
}

#[test]
fn remove_last_path_on_empty_is_none() {
    let mut store = SketchStore::new();
    assert!(store.remove_last_path().is_none());
    assert_eq!(store.revision(), 0);
}

#[test]
fn update_path_label_in_and_out_of_range() {
    let mut store = SketchStore::new();
    store.append_path(segment(0.0, 0.0, 1.0, 0.0, "old"));
    assert!(store.update_path_label(0, "new"));
    assert_eq!(store.paths()[0].label, "new");
    assert!(!store.update_path_label(3, "x"));
}

// =============================================================
// Store: snapshots are immutable
// =============================================================

#[test]
fn snapshot_is_unaffected_by_later_mutation() {
    let mut store = SketchStore::new();
    store.append_path(segment(0.0, 0.0, 1.0, 0.0, "a"));
    let snap = store.snapshot();
    store.append_path(segment(0.0, 0.0, 2.0, 0.0, "b"));
    store.append_label(label(1, "x"));
    assert_eq!(snap.paths.len(), 1);
    assert!(snap.labels.is_empty());
    assert!(snap.revision < store.revision());
}

// =============================================================
// Store: labels
// =============================================================

#[test]
fn label_append_update_remove() {
    let mut store = SketchStore::new();
    store.append_label(label(1, "Edit me"));
    store.append_label(label(2, "Edit me"));
    assert!(store.update_label_text(1, "Gutter"));
    assert_eq!(store.labels()[0].text, "Gutter");
    assert!(!store.update_label_text(99, "nope"));
    assert_eq!(store.remove_last_label().unwrap().id, 2);
    assert_eq!(store.labels().len(), 1);
}

// =============================================================
// Store: elements
// =============================================================

#[test]
fn element_append_and_replace_whole() {
    let mut store = SketchStore::new();
    store.append_element(pipe(1));
    store.append_element(dotted(2));
    let moved = ShapeElement::Pipe(Pipe { id: 1, x: 0.0, y: 0.0, width: 10.0, height: 20.0, rotation: 1.0 });
    assert!(store.update_element(moved.clone()));
    assert_eq!(store.element(1), Some(&moved));
    assert_eq!(store.elements().len(), 2);
}

#[test]
fn update_unknown_element_is_refused() {
    let mut store = SketchStore::new();
    store.append_element(pipe(1));
    let rev = store.revision();
    assert!(!store.update_element(pipe(5)));
    assert_eq!(store.revision(), rev);
}

// =============================================================
// Store: bulk
// =============================================================

#[test]
fn clear_all_empties_everything() {
    let mut store = SketchStore::new();
    store.append_path(segment(0.0, 0.0, 1.0, 0.0, "a"));
    store.append_label(label(1, "x"));
    store.append_element(pipe(2));
    store.set_current_path(Some(Polyline::new(pt(1.0, 1.0))));
    store.clear_all();
    assert!(store.paths().is_empty() && store.labels().is_empty() && store.elements().is_empty());
    assert!(store.current_path().is_none());
}

#[test]
fn load_replaces_document() {
    let mut store = SketchStore::new();
    store.append_path(segment(0.0, 0.0, 1.0, 0.0, "stale"));
    store.load(vec![segment(5.0, 5.0, 6.0, 6.0, "fresh")], vec![label(3, "t")], vec![pipe(4)]);
    assert_eq!(store.paths()[0].label, "fresh");
    assert_eq!(store.labels().len(), 1);
    assert_eq!(store.elements().len(), 1);
}

#[test]
fn take_current_path_clears_it() {
    let mut store = SketchStore::new();
    store.set_current_path(Some(Polyline::new(pt(1.0, 2.0))));
    assert!(store.take_current_path().is_some());
    assert!(store.take_current_path().is_none());
}
