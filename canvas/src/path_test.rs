#![allow(clippy::float_cmp)]

use super::*;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

// =============================================================
// Encoding
// =============================================================

#[test]
fn single_point_encodes_as_moveto_only() {
    assert_eq!(Polyline::new(pt(10.0, 10.0)).to_string(), "M10,10");
}

#[test]
fn segment_encodes_with_lineto() {
    assert_eq!(Polyline::segment(pt(10.0, 10.0), pt(50.0, 10.0)).to_string(), "M10,10 L50,10");
}

#[test]
fn fractional_and_negative_coordinates() {
    let line = Polyline::segment(pt(-2.5, 0.125), pt(3.75, -40.0));
    assert_eq!(line.to_string(), "M-2.5,0.125 L3.75,-40");
}

#[test]
fn negative_zero_prints_as_zero() {
    assert_eq!(Polyline::new(pt(-0.0, -0.0)).to_string(), "M0,0");
}

#[test]
fn freeform_encodes_every_point() {
    let mut line = Polyline::new(pt(0.0, 0.0));
    line.push(pt(1.0, 1.0));
    line.push(pt(2.0, 4.0));
    assert_eq!(line.to_string(), "M0,0 L1,1 L2,4");
}

// =============================================================
// Decoding
// =============================================================

#[test]
fn parses_two_point_path() {
    let line: Polyline = "M0,0 L100,0".parse().unwrap();
    assert_eq!(line.points(), &[pt(0.0, 0.0), pt(100.0, 0.0)]);
}

#[test]
fn parses_with_loose_whitespace() {
    let line: Polyline = "  M 1.5 , 2  L  3,4 ".parse().unwrap();
    assert_eq!(line.points(), &[pt(1.5, 2.0), pt(3.0, 4.0)]);
}

#[test]
fn parse_then_encode_is_stable() {
    let raw = "M12.25,7 L40,7 L40,90.5";
    let line: Polyline = raw.parse().unwrap();
    assert_eq!(line.to_string(), raw);
}

#[test]
fn parse_rejects_empty() {
    assert_eq!("   ".parse::<Polyline>(), Err(PathParseError::Empty));
}

#[test]
fn parse_rejects_missing_moveto() {
    assert_eq!("L1,2".parse::<Polyline>(), Err(PathParseError::MissingMoveTo));
}

#[test]
fn parse_rejects_bad_coordinates() {
    assert!(matches!("M1;2".parse::<Polyline>(), Err(PathParseError::BadCoordinate(_))));
    assert!(matches!("M1,2 L".parse::<Polyline>(), Err(PathParseError::BadCoordinate(_))));
    assert!(matches!("M1,2 Q3,4".parse::<Polyline>(), Err(PathParseError::BadCoordinate(_))));
    assert!(matches!("Mabc,2".parse::<Polyline>(), Err(PathParseError::BadCoordinate(_))));
}

#[test]
fn parse_rejects_non_finite() {
    assert!("MNaN,2".parse::<Polyline>().is_err());
    assert!("Minf,2".parse::<Polyline>().is_err());
}

// =============================================================
// Polyline editing
// =============================================================

#[test]
fn straight_end_keeps_single_segment() {
    let mut line = Polyline::new(pt(10.0, 10.0));
    line.set_straight_end(pt(20.0, 10.0));
    line.set_straight_end(pt(50.0, 10.0));
    assert_eq!(line.to_string(), "M10,10 L50,10");
}

#[test]
fn straight_end_collapses_freeform_points() {
    let mut line = Polyline::new(pt(0.0, 0.0));
    line.push(pt(1.0, 1.0));
    line.push(pt(2.0, 2.0));
    line.set_straight_end(pt(9.0, 9.0));
    assert_eq!(line.points().len(), 2);
}

#[test]
fn replace_end_moves_last_point_only() {
    let mut line = Polyline::new(pt(0.0, 0.0));
    line.push(pt(5.0, 5.0));
    line.push(pt(98.0, 3.0));
    line.replace_end(pt(100.0, 0.0));
    assert_eq!(line.to_string(), "M0,0 L5,5 L100,0");
}

#[test]
fn replace_end_on_single_point_is_noop() {
    let mut line = Polyline::new(pt(1.0, 1.0));
    line.replace_end(pt(9.0, 9.0));
    assert_eq!(line.start(), pt(1.0, 1.0));
    assert!(line.is_zero_length());
}

#[test]
fn endpoints_only_for_two_point_paths() {
    assert!(Polyline::new(pt(0.0, 0.0)).endpoints().is_none());
    let seg = Polyline::segment(pt(0.0, 0.0), pt(1.0, 0.0));
    assert_eq!(seg.endpoints(), Some((pt(0.0, 0.0), pt(1.0, 0.0))));
    let mut free = seg.clone();
    free.push(pt(2.0, 0.0));
    assert!(free.endpoints().is_none());
}

// =============================================================
// PathData
// =============================================================

#[test]
fn path_data_keeps_malformed_string_verbatim() {
    let data = PathData::from_wire("garbage C1,2");
    assert_eq!(data, PathData::Unparsed("garbage C1,2".into()));
    assert!(data.endpoints().is_none());
    assert_eq!(data.to_wire(), "garbage C1,2");
}

#[test]
fn path_data_serializes_as_string() {
    let data = PathData::from(Polyline::segment(pt(0.0, 0.0), pt(3.0, 4.0)));
    assert_eq!(serde_json::to_string(&data).unwrap(), "\"M0,0 L3,4\"");
}

#[test]
fn path_data_deserializes_both_variants() {
    let good: PathData = serde_json::from_str("\"M1,1 L2,2\"").unwrap();
    assert!(good.polyline().is_some());
    let bad: PathData = serde_json::from_str("\"nope\"").unwrap();
    assert!(bad.polyline().is_none());
}
