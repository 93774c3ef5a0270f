#![allow(clippy::float_cmp)]

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use super::*;

const EPSILON: f64 = 1e-9;

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON
}

fn pipe_at(x: f64, y: f64, w: f64, h: f64, r: f64) -> ShapeElement {
    ShapeElement::Pipe(Pipe { id: 1, x, y, width: w, height: h, rotation: r })
}

fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> ShapeElement {
    ShapeElement::DottedLine(DottedLine { id: 2, x1, y1, x2, y2, rotation: 0.0 })
}

fn expected_pipe_drag_handle(x: f64, y: f64, h: f64, r: f64) -> Point {
    pt(x + 20.0 * r.sin(), y - h / 2.0 - 20.0 * r.cos())
}

// =============================================================
// Pipe handles
// =============================================================

#[test]
fn pipe_handles_unrotated() {
    let h = handles(&pipe_at(100.0, 100.0, 80.0, 20.0, 0.0)).unwrap();
    assert!(close(h.drag, pt(100.0, 70.0)));
    assert!(close(h.rotate, pt(160.0, 100.0)));
}

#[test]
fn pipe_rotate_handle_turns_about_center() {
    let h = handles(&pipe_at(100.0, 100.0, 80.0, 20.0, FRAC_PI_2)).unwrap();
    assert!(close(h.rotate, pt(100.0, 160.0)));
    assert!(close(h.drag, expected_pipe_drag_handle(100.0, 100.0, 20.0, FRAC_PI_2)));
}

#[test]
fn pipe_drag_handle_formula_holds_after_drag_and_rotate() {
    let mut element = pipe_at(50.0, 60.0, 120.0, 20.0, 0.0);
    let offset = grab_offset(&element, pt(55.0, 40.0));
    for (i, step) in [pt(80.0, 40.0), pt(140.0, 95.0), pt(10.0, 300.0)].into_iter().enumerate() {
        let moved = drag_to(&element, step, offset);
        element = moved.element;
        let rotated = rotate_by(&element, 0.3 * f64::from(u8::try_from(i).unwrap() + 1));
        element = rotated.element;
        let ShapeElement::Pipe(p) = &element else { panic!("pipe expected") };
        let expected = expected_pipe_drag_handle(p.x, p.y, p.height, p.rotation);
        assert!(close(rotated.handles.unwrap().drag, expected));
    }
}

// =============================================================
// Dotted line handles
// =============================================================

#[test]
fn dotted_line_handles_horizontal() {
    let h = handles(&line(0.0, 0.0, 100.0, 0.0)).unwrap();
    assert!(close(h.drag, pt(50.0, 20.0)));
    assert!(close(h.rotate, pt(120.0, 0.0)));
}

#[test]
fn dotted_line_handles_follow_rotation() {
    let mut l = line(0.0, 0.0, 100.0, 0.0);
    l = rotate_by(&l, FRAC_PI_2).element;
    let h = handles(&l).unwrap();
    // Effective line now runs from (50,-50) to (50,50).
    assert!(close(h.rotate, pt(50.0, 70.0)));
    assert!(close(h.drag, pt(30.0, 0.0)));
}

#[test]
fn zero_length_dotted_line_has_no_handles() {
    assert!(handles(&line(5.0, 5.0, 5.0, 5.0)).is_none());
}

// =============================================================
// Drag
// =============================================================

#[test]
fn drag_pipe_keeps_grab_offset() {
    let element = pipe_at(100.0, 100.0, 80.0, 20.0, 0.0);
    let offset = grab_offset(&element, pt(110.0, 95.0));
    let moved = drag_to(&element, pt(210.0, 195.0), offset);
    assert_eq!(moved.element.center(), pt(200.0, 200.0));
}

#[test]
fn drag_dotted_line_preserves_length_and_direction() {
    let element = line(0.0, 0.0, 30.0, 40.0);
    let offset = grab_offset(&element, pt(15.0, 20.0));
    let moved = drag_to(&element, pt(115.0, 20.0), offset).element;
    let ShapeElement::DottedLine(l) = moved else { panic!("line expected") };
    assert_eq!((l.x1, l.y1, l.x2, l.y2), (100.0, 0.0, 130.0, 40.0));
    assert_eq!(l.length(), 50.0);
}

#[test]
fn drag_returns_handles_for_new_position() {
    let element = pipe_at(0.0, 0.0, 40.0, 20.0, 0.0);
    let moved = drag_to(&element, pt(10.0, 10.0), pt(0.0, 0.0));
    assert_eq!(moved.handles, handles(&moved.element));
    assert!(close(moved.handles.unwrap().drag, pt(10.0, -20.0)));
}

// =============================================================
// Rotate
// =============================================================

#[test]
fn rotations_accumulate() {
    let mut element = pipe_at(0.0, 0.0, 40.0, 20.0, 0.0);
    for _ in 0..4 {
        element = rotate_by(&element, FRAC_PI_4 / 2.0).element;
    }
    assert!((element.rotation() - FRAC_PI_2).abs() < EPSILON);
}

#[test]
fn rotate_keeps_geometry() {
    let element = line(0.0, 0.0, 30.0, 0.0);
    let rotated = rotate_by(&element, 1.0).element;
    let ShapeElement::DottedLine(l) = rotated else { panic!("line expected") };
    assert_eq!((l.x1, l.y1, l.x2, l.y2), (0.0, 0.0, 30.0, 0.0));
    assert_eq!(l.rotation, 1.0);
}

// =============================================================
// Provisional shapes and size policy
// =============================================================

#[test]
fn provisional_pipe_spans_horizontal_extent() {
    let shape = provisional_shape(ShapeKind::Pipe, 3, pt(10.0, 50.0), pt(110.0, 80.0));
    let ShapeElement::Pipe(p) = &shape else { panic!("pipe expected") };
    assert_eq!((p.x, p.y, p.width, p.height, p.rotation), (60.0, 50.0, 100.0, PIPE_THICKNESS, 0.0));
    assert!(meets_minimum_size(&shape));
}

#[test]
fn pipe_with_non_positive_width_is_rejected() {
    let leftward = provisional_shape(ShapeKind::Pipe, 1, pt(100.0, 0.0), pt(40.0, 0.0));
    let vertical = provisional_shape(ShapeKind::Pipe, 1, pt(100.0, 0.0), pt(100.0, 90.0));
    assert!(!meets_minimum_size(&leftward));
    assert!(!meets_minimum_size(&vertical));
}

#[test]
fn dotted_line_length_threshold() {
    let short = provisional_shape(ShapeKind::DottedLine, 1, pt(0.0, 0.0), pt(6.0, 8.0));
    let long = provisional_shape(ShapeKind::DottedLine, 1, pt(0.0, 0.0), pt(6.0, 8.1));
    assert!(!meets_minimum_size(&short));
    assert!(meets_minimum_size(&long));
}
