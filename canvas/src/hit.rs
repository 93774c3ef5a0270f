//! Hit-testing: which element or handle lies under a point.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::camera::Point;
use crate::consts::{HANDLE_GRAB_RADIUS, LINE_HIT_SLOP};
use crate::doc::{DottedLine, ElementId, Pipe, ShapeElement};
use crate::transform::Handles;

/// Which handle of the selected element a point falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Drag,
    Rotate,
}

/// The topmost (most recently added) element under `p`.
#[must_use]
pub fn element_at(elements: &[ShapeElement], p: Point) -> Option<ElementId> {
    elements.iter().rev().find(|e| hits_element(e, p)).map(ShapeElement::id)
}

/// Whether `p` lies on `element`.
#[must_use]
pub fn hits_element(element: &ShapeElement, p: Point) -> bool {
    match element {
        ShapeElement::Pipe(pipe) => hits_pipe(pipe, p),
        ShapeElement::DottedLine(line) => hits_line(line, p),
    }
}

fn hits_pipe(pipe: &Pipe, p: Point) -> bool {
    // Undo the pipe's rotation so the test is axis-aligned.
    let local = p.rotate_about(pipe.center(), -pipe.rotation).sub(pipe.center());
    local.x.abs() <= pipe.width.abs() / 2.0 && local.y.abs() <= pipe.height.abs() / 2.0
}

fn hits_line(line: &DottedLine, p: Point) -> bool {
    let (a, b) = line.effective_endpoints();
    distance_to_segment(p, a, b) <= LINE_HIT_SLOP
}

/// Shortest distance from `p` to the segment `a`–`b`.
#[must_use]
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b.sub(a);
    let len_sq = ab.x * ab.x + ab.y * ab.y;
    if len_sq <= f64::EPSILON {
        return p.distance(a);
    }
    let ap = p.sub(a);
    let t = ((ap.x * ab.x + ap.y * ab.y) / len_sq).clamp(0.0, 1.0);
    p.distance(a.add(ab.scale(t)))
}

/// The handle within grab range of `p`, preferring the nearer one.
#[must_use]
pub fn handle_at(handles: &Handles, p: Point) -> Option<HandleKind> {
    let drag = p.distance(handles.drag);
    let rotate = p.distance(handles.rotate);
    match (drag <= HANDLE_GRAB_RADIUS, rotate <= HANDLE_GRAB_RADIUS) {
        (true, true) if rotate < drag => Some(HandleKind::Rotate),
        (true, _) => Some(HandleKind::Drag),
        (false, true) => Some(HandleKind::Rotate),
        (false, false) => None,
    }
}
