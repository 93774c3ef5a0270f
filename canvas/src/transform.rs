//! Shape transforms: drag, rotate, provisional shapes, and handle placement.
//!
//! Handles are derived, never stored. `handles` is a pure function of the
//! element, and every transform returns the moved element together with its
//! freshly derived handles so a caller can never show one without the other.

#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::consts::{HANDLE_OFFSET, MIN_DOTTED_LINE_LENGTH, PIPE_THICKNESS};
use crate::doc::{DottedLine, ElementId, Pipe, ShapeElement, ShapeKind};

/// Positions of the two manipulation handles of a selected element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Handles {
    /// Pan from here to move the element.
    pub drag: Point,
    /// Rotate gestures are anchored here.
    pub rotate: Point,
}

/// An element after a transform, with handles derived from its new geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub element: ShapeElement,
    pub handles: Option<Handles>,
}

impl Transformed {
    fn new(element: ShapeElement) -> Self {
        let handles = handles(&element);
        Self { element, handles }
    }
}

/// Derive handle positions for `element`.
///
/// Returns `None` for a dotted line of zero length, whose direction is undefined.
#[must_use]
pub fn handles(element: &ShapeElement) -> Option<Handles> {
    match element {
        ShapeElement::Pipe(p) => Some(pipe_handles(p)),
        ShapeElement::DottedLine(l) => dotted_line_handles(l),
    }
}

fn pipe_handles(p: &Pipe) -> Handles {
    let (sin, cos) = p.rotation.sin_cos();
    let drag = Point::new(p.x + HANDLE_OFFSET * sin, p.y - p.height / 2.0 - HANDLE_OFFSET * cos);
    let rotate = Point::new(p.x + p.width / 2.0 + HANDLE_OFFSET, p.y).rotate_about(p.center(), p.rotation);
    Handles { drag, rotate }
}

fn dotted_line_handles(l: &DottedLine) -> Option<Handles> {
    let (a, b) = l.effective_endpoints();
    let len = a.distance(b);
    if len <= f64::EPSILON {
        return None;
    }
    let dir = b.sub(a).scale(1.0 / len);
    let normal = Point::new(-dir.y, dir.x);
    Some(Handles {
        drag: a.midpoint(b).add(normal.scale(HANDLE_OFFSET)),
        rotate: b.add(dir.scale(HANDLE_OFFSET)),
    })
}

/// Offset from the element's center to the pointer, captured when a drag starts.
#[must_use]
pub fn grab_offset(element: &ShapeElement, pointer: Point) -> Point {
    pointer.sub(element.center())
}

/// Move `element` so its center sits at `pointer - offset`.
///
/// Dotted lines keep their length and direction: the half-span is laid out
/// around the new center.
#[must_use]
pub fn drag_to(element: &ShapeElement, pointer: Point, offset: Point) -> Transformed {
    let center = pointer.sub(offset);
    let moved = match element {
        ShapeElement::Pipe(p) => ShapeElement::Pipe(Pipe { x: center.x, y: center.y, ..p.clone() }),
        ShapeElement::DottedLine(l) => {
            let half_dx = (l.x2 - l.x1) / 2.0;
            let half_dy = (l.y2 - l.y1) / 2.0;
            ShapeElement::DottedLine(DottedLine {
                x1: center.x - half_dx,
                y1: center.y - half_dy,
                x2: center.x + half_dx,
                y2: center.y + half_dy,
                ..l.clone()
            })
        }
    };
    Transformed::new(moved)
}

/// Add `delta` radians to the element's rotation.
#[must_use]
pub fn rotate_by(element: &ShapeElement, delta: f64) -> Transformed {
    let rotated = match element {
        ShapeElement::Pipe(p) => ShapeElement::Pipe(Pipe { rotation: p.rotation + delta, ..p.clone() }),
        ShapeElement::DottedLine(l) => {
            ShapeElement::DottedLine(DottedLine { rotation: l.rotation + delta, ..l.clone() })
        }
    };
    Transformed::new(rotated)
}

/// The shape being drawn while a pan from `anchor` is at `pointer`.
///
/// A pipe spans the signed horizontal extent of the pan at fixed thickness; a
/// dotted line runs from anchor to pointer.
#[must_use]
pub fn provisional_shape(kind: ShapeKind, id: ElementId, anchor: Point, pointer: Point) -> ShapeElement {
    match kind {
        ShapeKind::Pipe => {
            let width = pointer.x - anchor.x;
            ShapeElement::Pipe(Pipe {
                id,
                x: anchor.x + width / 2.0,
                y: anchor.y,
                width,
                height: PIPE_THICKNESS,
                rotation: 0.0,
            })
        }
        ShapeKind::DottedLine => ShapeElement::DottedLine(DottedLine {
            id,
            x1: anchor.x,
            y1: anchor.y,
            x2: pointer.x,
            y2: pointer.y,
            rotation: 0.0,
        }),
    }
}

/// Whether a drawn shape is big enough to commit.
#[must_use]
pub fn meets_minimum_size(element: &ShapeElement) -> bool {
    match element {
        ShapeElement::Pipe(p) => p.width > 0.0,
        ShapeElement::DottedLine(l) => l.length() > MIN_DOTTED_LINE_LENGTH,
    }
}
