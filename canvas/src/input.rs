//! Input model: tools, raw events, the gesture state machine, and the router.
//!
//! `InputEvent` is what the host delivers (pointer and gesture callbacks).
//! `InputState` is the gesture being tracked between begin and end, and
//! `UiState` is the persistent mode (tool, draw style, edit mode, selection).
//! [`route`] looks at all three and classifies the event into one `Intent`;
//! it never mutates anything, so the engine applies intents in one place.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::consts::LONG_PRESS_MS;
use crate::doc::{ElementId, ShapeElement, ShapeKind};
use crate::hit::{self, HandleKind};
use crate::path::Polyline;
use crate::transform;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tool {
    /// Draw measured strokes (default).
    #[default]
    Path,
    /// Annotate mode: taps place floating labels.
    Label,
    /// Pan draws a pipe or dotted line.
    Shape(ShapeKind),
}

/// How a stroke follows the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DrawStyle {
    /// One segment from the start to the pointer; prompts for a label.
    #[default]
    Straight,
    /// Every pointer position is appended; no label prompt.
    Freeform,
}

/// A raw pointer or gesture event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    PointerDown { at: Point },
    PointerMove { at: Point },
    PointerUp { at: Point },
    /// A press held in place; `held_ms` is how long it was held.
    LongPress { at: Point, held_ms: u64 },
    PanBegin { at: Point },
    PanUpdate { at: Point },
    PanEnd { at: Point },
    RotateBegin,
    /// `angle` is the total rotation in radians since the gesture began.
    RotateUpdate { angle: f64 },
    RotateEnd,
    Tap { at: Point },
}

impl InputEvent {
    /// The same event with its position passed through `f`.
    #[must_use]
    pub fn map_point(self, f: impl Fn(Point) -> Point) -> Self {
        match self {
            Self::PointerDown { at } => Self::PointerDown { at: f(at) },
            Self::PointerMove { at } => Self::PointerMove { at: f(at) },
            Self::PointerUp { at } => Self::PointerUp { at: f(at) },
            Self::LongPress { at, held_ms } => Self::LongPress { at: f(at), held_ms },
            Self::PanBegin { at } => Self::PanBegin { at: f(at) },
            Self::PanUpdate { at } => Self::PanUpdate { at: f(at) },
            Self::PanEnd { at } => Self::PanEnd { at: f(at) },
            Self::Tap { at } => Self::Tap { at: f(at) },
            Self::RotateBegin | Self::RotateUpdate { .. } | Self::RotateEnd => self,
        }
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub tool: Tool,
    pub draw_style: DrawStyle,
    /// Entered by long-press on an element; enables drag/rotate.
    pub edit_mode: bool,
    pub selected_id: Option<ElementId>,
}

/// Internal state for the gesture state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A stroke is being drawn; the stroke itself lives in the store.
    Drawing,
    /// A straight stroke is finished and waits for the host to supply a label.
    AwaitingLabel {
        segment: Polyline,
    },
    /// A freshly placed label is being edited; drawing is suspended.
    LabelEditing {
        id: ElementId,
    },
    /// A pan is drawing a new shape.
    DrawingShape {
        /// Where the pan began.
        anchor: Point,
        /// The shape as it would be committed right now.
        provisional: ShapeElement,
    },
    /// The selected element follows the pointer.
    Dragging {
        id: ElementId,
        /// Pointer-to-center offset captured at grab time.
        offset: Point,
    },
    /// The selected element follows a rotation gesture.
    Rotating {
        id: ElementId,
        /// Gesture angle at the previous update, used to compute the delta.
        last_angle: f64,
    },
}

/// What an event means given the current state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intent {
    Ignore,
    DrawStart(Point),
    DrawUpdate(Point),
    DrawEnd(Point),
    PlaceLabel(Point),
    SelectElement(ElementId),
    ShapeStart(ShapeKind, Point),
    ShapeUpdate(Point),
    ShapeEnd(Point),
    DragStart { id: ElementId, at: Point },
    DragUpdate(Point),
    DragEnd,
    RotateStart(ElementId),
    RotateUpdate(f64),
    RotateEnd,
    Deselect,
}

/// Classify `event` (already in canvas-local coordinates).
#[must_use]
pub fn route(event: InputEvent, ui: &UiState, input: &InputState, elements: &[ShapeElement]) -> Intent {
    match event {
        InputEvent::PointerDown { at } => match (input, ui.tool) {
            (InputState::Idle, Tool::Label) => Intent::PlaceLabel(at),
            (InputState::Idle, Tool::Path) => Intent::DrawStart(at),
            _ => Intent::Ignore,
        },
        InputEvent::PointerMove { at } => match input {
            InputState::Drawing => Intent::DrawUpdate(at),
            _ => Intent::Ignore,
        },
        InputEvent::PointerUp { at } => match input {
            InputState::Drawing => Intent::DrawEnd(at),
            _ => Intent::Ignore,
        },
        InputEvent::LongPress { at, held_ms } => {
            if held_ms < LONG_PRESS_MS || !matches!(input, InputState::Idle) {
                return Intent::Ignore;
            }
            hit::element_at(elements, at).map_or(Intent::Ignore, Intent::SelectElement)
        }
        InputEvent::PanBegin { at } => route_pan_begin(at, ui, input, elements),
        InputEvent::PanUpdate { at } => match input {
            InputState::Dragging { .. } => Intent::DragUpdate(at),
            InputState::DrawingShape { .. } => Intent::ShapeUpdate(at),
            _ => Intent::Ignore,
        },
        InputEvent::PanEnd { at } => match input {
            InputState::Dragging { .. } => Intent::DragEnd,
            InputState::DrawingShape { .. } => Intent::ShapeEnd(at),
            _ => Intent::Ignore,
        },
        InputEvent::RotateBegin => match (input, ui.edit_mode, ui.selected_id) {
            (InputState::Idle, true, Some(id)) => Intent::RotateStart(id),
            _ => Intent::Ignore,
        },
        InputEvent::RotateUpdate { angle } => match input {
            InputState::Rotating { .. } => Intent::RotateUpdate(angle),
            _ => Intent::Ignore,
        },
        InputEvent::RotateEnd => match input {
            InputState::Rotating { .. } => Intent::RotateEnd,
            _ => Intent::Ignore,
        },
        InputEvent::Tap { .. } => {
            if ui.edit_mode {
                Intent::Deselect
            } else {
                Intent::Ignore
            }
        }
    }
}

fn route_pan_begin(at: Point, ui: &UiState, input: &InputState, elements: &[ShapeElement]) -> Intent {
    if !matches!(input, InputState::Idle) {
        return Intent::Ignore;
    }
    if ui.edit_mode {
        // Only a pan that starts on the drag handle moves the element. The
        // rotate handle belongs to the rotation gesture.
        let Some(id) = ui.selected_id else {
            return Intent::Ignore;
        };
        let grabbed = elements
            .iter()
            .find(|e| e.id() == id)
            .and_then(transform::handles)
            .and_then(|h| hit::handle_at(&h, at));
        return match grabbed {
            Some(HandleKind::Drag) => Intent::DragStart { id, at },
            Some(HandleKind::Rotate) | None => Intent::Ignore,
        };
    }
    match ui.tool {
        Tool::Shape(kind) => Intent::ShapeStart(kind, at),
        Tool::Path | Tool::Label => Intent::Ignore,
    }
}
