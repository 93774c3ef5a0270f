//! The sketch engine: owns the store and UI state, applies routed intents.
//!
//! The host feeds [`Command`]s (raw input events plus toolbar/dialog
//! commands) to [`SketchEngine::handle`] and gets back [`Action`]s to react
//! to: persist, prompt, redraw. Errors never reach the host; they are logged
//! and the store keeps whatever it had before the failing step. Only a failed
//! input event drops the gesture back to idle. A rejected toolbar or dialog
//! command leaves the gesture in flight untouched.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::camera::{Camera, Point};
use crate::consts::DEFAULT_LABEL_TEXT;
use crate::doc::{ElementId, IdGen, Label, PathSegment, ShapeElement, ShapeKind, SketchStore};
use crate::input::{self, DrawStyle, InputEvent, InputState, Intent, Tool, UiState};
use crate::path::{PathData, Polyline};
use crate::render::Scene;
use crate::snap;
use crate::transform::{self, Handles};

/// Why a gesture step could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GestureError {
    #[error("no stroke in progress")]
    NoStroke,
    #[error("no stroke is waiting for a label")]
    NoPendingLabel,
    #[error("element {0} not found")]
    MissingElement(ElementId),
    #[error("label {0} not found")]
    MissingLabel(ElementId),
    #[error("no path at index {0}")]
    MissingPath(usize),
    #[error("gesture state does not match intent")]
    StateMismatch,
    #[error("camera needs finite pan and a positive zoom")]
    InvalidCamera,
}

/// Everything the host can ask of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    /// A raw event in screen coordinates.
    Input(InputEvent),
    SetTool(Tool),
    SetDrawStyle(DrawStyle),
    SetCamera(Camera),
    /// Answer to a label prompt; `None` commits the stroke unlabeled.
    SubmitLabel(Option<String>),
    EditLabel { id: ElementId, text: String },
    FinishLabelEdit,
    EditPathLabel { index: usize, text: String },
    EraseLastPath,
    RemoveLastLabel,
    ClearAll,
}

/// Actions returned for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    PathCommitted(PathSegment),
    LabelPromptRequested,
    LabelPlaced(Label),
    LabelEditRequested { id: ElementId },
    ElementCreated(ShapeElement),
    ElementUpdated { element: ShapeElement, handles: Option<Handles> },
    SelectionChanged(Option<ElementId>),
    EditModeChanged(bool),
    RenderNeeded,
}

/// Engine state: document, camera, mode, and the gesture in flight.
#[derive(Debug, Default)]
pub struct SketchEngine {
    pub store: SketchStore,
    pub camera: Camera,
    pub ui: UiState,
    pub input: InputState,
    ids: IdGen,
}

impl SketchEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Replace the document with saved data and reset all gesture state.
    pub fn load(
        &mut self,
        paths: Vec<PathSegment>,
        labels: Vec<Label>,
        elements: Vec<ShapeElement>,
        current_path: Option<PathData>,
    ) {
        for id in labels.iter().map(|l| l.id).chain(elements.iter().map(ShapeElement::id)) {
            self.ids.observe(id);
        }
        self.store.load(paths, labels, elements);
        if let Some(PathData::Polyline(line)) = current_path {
            self.store.set_current_path(Some(line));
        }
        self.input = InputState::Idle;
        self.ui.edit_mode = false;
        self.ui.selected_id = None;
    }

    // --- Dispatch ---

    /// Apply one command. Failures are logged and yield no actions.
    pub fn handle(&mut self, command: Command) -> Vec<Action> {
        let from_input = matches!(command, Command::Input(_));
        match self.try_handle(command) {
            Ok(actions) => actions,
            Err(e) if from_input => {
                warn!(error = %e, state = ?self.input, "gesture aborted");
                self.abort_gesture();
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, state = ?self.input, "command rejected");
                Vec::new()
            }
        }
    }

    fn try_handle(&mut self, command: Command) -> Result<Vec<Action>, GestureError> {
        match command {
            Command::Input(event) => self.on_input(event),
            Command::SetTool(tool) => {
                self.set_tool(tool);
                Ok(vec![Action::RenderNeeded])
            }
            Command::SetDrawStyle(style) => {
                self.ui.draw_style = style;
                Ok(Vec::new())
            }
            Command::SetCamera(camera) => {
                if !camera.is_valid() {
                    return Err(GestureError::InvalidCamera);
                }
                self.camera = camera;
                Ok(vec![Action::RenderNeeded])
            }
            Command::SubmitLabel(text) => self.submit_label(text),
            Command::EditLabel { id, text } => {
                if !self.store.update_label_text(id, text) {
                    return Err(GestureError::MissingLabel(id));
                }
                Ok(vec![Action::RenderNeeded])
            }
            Command::FinishLabelEdit => {
                if matches!(self.input, InputState::LabelEditing { .. }) {
                    self.input = InputState::Idle;
                }
                Ok(Vec::new())
            }
            Command::EditPathLabel { index, text } => {
                if !self.store.update_path_label(index, text) {
                    return Err(GestureError::MissingPath(index));
                }
                Ok(vec![Action::RenderNeeded])
            }
            Command::EraseLastPath => Ok(self.store.remove_last_path().map_or_else(Vec::new, |_| vec![Action::RenderNeeded])),
            Command::RemoveLastLabel => Ok(self.remove_last_label()),
            Command::ClearAll => {
                self.clear_all();
                Ok(vec![Action::SelectionChanged(None), Action::EditModeChanged(false), Action::RenderNeeded])
            }
        }
    }

    fn on_input(&mut self, event: InputEvent) -> Result<Vec<Action>, GestureError> {
        let camera = self.camera;
        let event = event.map_point(|p| camera.screen_to_canvas(p));
        let intent = input::route(event, &self.ui, &self.input, self.store.elements());
        debug!(?event, ?intent, "routed input");
        self.apply(intent)
    }

    fn apply(&mut self, intent: Intent) -> Result<Vec<Action>, GestureError> {
        match intent {
            Intent::Ignore => Ok(Vec::new()),
            Intent::DrawStart(at) => Ok(self.draw_start(at)),
            Intent::DrawUpdate(at) => self.draw_update(at),
            Intent::DrawEnd(at) => self.draw_end(at),
            Intent::PlaceLabel(at) => Ok(self.place_label(at)),
            Intent::SelectElement(id) => Ok(self.select(id)),
            Intent::Deselect => Ok(self.deselect()),
            Intent::ShapeStart(kind, at) => Ok(self.shape_start(kind, at)),
            Intent::ShapeUpdate(at) => self.shape_update(at),
            Intent::ShapeEnd(at) => self.shape_end(at),
            Intent::DragStart { id, at } => self.drag_start(id, at),
            Intent::DragUpdate(at) => self.drag_update(at),
            Intent::RotateStart(id) => self.rotate_start(id),
            Intent::RotateUpdate(angle) => self.rotate_update(angle),
            Intent::DragEnd | Intent::RotateEnd => {
                self.input = InputState::Idle;
                Ok(Vec::new())
            }
        }
    }

    // --- Strokes ---

    fn draw_start(&mut self, at: Point) -> Vec<Action> {
        let start = snap::snap_or_raw(self.store.paths(), at);
        self.store.set_current_path(Some(Polyline::new(start)));
        self.input = InputState::Drawing;
        vec![Action::RenderNeeded]
    }

    fn draw_update(&mut self, at: Point) -> Result<Vec<Action>, GestureError> {
        let mut line = self.store.current_path().cloned().ok_or(GestureError::NoStroke)?;
        self.extend(&mut line, at);
        self.store.set_current_path(Some(line));
        Ok(vec![Action::RenderNeeded])
    }

    fn draw_end(&mut self, at: Point) -> Result<Vec<Action>, GestureError> {
        self.input = InputState::Idle;
        let mut line = self.store.take_current_path().ok_or(GestureError::NoStroke)?;
        if line.end() != at {
            self.extend(&mut line, at);
        }
        if line.is_zero_length() {
            debug!("discarding zero-length stroke");
            return Ok(vec![Action::RenderNeeded]);
        }
        if let Some(snapped) = snap::find_closest_endpoint(self.store.paths(), line.end()) {
            line.replace_end(snapped);
        }
        match self.ui.draw_style {
            DrawStyle::Freeform => {
                let segment = PathSegment::new(line, String::new());
                self.store.append_path(segment.clone());
                Ok(vec![Action::PathCommitted(segment), Action::RenderNeeded])
            }
            DrawStyle::Straight => {
                self.input = InputState::AwaitingLabel { segment: line };
                Ok(vec![Action::LabelPromptRequested, Action::RenderNeeded])
            }
        }
    }

    fn extend(&self, line: &mut Polyline, at: Point) {
        match self.ui.draw_style {
            DrawStyle::Freeform => line.push(at),
            DrawStyle::Straight => line.set_straight_end(at),
        }
    }

    fn submit_label(&mut self, text: Option<String>) -> Result<Vec<Action>, GestureError> {
        if !matches!(self.input, InputState::AwaitingLabel { .. }) {
            return Err(GestureError::NoPendingLabel);
        }
        let InputState::AwaitingLabel { segment } = std::mem::take(&mut self.input) else {
            return Err(GestureError::StateMismatch);
        };
        let segment = PathSegment::new(segment, text.unwrap_or_default());
        self.store.append_path(segment.clone());
        Ok(vec![Action::PathCommitted(segment), Action::RenderNeeded])
    }

    // --- Labels ---

    fn place_label(&mut self, at: Point) -> Vec<Action> {
        let label = Label { id: self.ids.next_id(), x: at.x, y: at.y, text: DEFAULT_LABEL_TEXT.to_string() };
        let id = label.id;
        self.store.append_label(label.clone());
        self.input = InputState::LabelEditing { id };
        vec![Action::LabelPlaced(label), Action::LabelEditRequested { id }, Action::RenderNeeded]
    }

    fn remove_last_label(&mut self) -> Vec<Action> {
        let Some(removed) = self.store.remove_last_label() else {
            return Vec::new();
        };
        if matches!(self.input, InputState::LabelEditing { id } if id == removed.id) {
            self.input = InputState::Idle;
        }
        vec![Action::RenderNeeded]
    }

    // --- Selection ---

    fn select(&mut self, id: ElementId) -> Vec<Action> {
        let mut actions = Vec::new();
        if !self.ui.edit_mode {
            self.ui.edit_mode = true;
            actions.push(Action::EditModeChanged(true));
        }
        self.ui.selected_id = Some(id);
        actions.push(Action::SelectionChanged(Some(id)));
        actions.push(Action::RenderNeeded);
        actions
    }

    fn deselect(&mut self) -> Vec<Action> {
        self.ui.edit_mode = false;
        self.ui.selected_id = None;
        self.input = InputState::Idle;
        vec![Action::EditModeChanged(false), Action::SelectionChanged(None), Action::RenderNeeded]
    }

    // --- Shapes ---

    fn shape_start(&mut self, kind: ShapeKind, at: Point) -> Vec<Action> {
        let provisional = transform::provisional_shape(kind, self.ids.next_id(), at, at);
        self.input = InputState::DrawingShape { anchor: at, provisional };
        vec![Action::RenderNeeded]
    }

    fn shape_update(&mut self, at: Point) -> Result<Vec<Action>, GestureError> {
        let InputState::DrawingShape { anchor, provisional } = &self.input else {
            return Err(GestureError::StateMismatch);
        };
        let anchor = *anchor;
        let next = transform::provisional_shape(provisional.kind(), provisional.id(), anchor, at);
        self.input = InputState::DrawingShape { anchor, provisional: next };
        Ok(vec![Action::RenderNeeded])
    }

    fn shape_end(&mut self, at: Point) -> Result<Vec<Action>, GestureError> {
        let InputState::DrawingShape { anchor, provisional } = std::mem::take(&mut self.input) else {
            return Err(GestureError::StateMismatch);
        };
        let shape = transform::provisional_shape(provisional.kind(), provisional.id(), anchor, at);
        if !transform::meets_minimum_size(&shape) {
            debug!(?shape, "discarding undersized shape");
            return Ok(vec![Action::RenderNeeded]);
        }
        self.store.append_element(shape.clone());
        Ok(vec![Action::ElementCreated(shape), Action::RenderNeeded])
    }

    // --- Transforms ---

    fn drag_start(&mut self, id: ElementId, at: Point) -> Result<Vec<Action>, GestureError> {
        let element = self.store.element(id).ok_or(GestureError::MissingElement(id))?;
        let offset = transform::grab_offset(element, at);
        self.input = InputState::Dragging { id, offset };
        Ok(Vec::new())
    }

    fn drag_update(&mut self, at: Point) -> Result<Vec<Action>, GestureError> {
        let InputState::Dragging { id, offset } = self.input else {
            return Err(GestureError::StateMismatch);
        };
        let element = self.store.element(id).ok_or(GestureError::MissingElement(id))?;
        let moved = transform::drag_to(element, at, offset);
        Ok(self.commit_transform(moved))
    }

    fn rotate_start(&mut self, id: ElementId) -> Result<Vec<Action>, GestureError> {
        self.store.element(id).ok_or(GestureError::MissingElement(id))?;
        self.input = InputState::Rotating { id, last_angle: 0.0 };
        Ok(Vec::new())
    }

    fn rotate_update(&mut self, angle: f64) -> Result<Vec<Action>, GestureError> {
        let InputState::Rotating { id, last_angle } = self.input else {
            return Err(GestureError::StateMismatch);
        };
        let element = self.store.element(id).ok_or(GestureError::MissingElement(id))?;
        let rotated = transform::rotate_by(element, angle - last_angle);
        self.input = InputState::Rotating { id, last_angle: angle };
        Ok(self.commit_transform(rotated))
    }

    fn commit_transform(&mut self, t: transform::Transformed) -> Vec<Action> {
        self.store.update_element(t.element.clone());
        vec![Action::ElementUpdated { element: t.element, handles: t.handles }, Action::RenderNeeded]
    }

    // --- Mode ---

    fn set_tool(&mut self, tool: Tool) {
        if tool != Tool::Label && matches!(self.input, InputState::LabelEditing { .. }) {
            self.input = InputState::Idle;
        }
        self.ui.tool = tool;
    }

    /// Reset the document and every mode flag except the draw style.
    pub fn clear_all(&mut self) {
        self.store.clear_all();
        self.input = InputState::Idle;
        self.ui = UiState { tool: reset_tool(self.ui.tool), draw_style: self.ui.draw_style, ..UiState::default() };
    }

    fn abort_gesture(&mut self) {
        if matches!(self.input, InputState::Drawing) {
            self.store.set_current_path(None);
        }
        self.input = InputState::Idle;
    }

    // --- Queries ---

    /// The in-progress stroke in wire form, or `""`.
    #[must_use]
    pub fn current_path(&self) -> String {
        self.store.current_path().map(ToString::to_string).unwrap_or_default()
    }

    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.ui.selected_id
    }

    #[must_use]
    pub fn edit_mode(&self) -> bool {
        self.ui.edit_mode
    }

    /// Handles of the selected element, derived on every call.
    #[must_use]
    pub fn handles(&self) -> Option<Handles> {
        self.ui.selected_id.and_then(|id| self.store.element(id)).and_then(transform::handles)
    }

    /// The shape being drawn by an active pan, if any.
    #[must_use]
    pub fn provisional_shape(&self) -> Option<&ShapeElement> {
        match &self.input {
            InputState::DrawingShape { provisional, .. } => Some(provisional),
            _ => None,
        }
    }

    /// The straight stroke waiting for its label, if any.
    #[must_use]
    pub fn pending_label_path(&self) -> Option<&Polyline> {
        match &self.input {
            InputState::AwaitingLabel { segment } => Some(segment),
            _ => None,
        }
    }

    /// Everything the renderer needs for one frame.
    #[must_use]
    pub fn scene(&self) -> Scene {
        Scene {
            snapshot: self.store.snapshot(),
            selected_id: self.ui.selected_id,
            provisional: self.provisional_shape().cloned(),
        }
    }
}

/// Annotate mode is a mode flag and does not survive a clear; drawing tools do.
fn reset_tool(tool: Tool) -> Tool {
    match tool {
        Tool::Label => Tool::Path,
        other => other,
    }
}
