//! Document model: committed strokes, floating labels, shape elements, and
//! the in-memory store that owns them.
//!
//! `SketchStore` is the single authority over what is on the canvas. Every
//! mutation builds a fresh collection and swaps it in, so a `SketchSnapshot`
//! handed to the renderer (or kept for undo) never changes underneath its
//! holder. Each mutation bumps `revision`.
//!
//! Element and label ids come from `IdGen`: creation time in milliseconds,
//! bumped when two ids would otherwise collide.

#[cfg(test)]
#[path = "doc_test.rs"]
mod doc_test;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::camera::Point;
use crate::path::{PathData, Polyline};

/// Identifier for a label or shape element.
pub type ElementId = i64;

/// A committed stroke with its measurement label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    /// Path data in `M x,y L x,y ...` form on the wire.
    pub path: PathData,
    /// User-supplied label; empty for freeform strokes.
    #[serde(default)]
    pub label: String,
}

impl PathSegment {
    #[must_use]
    pub fn new(line: Polyline, label: impl Into<String>) -> Self {
        Self { path: PathData::Polyline(line), label: label.into() }
    }
}

/// Floating text label placed in annotate mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// Rectangular pipe centred on `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipe {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Radians, clockwise about the center.
    pub rotation: f64,
}

impl Pipe {
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Dashed line between two stored endpoints, rotated about their midpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DottedLine {
    pub id: ElementId,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    /// Radians, clockwise about the midpoint.
    pub rotation: f64,
}

impl DottedLine {
    #[must_use]
    pub fn start(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    #[must_use]
    pub fn end(&self) -> Point {
        Point::new(self.x2, self.y2)
    }

    #[must_use]
    pub fn midpoint(&self) -> Point {
        self.start().midpoint(self.end())
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.start().distance(self.end())
    }

    /// Endpoints after applying `rotation` about the midpoint. This is the
    /// geometry that is drawn, hit-tested, and carries the handles.
    #[must_use]
    pub fn effective_endpoints(&self) -> (Point, Point) {
        let mid = self.midpoint();
        (
            self.start().rotate_about(mid, self.rotation),
            self.end().rotate_about(mid, self.rotation),
        )
    }
}

/// Which shape a shape tool draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShapeKind {
    Pipe,
    DottedLine,
}

/// A structured drawing primitive that supports selection, drag, and rotate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ShapeElement {
    #[serde(rename = "pipe")]
    Pipe(Pipe),
    #[serde(rename = "dottedLine")]
    DottedLine(DottedLine),
}

impl ShapeElement {
    #[must_use]
    pub fn id(&self) -> ElementId {
        match self {
            Self::Pipe(p) => p.id,
            Self::DottedLine(l) => l.id,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Pipe(_) => ShapeKind::Pipe,
            Self::DottedLine(_) => ShapeKind::DottedLine,
        }
    }

    #[must_use]
    pub fn rotation(&self) -> f64 {
        match self {
            Self::Pipe(p) => p.rotation,
            Self::DottedLine(l) => l.rotation,
        }
    }

    /// The point drags and rotations pivot around.
    #[must_use]
    pub fn center(&self) -> Point {
        match self {
            Self::Pipe(p) => p.center(),
            Self::DottedLine(l) => l.midpoint(),
        }
    }
}

/// Hands out creation-time ids that never repeat within one store.
#[derive(Debug, Clone, Default)]
pub struct IdGen {
    last: ElementId,
}

impl IdGen {
    /// Next id based on the wall clock.
    pub fn next_id(&mut self) -> ElementId {
        self.next_at(now_ms())
    }

    /// Next id given the current time in milliseconds.
    pub fn next_at(&mut self, now_ms: ElementId) -> ElementId {
        let id = now_ms.max(self.last + 1);
        self.last = id;
        id
    }

    /// Make sure future ids land above `id` (used after loading saved data).
    pub fn observe(&mut self, id: ElementId) {
        self.last = self.last.max(id);
    }
}

fn now_ms() -> ElementId {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| ElementId::try_from(d.as_millis()).unwrap_or(ElementId::MAX))
}

/// Read-only view of the store at one revision.
#[derive(Debug, Clone, Default)]
pub struct SketchSnapshot {
    pub paths: Arc<Vec<PathSegment>>,
    pub labels: Arc<Vec<Label>>,
    pub elements: Arc<Vec<ShapeElement>>,
    pub current_path: Option<Polyline>,
    pub revision: u64,
}

/// In-memory store of everything drawn on one canvas page.
#[derive(Debug, Clone, Default)]
pub struct SketchStore {
    paths: Arc<Vec<PathSegment>>,
    labels: Arc<Vec<Label>>,
    elements: Arc<Vec<ShapeElement>>,
    current_path: Option<Polyline>,
    revision: u64,
}

impl SketchStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Paths ---

    /// Commit a stroke. Zero-length strokes are refused.
    pub fn append_path(&mut self, segment: PathSegment) -> bool {
        if segment.path.polyline().is_some_and(Polyline::is_zero_length) {
            return false;
        }
        self.paths = replaced(&self.paths, |v| v.push(segment));
        self.bump();
        true
    }

    /// Erase the most recently committed stroke.
    pub fn remove_last_path(&mut self) -> Option<PathSegment> {
        let last = self.paths.last().cloned()?;
        self.paths = replaced(&self.paths, |v| {
            v.pop();
        });
        self.bump();
        Some(last)
    }

    /// Change the label of the stroke at `index`. Returns false when out of range.
    pub fn update_path_label(&mut self, index: usize, text: impl Into<String>) -> bool {
        if index >= self.paths.len() {
            return false;
        }
        let text = text.into();
        self.paths = replaced(&self.paths, |v| v[index].label = text);
        self.bump();
        true
    }

    // --- In-progress stroke ---

    pub fn set_current_path(&mut self, line: Option<Polyline>) {
        self.current_path = line;
        self.bump();
    }

    /// Remove and return the in-progress stroke.
    pub fn take_current_path(&mut self) -> Option<Polyline> {
        let line = self.current_path.take();
        if line.is_some() {
            self.bump();
        }
        line
    }

    // --- Labels ---

    pub fn append_label(&mut self, label: Label) {
        self.labels = replaced(&self.labels, |v| v.push(label));
        self.bump();
    }

    pub fn remove_last_label(&mut self) -> Option<Label> {
        let last = self.labels.last().cloned()?;
        self.labels = replaced(&self.labels, |v| {
            v.pop();
        });
        self.bump();
        Some(last)
    }

    /// Replace a label's text. Returns false when no label has `id`.
    pub fn update_label_text(&mut self, id: ElementId, text: impl Into<String>) -> bool {
        let Some(index) = self.labels.iter().position(|l| l.id == id) else {
            return false;
        };
        let text = text.into();
        self.labels = replaced(&self.labels, |v| v[index].text = text);
        self.bump();
        true
    }

    // --- Shape elements ---

    pub fn append_element(&mut self, element: ShapeElement) {
        self.elements = replaced(&self.elements, |v| v.push(element));
        self.bump();
    }

    /// Replace the element with the same id as `element`, whole. Returns
    /// false when no such element exists.
    pub fn update_element(&mut self, element: ShapeElement) -> bool {
        let id = element.id();
        let Some(index) = self.elements.iter().position(|e| e.id() == id) else {
            return false;
        };
        self.elements = replaced(&self.elements, |v| v[index] = element);
        self.bump();
        true
    }

    // --- Bulk ---

    /// Drop every stroke, label, element, and the in-progress stroke.
    pub fn clear_all(&mut self) {
        self.paths = Arc::new(Vec::new());
        self.labels = Arc::new(Vec::new());
        self.elements = Arc::new(Vec::new());
        self.current_path = None;
        self.bump();
    }

    /// Replace the whole document with loaded data.
    pub fn load(&mut self, paths: Vec<PathSegment>, labels: Vec<Label>, elements: Vec<ShapeElement>) {
        self.paths = Arc::new(paths);
        self.labels = Arc::new(labels);
        self.elements = Arc::new(elements);
        self.current_path = None;
        self.bump();
    }

    // --- Queries ---

    #[must_use]
    pub fn paths(&self) -> &[PathSegment] {
        &self.paths
    }

    #[must_use]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    #[must_use]
    pub fn elements(&self) -> &[ShapeElement] {
        &self.elements
    }

    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&ShapeElement> {
        self.elements.iter().find(|e| e.id() == id)
    }

    #[must_use]
    pub fn current_path(&self) -> Option<&Polyline> {
        self.current_path.as_ref()
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Cheap shared view for rendering and persistence.
    #[must_use]
    pub fn snapshot(&self) -> SketchSnapshot {
        SketchSnapshot {
            paths: Arc::clone(&self.paths),
            labels: Arc::clone(&self.labels),
            elements: Arc::clone(&self.elements),
            current_path: self.current_path.clone(),
            revision: self.revision,
        }
    }

    fn bump(&mut self) {
        self.revision += 1;
    }
}

/// Copy `current`, apply `edit`, and return the new collection.
fn replaced<T: Clone>(current: &Arc<Vec<T>>, edit: impl FnOnce(&mut Vec<T>)) -> Arc<Vec<T>> {
    let mut next = current.as_ref().clone();
    edit(&mut next);
    Arc::new(next)
}
