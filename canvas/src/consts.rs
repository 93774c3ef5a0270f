//! Shared numeric constants for the canvas crate.

// ── Snapping ────────────────────────────────────────────────────

/// Maximum distance (exclusive) at which a new stroke snaps to an existing endpoint.
pub const SNAP_RADIUS: f64 = 20.0;

// ── Shapes ──────────────────────────────────────────────────────

/// Dotted lines whose endpoints are this close or closer are never committed.
pub const MIN_DOTTED_LINE_LENGTH: f64 = 10.0;

/// Thickness of a freshly drawn pipe.
pub const PIPE_THICKNESS: f64 = 20.0;

/// Hit slop around a dotted line body for long-press selection.
pub const LINE_HIT_SLOP: f64 = 10.0;

// ── Handles ─────────────────────────────────────────────────────

/// Offset of each manipulation handle from the geometry it is attached to.
pub const HANDLE_OFFSET: f64 = 20.0;

/// A pan starting within this distance of a handle grabs that handle.
pub const HANDLE_GRAB_RADIUS: f64 = 20.0;

// ── Gestures ────────────────────────────────────────────────────

/// Minimum hold time for a long-press to enter edit mode.
pub const LONG_PRESS_MS: u64 = 800;

// ── Labels ──────────────────────────────────────────────────────

/// Text given to a freshly placed label.
pub const DEFAULT_LABEL_TEXT: &str = "Edit me";
