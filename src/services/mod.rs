//! Domain services used by the command-line host.
//!
//! ARCHITECTURE
//! ============
//! `canvas_record` is the object-store seam (SQLite or in-memory).
//! `snapshot` turns a scene into a stored PNG. `persistence` combines the two
//! into load/save/discard keyed by page, which is all the CLI talks to.

pub mod canvas_record;
pub mod persistence;
pub mod snapshot;
