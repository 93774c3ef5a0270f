//! Snapshot service — renders a scene to PNG and files it under storage.
//!
//! DESIGN
//! ======
//! Rasterizing and encoding are CPU-bound, so they run on the blocking pool.
//! The image is written to a temporary file inside
//! `<storage>/canvasImages/` and then renamed to `canvas_<timestamp>.png` in
//! the same directory, so a half-written file is never visible at the final
//! path. The rename never replaces an existing snapshot; a taken name moves
//! on to the next `_<n>` suffix.

use std::path::{Path, PathBuf};

use canvas::render::{self, RenderOptions, Scene};
use time::OffsetDateTime;
use tracing::debug;

pub const IMAGES_DIR: &str = "canvasImages";

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("render failed: {0}")]
    Render(#[from] image::ImageError),
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Writes scene snapshots into a storage directory.
#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    storage_dir: PathBuf,
    options: RenderOptions,
}

impl SnapshotWriter {
    #[must_use]
    pub fn new(storage_dir: impl Into<PathBuf>, options: RenderOptions) -> Self {
        Self { storage_dir: storage_dir.into(), options }
    }

    /// Directory final snapshots are moved into.
    #[must_use]
    pub fn images_dir(&self) -> PathBuf {
        self.storage_dir.join(IMAGES_DIR)
    }

    /// Render `scene` and store it; returns the final path.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering, the temp write, or the move fails.
    pub async fn capture(&self, scene: Scene) -> Result<PathBuf, SnapshotError> {
        let options = self.options;
        let images_dir = self.images_dir();
        let path = tokio::task::spawn_blocking(move || capture_blocking(&scene, &options, &images_dir)).await??;
        debug!(path = %path.display(), "snapshot stored");
        Ok(path)
    }

    /// Render `scene` straight to `out`.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or the write fails.
    pub async fn render_to(&self, scene: Scene, out: PathBuf) -> Result<(), SnapshotError> {
        let options = self.options;
        tokio::task::spawn_blocking(move || render::save_png(&scene, &options, &out)).await??;
        Ok(())
    }
}

fn capture_blocking(scene: &Scene, options: &RenderOptions, images_dir: &Path) -> Result<PathBuf, SnapshotError> {
    std::fs::create_dir_all(images_dir)?;
    let mut temp = tempfile::Builder::new().prefix(".pending_").suffix(".png").tempfile_in(images_dir)?;
    render::save_png(scene, options, temp.path())?;

    let ms = now_ms();
    loop {
        let dest = unique_destination(images_dir, ms);
        match temp.persist_noclobber(&dest) {
            Ok(_) => return Ok(dest),
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => {
                debug!(path = %dest.display(), "snapshot name taken; retrying");
                temp = e.file;
            }
            Err(e) => return Err(e.error.into()),
        }
    }
}

/// `canvas_<ms>.png`, or `canvas_<ms>_<n>.png` if that name is taken.
fn unique_destination(dir: &Path, ms: i128) -> PathBuf {
    let first = dir.join(format!("canvas_{ms}.png"));
    if !first.exists() {
        return first;
    }
    let mut n = 1u32;
    loop {
        let candidate = dir.join(format!("canvas_{ms}_{n}.png"));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

fn now_ms() -> i128 {
    OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod tests;
