//! Persistence adapter — load, save, and discard a page's canvas.
//!
//! DESIGN
//! ======
//! The adapter sits between a [`SketchEngine`] and the [`CanvasStore`]. A save
//! captures a snapshot image first, then either patches the page's active
//! record or inserts a new one. Saves for the same page are serialized with a
//! per-page async mutex: a second save waits for the first, so two racing
//! saves can never both decide to insert. A page's mutex is dropped from the
//! lock map once the last caller holding it is done.
//!
//! ERROR HANDLING
//! ==============
//! Snapshot failures are logged and the save continues without an image path.
//! Store failures are returned to the caller. The engine's in-memory document
//! is never rolled back on failure; the caller may simply save again.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{error, info, warn};
use uuid::Uuid;

use canvas::doc::{Label, PathSegment, ShapeElement};
use canvas::engine::SketchEngine;
use canvas::path::PathData;
use canvas::render::Scene;

use crate::services::canvas_record::{CanvasRecord, CanvasStore, PageId, RecordPatch, StoreError, UserId};
use crate::services::snapshot::SnapshotWriter;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("canvas store error: {0}")]
    Store(#[from] StoreError),
}

/// The persisted part of a canvas, independent of any record bookkeeping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanvasContent {
    pub paths: Vec<PathSegment>,
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub elements: Vec<ShapeElement>,
    /// In-progress stroke in wire form, or `""`.
    #[serde(default)]
    pub current_path: String,
}

impl CanvasContent {
    /// Copy the document out of `engine`.
    #[must_use]
    pub fn from_engine(engine: &SketchEngine) -> Self {
        Self {
            paths: engine.store.paths().to_vec(),
            labels: engine.store.labels().to_vec(),
            elements: engine.store.elements().to_vec(),
            current_path: engine.current_path(),
        }
    }

    /// Load this content into `engine`, replacing its document.
    pub fn load_into(self, engine: &mut SketchEngine) {
        let current = (!self.current_path.trim().is_empty()).then(|| PathData::from_wire(&self.current_path));
        engine.load(self.paths, self.labels, self.elements, current);
    }

    fn from_record(record: CanvasRecord) -> Self {
        Self {
            paths: record.paths,
            labels: record.labels,
            elements: record.elements,
            current_path: record.current_path,
        }
    }
}

/// Everything a save needs: the document and the scene to snapshot.
#[derive(Debug, Clone)]
pub struct SaveDraft {
    pub content: CanvasContent,
    pub scene: Scene,
}

impl SaveDraft {
    #[must_use]
    pub fn from_engine(engine: &SketchEngine) -> Self {
        Self { content: CanvasContent::from_engine(engine), scene: engine.scene() }
    }
}

/// What a save did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub record_id: Uuid,
    /// True when a new record was inserted, false when the active one was updated.
    pub inserted: bool,
    pub image_path: Option<PathBuf>,
}

// =============================================================================
// ADAPTER
// =============================================================================

pub struct PersistenceAdapter {
    store: Arc<dyn CanvasStore>,
    snapshots: SnapshotWriter,
    page_locks: Mutex<HashMap<PageId, Arc<Mutex<()>>>>,
}

impl PersistenceAdapter {
    #[must_use]
    pub fn new(store: Arc<dyn CanvasStore>, snapshots: SnapshotWriter) -> Self {
        Self { store, snapshots, page_locks: Mutex::new(HashMap::new()) }
    }

    #[must_use]
    pub fn snapshots(&self) -> &SnapshotWriter {
        &self.snapshots
    }

    /// Content of the page's active record, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store read or JSON decode fails.
    pub async fn load(&self, page_id: PageId) -> Result<Option<CanvasContent>, PersistenceError> {
        let record = self.store.get_active_by_page(page_id).await?;
        Ok(record.map(CanvasContent::from_record))
    }

    /// Save `draft` as the page's active canvas.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails. Snapshot failures are not
    /// errors; the outcome then carries no image path.
    pub async fn save(&self, page_id: PageId, user_id: UserId, draft: SaveDraft) -> Result<SaveOutcome, PersistenceError> {
        let lock = self.page_lock(page_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.save_locked(page_id, user_id, draft).await
        };
        drop(lock);
        self.release_page_lock(page_id).await;
        result
    }

    /// Soft-invalidate the page's active record so the next save starts fresh.
    /// Returns whether anything was deactivated.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub async fn discard(&self, page_id: PageId, user_id: UserId) -> Result<bool, PersistenceError> {
        let lock = self.page_lock(page_id).await;
        let result = {
            let _guard = lock.lock().await;
            self.store.deactivate_page(page_id, user_id).await
        };
        drop(lock);
        self.release_page_lock(page_id).await;
        let changed = result?;
        info!(page_id, user_id, changed, "canvas discarded");
        Ok(changed > 0)
    }

    async fn save_locked(&self, page_id: PageId, user_id: UserId, draft: SaveDraft) -> Result<SaveOutcome, PersistenceError> {
        let image_path = match self.snapshots.capture(draft.scene).await {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, page_id, "snapshot capture failed; saving without image");
                None
            }
        };
        let image_str = image_path.as_ref().map(|p| p.to_string_lossy().into_owned());

        let result = self.write(page_id, user_id, draft.content, image_str).await;
        match &result {
            Ok((record_id, inserted)) => {
                info!(page_id, user_id, %record_id, inserted, "canvas saved");
            }
            Err(e) => {
                error!(error = %e, page_id, user_id, "canvas save failed");
            }
        }
        let (record_id, inserted) = result?;
        Ok(SaveOutcome { record_id, inserted, image_path })
    }

    async fn write(
        &self,
        page_id: PageId,
        user_id: UserId,
        content: CanvasContent,
        canvas_image_path: Option<String>,
    ) -> Result<(Uuid, bool), StoreError> {
        if let Some(active) = self.store.get_active_by_page(page_id).await? {
            let patch = RecordPatch {
                paths: content.paths,
                labels: content.labels,
                elements: content.elements,
                current_path: content.current_path,
                canvas_image_path,
                modified_by: user_id,
                modified_date: OffsetDateTime::now_utc(),
            };
            self.store.update(active.id, patch).await?;
            return Ok((active.id, false));
        }

        let mut record = CanvasRecord::new(page_id, user_id);
        record.paths = content.paths;
        record.labels = content.labels;
        record.elements = content.elements;
        record.current_path = content.current_path;
        record.canvas_image_path = canvas_image_path;
        let id = record.id;
        self.store.insert(record).await?;
        Ok((id, true))
    }

    async fn page_lock(&self, page_id: PageId) -> Arc<Mutex<()>> {
        let mut locks = self.page_locks.lock().await;
        Arc::clone(locks.entry(page_id).or_default())
    }

    /// Forget the page's mutex when only the map still refers to it. Clones are
    /// handed out under the map lock, so a count of one means no waiters.
    async fn release_page_lock(&self, page_id: PageId) {
        let mut locks = self.page_locks.lock().await;
        if locks.get(&page_id).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(&page_id);
        }
    }
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
