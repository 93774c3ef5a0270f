//! Canvas record store — the object store behind the persistence adapter.
//!
//! DESIGN
//! ======
//! A canvas record is one saved version of a page's drawing. At most one
//! record per page is active; superseded records are soft-invalidated
//! (`is_active = false`) and never deleted. The store exposes exactly the
//! operations the adapter needs: fetch the active record, insert, patch by id,
//! and deactivate a page.
//!
//! `CanvasStore` is an async trait so the adapter can run against SQLite in
//! production and against [`MemoryCanvasStore`] in tests.
//!
//! ERROR HANDLING
//! ==============
//! Paths, labels, and elements are stored as JSON text. A row whose JSON does
//! not decode is an error for that load, not a silent empty canvas.

use sqlx::SqlitePool;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use canvas::doc::{Label, PathSegment, ShapeElement};

pub type PageId = i64;
pub type UserId = i64;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("canvas record not found: {0}")]
    NotFound(Uuid),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("canvas JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One saved version of a page's canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasRecord {
    pub id: Uuid,
    pub page_id: PageId,
    pub paths: Vec<PathSegment>,
    pub labels: Vec<Label>,
    pub elements: Vec<ShapeElement>,
    /// In-progress stroke at save time in wire form, or `""`.
    pub current_path: String,
    pub canvas_image_path: Option<String>,
    pub created_by: UserId,
    pub created_date: OffsetDateTime,
    pub modified_by: Option<UserId>,
    pub modified_date: Option<OffsetDateTime>,
    pub is_active: bool,
}

impl CanvasRecord {
    /// A fresh active record for `page_id`, created now by `user_id`.
    #[must_use]
    pub fn new(page_id: PageId, user_id: UserId) -> Self {
        Self {
            id: Uuid::new_v4(),
            page_id,
            paths: Vec::new(),
            labels: Vec::new(),
            elements: Vec::new(),
            current_path: String::new(),
            canvas_image_path: None,
            created_by: user_id,
            created_date: OffsetDateTime::now_utc(),
            modified_by: None,
            modified_date: None,
            is_active: true,
        }
    }

    /// Apply `patch` in place.
    pub fn apply(&mut self, patch: RecordPatch) {
        self.paths = patch.paths;
        self.labels = patch.labels;
        self.elements = patch.elements;
        self.current_path = patch.current_path;
        self.canvas_image_path = patch.canvas_image_path;
        self.modified_by = Some(patch.modified_by);
        self.modified_date = Some(patch.modified_date);
    }
}

/// Fields rewritten when an active record is saved again.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPatch {
    pub paths: Vec<PathSegment>,
    pub labels: Vec<Label>,
    pub elements: Vec<ShapeElement>,
    pub current_path: String,
    pub canvas_image_path: Option<String>,
    pub modified_by: UserId,
    pub modified_date: OffsetDateTime,
}

/// Object-store operations used by the persistence adapter.
#[async_trait::async_trait]
pub trait CanvasStore: Send + Sync {
    /// Most recent active record for `page_id`.
    async fn get_active_by_page(&self, page_id: PageId) -> Result<Option<CanvasRecord>, StoreError>;

    /// Store `record` as the page's active record. Any record still active for
    /// the same page is deactivated first.
    async fn insert(&self, record: CanvasRecord) -> Result<(), StoreError>;

    /// Patch the record with `id`.
    async fn update(&self, id: Uuid, patch: RecordPatch) -> Result<(), StoreError>;

    /// Deactivate every active record of `page_id`. Returns how many changed.
    async fn deactivate_page(&self, page_id: PageId, user_id: UserId) -> Result<u64, StoreError>;
}

// =============================================================================
// SQLITE
// =============================================================================

const SELECT_COLUMNS: &str = "SELECT id, page_id, paths, labels, elements, current_path, canvas_image_path, \
     created_by, created_date, modified_by, modified_date, is_active FROM canvas_records";

#[derive(sqlx::FromRow)]
struct CanvasRow {
    id: Uuid,
    page_id: i64,
    paths: String,
    labels: String,
    elements: String,
    current_path: String,
    canvas_image_path: Option<String>,
    created_by: i64,
    created_date: OffsetDateTime,
    modified_by: Option<i64>,
    modified_date: Option<OffsetDateTime>,
    is_active: bool,
}

impl TryFrom<CanvasRow> for CanvasRecord {
    type Error = serde_json::Error;

    fn try_from(row: CanvasRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            page_id: row.page_id,
            paths: serde_json::from_str(&row.paths)?,
            labels: serde_json::from_str(&row.labels)?,
            elements: serde_json::from_str(&row.elements)?,
            current_path: row.current_path,
            canvas_image_path: row.canvas_image_path,
            created_by: row.created_by,
            created_date: row.created_date,
            modified_by: row.modified_by,
            modified_date: row.modified_date,
            is_active: row.is_active,
        })
    }
}

/// [`CanvasStore`] over the `canvas_records` table.
#[derive(Clone)]
pub struct SqliteCanvasStore {
    pool: SqlitePool,
}

impl SqliteCanvasStore {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CanvasStore for SqliteCanvasStore {
    async fn get_active_by_page(&self, page_id: PageId) -> Result<Option<CanvasRecord>, StoreError> {
        let sql = format!("{SELECT_COLUMNS} WHERE page_id = ?1 AND is_active = 1 ORDER BY created_date DESC, rowid DESC LIMIT 1");
        let row = sqlx::query_as::<_, CanvasRow>(&sql)
            .bind(page_id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(CanvasRecord::try_from).transpose().map_err(StoreError::from)
    }

    async fn insert(&self, record: CanvasRecord) -> Result<(), StoreError> {
        let paths = serde_json::to_string(&record.paths)?;
        let labels = serde_json::to_string(&record.labels)?;
        let elements = serde_json::to_string(&record.elements)?;

        let mut tx = self.pool.begin().await?;
        let stale = sqlx::query(
            "UPDATE canvas_records SET is_active = 0, modified_by = ?1, modified_date = ?2 \
             WHERE page_id = ?3 AND is_active = 1",
        )
        .bind(record.created_by)
        .bind(record.created_date)
        .bind(record.page_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        if stale > 0 {
            debug!(page_id = record.page_id, stale, "deactivated stray active records");
        }

        sqlx::query(
            "INSERT INTO canvas_records \
             (id, page_id, paths, labels, elements, current_path, canvas_image_path, \
              created_by, created_date, modified_by, modified_date, is_active) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        )
        .bind(record.id)
        .bind(record.page_id)
        .bind(paths)
        .bind(labels)
        .bind(elements)
        .bind(&record.current_path)
        .bind(&record.canvas_image_path)
        .bind(record.created_by)
        .bind(record.created_date)
        .bind(record.modified_by)
        .bind(record.modified_date)
        .bind(record.is_active)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn update(&self, id: Uuid, patch: RecordPatch) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE canvas_records SET paths = ?1, labels = ?2, elements = ?3, current_path = ?4, \
             canvas_image_path = ?5, modified_by = ?6, modified_date = ?7 WHERE id = ?8",
        )
        .bind(serde_json::to_string(&patch.paths)?)
        .bind(serde_json::to_string(&patch.labels)?)
        .bind(serde_json::to_string(&patch.elements)?)
        .bind(&patch.current_path)
        .bind(&patch.canvas_image_path)
        .bind(patch.modified_by)
        .bind(patch.modified_date)
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    async fn deactivate_page(&self, page_id: PageId, user_id: UserId) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE canvas_records SET is_active = 0, modified_by = ?1, modified_date = ?2 \
             WHERE page_id = ?3 AND is_active = 1",
        )
        .bind(user_id)
        .bind(OffsetDateTime::now_utc())
        .bind(page_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}

// =============================================================================
// IN-MEMORY
// =============================================================================

/// [`CanvasStore`] kept in process memory. Records are never removed.
#[derive(Default)]
pub struct MemoryCanvasStore {
    records: RwLock<Vec<CanvasRecord>>,
}

impl MemoryCanvasStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record ever stored, active or not, in insertion order.
    pub async fn records(&self) -> Vec<CanvasRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait::async_trait]
impl CanvasStore for MemoryCanvasStore {
    async fn get_active_by_page(&self, page_id: PageId) -> Result<Option<CanvasRecord>, StoreError> {
        let records = self.records.read().await;
        Ok(records.iter().rev().find(|r| r.page_id == page_id && r.is_active).cloned())
    }

    async fn insert(&self, record: CanvasRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        for stale in records.iter_mut().filter(|r| r.page_id == record.page_id && r.is_active) {
            stale.is_active = false;
            stale.modified_by = Some(record.created_by);
            stale.modified_date = Some(record.created_date);
        }
        records.push(record);
        Ok(())
    }

    async fn update(&self, id: Uuid, patch: RecordPatch) -> Result<(), StoreError> {
        let mut records = self.records.write().await;
        let record = records.iter_mut().find(|r| r.id == id).ok_or(StoreError::NotFound(id))?;
        record.apply(patch);
        Ok(())
    }

    async fn deactivate_page(&self, page_id: PageId, user_id: UserId) -> Result<u64, StoreError> {
        let now = OffsetDateTime::now_utc();
        let mut records = self.records.write().await;
        let mut changed = 0;
        for record in records.iter_mut().filter(|r| r.page_id == page_id && r.is_active) {
            record.is_active = false;
            record.modified_by = Some(user_id);
            record.modified_date = Some(now);
            changed += 1;
        }
        Ok(changed)
    }
}

#[cfg(test)]
#[path = "canvas_record_test.rs"]
mod tests;
