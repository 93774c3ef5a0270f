//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is built once at startup and handed to every command. It owns
//! the configuration and the persistence adapter; the adapter in turn owns
//! the object store and the snapshot writer. Clone is cheap (Arc fields).

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db;
use crate::services::canvas_record::{CanvasStore, SqliteCanvasStore};
use crate::services::persistence::PersistenceAdapter;
use crate::services::snapshot::SnapshotWriter;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub persistence: Arc<PersistenceAdapter>,
}

impl AppState {
    /// Open the configured database and wire the SQLite store.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot connect or migrations fail.
    pub async fn connect(config: AppConfig) -> Result<Self, sqlx::Error> {
        let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;
        Ok(Self::with_store(config, Arc::new(SqliteCanvasStore::new(pool))))
    }

    /// Build state around an existing store.
    #[must_use]
    pub fn with_store(config: AppConfig, store: Arc<dyn CanvasStore>) -> Self {
        let snapshots = SnapshotWriter::new(config.storage_dir.clone(), config.render_options());
        Self { config: Arc::new(config), persistence: Arc::new(PersistenceAdapter::new(store, snapshots)) }
    }
}
