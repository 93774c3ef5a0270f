//! Runtime configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! `main` loads `.env` through `dotenvy` first, so every knob can live in the
//! process environment or in a local `.env` file. Numeric knobs that fail to
//! parse fall back to their defaults; values that parse but make no sense
//! (a zero-sized snapshot) are rejected with [`ConfigError`].

use std::path::PathBuf;

use canvas::render::RenderOptions;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://roofsketch.db?mode=rwc";
pub const DEFAULT_STORAGE_DIR: &str = "./storage";
pub const DEFAULT_SNAPSHOT_WIDTH: u32 = 1024;
pub const DEFAULT_SNAPSHOT_HEIGHT: u32 = 600;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("DATABASE_URL is empty")]
    EmptyDatabaseUrl,
    #[error("snapshot size must be non-zero, got {width}x{height}")]
    InvalidSnapshotSize { width: u32, height: u32 },
    #[error("DB_MAX_CONNECTIONS must be at least 1")]
    NoConnections,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    /// Root for stored files; snapshots land in `<storage_dir>/canvasImages`.
    pub storage_dir: PathBuf,
    pub snapshot_width: u32,
    pub snapshot_height: u32,
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Build config from the process environment.
    ///
    /// - `DATABASE_URL`: default [`DEFAULT_DATABASE_URL`]
    /// - `CANVAS_STORAGE_DIR`: default [`DEFAULT_STORAGE_DIR`]
    /// - `SNAPSHOT_WIDTH` / `SNAPSHOT_HEIGHT`: default 1024 x 600
    /// - `DB_MAX_CONNECTIONS`: default 5
    ///
    /// # Errors
    ///
    /// Returns an error if a value is present but unusable.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`AppConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let config = Self {
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            storage_dir: lookup("CANVAS_STORAGE_DIR").map_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR), PathBuf::from),
            snapshot_width: parse_or(lookup("SNAPSHOT_WIDTH"), DEFAULT_SNAPSHOT_WIDTH),
            snapshot_height: parse_or(lookup("SNAPSHOT_HEIGHT"), DEFAULT_SNAPSHOT_HEIGHT),
            db_max_connections: parse_or(lookup("DB_MAX_CONNECTIONS"), DEFAULT_DB_MAX_CONNECTIONS),
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the environment.
    #[must_use]
    pub fn with_overrides(mut self, database_url: Option<String>, storage_dir: Option<PathBuf>) -> Self {
        if let Some(url) = database_url {
            self.database_url = url;
        }
        if let Some(dir) = storage_dir {
            self.storage_dir = dir;
        }
        self
    }

    /// Check invariants the rest of the program relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated rule.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::EmptyDatabaseUrl);
        }
        if self.snapshot_width == 0 || self.snapshot_height == 0 {
            return Err(ConfigError::InvalidSnapshotSize { width: self.snapshot_width, height: self.snapshot_height });
        }
        if self.db_max_connections == 0 {
            return Err(ConfigError::NoConnections);
        }
        Ok(())
    }

    /// Renderer settings for snapshots and `render`.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions { width: self.snapshot_width, height: self.snapshot_height, ..RenderOptions::default() }
    }
}

fn parse_or<T>(raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
