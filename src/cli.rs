//! Command-line host for the canvas engine.
//!
//! DESIGN
//! ======
//! Each subcommand is a short async function over [`AppState`] that returns
//! the text to print, so `main` stays a thin shell and the commands can be
//! tested against an in-memory store.
//!
//! `replay` is how drawings get in: it loads a page into a fresh
//! [`SketchEngine`], feeds it a JSON array of engine commands, and saves the
//! result (with snapshot) back to the page.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::{debug, info, warn};

use canvas::engine::{Command as EngineCommand, SketchEngine};

use crate::config::ConfigError;
use crate::services::canvas_record::{PageId, UserId};
use crate::services::persistence::{PersistenceError, SaveDraft};
use crate::services::snapshot::SnapshotError;
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("cannot read script {path}: {source}")]
    ReadScript { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no active canvas for page {0}")]
    NoCanvas(PageId),
}

#[derive(Parser, Debug)]
#[command(name = "roofsketch", about = "Roof measurement canvas: replay, render, and manage saved sketches")]
pub struct Cli {
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[arg(long, env = "CANVAS_STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    /// Print the page's active canvas as JSON.
    Show {
        #[arg(long)]
        page: PageId,
    },
    /// Apply a JSON script of engine commands to a page and save it.
    Replay {
        #[arg(long)]
        page: PageId,
        #[arg(long)]
        user: UserId,
        #[arg(long)]
        script: PathBuf,
    },
    /// Rasterize the page's active canvas to a PNG file.
    Render {
        #[arg(long)]
        page: PageId,
        #[arg(long)]
        out: PathBuf,
    },
    /// Soft-invalidate the page's active canvas.
    Discard {
        #[arg(long)]
        page: PageId,
        #[arg(long)]
        user: UserId,
    },
}

/// Run one subcommand and return what it prints.
///
/// # Errors
///
/// Returns the first storage, snapshot, or input error the command hits.
pub async fn run(state: &AppState, command: CliCommand) -> Result<String, CliError> {
    match command {
        CliCommand::Show { page } => show(state, page).await,
        CliCommand::Replay { page, user, script } => replay(state, page, user, &script).await,
        CliCommand::Render { page, out } => render(state, page, out).await,
        CliCommand::Discard { page, user } => discard(state, page, user).await,
    }
}

async fn show(state: &AppState, page: PageId) -> Result<String, CliError> {
    let content = state.persistence.load(page).await?.ok_or(CliError::NoCanvas(page))?;
    Ok(serde_json::to_string_pretty(&content)?)
}

async fn replay(state: &AppState, page: PageId, user: UserId, script: &Path) -> Result<String, CliError> {
    let raw = tokio::fs::read_to_string(script)
        .await
        .map_err(|source| CliError::ReadScript { path: script.to_path_buf(), source })?;
    let commands: Vec<EngineCommand> = serde_json::from_str(&raw)?;

    let mut engine = SketchEngine::new();
    if let Some(content) = state.persistence.load(page).await? {
        content.load_into(&mut engine);
    }

    let total = commands.len();
    for command in commands {
        for action in engine.handle(command) {
            debug!(?action, "engine action");
        }
    }
    if engine.pending_label_path().is_some() {
        warn!(page, "script ended with a stroke awaiting its label; it is not saved");
    }
    info!(page, commands = total, paths = engine.store.paths().len(), "script replayed");

    let outcome = state.persistence.save(page, user, SaveDraft::from_engine(&engine)).await?;
    Ok(serde_json::to_string_pretty(&outcome)?)
}

async fn render(state: &AppState, page: PageId, out: PathBuf) -> Result<String, CliError> {
    let content = state.persistence.load(page).await?.ok_or(CliError::NoCanvas(page))?;
    let mut engine = SketchEngine::new();
    content.load_into(&mut engine);
    state.persistence.snapshots().render_to(engine.scene(), out.clone()).await?;
    Ok(out.display().to_string())
}

async fn discard(state: &AppState, page: PageId, user: UserId) -> Result<String, CliError> {
    let changed = state.persistence.discard(page, user).await?;
    Ok(if changed {
        format!("page {page}: active canvas discarded")
    } else {
        format!("page {page}: nothing to discard")
    })
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
