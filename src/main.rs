use clap::Parser;
use tracing_subscriber::EnvFilter;

use roofsketch::cli::{self, Cli, CliError};
use roofsketch::config::AppConfig;
use roofsketch::state::AppState;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let dotenv = dotenvy::dotenv();

    // Logs go to stderr so command output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "failed to read .env"),
    }

    let cli = Cli::parse();
    let config = AppConfig::from_env()?.with_overrides(cli.database_url, cli.storage_dir);
    config.validate()?;
    tracing::info!(storage = %config.storage_dir.display(), "roofsketch starting");

    let state = AppState::connect(config).await?;
    let output = cli::run(&state, cli.command).await?;
    println!("{output}");
    Ok(())
}
