//! Database initialization and migration runner.

use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

/// Open the SQLite pool and run embedded migrations.
///
/// `sqlite::memory:` gives every connection its own database, so callers
/// using it should pass `max_connections = 1`.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}
