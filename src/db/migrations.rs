//! Database migrations
//!
//! Migrations are handled by SQLx and stored in the `migrations/` directory.
//! They are embedded at compile time and applied when the pool is created.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;

/// Apply pending forward migrations
pub async fn run(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;

    info!("Database migrations applied");
    Ok(())
}
