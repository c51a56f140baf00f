//! Database layer
//!
//! This module handles local storage of:
//! - Organizations (tenants)
//! - Users
//! - Deals
//! - Call recordings

pub mod deal_repository;
pub mod migrations;
pub mod organization_repository;
pub mod recording_repository;
pub mod repository;
pub mod user_repository;

use std::{str::FromStr, time::Duration};

use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Sqlite,
};

use crate::config::DatabaseConfig;

pub use deal_repository::DealRepository;
pub use organization_repository::OrganizationRepository;
pub use recording_repository::RecordingRepository;
pub use user_repository::UserRepository;

/// Database connection pool type
pub type DbPool = Pool<Sqlite>;

/// Initialize the database connection pool
pub async fn init_pool(config: &DatabaseConfig) -> Result<DbPool> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .with_context(|| format!("Invalid database URL: {}", config.url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    migrations::run(&pool).await?;

    Ok(pool)
}

/// Check that the database answers queries
pub async fn check_health(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .fetch_one(pool)
        .await
        .context("Database health check failed")?;
    Ok(())
}
