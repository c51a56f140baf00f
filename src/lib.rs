//! RecordMe backend library
//!
//! This crate provides the core functionality for the RecordMe API: tenant,
//! user, deal and call recording storage behind identity provider tokens.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod db;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

pub use config::AppConfig;
pub use db::DbPool;
pub use middleware::{auth_middleware, AuthContext};
use services::TokenValidator;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Database connection pool
    pub db: DbPool,
    /// Bearer token validator
    pub tokens: Arc<TokenValidator>,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool) -> anyhow::Result<Self> {
        let tokens = Arc::new(TokenValidator::new(&config.auth)?);
        Ok(Self { config, db, tokens })
    }
}
