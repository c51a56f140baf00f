//! API routes and handlers
//!
//! This module defines all API endpoints and their routing.

use axum::{routing::get, Router};
use serde::Serialize;

use crate::{middleware, AppState};

mod deals;
mod health;
mod organizations;
mod recordings;
mod users;

pub use health::*;

/// Body returned by successful deletes
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub detail: String,
}

impl DeleteResponse {
    pub fn new(entity: &str) -> Self {
        Self {
            detail: format!("{} deleted successfully", entity),
        }
    }
}

/// Kubernetes probes, mounted at the root
pub fn probe_routes() -> Router<AppState> {
    Router::new()
        .route("/healthcheck", get(health::healthcheck))
        .route("/startup", get(health::startup))
        .route("/readiness", get(health::readiness))
}

/// Public API routes (no authentication required)
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/health/detailed", get(health::health_check_detailed))
}

/// Protected API routes (authentication required)
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .nest("/org", organizations::routes())
        .nest("/user", users::routes())
        .nest("/deal", deals::routes())
        .nest("/recorder", recordings::routes())
}

/// Create the application router: probes, public and protected API routes,
/// with authentication applied to the protected routes only
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(probe_routes())
        .nest("/api/v1", public_routes())
        .nest(
            "/api/v1",
            protected_routes().layer(axum::middleware::from_fn_with_state(
                state.clone(),
                middleware::auth_middleware,
            )),
        )
        .layer(axum::middleware::from_fn(
            middleware::request_log_middleware,
        ))
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .with_state(state)
}
