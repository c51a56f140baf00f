//! Health check endpoints
//!
//! Kubernetes probes at the root plus a detailed component report.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::{db, AppState};

/// Probe response
#[derive(Serialize, Debug, PartialEq)]
pub struct ProbeResponse {
    pub status: &'static str,
}

/// Detailed health response with component status
#[derive(Serialize)]
pub struct DetailedHealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub components: ComponentHealth,
}

/// Health status of individual components
#[derive(Serialize)]
pub struct ComponentHealth {
    pub database: ComponentStatus,
}

/// Status of a single component
#[derive(Serialize)]
pub struct ComponentStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            message: None,
        }
    }

    fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            status: "unhealthy".to_string(),
            message: Some(message.into()),
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Liveness probe
pub async fn healthcheck() -> Json<ProbeResponse> {
    Json(ProbeResponse { status: "OK" })
}

/// Startup probe
pub async fn startup() -> Json<ProbeResponse> {
    Json(ProbeResponse { status: "OK" })
}

/// Readiness probe
///
/// Returns 200 once the database answers, 503 otherwise.
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ProbeResponse>) {
    match db::check_health(&state.db).await {
        Ok(_) => (StatusCode::OK, Json(ProbeResponse { status: "Ready" })),
        Err(e) => {
            tracing::warn!("Readiness check failed: {:#}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ProbeResponse {
                    status: "Service Unavailable",
                }),
            )
        }
    }
}

/// Detailed health check endpoint
///
/// Returns 200 if all components are healthy, 503 otherwise.
pub async fn health_check_detailed(
    State(state): State<AppState>,
) -> (StatusCode, Json<DetailedHealthResponse>) {
    let database_status = match db::check_health(&state.db).await {
        Ok(_) => ComponentStatus::healthy(),
        Err(e) => ComponentStatus::unhealthy(e.to_string()),
    };

    let overall_healthy = database_status.is_healthy();

    let status_code = if overall_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = DetailedHealthResponse {
        status: if overall_healthy {
            "healthy".to_string()
        } else {
            "unhealthy".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.to_string(),
        components: ComponentHealth {
            database: database_status,
        },
    };

    (status_code, Json(response))
}
