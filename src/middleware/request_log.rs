//! Request logging middleware
//!
//! Emits a debug event per request. Kubernetes probes are skipped, they would
//! drown out everything else.

use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tracing::debug;

const PROBE_PATHS: [&str; 3] = ["/healthcheck", "/startup", "/readiness"];

fn is_probe(path: &str) -> bool {
    PROBE_PATHS.contains(&path)
}

/// Middleware that logs method, path and query of non-probe requests
pub async fn request_log_middleware(request: Request<Body>, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if is_probe(&path) {
        return next.run(request).await;
    }

    let method = request.method().clone();
    let query = request.uri().query().unwrap_or_default().to_string();
    let start = Instant::now();

    debug!(method = %method, path = %path, query = %query, "Request received");

    let response = next.run(request).await;

    debug!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Request completed"
    );

    response
}
