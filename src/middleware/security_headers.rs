//! Security headers middleware
//!
//! Adds security headers to all responses. The API serves JSON only, so the
//! content policy denies everything by default and responses are never cached.

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

const CONTENT_SECURITY_POLICY: &str = "default-src 'none'; base-uri 'self'; connect-src 'self'; \
frame-src 'none'; img-src 'self' data: *; style-src 'self' *; script-src 'self' 'unsafe-inline' *";

/// Middleware that adds security headers to all responses
pub async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();

    // One year, subdomains included
    headers.insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static("max-age=31536000; includeSubDomains"),
    );

    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CONTENT_SECURITY_POLICY),
    );

    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));

    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, max-age=0, must-revalidate"),
    );

    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));

    response
}
