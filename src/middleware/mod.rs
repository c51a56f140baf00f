//! Middleware components
//!
//! This module contains middleware for:
//! - Authentication (bearer tokens from the identity provider)
//! - Security headers
//! - Request logging

pub mod auth;
pub mod request_log;
pub mod security_headers;

pub use auth::{auth_middleware, AuthContext, AuthError};
pub use request_log::request_log_middleware;
pub use security_headers::security_headers_middleware;
