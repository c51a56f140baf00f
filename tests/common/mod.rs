//! Common test utilities and helpers
//!
//! This module provides shared test infrastructure including:
//! - Test database setup
//! - API test client
//! - Bearer token builders and a signing key set

pub mod tokens;

pub use test_app::*;
pub use tokens::*;
