//! Integration tests for the RecordMe backend
//!
//! These tests verify the behavior of the API endpoints with a real
//! (temporary file) database and all middleware.

mod api_tests;
mod repository_tests;
