//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::sync::Arc;
use async_trait::async_trait;

use crate::api::{ApiError, ChatBackend, ChatReply, SourcesListing};

/// A backend for tests that don't need real API calls.
pub struct NoopBackend;

#[async_trait]
impl ChatBackend for NoopBackend {
    async fn send_message(&self, _message: &str) -> Result<ChatReply, ApiError> {
        Ok(ChatReply::default())
    }

    async fn fetch_sources(&self, _indexed_only: bool) -> Result<SourcesListing, ApiError> {
        Ok(SourcesListing::default())
    }

    async fn health(&self) -> Result<bool, ApiError> {
        Ok(true)
    }
}

/// Creates a test App with a NoopBackend.
pub fn test_app() -> crate::core::state::App {
    crate::core::state::App::new(Arc::new(NoopBackend), "http://localhost:8000/api".to_string())
}
