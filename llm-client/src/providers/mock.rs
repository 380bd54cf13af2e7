//! Mock LLM provider for testing
//!
//! Returns a canned response (or a canned failure) and records every request
//! it receives so tests can inspect the prompt that was sent.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse};

/// A mock provider with a fixed outcome
pub struct MockProvider {
    /// Error message to fail with (None = always succeed)
    fail_with: Option<String>,
    /// Response content to return on success
    success_response: String,
    /// Requests received so far
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockProvider {
    /// Create a provider that always succeeds with `response`
    pub fn always_succeeds(response: &str) -> Self {
        Self {
            fail_with: None,
            success_response: response.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a provider whose requests always fail with an API error
    pub fn always_fails(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            success_response: String::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Get the number of times complete() was called
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }

        if let Some(message) = &self.fail_with {
            return Err(LlmError::ApiError {
                message: message.clone(),
                status_code: None,
            });
        }

        Ok(LlmResponse {
            content: self.success_response.clone(),
            model: "mock-model".to_string(),
            usage: None,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
