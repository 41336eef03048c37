//! # Mock Completion Model for Testing
//!
//! Provides a `MockCompletionModel` that implements the `CompletionModel` trait
//! for use in tests. It allows setting a predefined response or error to simulate
//! different model behaviors without making actual API calls.

use rig::{
    completion::{
        AssistantContent, CompletionError, CompletionModel, CompletionRequest, CompletionResponse,
    },
    one_or_many::OneOrMany,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// A mock completion model for testing purposes.
/// It returns a predefined response or error when `completion` is called.
#[derive(Debug, Clone)]
pub struct MockCompletionModel {
    /// The predefined response to return. Arc<Mutex<>> allows modification after creation if needed.
    response: Arc<Mutex<Option<OneOrMany<AssistantContent>>>>,

    /// When set, every call fails with this provider error.
    failure: Arc<Mutex<Option<String>>>,

    /// Number of completion calls received.
    calls: Arc<AtomicUsize>,
}

impl MockCompletionModel {
    /// Creates a new mock model that will return a default empty success response.
    pub fn new() -> Self {
        Self {
            response: Arc::new(Mutex::new(None)),
            failure: Arc::new(Mutex::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sets the response that the mock model should return.
    pub async fn set_response(&self, response: OneOrMany<AssistantContent>) {
        let mut guard = self.response.lock().await;
        *guard = Some(response);
    }

    /// Helper to create a simple text response.
    pub async fn set_text_response(&self, text: &str) {
        let response = OneOrMany::one(AssistantContent::text(text));
        self.set_response(response).await;
    }

    /// Makes every subsequent call fail with a provider error.
    pub async fn set_failure(&self, message: &str) {
        let mut guard = self.failure.lock().await;
        *guard = Some(message.to_string());
    }

    /// Number of completion calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockCompletionModel {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionModel for MockCompletionModel {
    type Response = String;

    async fn completion(
        &self,
        _completion_request: CompletionRequest,
    ) -> Result<CompletionResponse<Self::Response>, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let failure = {
            let guard = self.failure.lock().await;
            guard.clone()
        };
        if let Some(message) = failure {
            return Err(CompletionError::ProviderError(message));
        }

        let response = {
            let guard = self.response.lock().await;
            guard.clone()
        };
        match response {
            Some(result) => Ok(CompletionResponse {
                choice: result,
                raw_response: "".to_string(),
            }),
            None => Ok(CompletionResponse {
                choice: OneOrMany::one(AssistantContent::text("")),
                raw_response: "".to_string(),
            }),
        }
    }
}
