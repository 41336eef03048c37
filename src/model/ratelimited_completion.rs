//! Completion model wrapper that waits on a shared quota before each call.

use std::sync::Arc;

use governor::DefaultDirectRateLimiter;
use rig::completion::{
    self, CompletionError, CompletionModel, CompletionRequest, CompletionResponse,
};
use tracing::{Instrument, debug_span, info_span};

use super::RateLimitResponse;

/// A completion model gated by a direct `governor` limiter.
///
/// Clones share the limiter, so the quota is global to everything built from
/// one `Client`.
#[derive(Clone)]
pub struct RateLimitedCompletionModel<M: CompletionModel> {
    model: M,
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl<M> RateLimitedCompletionModel<M>
where
    M: CompletionModel,
{
    pub fn new(model: M, limiter: DefaultDirectRateLimiter) -> Self {
        Self {
            model,
            limiter: Arc::new(limiter),
        }
    }

    /// The wrapped model
    pub fn inner(&self) -> &M {
        &self.model
    }
}

impl<M: CompletionModel> CompletionModel for RateLimitedCompletionModel<M> {
    type Response = RateLimitResponse<M::Response>;

    async fn completion(
        &self,
        completion_request: CompletionRequest,
    ) -> Result<completion::CompletionResponse<Self::Response>, CompletionError> {
        self.limiter
            .until_ready()
            .instrument(debug_span!("completion_quota"))
            .await;
        let response = self
            .model
            .completion(completion_request)
            .instrument(info_span!("summarize_completion"))
            .await?;
        Ok(CompletionResponse {
            choice: response.choice,
            raw_response: RateLimitResponse {
                response: response.raw_response,
            },
        })
    }
}
