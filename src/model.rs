//! # LLM Client Module
//!
//! This module provides the completion-model client used for page
//! summarization, with built-in rate limiting so a burst of generation runs
//! cannot exhaust the provider quota.
//!
//! ## Key Components
//!
//! - `Client`: Wraps a completion model behind a shared rate limiter
//! - `RateLimitedCompletionModel`: A wrapper that adds rate limiting to any completion model
//! - `MockCompletionModel`: A scripted model for tests
//!
//! ## Features
//!
//! - Quota shared across clones, so every request served by one process draws
//!   from the same budget
//! - Environment variable configuration for the API key
//! - Instrumentation with tracing spans for monitoring
//! - Type-safe model integration with the `rig` framework

use std::num::NonZeroU32;

use governor::{Quota, RateLimiter};
use ratelimited_completion::RateLimitedCompletionModel;
use rig::{completion::CompletionModel, providers::openai};

use crate::error::{Error, Result};

pub mod mock_model;
pub mod ratelimited_completion;

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = openai::GPT_4O_MINI;

/// Default completion quota per minute
pub const DEFAULT_REQUESTS_PER_MINUTE: u32 = 500;

/// Environment variable holding the OpenAI API key
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone)]
pub struct Client<C>
where
    C: CompletionModel,
{
    completion_model: C,
}

pub struct RateLimitResponse<T> {
    #[allow(dead_code)]
    response: T,
}

impl Client<RateLimitedCompletionModel<openai::CompletionModel>> {
    /// Build an OpenAI-backed client from `OPENAI_API_KEY`
    pub fn new_openai_from_env(model: &str, requests_per_minute: u32) -> Result<Self> {
        let api_key = std::env::var(OPENAI_API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "OpenAI API key not provided. Set the {} environment variable.",
                    OPENAI_API_KEY_ENV
                ))
            })?;
        let openai_client = openai::Client::new(&api_key);
        Self::new_openai(openai_client, model, requests_per_minute)
    }

    pub fn new_openai(
        openai_client: openai::Client,
        model: &str,
        requests_per_minute: u32,
    ) -> Result<Self> {
        let quota = NonZeroU32::new(requests_per_minute).ok_or_else(|| {
            Error::Config("requests per minute must be greater than zero".to_string())
        })?;
        let completion_limiter = RateLimiter::direct(Quota::per_minute(quota));
        let completion_model = RateLimitedCompletionModel::new(
            openai_client.completion_model(model),
            completion_limiter,
        );
        Ok(Self { completion_model })
    }
}

impl<C> Client<C>
where
    C: CompletionModel,
{
    /// Wrap an arbitrary completion model
    pub fn from_model(completion_model: C) -> Self {
        Self { completion_model }
    }

    pub fn completion(&self) -> &C {
        &self.completion_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mock_model::MockCompletionModel;

    #[test]
    fn test_zero_quota_is_rejected() {
        let openai_client = openai::Client::new("sk-test");
        let result = Client::new_openai(openai_client, DEFAULT_MODEL, 0);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_from_model_exposes_completion() {
        let client = Client::from_model(MockCompletionModel::new());
        let _model: &MockCompletionModel = client.completion();
    }
}
