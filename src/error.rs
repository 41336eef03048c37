//! Error types for the llmstxt crate

use thiserror::Error;

use crate::firecrawl::FirecrawlError;

/// Result type for llmstxt operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for llmstxt operations
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error while writing artifacts
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Firecrawl API error
    #[error("Firecrawl error: {0}")]
    Firecrawl(String),

    /// Language model error
    #[error("LLM error: {0}")]
    Llm(String),

    /// The site map returned no URLs, nothing to generate
    #[error("No URLs found for the website")]
    NoUrlsFound,

    /// Missing or invalid configuration (API keys, addresses)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<FirecrawlError> for Error {
    fn from(err: FirecrawlError) -> Self {
        match err {
            FirecrawlError::Http(e) => Error::Http(e),
            _ => Error::Firecrawl(err.to_string()),
        }
    }
}
