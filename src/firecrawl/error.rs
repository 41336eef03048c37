//! Error types for the firecrawl module

use thiserror::Error;

/// Error type for Firecrawl operations
#[derive(Debug, Error)]
pub enum FirecrawlError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status
    #[error("API error: {status_code} - {message}")]
    Api {
        /// HTTP status code
        status_code: u16,
        /// Response body
        message: String,
    },

    /// Authentication rejected
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    /// Response body could not be decoded
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}
