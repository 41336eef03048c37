//! HTTP client implementation for the Firecrawl API
//!
//! This module provides the transport used by `FirecrawlClient`: bearer
//! authentication, JSON bodies and status-code mapping.

use reqwest::{Client as ReqwestClient, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

use crate::firecrawl::error::FirecrawlError;

/// Default timeout for HTTP requests in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// API version prefix
const API_VERSION: &str = "v1";

/// HTTP client for making requests to the Firecrawl API
#[derive(Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: ReqwestClient,

    /// Base URL for API requests
    base_url: String,

    /// API key sent as a bearer token
    api_key: String,
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpClient {
    /// Create a new HTTP client against the given API host
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, FirecrawlError> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn build_url(&self, path: &str) -> Result<Url, FirecrawlError> {
        let url = format!("{}/{}/{}", self.base_url, API_VERSION, path);
        Ok(Url::parse(&url)?)
    }

    /// Send a POST request with a JSON body
    #[instrument(skip(self, body), level = "debug")]
    pub async fn post<T: DeserializeOwned, B: Serialize + std::fmt::Debug>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, FirecrawlError> {
        let url = self.build_url(path)?;
        let request = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body);

        debug!("Sending POST request to {}", path);
        self.execute_request(request).await
    }

    /// Execute an HTTP request and handle the response
    async fn execute_request<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, FirecrawlError> {
        let response = request.send().await?;

        let status = response.status();
        let response_text = response.text().await?;

        if status.is_success() {
            serde_json::from_str(&response_text).map_err(|e| {
                error!("Failed to parse response: {}", e);
                FirecrawlError::UnexpectedResponse(format!("Failed to parse response: {}", e))
            })
        } else {
            error!("API error: {} - {}", status, response_text);

            match status {
                StatusCode::TOO_MANY_REQUESTS => Err(FirecrawlError::RateLimit(response_text)),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    Err(FirecrawlError::Auth("Invalid Firecrawl API key".to_string()))
                }
                _ => Err(FirecrawlError::Api {
                    status_code: status.as_u16(),
                    message: response_text,
                }),
            }
        }
    }
}
