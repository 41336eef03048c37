//! Site mapping and page scraping over the Firecrawl API

use tracing::{debug, error, info, instrument};

use crate::firecrawl::DEFAULT_BASE_URL;
use crate::firecrawl::error::FirecrawlError;
use crate::firecrawl::http::HttpClient;
use crate::firecrawl::types::{MapRequest, MapResponse, ScrapeRequest, ScrapeResponse, ScrapedPage};

/// Default page timeout requested from Firecrawl, in milliseconds
pub const DEFAULT_SCRAPE_TIMEOUT_MS: u64 = 30_000;

/// Client for the Firecrawl map and scrape endpoints
#[derive(Debug, Clone)]
pub struct FirecrawlClient {
    http: HttpClient,
    scrape_timeout_ms: u64,
}

impl FirecrawlClient {
    /// Create a client against the public Firecrawl API
    pub fn new(api_key: impl Into<String>) -> Result<Self, FirecrawlError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom API host (self-hosted Firecrawl, tests)
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, FirecrawlError> {
        Ok(Self {
            http: HttpClient::new(api_key, base_url)?,
            scrape_timeout_ms: DEFAULT_SCRAPE_TIMEOUT_MS,
        })
    }

    /// Set the page timeout sent with scrape requests
    pub fn with_scrape_timeout_ms(mut self, scrape_timeout_ms: u64) -> Self {
        self.scrape_timeout_ms = scrape_timeout_ms;
        self
    }

    /// Map a website to get its URLs, in discovery order
    ///
    /// Returns at most `limit` URLs. Any transport or API failure is logged and
    /// yields an empty list; no retry is attempted.
    #[instrument(skip(self))]
    pub async fn map_website(&self, url: &str, limit: u32) -> Vec<String> {
        info!("Mapping website: {} (limit: {})", url, limit);

        let request = MapRequest::new(url, limit);
        match self.http.post::<MapResponse, _>("map", &request).await {
            Ok(MapResponse {
                success: true,
                links: Some(mut links),
            }) if !links.is_empty() => {
                links.truncate(limit as usize);
                info!("Found {} URLs", links.len());
                links
            }
            Ok(response) => {
                error!("Failed to map website: {:?}", response);
                Vec::new()
            }
            Err(e) => {
                error!("Error mapping website: {}", e);
                Vec::new()
            }
        }
    }

    /// Scrape a single URL as main-content markdown
    ///
    /// Returns `None` on any failure, including a reply without markdown.
    #[instrument(skip(self))]
    pub async fn scrape_url(&self, url: &str) -> Option<ScrapedPage> {
        debug!("Scraping URL: {}", url);

        let request = ScrapeRequest::markdown(url, self.scrape_timeout_ms);
        match self.http.post::<ScrapeResponse, _>("scrape", &request).await {
            Ok(ScrapeResponse {
                success: true,
                data: Some(data),
            }) => Some(ScrapedPage {
                url: url.to_string(),
                markdown: data.markdown.unwrap_or_default(),
                metadata: data.metadata,
            }),
            Ok(response) => {
                error!("Failed to scrape {}: {:?}", url, response);
                None
            }
            Err(e) => {
                error!("Error scraping {}: {}", url, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_map_website_returns_links() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/v1/map")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "url": "https://example.com",
                "limit": 2,
                "includeSubdomains": false
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"success": true, "links": ["https://example.com", "https://example.com/a", "https://example.com/b"]}"#,
            )
            .create_async()
            .await;

        let client = FirecrawlClient::with_base_url("fc-test-key", server.url()).unwrap();
        let urls = client.map_website("https://example.com", 2).await;

        assert_eq!(urls, vec!["https://example.com", "https://example.com/a"]);
        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_map_website_failure_is_empty() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/v1/map")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let client = FirecrawlClient::with_base_url("fc-test-key", server.url()).unwrap();
        let urls = client.map_website("https://example.com", 10).await;

        assert!(urls.is_empty());
        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_map_website_unsuccessful_body_is_empty() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/map")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": false, "error": "blocked"}"#)
            .create_async()
            .await;

        let client = FirecrawlClient::with_base_url("fc-test-key", server.url()).unwrap();
        assert!(client.map_website("https://example.com", 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_scrape_url_returns_markdown() {
        let mut server = Server::new_async().await;
        let mock_server = server
            .mock("POST", "/v1/scrape")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "url": "https://example.com/about",
                "formats": ["markdown"],
                "onlyMainContent": true,
                "timeout": 30000
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"success": true, "data": {"markdown": "About us", "metadata": {"title": "About", "statusCode": 200}}}"#,
            )
            .create_async()
            .await;

        let client = FirecrawlClient::with_base_url("fc-test-key", server.url()).unwrap();
        let page = client.scrape_url("https://example.com/about").await.unwrap();

        assert_eq!(page.url, "https://example.com/about");
        assert_eq!(page.markdown, "About us");
        assert_eq!(page.metadata.title.as_deref(), Some("About"));
        assert_eq!(page.metadata.status_code, Some(200));
        mock_server.assert_async().await;
    }

    #[tokio::test]
    async fn test_scrape_url_failure_is_none() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/scrape")
            .with_status(403)
            .with_body("forbidden")
            .create_async()
            .await;

        let client = FirecrawlClient::with_base_url("fc-test-key", server.url()).unwrap();
        assert!(client.scrape_url("https://example.com/private").await.is_none());
    }
}
