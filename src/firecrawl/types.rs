//! Type definitions for the Firecrawl API
//!
//! This module contains the request and response bodies for the map and
//! scrape endpoints. Field names follow the API's camelCase wire format.

use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/map`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRequest {
    /// The site to map
    pub url: String,

    /// Maximum number of links to return
    pub limit: u32,

    /// Whether to include subdomains of the site
    pub include_subdomains: bool,

    /// Whether to skip the site's sitemap during discovery
    pub ignore_sitemap: bool,
}

impl MapRequest {
    /// Create a map request with the default discovery flags
    pub fn new(url: impl Into<String>, limit: u32) -> Self {
        Self {
            url: url.into(),
            limit,
            include_subdomains: false,
            ignore_sitemap: false,
        }
    }
}

/// Response body for `POST /v1/map`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapResponse {
    /// Whether the map succeeded
    #[serde(default)]
    pub success: bool,

    /// Discovered links, in discovery order
    #[serde(default)]
    pub links: Option<Vec<String>>,
}

/// Request body for `POST /v1/scrape`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    /// The page to scrape
    pub url: String,

    /// Output formats to request
    pub formats: Vec<String>,

    /// Strip navigation, footers and similar boilerplate
    pub only_main_content: bool,

    /// Page timeout in milliseconds, enforced by Firecrawl
    pub timeout: u64,
}

impl ScrapeRequest {
    /// Create a markdown-only, main-content scrape request
    pub fn markdown(url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            url: url.into(),
            formats: vec!["markdown".to_string()],
            only_main_content: true,
            timeout: timeout_ms,
        }
    }
}

/// Response body for `POST /v1/scrape`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeResponse {
    /// Whether the scrape succeeded
    #[serde(default)]
    pub success: bool,

    /// Scraped document
    #[serde(default)]
    pub data: Option<ScrapeData>,
}

/// Document returned by a scrape
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScrapeData {
    /// Rendered page content as markdown
    #[serde(default)]
    pub markdown: Option<String>,

    /// Page metadata
    #[serde(default)]
    pub metadata: PageMetadata,
}

/// Metadata Firecrawl extracts from a page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    /// HTML title
    #[serde(default)]
    pub title: Option<String>,

    /// Meta description
    #[serde(default)]
    pub description: Option<String>,

    /// Detected language
    #[serde(default)]
    pub language: Option<String>,

    /// Final URL after redirects
    #[serde(default)]
    pub source_url: Option<String>,

    /// HTTP status of the page fetch
    #[serde(default)]
    pub status_code: Option<u16>,
}

/// A successfully scraped page
#[derive(Debug, Clone)]
pub struct ScrapedPage {
    /// URL that was requested
    pub url: String,

    /// Page content as markdown
    pub markdown: String,

    /// Page metadata
    pub metadata: PageMetadata,
}
