//! # Firecrawl API Module
//!
//! This module wraps the Firecrawl HTTP API, which does the actual site
//! discovery and page rendering for llms.txt generation.
//!
//! ## Key Components
//!
//! - `FirecrawlClient`: High level `map_website` / `scrape_url` operations
//! - `HttpClient`: Bearer-authenticated JSON transport used by the client
//! - Request and response types for the `/v1/map` and `/v1/scrape` endpoints
//!
//! ## Failure model
//!
//! Neither operation propagates errors to the caller. A failed map yields an
//! empty URL list and a failed scrape yields `None`; both are logged. The
//! generator decides what an empty result means.

mod client;
mod error;
mod http;
mod types;

pub use client::{DEFAULT_SCRAPE_TIMEOUT_MS, FirecrawlClient};
pub use error::FirecrawlError;
pub use http::HttpClient;
pub use types::{MapRequest, MapResponse, PageMetadata, ScrapeRequest, ScrapeResponse, ScrapedPage};

/// Default Firecrawl API host
pub const DEFAULT_BASE_URL: &str = "https://api.firecrawl.dev";
