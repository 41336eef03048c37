//! # Generator Configuration Module
//!
//! This module provides configuration options for a generation run: how many
//! URLs to process, what goes into the full document, and how pages are
//! summarized. It uses a builder pattern for flexible configuration.
//!
//! ## Key Components
//!
//! - `GeneratorConfig`: The configuration struct with run parameters
//! - `GeneratorConfigBuilder`: Builder pattern implementation for easier configuration

use crate::firecrawl::{DEFAULT_BASE_URL, DEFAULT_SCRAPE_TIMEOUT_MS};
use crate::summarizer::{DEFAULT_CONTENT_CHAR_BUDGET, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

/// Default number of URLs processed per run
pub const DEFAULT_MAX_URLS: u32 = 20;

/// Configuration for a generation run
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Maximum number of URLs to map and process
    pub max_urls: u32,

    /// Whether to render llms-full.txt at all
    pub include_full_text: bool,

    /// Drop assets, directory listings and near-empty pages before rendering
    pub filter_non_content: bool,

    /// Normalize page markdown before it enters llms-full.txt
    pub clean_markdown: bool,

    /// Page characters sent to the model per summary
    pub content_char_budget: usize,

    /// Page timeout requested from Firecrawl, in milliseconds
    pub scrape_timeout_ms: u64,

    /// Sampling temperature for summaries
    pub temperature: f64,

    /// Reply length bound for summaries, in tokens
    pub max_tokens: u64,

    /// Firecrawl API host
    pub firecrawl_base_url: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_urls: DEFAULT_MAX_URLS,
            include_full_text: true,
            filter_non_content: false,
            clean_markdown: false,
            content_char_budget: DEFAULT_CONTENT_CHAR_BUDGET,
            scrape_timeout_ms: DEFAULT_SCRAPE_TIMEOUT_MS,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            firecrawl_base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Builder for GeneratorConfig
#[derive(Debug, Default)]
pub struct GeneratorConfigBuilder {
    config: GeneratorConfig,
}

impl GeneratorConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: GeneratorConfig::default(),
        }
    }

    /// Set the maximum number of URLs to process
    pub fn max_urls(mut self, max_urls: u32) -> Self {
        self.config.max_urls = max_urls;
        self
    }

    /// Set whether llms-full.txt is rendered
    pub fn include_full_text(mut self, include_full_text: bool) -> Self {
        self.config.include_full_text = include_full_text;
        self
    }

    /// Set whether non-content pages are filtered out
    pub fn filter_non_content(mut self, filter_non_content: bool) -> Self {
        self.config.filter_non_content = filter_non_content;
        self
    }

    /// Set whether page markdown is cleaned
    pub fn clean_markdown(mut self, clean_markdown: bool) -> Self {
        self.config.clean_markdown = clean_markdown;
        self
    }

    pub fn content_char_budget(mut self, content_char_budget: usize) -> Self {
        self.config.content_char_budget = content_char_budget;
        self
    }

    pub fn scrape_timeout_ms(mut self, scrape_timeout_ms: u64) -> Self {
        self.config.scrape_timeout_ms = scrape_timeout_ms;
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.config.temperature = temperature;
        self
    }

    pub fn max_tokens(mut self, max_tokens: u64) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set the Firecrawl API host
    pub fn firecrawl_base_url(mut self, firecrawl_base_url: impl Into<String>) -> Self {
        self.config.firecrawl_base_url = firecrawl_base_url.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> GeneratorConfig {
        self.config
    }
}

impl GeneratorConfig {
    /// Create a new builder
    pub fn builder() -> GeneratorConfigBuilder {
        GeneratorConfigBuilder::new()
    }
}
