//! # llms.txt Generator Module
//!
//! This module orchestrates a generation run: it maps a site, scrapes and
//! summarizes each discovered page in turn, and assembles the index and full
//! documents while reporting progress.
//!
//! ## Key Components
//!
//! - `Generator`: Runs the map → scrape → summarize → assemble pipeline
//! - `GeneratorConfig`: Run parameters, built with a builder
//! - `ProgressEvent`: Status updates sent over an unbounded channel
//! - `assembly`: Rendering of the two documents
//!
//! ## Failure model
//!
//! A run aborts only when the site map yields no URLs. A page that cannot be
//! scraped is dropped and listed under `errors`; a page that cannot be
//! summarized keeps the default title and description.
//!
//! Pages are processed strictly one after another, which bounds the load put
//! on both third-party APIs.

pub mod assembly;
mod config;
mod events;

pub use assembly::{GenerationResult, PageResult};
pub use config::{DEFAULT_MAX_URLS, GeneratorConfig, GeneratorConfigBuilder};
pub use events::{
    ErrorEntry, GeneratedFiles, GenerationStatus, ProgressEvent, ProgressSender,
};

use rig::completion::CompletionModel;
use tracing::{debug, info, instrument, warn};

use crate::error::{Error, Result};
use crate::firecrawl::FirecrawlClient;
use crate::summarizer::Summarizer;

/// Message recorded for a page that could not be scraped
pub const SCRAPE_FAILED_MESSAGE: &str = "Scraping failed";

/// Generates llms.txt documents for one site at a time
#[derive(Debug, Clone)]
pub struct Generator<C>
where
    C: CompletionModel,
{
    firecrawl: FirecrawlClient,
    summarizer: Summarizer<C>,
    config: GeneratorConfig,
}

impl<C> Generator<C>
where
    C: CompletionModel,
{
    /// Create a generator from a Firecrawl API key and a completion model
    pub fn new(firecrawl_api_key: &str, model: C, config: GeneratorConfig) -> Result<Self> {
        let firecrawl =
            FirecrawlClient::with_base_url(firecrawl_api_key, config.firecrawl_base_url.clone())?
                .with_scrape_timeout_ms(config.scrape_timeout_ms);
        Ok(Self::with_client(firecrawl, model, config))
    }

    /// Create a generator around an existing Firecrawl client
    pub fn with_client(firecrawl: FirecrawlClient, model: C, config: GeneratorConfig) -> Self {
        let summarizer = Summarizer::new(model)
            .with_content_char_budget(config.content_char_budget)
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens);
        Self {
            firecrawl,
            summarizer,
            config,
        }
    }

    /// Generate llms.txt and llms-full.txt for `url`
    ///
    /// Progress is sent on `progress` when given; a closed receiver is not an
    /// error, the run carries on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoUrlsFound`] when the site map is empty. No scrape or
    /// summarize call is made in that case.
    #[instrument(skip(self, progress))]
    pub async fn generate(
        &self,
        url: &str,
        progress: Option<&ProgressSender>,
    ) -> Result<GenerationResult> {
        info!("Generating llms.txt for {}", url);
        let emit = |event: ProgressEvent| {
            if let Some(sender) = progress {
                if sender.send(event).is_err() {
                    debug!("Progress receiver dropped");
                }
            }
        };

        emit(ProgressEvent::mapping());

        let mut urls = self.firecrawl.map_website(url, self.config.max_urls).await;
        if urls.is_empty() {
            return Err(Error::NoUrlsFound);
        }
        urls.truncate(self.config.max_urls as usize);

        let total = urls.len();
        let mut pages = Vec::with_capacity(total);
        let mut errors = Vec::new();

        for (idx, page_url) in urls.iter().enumerate() {
            match self.process_url(page_url, idx).await {
                Some(page) => {
                    pages.push(page);
                    emit(ProgressEvent::scraping(total, idx + 1, page_url, Vec::new()));
                }
                None => {
                    let entry = ErrorEntry::for_url(page_url, SCRAPE_FAILED_MESSAGE);
                    errors.push(entry.clone());
                    emit(ProgressEvent::scraping(total, idx + 1, page_url, vec![entry]));
                }
            }
        }

        assembly::sort_by_discovery(&mut pages);
        emit(ProgressEvent::generating(total, errors.clone()));

        let num_urls_processed = pages.len();
        if self.config.filter_non_content {
            let before = pages.len();
            pages.retain(|page| assembly::is_content_page(page, url));
            debug!("Filtered out {} non-content pages", before - pages.len());
        }

        let llms_txt = assembly::render_index(url, &pages);
        let llms_full_txt = if self.config.include_full_text {
            assembly::render_full(url, &pages, self.config.clean_markdown)
        } else {
            String::new()
        };

        emit(ProgressEvent::completed(
            total,
            errors,
            GeneratedFiles {
                llms_txt: llms_txt.clone(),
                llms_full_txt: llms_full_txt.clone(),
            },
        ));

        info!("Processed {} out of {} URLs", num_urls_processed, total);
        Ok(GenerationResult {
            llms_txt,
            llms_full_txt,
            num_urls_processed,
            num_urls_total: total,
        })
    }

    /// Scrape and summarize one page; `None` when the scrape fails
    async fn process_url(&self, url: &str, index: usize) -> Option<PageResult> {
        let scraped = self.firecrawl.scrape_url(url).await?;
        if scraped.markdown.trim().is_empty() {
            warn!("Scrape of {} returned no content", url);
            return None;
        }

        let description = self.summarizer.describe(url, &scraped.markdown).await;
        Some(PageResult {
            url: url.to_string(),
            title: description.title,
            description: description.description,
            content: scraped.markdown,
            index,
        })
    }
}
