//! # llmstxt - llms.txt Generation for Websites
//!
//! This crate turns a website into the two text files described by the
//! llms.txt convention: a concise index (`llms.txt`) listing each page with a
//! short description, and a full-text companion (`llms-full.txt`) holding
//! every page's markdown.
//!
//! ## Pipeline
//!
//! - Map the site with Firecrawl to discover up to `max_urls` pages
//! - Scrape each page to markdown, one after another
//! - Summarize each page into a title and description with a rate-limited LLM
//! - Assemble both documents in discovery order
//!
//! Progress is reported as a stream of [`generator::ProgressEvent`]s, which the
//! [`server`] module relays to HTTP clients as server-sent events.
//!
//! ## Example
//!
//! ```rust,no_run
//! use llmstxt::generator::{Generator, GeneratorConfig};
//! use llmstxt::model::{Client, DEFAULT_MODEL, DEFAULT_REQUESTS_PER_MINUTE};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads OPENAI_API_KEY
//!     let client = Client::new_openai_from_env(DEFAULT_MODEL, DEFAULT_REQUESTS_PER_MINUTE)?;
//!
//!     let config = GeneratorConfig::builder().max_urls(10).build();
//!     let generator = Generator::new("fc-your-key", client.completion().clone(), config)?;
//!
//!     let result = generator.generate("https://example.com", None).await?;
//!     println!("{}", result.llms_txt);
//!     Ok(())
//! }
//! ```

mod error;
pub mod firecrawl;
pub mod generator;
pub mod markdown;
pub mod model;
pub mod server;
pub mod summarizer;

pub use error::{Error, Result};

/// Commonly used types
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::firecrawl::FirecrawlClient;
    pub use crate::generator::{
        GenerationResult, GenerationStatus, Generator, GeneratorConfig, ProgressEvent,
    };
    pub use crate::summarizer::{PageDescription, Summarizer};
}
