//! Progress events emitted by the Generator during a run.
//!
//! Events serialize to the camelCase JSON shape relayed to streaming clients,
//! for example:
//!
//! ```json
//! {"status":"scraping","totalUrls":3,"processedUrls":1,"currentUrl":"https://example.com","errors":[]}
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Channel half the generator reports progress on
pub type ProgressSender = mpsc::UnboundedSender<ProgressEvent>;

/// Phase of a generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Mapping,
    Scraping,
    Generating,
    Completed,
    Error,
}

impl GenerationStatus {
    /// Whether no further events follow this one
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

/// A per-URL (or run level) failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub message: String,
}

impl ErrorEntry {
    pub fn for_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            message: message.into(),
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            url: None,
            message: message.into(),
        }
    }
}

/// The two finished documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedFiles {
    pub llms_txt: String,
    pub llms_full_txt: String,
}

/// A discrete status update describing how far a run has advanced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub status: GenerationStatus,
    pub total_urls: usize,
    pub processed_urls: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_url: Option<String>,
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<GeneratedFiles>,
}

impl ProgressEvent {
    /// Mapping has started; nothing is known yet.
    pub fn mapping() -> Self {
        Self {
            status: GenerationStatus::Mapping,
            total_urls: 0,
            processed_urls: 0,
            current_url: None,
            errors: Vec::new(),
            files: None,
        }
    }

    /// One page has been handled. `errors` holds only that page's failure, if any.
    pub fn scraping(
        total_urls: usize,
        processed_urls: usize,
        current_url: impl Into<String>,
        errors: Vec<ErrorEntry>,
    ) -> Self {
        Self {
            status: GenerationStatus::Scraping,
            total_urls,
            processed_urls,
            current_url: Some(current_url.into()),
            errors,
            files: None,
        }
    }

    pub fn generating(total_urls: usize, errors: Vec<ErrorEntry>) -> Self {
        Self {
            status: GenerationStatus::Generating,
            total_urls,
            processed_urls: total_urls,
            current_url: None,
            errors,
            files: None,
        }
    }

    pub fn completed(total_urls: usize, errors: Vec<ErrorEntry>, files: GeneratedFiles) -> Self {
        Self {
            status: GenerationStatus::Completed,
            total_urls,
            processed_urls: total_urls,
            current_url: None,
            errors,
            files: Some(files),
        }
    }

    /// The run aborted.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: GenerationStatus::Error,
            total_urls: 0,
            processed_urls: 0,
            current_url: None,
            errors: vec![ErrorEntry::message(message)],
            files: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
