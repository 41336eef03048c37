//! # Page Summarizer
//!
//! Turns a scraped page into the short title and description used in the
//! index document. The page markdown is truncated to a fixed character budget
//! before it is sent, and the model is asked for a strict JSON reply.
//!
//! Summarization never fails a page: any model error or malformed reply falls
//! back to [`DEFAULT_TITLE`] and [`DEFAULT_DESCRIPTION`].

use std::sync::LazyLock;

use regex::Regex;
use rig::completion::{AssistantContent, CompletionModel};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument, trace};

use crate::error::{Error, Result};

/// Title used when the model gives no usable title
pub const DEFAULT_TITLE: &str = "Page";

/// Description used when the model gives no usable description
pub const DEFAULT_DESCRIPTION: &str = "No description available";

/// Maximum number of page characters sent to the model
pub const DEFAULT_CONTENT_CHAR_BUDGET: usize = 4000;

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f64 = 0.3;

/// Default reply length bound, in tokens
pub const DEFAULT_MAX_TOKENS: u64 = 100;

const SYSTEM_PROMPT: &str = "You are an editorial assistant that writes concise titles and \
descriptions for web pages so that language models can cite them. If the page is mostly \
written in a language other than English, answer in that language.";

static JSON_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*?\}").expect("valid JSON object pattern"));

/// Title and description for one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescription {
    pub title: String,
    pub description: String,
}

impl PageDescription {
    /// The description used when summarization fails
    pub fn fallback() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

/// Generates page descriptions with a completion model
#[derive(Debug, Clone)]
pub struct Summarizer<C>
where
    C: CompletionModel,
{
    model: C,
    content_char_budget: usize,
    temperature: f64,
    max_tokens: u64,
}

impl<C> Summarizer<C>
where
    C: CompletionModel,
{
    pub fn new(model: C) -> Self {
        Self {
            model,
            content_char_budget: DEFAULT_CONTENT_CHAR_BUDGET,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Set how many characters of page content are sent to the model
    pub fn with_content_char_budget(mut self, content_char_budget: usize) -> Self {
        self.content_char_budget = content_char_budget;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Generate a title and description for a page, falling back to defaults on failure
    #[instrument(skip(self, markdown), fields(len = markdown.len()))]
    pub async fn describe(&self, url: &str, markdown: &str) -> PageDescription {
        match self.try_describe(url, markdown).await {
            Ok(description) => description,
            Err(e) => {
                error!("Error generating description for {}: {}", url, e);
                PageDescription::fallback()
            }
        }
    }

    async fn try_describe(&self, url: &str, markdown: &str) -> Result<PageDescription> {
        debug!("Generating description for: {}", url);

        let content = truncate_chars(markdown, self.content_char_budget);
        let prompt = build_user_prompt(url, content);

        let response = self
            .model
            .completion_request(prompt)
            .preamble(SYSTEM_PROMPT.to_string())
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .additional_params(serde_json::json!({
                "response_format": { "type": "json_object" }
            }))
            .send()
            .await
            .map_err(|e| Error::Llm(format!("Failed to generate description: {}", e)))?;

        let text = response
            .choice
            .iter()
            .filter_map(|c| match c {
                AssistantContent::Text(t) => Some(t.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        trace!("Model reply: {}", text);
        parse_description(&text)
    }
}

/// Build the user prompt for one page
pub fn build_user_prompt(url: &str, content: &str) -> String {
    format!(
        "For the following page ({url}), generate:\n\
         - An editorialized title (3-4 words) summarizing the main topic.\n\
         - A concise description (9-12 words) summarizing the value of the page.\n\n\
         Return the response in JSON format:\n\
         {{\n  \"title\": \"3-4 word title\",\n  \"description\": \"9-12 word description\"\n}}\n\n\
         Page content (Markdown):\n{content}\n"
    )
}

/// Truncate to at most `budget` characters, on a char boundary
pub fn truncate_chars(text: &str, budget: usize) -> &str {
    match text.char_indices().nth(budget) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Parse a model reply into a description
///
/// The reply may wrap the JSON object in prose or code fences; the first
/// `{...}` object is used. Missing or non-string fields fall back individually.
pub fn parse_description(text: &str) -> Result<PageDescription> {
    let value: serde_json::Value = match serde_json::from_str(text.trim()) {
        Ok(value) => value,
        Err(_) => {
            let object = JSON_OBJECT
                .find(text)
                .ok_or_else(|| Error::Llm(format!("No JSON object in reply: {:?}", text)))?;
            serde_json::from_str(object.as_str())?
        }
    };

    let field = |name: &str, default: &str| {
        value
            .get(name)
            .and_then(|v| v.as_str())
            .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default.to_string())
    };

    Ok(PageDescription {
        title: field("title", DEFAULT_TITLE),
        description: field("description", DEFAULT_DESCRIPTION),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::mock_model::MockCompletionModel;

    #[test]
    fn test_parse_plain_json() {
        let parsed =
            parse_description(r#"{"title": "Pricing Plans", "description": "Compare plans."}"#)
                .unwrap();
        assert_eq!(parsed.title, "Pricing Plans");
        assert_eq!(parsed.description, "Compare plans.");
    }

    #[test]
    fn test_parse_json_wrapped_in_prose() {
        let reply = "Sure! Here it is:\n```json\n{\"title\": \"API Docs\", \"description\": \"Reference for every endpoint.\"}\n```";
        let parsed = parse_description(reply).unwrap();
        assert_eq!(parsed.title, "API Docs");
    }

    #[test]
    fn test_parse_missing_fields_fall_back() {
        let parsed = parse_description(r#"{"title": 42}"#).unwrap();
        assert_eq!(parsed, PageDescription::fallback());
    }

    #[test]
    fn test_parse_collapses_multi_line_fields() {
        let parsed = parse_description(
            "{\"title\": \" Getting\\nStarted \", \"description\": \"First line.\\nSecond line.\"}",
        )
        .unwrap();
        assert_eq!(parsed.title, "Getting Started");
        assert_eq!(parsed.description, "First line. Second line.");
    }

    #[test]
    fn test_parse_whitespace_only_field_falls_back() {
        let parsed = parse_description(r#"{"title": " \n ", "description": "Fine."}"#).unwrap();
        assert_eq!(parsed.title, DEFAULT_TITLE);
        assert_eq!(parsed.description, "Fine.");
    }

    #[test]
    fn test_parse_without_json_is_error() {
        assert!(parse_description("no json here").is_err());
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 4000), "short");
    }

    #[test]
    fn test_prompt_contains_url_and_content() {
        let prompt = build_user_prompt("https://example.com", "# Hello");
        assert!(prompt.contains("(https://example.com)"));
        assert!(prompt.ends_with("# Hello\n"));
        assert!(prompt.contains("\"title\""));
    }

    #[tokio::test]
    async fn test_describe_uses_model_reply() {
        let mock = MockCompletionModel::new();
        mock.set_text_response(r#"{"title": "About Us", "description": "Who we are and what we do."}"#)
            .await;
        let summarizer = Summarizer::new(mock.clone());

        let description = summarizer.describe("https://example.com/about", "content").await;

        assert_eq!(description.title, "About Us");
        assert_eq!(description.description, "Who we are and what we do.");
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_describe_falls_back_on_model_error() {
        let mock = MockCompletionModel::new();
        mock.set_failure("upstream unavailable").await;
        let summarizer = Summarizer::new(mock);

        let description = summarizer.describe("https://example.com", "content").await;

        assert_eq!(description, PageDescription::fallback());
    }

    #[tokio::test]
    async fn test_describe_falls_back_on_empty_reply() {
        let summarizer = Summarizer::new(MockCompletionModel::new());
        let description = summarizer.describe("https://example.com", "content").await;
        assert_eq!(description, PageDescription::fallback());
    }
}
