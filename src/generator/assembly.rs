//! Rendering of the index (`llms.txt`) and full (`llms-full.txt`) documents.
//!
//! Pages are always rendered in discovery order, whatever order they were
//! fetched in. The full document is first built with one boundary marker per
//! page; the markers are stripped before the document is returned.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::markdown::clean_for_llms;
use crate::summarizer::DEFAULT_TITLE;

static PAGE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<\|firecrawl-page-\d+-lllmstxt\|>\n?").expect("valid separator pattern")
});

const IGNORED_EXTENSIONS: &[&str] = &[
    ".xml", ".json", ".png", ".jpg", ".jpeg", ".ico", ".svg", ".webp", ".gif",
];

const IGNORED_NAMES: &[&str] = &["sitemap.xml", "robots.txt", "feed.xml", "rss.xml"];

const MIN_CONTENT_LENGTH: usize = 30;

/// A page that was scraped and summarized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageResult {
    pub url: String,
    pub title: String,
    pub description: String,
    /// Page body as markdown
    pub content: String,
    /// Position in the mapped URL list
    pub index: usize,
}

/// Final output of a generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub llms_txt: String,
    pub llms_full_txt: String,
    /// Pages successfully scraped
    pub num_urls_processed: usize,
    /// URLs attempted after truncation to the requested maximum
    pub num_urls_total: usize,
}

/// Boundary marker placed before the `ordinal`-th page (1-based)
pub fn page_separator(ordinal: usize) -> String {
    format!("<|firecrawl-page-{ordinal}-lllmstxt|>\n")
}

/// Remove every page boundary marker
///
/// Removal repeats until no marker is left, so fragments that join into a
/// new marker once an inner one is removed are stripped as well.
pub fn strip_page_separators(text: &str) -> String {
    let mut out = PAGE_SEPARATOR.replace_all(text, "").into_owned();
    while PAGE_SEPARATOR.is_match(&out) {
        out = PAGE_SEPARATOR.replace_all(&out, "").into_owned();
    }
    out
}

/// Collapse every whitespace run, newlines included, into one space
pub fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sort pages back into discovery order
pub fn sort_by_discovery(pages: &mut [PageResult]) {
    pages.sort_by_key(|page| page.index);
}

/// Render llms.txt: a header and one `- [title](url): description` line per page
pub fn render_index(site_url: &str, pages: &[PageResult]) -> String {
    let mut out = format!("# {site_url} llms.txt\n\n");
    for page in pages {
        out.push_str(&format!(
            "- [{}]({}): {}\n",
            single_line(&page.title),
            page.url,
            single_line(&page.description)
        ));
    }
    out
}

/// Render llms-full.txt: a header and each page body under a `## title` heading
pub fn render_full(site_url: &str, pages: &[PageResult], clean_markdown: bool) -> String {
    let mut out = format!("# {site_url} llms-full.txt\n\n");
    for (i, page) in pages.iter().enumerate() {
        let body = if clean_markdown {
            clean_for_llms(&page.content)
        } else {
            page.content.clone()
        };
        out.push_str(&page_separator(i + 1));
        out.push_str(&format!("## {}\n{}\n\n", single_line(&page.title), body));
    }
    strip_page_separators(&out)
}

/// Whether a page is worth listing
///
/// Rejects asset and feed URLs, directory-style paths other than the site
/// root, pages whose summary fell back to the default title, and pages with
/// almost no content.
pub fn is_content_page(page: &PageResult, site_url: &str) -> bool {
    let url = page.url.to_lowercase();
    let site = site_url.to_lowercase();
    let site = site.trim_end_matches('/');
    let is_root = url == site || url == format!("{site}/");

    if IGNORED_EXTENSIONS.iter().any(|ext| url.ends_with(ext))
        || IGNORED_NAMES.iter().any(|name| url.ends_with(name))
    {
        return false;
    }
    if !is_root && url.ends_with('/') {
        return false;
    }
    page.title != DEFAULT_TITLE && page.content.trim().chars().count() >= MIN_CONTENT_LENGTH
}
