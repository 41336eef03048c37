//! Markdown cleanup for the full document
//!
//! Scraped markdown carries escape noise, links wrapped across lines and
//! inconsistent list and heading markup. `clean_for_llms` normalizes it into
//! compact, readable text. The pass is line oriented and does not try to
//! preserve code block indentation.

use std::sync::LazyLock;

use regex::{Captures, Regex};

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect(concat!("valid pattern ", stringify!($name))));
    };
}

pattern!(BACKSLASHES, r"\\+");
pattern!(LINK, r"\[([^\]]+)\]\(([^)]+)\)");
pattern!(EMPTY_LINK, r"\[([^\]]*)\]\(\s*\)");
pattern!(NEWLINES, r"\n+");
pattern!(SPACE_RUNS, r" {2,}");
pattern!(INDENT_AFTER_NEWLINE, r"\n +");
pattern!(TRAILING_WS, r"(?m)[ \t]+$");
pattern!(LEADING_WS, r"(?m)^[ \t]+");
pattern!(BULLET, r"(?m)^[*-][ \t]+");
pattern!(EMPTY_HEADING, r"(?m)^#{1,6}[ \t]*\n");
pattern!(HEADING, r"(?m)^(#{1,6})[ \t]*([^#\s].*)$");
pattern!(RULE, r"(?m)^[-*_]{3,}$");
pattern!(BLANK_RUNS, r"\n{3,}");

/// Normalize scraped markdown for inclusion in llms-full.txt
pub fn clean_for_llms(markdown: &str) -> String {
    if markdown.trim().is_empty() {
        return String::new();
    }

    let clean = BACKSLASHES.replace_all(markdown, "");
    let clean = LINK.replace_all(&clean, |caps: &Captures| {
        let text = NEWLINES.replace_all(&caps[1], " ");
        let text = SPACE_RUNS.replace_all(&text, " ");
        format!("[{}]({})", text.trim(), &caps[2])
    });
    let clean = EMPTY_LINK.replace_all(&clean, "${1}");
    let clean = LINK.replace_all(&clean, "\n${0}\n");
    let clean = INDENT_AFTER_NEWLINE.replace_all(&clean, "\n");
    let clean = SPACE_RUNS.replace_all(&clean, " ");
    let clean = TRAILING_WS.replace_all(&clean, "");
    let clean = LEADING_WS.replace_all(&clean, "");
    let clean = BULLET.replace_all(&clean, "- ");
    let clean = EMPTY_HEADING.replace_all(&clean, "");
    let clean = RULE.replace_all(&clean, "");
    let clean = HEADING.replace_all(&clean, "\n${1} ${2}\n");
    let clean = BLANK_RUNS.replace_all(&clean, "\n\n");

    clean.trim().to_string()
}
