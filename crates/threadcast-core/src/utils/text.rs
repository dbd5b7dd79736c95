//! Text normalization and post-identifier extraction.

use std::sync::LazyLock;

use regex::Regex;

static STATUS_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)/status(?:es)?/(\d+)").expect("status pattern is valid"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\r?\n)+").expect("line break pattern is valid"));

/// Extract the numeric status identifier from a post URL.
///
/// Accepts `.../status/{digits}` and `.../statuses/{digits}` in any case,
/// with or without trailing path segments or query strings.
///
/// # Examples
///
/// ```
/// use threadcast_core::extract_status_id;
///
/// assert_eq!(extract_status_id("https://x.com/alice/status/42").as_deref(), Some("42"));
/// assert_eq!(extract_status_id("https://x.com/alice"), None);
/// ```
pub fn extract_status_id(url: &str) -> Option<String> {
    STATUS_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Collapse whitespace runs (newlines included) to one space and trim.
///
/// Embedded URLs are left untouched.
pub fn clean_text(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

/// Split pasted text on newline runs, trimming each line and dropping blanks.
pub fn split_lines(raw: &str) -> Vec<String> {
    LINE_BREAKS
        .split(raw)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}
