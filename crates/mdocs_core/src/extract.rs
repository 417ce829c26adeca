//! Heading and keyword extraction from raw markdown.
//!
//! Fenced code blocks are stripped first so `#` comments or `**` inside code
//! samples never count. Results are deduplicated in first-seen order, which
//! keeps headings usable as a document outline.

use crate::constants::DEFAULT_HEADING_DEPTH;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Headings and keywords pulled out of one markdown document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocMetadata {
    /// Full heading lines, e.g. `"## Install"`.
    pub headings: Vec<String>,
    /// Text wrapped in `**...**`, markers removed.
    pub keywords: Vec<String>,
}

fn code_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)```.*?```").expect("valid code fence regex"))
}

fn newline_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\r\n]+").expect("valid newline regex"))
}

fn keyword_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid keyword regex"))
}

fn default_heading_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| build_heading_re(DEFAULT_HEADING_DEPTH))
}

fn build_heading_re(max_depth: usize) -> Regex {
    let depth = max_depth.max(1);
    Regex::new(&format!(r"(?m)^#{{1,{depth}}}[ \t].+$")).expect("valid heading regex")
}

fn push_unique(seen: &mut HashSet<String>, out: &mut Vec<String>, value: &str) {
    if seen.insert(value.to_string()) {
        out.push(value.to_string());
    }
}

/// Extract headings (up to [`DEFAULT_HEADING_DEPTH`]) and keywords.
pub fn extract(content: &str) -> DocMetadata {
    extract_with_regex(content, default_heading_re())
}

/// Extract headings up to `max_depth` `#` characters, plus keywords.
///
/// # Arguments
/// - `content`: Raw markdown text.
/// - `max_depth`: Deepest heading level to collect (values below 1 act as 1).
///
/// # Returns
/// Deduplicated headings and keywords in encounter order. Malformed input
/// yields partial or empty results, never an error.
pub fn extract_with_depth(content: &str, max_depth: usize) -> DocMetadata {
    if max_depth == DEFAULT_HEADING_DEPTH {
        return extract(content);
    }
    extract_with_regex(content, &build_heading_re(max_depth))
}

fn extract_with_regex(content: &str, heading_re: &Regex) -> DocMetadata {
    let without_code = code_fence_re().replace_all(content, "");
    let text = newline_run_re().replace_all(&without_code, "\n");

    let mut seen = HashSet::new();
    let mut headings = Vec::new();
    for found in heading_re.find_iter(&text) {
        push_unique(&mut seen, &mut headings, found.as_str());
    }

    seen.clear();
    let mut keywords = Vec::new();
    for captures in keyword_re().captures_iter(&text) {
        if let Some(word) = captures.get(1) {
            push_unique(&mut seen, &mut keywords, word.as_str());
        }
    }

    DocMetadata { headings, keywords }
}
