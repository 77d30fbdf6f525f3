// src/utils/text_debug.rs
//! HTML rendering of section text with the values the field rules look for
//! highlighted, for eyeballing why a rule did or did not fire.

use crate::patterns::PatternLibrary;
use crate::utils::error::StorageError;
use html_escape::{encode_double_quoted_attribute, encode_text};
use regex::Regex;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightKind {
    Date,
    Money,
    Position,
}

impl HighlightKind {
    fn css_class(self) -> &'static str {
        match self {
            HighlightKind::Date => "highlight-date",
            HighlightKind::Money => "highlight-money",
            HighlightKind::Position => "highlight-position",
        }
    }
}

/// Byte range of a highlighted match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub start: usize,
    pub end: usize,
    pub kind: HighlightKind,
}

/// Non-overlapping highlights in text order. Where matches overlap the
/// earlier one wins; a date range is kept whole over the dates inside it.
pub fn find_highlights(patterns: &PatternLibrary, text: &str) -> Vec<Highlight> {
    let sources: [(&Regex, HighlightKind); 6] = [
        (&patterns.date_range, HighlightKind::Date),
        (&patterns.date_slash, HighlightKind::Date),
        (&patterns.date_dash, HighlightKind::Date),
        (&patterns.date_written, HighlightKind::Date),
        (&patterns.money, HighlightKind::Money),
        (&patterns.position_header, HighlightKind::Position),
    ];

    let mut found: Vec<Highlight> = sources
        .iter()
        .flat_map(|(re, kind)| {
            re.find_iter(text).map(move |m| Highlight { start: m.start(), end: m.end(), kind: *kind })
        })
        .collect();
    // Longer match first on equal start.
    found.sort_by_key(|h| (h.start, std::cmp::Reverse(h.end)));

    let mut kept: Vec<Highlight> = Vec::with_capacity(found.len());
    for h in found {
        if kept.last().map_or(true, |last| h.start >= last.end) {
            kept.push(h);
        }
    }
    kept
}

/// Renders `text` as a standalone HTML page with highlights.
pub fn render_debug_html(patterns: &PatternLibrary, title: &str, text: &str) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n");
    html.push_str("body { white-space: pre-wrap; font-family: monospace; }\n");
    html.push_str(".highlight-date { background-color: #FFFF00; }\n");
    html.push_str(".highlight-money { background-color: #90EE90; }\n");
    html.push_str(".highlight-position { background-color: #ADD8E6; }\n");
    html.push_str("</style>\n");
    html.push_str(&format!("<title>{}</title>\n</head>\n<body>\n", encode_text(title)));

    let mut last = 0;
    for h in find_highlights(patterns, text) {
        let label = format!("{:?} {}-{}", h.kind, h.start, h.end);
        html.push_str(&encode_text(&text[last..h.start]));
        html.push_str(&format!(
            "<span class=\"{}\" title=\"{}\">{}</span>",
            h.kind.css_class(),
            encode_double_quoted_attribute(&label),
            encode_text(&text[h.start..h.end])
        ));
        last = h.end;
    }
    html.push_str(&encode_text(&text[last..]));
    html.push_str("\n</body>\n</html>");
    html
}

/// Writes the annotated page to `path`.
pub fn save_debug_html<P: AsRef<Path>>(
    patterns: &PatternLibrary,
    title: &str,
    text: &str,
    path: P,
) -> Result<(), StorageError> {
    let path = path.as_ref();
    fs::write(path, render_debug_html(patterns, title, text))?;
    tracing::debug!("Saved debug HTML to {}", path.display());
    Ok(())
}
