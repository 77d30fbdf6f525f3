// src/layout/mod.rs
//! Typed layout records handed over by the external renderer.
//!
//! The renderer dumps each page as an ordered list of blocks; a block is
//! either text (lines of styled spans) or something else (image, drawing).
//! Missing fields deserialize to empty values so one damaged block never
//! aborts a document.

use crate::utils::error::LayoutError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Minimum number of extractable characters before a page counts as text-based.
pub const SCANNED_TEXT_THRESHOLD: usize = 50;
/// Fraction of the page an image must cover to be considered dominant.
pub const DOMINANT_IMAGE_RATIO: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    #[default]
    Text,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Span {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_name: Option<String>,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), font_size: None, font_name: None }
    }

    pub fn styled(text: impl Into<String>, font_size: f32, font_name: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: Some(font_size),
            font_name: Some(font_name.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Line {
    #[serde(default)]
    pub spans: Vec<Span>,
}

impl Line {
    pub fn text(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LayoutBlock {
    #[serde(default)]
    pub kind: BlockKind,
    #[serde(default)]
    pub lines: Vec<Line>,
}

impl LayoutBlock {
    /// A text block with one unstyled span per line.
    pub fn text_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: BlockKind::Text,
            lines: lines
                .into_iter()
                .map(|l| Line { spans: vec![Span::plain(l)] })
                .collect(),
        }
    }

    /// A single-line block whose only span carries font metadata.
    pub fn heading(text: impl Into<String>, font_size: f32, font_name: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Text,
            lines: vec![Line { spans: vec![Span::styled(text, font_size, font_name)] }],
        }
    }

    pub fn non_text() -> Self {
        Self { kind: BlockKind::Other, lines: Vec::new() }
    }

    pub fn is_text(&self) -> bool {
        self.kind == BlockKind::Text
    }

    /// Spans are concatenated within a line, lines are joined with `\n`.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(Line::text)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    pub fn spans(&self) -> impl Iterator<Item = &Span> {
        self.lines.iter().flat_map(|l| l.spans.iter())
    }
}

/// Geometry summary used to decide whether a page needs OCR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PageProfile {
    #[serde(default)]
    pub text_chars: usize,
    #[serde(default)]
    pub page_area: f32,
    #[serde(default)]
    pub image_areas: Vec<f32>,
}

impl PageProfile {
    /// A page with little extractable text is treated as scanned, whether or
    /// not a dominant image was found on it.
    pub fn is_scanned(&self) -> bool {
        if self.text_chars >= SCANNED_TEXT_THRESHOLD {
            return false;
        }
        if self.has_dominant_image() {
            tracing::debug!("Dominant image found on low-text page");
        } else {
            tracing::debug!("Low-text page without dominant image, assuming scanned");
        }
        true
    }

    pub fn has_dominant_image(&self) -> bool {
        self.page_area > 0.0
            && self
                .image_areas
                .iter()
                .any(|area| area / self.page_area > DOMINANT_IMAGE_RATIO)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Page {
    /// Zero-based page index.
    pub number: usize,
    #[serde(default)]
    pub blocks: Vec<LayoutBlock>,
    /// Text recognised by the OCR collaborator for scanned pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<PageProfile>,
}

impl Page {
    pub fn new(number: usize, blocks: Vec<LayoutBlock>) -> Self {
        Self { number, blocks, ocr_text: None, profile: None }
    }

    /// OCR output becomes a single text block, one line per recognised line.
    pub fn from_ocr_text(number: usize, text: &str) -> Self {
        let block = LayoutBlock::text_lines(text.lines().map(str::to_string));
        Self {
            number,
            blocks: vec![block],
            ocr_text: Some(text.to_string()),
            profile: None,
        }
    }

    pub fn is_scanned(&self) -> bool {
        self.profile.as_ref().is_some_and(PageProfile::is_scanned)
    }

    /// Blocks fed to the segmenter. Scanned (or block-less) pages with
    /// recognised text use that text; with `use_ocr` off the rendered
    /// blocks are used as they are.
    pub fn effective_blocks(&self, use_ocr: bool) -> Vec<LayoutBlock> {
        match &self.ocr_text {
            Some(text) if use_ocr && (self.is_scanned() || self.blocks.is_empty()) => {
                Page::from_ocr_text(self.number, text).blocks
            }
            _ => self.blocks.clone(),
        }
    }

    /// Plain text of the page, as written to the extracted-text dump.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter(|b| b.is_text())
            .map(LayoutBlock::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Top-level shape of the renderer's JSON dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LayoutDocument {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl LayoutDocument {
    pub fn from_json(json: &str) -> Result<Self, LayoutError> {
        let mut doc: LayoutDocument = serde_json::from_str(json)?;
        doc.pages.sort_by_key(|p| p.number);
        Ok(doc)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LayoutError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn scanned_pages(&self) -> Vec<usize> {
        self.pages.iter().filter(|p| p.is_scanned()).map(|p| p.number).collect()
    }
}
