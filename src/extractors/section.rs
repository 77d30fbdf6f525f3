// src/extractors/section.rs

// --- Imports ---
use crate::layout::{LayoutBlock, Page};
use crate::patterns::{PatternLibrary, SectionTag};
use crate::utils::text::is_upper_text;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;

// --- Configuration ---
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Blocks longer than this are never headings.
    pub max_heading_len: usize,
    /// Only blocks shorter than this are tested against the section patterns.
    pub max_classified_len: usize,
    /// Any span strictly above this size marks the block as title-formatted.
    pub title_font_size: f32,
    /// Lower-case font name fragments that mark a bold face.
    pub bold_markers: Vec<String>,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_heading_len: 150,
            max_classified_len: 100,
            title_font_size: 12.0,
            bold_markers: vec!["bold".to_string(), "negrito".to_string()],
        }
    }
}

// --- Data Structures ---
/// A text block after reading, with its position in the document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentedBlock {
    pub page: usize,
    /// Index in the page's block list (non-text blocks included).
    pub index: usize,
    pub text: String,
}

/// A text block plus the section it opens, if it is a heading.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedBlock {
    pub block: SegmentedBlock,
    pub heading: Option<SectionTag>,
}

/// One contiguous stretch of blocks flushed onto a section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionRun {
    pub tag: SectionTag,
    pub first_page: usize,
    pub last_page: usize,
    pub start_block: usize,
    pub end_block: usize,
    /// Position of the run's first block inside the section's block list.
    pub offset: usize,
    pub block_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub tag: SectionTag,
    pub blocks: Vec<SegmentedBlock>,
}

impl Section {
    /// Block texts joined by newlines, trimmed.
    pub fn text(&self) -> String {
        join_texts(self.blocks.iter())
    }

    /// Block texts, heading blocks included.
    pub fn block_texts(&self) -> Vec<&str> {
        self.blocks.iter().map(|b| b.text.as_str()).collect()
    }

    /// Block texts without the headings that opened each run of this section.
    pub fn body_texts<'a>(&'a self, runs: &[SectionRun]) -> Vec<&'a str> {
        let heading_offsets: Vec<usize> = runs
            .iter()
            .filter(|r| r.tag == self.tag && r.tag != SectionTag::Header)
            .map(|r| r.offset)
            .collect();
        self.blocks
            .iter()
            .enumerate()
            .filter(|(i, _)| !heading_offsets.contains(i))
            .map(|(_, b)| b.text.as_str())
            .collect()
    }
}

fn join_texts<'a>(blocks: impl Iterator<Item = &'a SegmentedBlock>) -> String {
    blocks
        .map(|b| b.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Accumulated sections of one document, plus the ledger of runs in reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionMap {
    pub sections: IndexMap<SectionTag, Section>,
    pub runs: Vec<SectionRun>,
}

impl SectionMap {
    pub fn get(&self, tag: SectionTag) -> Option<&Section> {
        self.sections.get(&tag)
    }

    pub fn text(&self, tag: SectionTag) -> Option<String> {
        self.get(tag).map(Section::text)
    }

    /// Section tag to concatenated text, in order of first appearance.
    pub fn texts(&self) -> IndexMap<SectionTag, String> {
        self.sections.iter().map(|(tag, s)| (*tag, s.text())).collect()
    }

    /// Text of every syllabus-related run, in reading order.
    pub fn syllabus_text(&self) -> Option<String> {
        let parts: Vec<String> = self
            .runs
            .iter()
            .filter(|run| run.tag.is_syllabus())
            .filter_map(|run| {
                let section = self.sections.get(&run.tag)?;
                let blocks = section.blocks.get(run.offset..run.offset + run.block_count)?;
                Some(join_texts(blocks.iter()))
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n").trim().to_string())
        }
    }

    pub fn total_blocks(&self) -> usize {
        self.sections.values().map(|s| s.blocks.len()).sum()
    }

    pub fn tags(&self) -> Vec<SectionTag> {
        self.sections.keys().copied().collect()
    }
}

// --- Main Segmenter Structure ---
pub struct SectionSegmenter<'p> {
    patterns: &'p PatternLibrary,
    config: SegmenterConfig,
    current_tag: SectionTag,
    current_run: Vec<SegmentedBlock>,
    map: SectionMap,
}

impl<'p> SectionSegmenter<'p> {
    pub fn new(patterns: &'p PatternLibrary, config: SegmenterConfig) -> Self {
        Self {
            patterns,
            config,
            current_tag: SectionTag::Header,
            current_run: Vec::new(),
            map: SectionMap::default(),
        }
    }

    pub fn current_tag(&self) -> SectionTag {
        self.current_tag
    }

    /// Reads and classifies the text blocks of one page. Pure, so pages can be
    /// classified in parallel before being applied in order.
    pub fn classify_page(&self, page_number: usize, blocks: &[LayoutBlock]) -> Vec<ClassifiedBlock> {
        blocks
            .iter()
            .enumerate()
            .filter(|(_, block)| block.is_text())
            .map(|(index, block)| {
                let text = block.text();
                let heading = self.identify_section_type(&text, block);
                ClassifiedBlock {
                    block: SegmentedBlock { page: page_number, index, text },
                    heading,
                }
            })
            .collect()
    }

    /// Applies classified blocks of one page to the running state.
    pub fn apply(&mut self, classified: Vec<ClassifiedBlock>) {
        for ClassifiedBlock { block, heading } in classified {
            match heading {
                Some(tag) => {
                    self.flush();
                    self.current_tag = tag;
                    self.current_run.push(block);
                }
                None => self.current_run.push(block),
            }
        }
    }

    /// Segments one page. Pages must be fed in ascending order.
    pub fn segment(&mut self, blocks: &[LayoutBlock], page_number: usize) {
        let classified = self.classify_page(page_number, blocks);
        tracing::debug!("Page {}: {} text blocks", page_number + 1, classified.len());
        self.apply(classified);
    }

    /// Segments all pages; classification optionally runs on the rayon pool,
    /// the merge always follows page order.
    pub fn segment_pages(&mut self, pages: &[Page], use_ocr: bool, parallel: bool) {
        let mut ordered: Vec<&Page> = pages.iter().collect();
        ordered.sort_by_key(|p| p.number);

        let classify = |page: &&Page| {
            let blocks = page.effective_blocks(use_ocr);
            self.classify_page(page.number, &blocks)
        };
        let classified: Vec<Vec<ClassifiedBlock>> = if parallel {
            ordered.par_iter().map(classify).collect()
        } else {
            ordered.iter().map(classify).collect()
        };

        for page_blocks in classified {
            self.apply(page_blocks);
        }
    }

    /// Flushes the pending run and returns the accumulated sections.
    pub fn finish(mut self) -> SectionMap {
        self.flush();
        tracing::info!("Sections extracted: {:?}", self.map.tags());
        self.map
    }

    fn flush(&mut self) {
        if self.current_run.is_empty() {
            return;
        }
        let run = std::mem::take(&mut self.current_run);
        let tag = self.current_tag;
        let section = self
            .map
            .sections
            .entry(tag)
            .or_insert_with(|| Section { tag, blocks: Vec::new() });

        let (first, last) = (&run[0], &run[run.len() - 1]);
        let record = SectionRun {
            tag,
            first_page: first.page,
            last_page: last.page,
            start_block: first.index,
            end_block: last.index,
            offset: section.blocks.len(),
            block_count: run.len(),
        };
        tracing::trace!(
            "Run for '{}': pages {}-{}, {} blocks",
            tag,
            record.first_page + 1,
            record.last_page + 1,
            record.block_count
        );
        section.blocks.extend(run);
        self.map.runs.push(record);
    }

    /// Identifies a heading from its text and typography.
    fn identify_section_type(&self, text: &str, block: &LayoutBlock) -> Option<SectionTag> {
        let len = text.chars().count();
        if len > self.config.max_heading_len {
            return None;
        }

        let is_uppercase = is_upper_text(text);
        let is_title_format = self.check_title_format(block);

        if (is_uppercase || is_title_format) && len < self.config.max_classified_len {
            if let Some(tag) = self.patterns.match_section(text) {
                tracing::info!("Section heading identified: {} - '{}'", tag, text);
                return Some(tag);
            }
        }
        None
    }

    fn check_title_format(&self, block: &LayoutBlock) -> bool {
        block.spans().any(|span| {
            let large = span.font_size.is_some_and(|size| size > self.config.title_font_size);
            let bold = span.font_name.as_deref().is_some_and(|name| {
                let name = name.to_lowercase();
                self.config.bold_markers.iter().any(|m| name.contains(m.as_str()))
            });
            large || bold
        })
    }
}
