// src/lib.rs
//! Section segmentation and structured field extraction for Brazilian public
//! exam notices ("editais"), working on layout blocks produced by a PDF
//! renderer.

pub mod extractors;
pub mod layout;
pub mod patterns;
pub mod pipeline;
pub mod record;
pub mod storage;
pub mod utils;

pub use extractors::{DataExtractor, ExtractionReport, SectionMap, SectionSegmenter};
pub use layout::{LayoutBlock, LayoutDocument, Page};
pub use patterns::{PatternLibrary, SectionTag};
pub use pipeline::{EditalProcessor, ProcessedEdital, ProcessorConfig};
pub use record::ExtractionResult;
