// src/extractors/mod.rs
pub mod data;
pub mod identification;
pub mod positions;
pub mod registration;
pub mod schedule;
pub mod section;
pub mod syllabus;
pub mod vacancies;

// Re-export key extraction types for convenience
pub use data::{DataExtractor, ExtractionReport, ExtractorConfig, FieldGroup, RuleOutcome, SectionTexts};
pub use section::{Section, SectionMap, SectionRun, SectionSegmenter, SegmenterConfig};
