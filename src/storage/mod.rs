// src/storage/mod.rs
use crate::patterns::PatternLibrary;
use crate::pipeline::ProcessedEdital;
use crate::utils::error::StorageError;
use crate::utils::text_debug;
use indexmap::IndexMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const TEXT_FILE: &str = "texto_extraido.txt";
pub const SECTIONS_FILE: &str = "secoes_extraidas.txt";
pub const DATA_FILE: &str = "dados_extraidos.json";
pub const METADATA_FILE: &str = "metadados.json";
pub const DEBUG_DIR: &str = "debug";

/// Paths of the files written for one run.
#[derive(Debug, Clone)]
pub struct SavedFiles {
    pub text_file: PathBuf,
    pub sections_file: PathBuf,
    pub data_file: PathBuf,
    pub metadata_file: PathBuf,
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Writes every result file of a run.
    pub fn save_all(&self, processed: &ProcessedEdital) -> Result<SavedFiles, StorageError> {
        let saved = SavedFiles {
            text_file: self.save_text(processed)?,
            sections_file: self.save_sections(processed)?,
            data_file: self.save_data(processed)?,
            metadata_file: self.save_metadata(processed)?,
        };
        tracing::info!("Results saved to {}", self.base_dir.display());
        Ok(saved)
    }

    /// Per-page text, each page under a `=== PÁGINA n ===` banner.
    pub fn save_text(&self, processed: &ProcessedEdital) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(TEXT_FILE);
        let mut file = fs::File::create(&file_path)?;
        for (number, text) in &processed.page_texts {
            write!(file, "=== PÁGINA {} ===\n{}\n\n", number + 1, text)?;
        }
        tracing::debug!("Saved page text to {}", file_path.display());
        Ok(file_path)
    }

    /// Per-section text, each section under a `=== SEÇÃO: tag ===` banner.
    pub fn save_sections(&self, processed: &ProcessedEdital) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(SECTIONS_FILE);
        let mut file = fs::File::create(&file_path)?;
        for (tag, section) in &processed.sections.sections {
            write!(file, "=== SEÇÃO: {} ===\n{}\n\n", tag, section.text())?;
        }
        tracing::debug!("Saved sections to {}", file_path.display());
        Ok(file_path)
    }

    /// The structured record as pretty JSON.
    pub fn save_data(&self, processed: &ProcessedEdital) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(DATA_FILE);
        let json = serde_json::to_string_pretty(&processed.report.result)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, json)?;
        tracing::debug!("Saved structured data to {}", file_path.display());
        Ok(file_path)
    }

    /// Run metadata: pages, sections, rule outcomes and a timestamp.
    pub fn save_metadata(&self, processed: &ProcessedEdital) -> Result<PathBuf, StorageError> {
        let file_path = self.base_dir.join(METADATA_FILE);

        let outcomes: IndexMap<String, String> = processed
            .report
            .outcomes
            .iter()
            .map(|(group, outcome)| {
                let key = serde_json::to_value(group)
                    .ok()
                    .and_then(|v| v.as_str().map(str::to_string))
                    .unwrap_or_else(|| format!("{:?}", group));
                (key, outcome.to_string())
            })
            .collect();
        let sections: IndexMap<String, usize> = processed
            .sections
            .sections
            .iter()
            .map(|(tag, s)| (tag.to_string(), s.blocks.len()))
            .collect();

        let metadata = serde_json::json!({
            "source": processed.source,
            "page_count": processed.page_count,
            "scanned_pages": processed.scanned_pages.iter().map(|p| p + 1).collect::<Vec<_>>(),
            "sections": sections,
            "runs": processed.sections.runs,
            "rule_outcomes": outcomes,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, metadata_str)?;

        tracing::debug!("Saved metadata to {}", file_path.display());
        Ok(file_path)
    }

    /// One annotated HTML page per section under `debug/`.
    pub fn save_debug(
        &self,
        patterns: &PatternLibrary,
        processed: &ProcessedEdital,
    ) -> Result<Vec<PathBuf>, StorageError> {
        let debug_dir = self.base_dir.join(DEBUG_DIR);
        fs::create_dir_all(&debug_dir)?;

        let mut written = Vec::new();
        for (tag, section) in &processed.sections.sections {
            let path = debug_dir.join(format!("{}.html", tag));
            text_debug::save_debug_html(patterns, tag.as_str(), &section.text(), &path)?;
            written.push(path);
        }
        tracing::info!("Saved {} annotated sections to {}", written.len(), debug_dir.display());
        Ok(written)
    }
}
