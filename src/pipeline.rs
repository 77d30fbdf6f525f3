// src/pipeline.rs
//! Layout pages in, sections and structured record out.

use crate::extractors::{
    DataExtractor, ExtractionReport, ExtractorConfig, SectionMap, SectionSegmenter, SectionTexts,
    SegmenterConfig,
};
use crate::layout::{LayoutBlock, LayoutDocument, Page};
use crate::patterns::{PatternLibrary, SectionTag};

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub segmenter: SegmenterConfig,
    pub extractor: ExtractorConfig,
    /// Read recognised text for scanned pages; when off, pages that only
    /// carry recognised text are skipped.
    pub use_ocr_pages: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            segmenter: SegmenterConfig::default(),
            extractor: ExtractorConfig::default(),
            use_ocr_pages: true,
        }
    }
}

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct ProcessedEdital {
    pub source: Option<String>,
    pub page_count: usize,
    /// Page number and the text that was segmented for it.
    pub page_texts: Vec<(usize, String)>,
    pub scanned_pages: Vec<usize>,
    pub sections: SectionMap,
    pub report: ExtractionReport,
}

pub struct EditalProcessor<'p> {
    patterns: &'p PatternLibrary,
    config: ProcessorConfig,
}

impl<'p> EditalProcessor<'p> {
    pub fn new(patterns: &'p PatternLibrary, config: ProcessorConfig) -> Self {
        Self { patterns, config }
    }

    pub fn process(&self, doc: &LayoutDocument) -> ProcessedEdital {
        tracing::info!(
            "Processing {} ({} pages)",
            doc.source.as_deref().unwrap_or("<layout>"),
            doc.pages.len()
        );

        let pages: Vec<Page> = doc
            .pages
            .iter()
            .filter(|page| self.config.use_ocr_pages || !is_ocr_only(page))
            .cloned()
            .collect();
        if pages.len() < doc.pages.len() {
            tracing::warn!(
                "Skipping {} pages that only carry recognised text",
                doc.pages.len() - pages.len()
            );
        }

        let sections = self.segment(&pages);
        let texts = self.section_texts(&sections);
        let report = DataExtractor::new(self.patterns, self.config.extractor.clone()).extract(&texts);

        let page_texts = pages
            .iter()
            .map(|page| (page.number, page_text(&page.effective_blocks(self.config.use_ocr_pages))))
            .collect();

        ProcessedEdital {
            source: doc.source.clone(),
            page_count: doc.pages.len(),
            page_texts,
            scanned_pages: doc.scanned_pages(),
            sections,
            report,
        }
    }

    pub fn segment(&self, pages: &[Page]) -> SectionMap {
        let mut segmenter = SectionSegmenter::new(self.patterns, self.config.segmenter.clone());
        segmenter.segment_pages(pages, self.config.use_ocr_pages, self.config.extractor.parallel);
        segmenter.finish()
    }

    /// Section texts handed to the field rules. With syllabus merging on,
    /// `conteudo_programatico` carries every syllabus-related run.
    pub fn section_texts(&self, sections: &SectionMap) -> SectionTexts {
        let mut texts = sections.texts();
        if self.config.extractor.merge_syllabus_sections {
            if let Some(syllabus) = sections.syllabus_text() {
                texts.insert(SectionTag::ConteudoProgramatico, syllabus);
            }
        }
        texts
    }
}

fn is_ocr_only(page: &Page) -> bool {
    page.blocks.is_empty() && page.ocr_text.is_some()
}

fn page_text(blocks: &[LayoutBlock]) -> String {
    blocks
        .iter()
        .filter(|b| b.is_text())
        .map(LayoutBlock::text)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{FieldGroup, RuleOutcome};
    use crate::layout::PageProfile;
    use crate::record::UNSCOPED_KEY;

    fn processor(config: ProcessorConfig) -> EditalProcessor<'static> {
        EditalProcessor::new(PatternLibrary::shared(), config)
    }

    fn block(text: &str) -> LayoutBlock {
        LayoutBlock::text_lines(text.lines().map(str::to_string))
    }

    fn sample_document() -> LayoutDocument {
        LayoutDocument {
            source: Some("edital.pdf".to_string()),
            pages: vec![
                Page::new(
                    0,
                    vec![
                        block("PREFEITURA MUNICIPAL DE SANTA LUZIA\nEDITAL Nº 12/2024\nCONCURSO PÚBLICO 2024"),
                        block("Organização: Instituto AOCP"),
                        block("DO CRONOGRAMA"),
                        block("01/03/2024 a 15/03/2024 - Inscrições\n05/05/2024 - Prova objetiva"),
                    ],
                ),
                Page::new(
                    1,
                    vec![
                        block("DAS INSCRIÇÕES"),
                        block("Taxa de inscrição: R$ 120,00"),
                        LayoutBlock::non_text(),
                        block("DOS CARGOS"),
                        block("CARGO: ENFERMEIRO - Requisitos: Graduação em Enfermagem.\nRemuneração: R$ 4.500,00"),
                    ],
                ),
                Page::new(
                    2,
                    vec![
                        block("DAS VAGAS"),
                        block("CARGO: ENFERMEIRO -\n6 vagas, sendo 1 para pessoas com deficiência e 1 para candidatos negros"),
                        block("ANEXO II - CONTEÚDO PROGRAMÁTICO"),
                        block("CONHECIMENTOS BÁSICOS"),
                        block("PORTUGUÊS\n1. Ortografia\n2. Crase"),
                        block("CONHECIMENTOS ESPECÍFICOS"),
                        block("SAÚDE PÚBLICA\n1. SUS"),
                    ],
                ),
            ],
        }
    }

    #[test]
    fn test_end_to_end() {
        let out = processor(ProcessorConfig::default()).process(&sample_document());
        assert_eq!(out.page_count, 3);
        assert_eq!(out.page_texts.len(), 3);

        let r = &out.report.result;
        assert_eq!(r.identificacao.numero_edital.as_deref(), Some("12/2024"));
        assert_eq!(r.identificacao.ano.as_deref(), Some("2024"));
        assert_eq!(r.identificacao.banca.as_deref(), Some("AOCP"));
        assert_eq!(r.cronograma.len(), 2);
        assert_eq!(r.cronograma[0].data, "01/03/2024 a 15/03/2024");
        assert_eq!(r.inscricao.taxa.as_deref(), Some("120,00"));
        assert_eq!(r.cargos.len(), 1);
        assert_eq!(r.remuneracao["ENFERMEIRO"], "4.500,00");
        let vagas = r.vagas["ENFERMEIRO"];
        assert_eq!((vagas.total, vagas.pcd, vagas.negros), (6, 1, 1));

        let syllabus = &r.conteudo_programatico;
        assert_eq!(syllabus.conhecimentos_basicos.len(), 1);
        assert_eq!(syllabus.conhecimentos_basicos[0].topicos, vec!["Ortografia", "Crase"]);
        assert_eq!(syllabus.specific(UNSCOPED_KEY).map(|d| d.len()), Some(1));
        assert!(out.report.failures().is_empty());
    }

    #[test]
    fn test_every_text_block_lands_in_one_section() {
        let doc = sample_document();
        let out = processor(ProcessorConfig::default()).process(&doc);
        let text_blocks: usize = doc
            .pages
            .iter()
            .map(|p| p.blocks.iter().filter(|b| b.is_text()).count())
            .sum();
        assert_eq!(out.sections.total_blocks(), text_blocks);
    }

    #[test]
    fn test_without_syllabus_merge_headings_split_the_syllabus() {
        let mut config = ProcessorConfig::default();
        config.extractor.merge_syllabus_sections = false;
        let out = processor(config).process(&sample_document());
        assert!(out.report.result.conteudo_programatico.conhecimentos_basicos.is_empty());
        assert!(out.report.result.conteudo_programatico.conhecimentos_especificos.is_empty());
        assert_eq!(
            out.report.outcome(FieldGroup::ConteudoProgramatico),
            Some(&RuleOutcome::NotFound)
        );
    }

    #[test]
    fn test_sequential_matches_parallel() {
        let doc = sample_document();
        let parallel = processor(ProcessorConfig::default()).process(&doc);
        let mut config = ProcessorConfig::default();
        config.extractor.parallel = false;
        let sequential = processor(config).process(&doc);
        assert_eq!(parallel.sections, sequential.sections);
        assert_eq!(parallel.report, sequential.report);
    }

    #[test]
    fn test_ocr_pages() {
        let mut scanned = Page::new(1, vec![]);
        scanned.ocr_text = Some("Taxa de inscrição: R$ 60,00\nPagamento em qualquer agência".to_string());
        scanned.profile = Some(PageProfile { text_chars: 0, page_area: 100.0, image_areas: vec![90.0] });
        let doc = LayoutDocument {
            source: None,
            pages: vec![
                Page::new(0, vec![block("EDITAL Nº 1/2024"), block("DAS INSCRIÇÕES")]),
                scanned,
            ],
        };

        let out = processor(ProcessorConfig::default()).process(&doc);
        assert_eq!(out.scanned_pages, vec![1]);
        assert_eq!(out.report.result.inscricao.taxa.as_deref(), Some("60,00"));

        let config = ProcessorConfig { use_ocr_pages: false, ..ProcessorConfig::default() };
        let out = processor(config).process(&doc);
        assert_eq!(out.page_texts.len(), 1);
        assert!(out.report.result.inscricao.taxa.is_none());
    }

    #[test]
    fn test_empty_document() {
        let out = processor(ProcessorConfig::default()).process(&LayoutDocument::default());
        assert_eq!(out.sections.total_blocks(), 0);
        assert!(out.report.result.cargos.is_empty());
        assert_eq!(out.report.outcome(FieldGroup::Cargos), Some(&RuleOutcome::SectionMissing));
    }
}
