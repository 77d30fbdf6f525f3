// src/extractors/data.rs
//! Runs every field rule against its section text and assembles the record.
//!
//! Rules are isolated: each one gets its own outcome, and a failed rule only
//! leaves its own part of the record empty.

use crate::extractors::{
    identification::extract_identification, positions::extract_positions,
    registration::extract_registration, schedule::extract_schedule,
    syllabus::extract_syllabus, vacancies::extract_vacancies,
};
use crate::patterns::{PatternLibrary, SectionTag};
use crate::record::{
    Cargo, ConteudoProgramatico, EventoCronograma, ExtractionResult, Identificacao, Inscricao, Vagas,
};
use crate::utils::error::ExtractError;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;

/// Section tag to concatenated section text.
pub type SectionTexts = IndexMap<SectionTag, String>;

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Run field groups on the rayon pool.
    pub parallel: bool,
    /// Feed the syllabus parser with every syllabus-related run, not only
    /// the `conteudo_programatico` section.
    pub merge_syllabus_sections: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self { parallel: true, merge_syllabus_sections: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldGroup {
    Identificacao,
    Cronograma,
    Inscricao,
    Cargos,
    Vagas,
    Requisitos,
    Remuneracao,
    ConteudoProgramatico,
}

impl FieldGroup {
    pub const ALL: [FieldGroup; 8] = [
        FieldGroup::Identificacao,
        FieldGroup::Cronograma,
        FieldGroup::Inscricao,
        FieldGroup::Cargos,
        FieldGroup::Vagas,
        FieldGroup::Requisitos,
        FieldGroup::Remuneracao,
        FieldGroup::ConteudoProgramatico,
    ];
}

/// What happened to one field group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Extracted,
    /// The section was there but the rule found nothing.
    NotFound,
    /// None of the sections the rule reads were present.
    SectionMissing,
    Failed(ExtractError),
}

impl RuleOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, RuleOutcome::Failed(_))
    }
}

impl fmt::Display for RuleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleOutcome::Extracted => f.write_str("extracted"),
            RuleOutcome::NotFound => f.write_str("not_found"),
            RuleOutcome::SectionMissing => f.write_str("section_missing"),
            RuleOutcome::Failed(e) => write!(f, "failed: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum GroupValue {
    Identificacao(Identificacao),
    Cronograma(Vec<EventoCronograma>),
    Inscricao(Inscricao),
    Cargos(Vec<Cargo>),
    Vagas(IndexMap<String, Vagas>),
    Requisitos(IndexMap<String, String>),
    Remuneracao(IndexMap<String, String>),
    ConteudoProgramatico(ConteudoProgramatico),
}

/// The record plus how each field group fared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionReport {
    pub result: ExtractionResult,
    pub outcomes: IndexMap<FieldGroup, RuleOutcome>,
}

impl ExtractionReport {
    pub fn outcome(&self, group: FieldGroup) -> Option<&RuleOutcome> {
        self.outcomes.get(&group)
    }

    pub fn failures(&self) -> Vec<(FieldGroup, &ExtractError)> {
        self.outcomes
            .iter()
            .filter_map(|(g, o)| match o {
                RuleOutcome::Failed(e) => Some((*g, e)),
                _ => None,
            })
            .collect()
    }
}

pub struct DataExtractor<'p> {
    patterns: &'p PatternLibrary,
    config: ExtractorConfig,
}

impl<'p> DataExtractor<'p> {
    pub fn new(patterns: &'p PatternLibrary, config: ExtractorConfig) -> Self {
        Self { patterns, config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extracts every field group from the section texts.
    pub fn extract(&self, texts: &SectionTexts) -> ExtractionReport {
        let results: Vec<(FieldGroup, RuleOutcome, Option<GroupValue>)> = if self.config.parallel {
            FieldGroup::ALL.par_iter().map(|g| self.run_group(*g, texts)).collect()
        } else {
            FieldGroup::ALL.iter().map(|g| self.run_group(*g, texts)).collect()
        };

        let mut report = ExtractionReport::default();
        for (group, outcome, value) in results {
            match &outcome {
                RuleOutcome::Failed(e) => tracing::warn!("Rule for {:?} failed: {}", group, e),
                other => tracing::debug!("Rule for {:?}: {}", group, other),
            }
            if let Some(value) = value {
                report.result.apply(value);
            }
            report.outcomes.insert(group, outcome);
        }

        tracing::info!(
            "Structured data extraction finished ({} failed rules)",
            report.failures().len()
        );
        report
    }

    fn run_group(
        &self,
        group: FieldGroup,
        texts: &SectionTexts,
    ) -> (FieldGroup, RuleOutcome, Option<GroupValue>) {
        let p = self.patterns;
        let (outcome, value) = match group {
            FieldGroup::Identificacao => {
                let source = identification_text(texts);
                run_rule(source.as_ref(), |t| extract_identification(p, t), GroupValue::Identificacao)
            }
            FieldGroup::Cronograma => run_rule(
                texts.get(&SectionTag::Cronograma),
                |t| extract_schedule(p, t),
                GroupValue::Cronograma,
            ),
            FieldGroup::Inscricao => run_rule(
                texts.get(&SectionTag::Inscricao),
                |t| extract_registration(p, t),
                GroupValue::Inscricao,
            ),
            FieldGroup::Cargos => run_rule(
                texts.get(&SectionTag::Cargos),
                |t| extract_positions(p, t),
                GroupValue::Cargos,
            ),
            FieldGroup::Vagas => run_rule(
                texts.get(&SectionTag::Vagas),
                |t| extract_vacancies(p, t),
                GroupValue::Vagas,
            ),
            FieldGroup::Requisitos => self.position_map(texts, SectionTag::Requisitos, |c| c.requisitos, GroupValue::Requisitos),
            FieldGroup::Remuneracao => self.position_map(texts, SectionTag::Remuneracao, |c| c.remuneracao, GroupValue::Remuneracao),
            FieldGroup::ConteudoProgramatico => run_rule(
                texts.get(&SectionTag::ConteudoProgramatico),
                |t| extract_syllabus(p, t),
                GroupValue::ConteudoProgramatico,
            ),
        };
        (group, outcome, value)
    }

    /// Position name to one per-position detail, read from the positions
    /// section and then from the section dedicated to that detail.
    fn position_map(
        &self,
        texts: &SectionTexts,
        dedicated: SectionTag,
        pick: fn(Cargo) -> Option<String>,
        wrap: fn(IndexMap<String, String>) -> GroupValue,
    ) -> (RuleOutcome, Option<GroupValue>) {
        let sources: Vec<&String> = [SectionTag::Cargos, dedicated]
            .iter()
            .filter_map(|tag| texts.get(tag))
            .collect();
        if sources.is_empty() {
            return (RuleOutcome::SectionMissing, None);
        }

        let mut map = IndexMap::new();
        for text in sources {
            match extract_positions(self.patterns, text) {
                Ok(found) => {
                    for cargo in found.unwrap_or_default() {
                        let nome = cargo.nome.clone();
                        if let Some(detail) = pick(cargo) {
                            map.entry(nome).or_insert(detail);
                        }
                    }
                }
                Err(e) => return (RuleOutcome::Failed(e), None),
            }
        }

        if map.is_empty() {
            (RuleOutcome::NotFound, None)
        } else {
            (RuleOutcome::Extracted, Some(wrap(map)))
        }
    }
}

/// Header and `identificacao` texts joined in reading order.
fn identification_text(texts: &SectionTexts) -> Option<String> {
    let parts: Vec<&str> = texts
        .iter()
        .filter(|(tag, _)| matches!(tag, SectionTag::Header | SectionTag::Identificacao))
        .map(|(_, text)| text.as_str())
        .collect();
    (!parts.is_empty()).then(|| parts.join("\n"))
}

fn run_rule<T>(
    source: Option<&String>,
    rule: impl FnOnce(&str) -> Result<Option<T>, ExtractError>,
    wrap: fn(T) -> GroupValue,
) -> (RuleOutcome, Option<GroupValue>) {
    let Some(text) = source else {
        return (RuleOutcome::SectionMissing, None);
    };
    match rule(text) {
        Ok(Some(value)) => (RuleOutcome::Extracted, Some(wrap(value))),
        Ok(None) => (RuleOutcome::NotFound, None),
        Err(e) => (RuleOutcome::Failed(e), None),
    }
}

impl ExtractionResult {
    fn apply(&mut self, value: GroupValue) {
        match value {
            GroupValue::Identificacao(v) => self.identificacao = v,
            GroupValue::Cronograma(v) => self.cronograma = v,
            GroupValue::Inscricao(v) => self.inscricao = v,
            GroupValue::Cargos(v) => self.cargos = v,
            GroupValue::Vagas(v) => self.vagas = v,
            GroupValue::Requisitos(v) => self.requisitos = v,
            GroupValue::Remuneracao(v) => self.remuneracao = v,
            GroupValue::ConteudoProgramatico(v) => self.conteudo_programatico = v,
        }
    }
}
