// src/extractors/syllabus.rs
//! Line-oriented state machine for the syllabus ("conteúdo programático").
//!
//! Headings switch between basic and specific knowledge, upper-case lines
//! open a discipline, and every other line is a topic of the open
//! discipline. Pending topics are flushed on every transition and at the end
//! of input, so a discipline with at least one topic is never lost.

use crate::patterns::PatternLibrary;
use crate::record::{ConteudoProgramatico, Disciplina, UNSCOPED_KEY};
use crate::utils::error::ExtractError;

/// Discipline headings must be shorter than this.
const MAX_DISCIPLINE_LEN: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Knowledge {
    None,
    Basic,
    /// Specific knowledge, optionally scoped to a position.
    Specific(Option<String>),
}

/// Working state of one parse. Lives for a single call.
#[derive(Debug)]
struct SyllabusParser<'p> {
    patterns: &'p PatternLibrary,
    knowledge: Knowledge,
    discipline: Option<String>,
    topics: Vec<String>,
    out: ConteudoProgramatico,
}

impl<'p> SyllabusParser<'p> {
    fn new(patterns: &'p PatternLibrary) -> Self {
        Self {
            patterns,
            knowledge: Knowledge::None,
            discipline: None,
            topics: Vec::new(),
            out: ConteudoProgramatico::default(),
        }
    }

    fn feed(&mut self, raw: &str) {
        let line = raw.trim();
        if line.is_empty() {
            return;
        }

        if self.patterns.syllabus_basic.is_match(line) {
            self.switch(Knowledge::Basic);
            return;
        }

        if let Some(caps) = self.patterns.syllabus_specific.captures(line) {
            let scope = caps
                .get(2)
                .map(|m| m.as_str().trim().trim_end_matches(':').trim().to_string())
                .filter(|s| !s.is_empty());
            self.switch(Knowledge::Specific(scope));
            return;
        }

        if line.chars().count() < MAX_DISCIPLINE_LEN && self.patterns.discipline.is_match(line) {
            self.flush();
            self.discipline = Some(line.trim_end_matches(':').trim().to_string());
            return;
        }

        if self.knowledge != Knowledge::None && self.discipline.is_some() {
            let topic = self.patterns.strip_list_marker(line);
            if !topic.is_empty() {
                self.topics.push(topic.to_string());
            }
        }
    }

    fn switch(&mut self, knowledge: Knowledge) {
        self.flush();
        tracing::trace!("Syllabus state: {:?}", knowledge);
        self.knowledge = knowledge;
        self.discipline = None;
    }

    /// Moves the open discipline and its topics into the bucket of the current state.
    fn flush(&mut self) {
        let topics = std::mem::take(&mut self.topics);
        let Some(disciplina) = self.discipline.take() else { return };
        if topics.is_empty() {
            return;
        }
        let entry = Disciplina { disciplina, topicos: topics };
        match &self.knowledge {
            Knowledge::Basic => self.out.conhecimentos_basicos.push(entry),
            Knowledge::Specific(scope) => {
                let key = scope.clone().unwrap_or_else(|| UNSCOPED_KEY.to_string());
                self.out.conhecimentos_especificos.entry(key).or_default().push(entry);
            }
            Knowledge::None => {
                tracing::warn!("Discipline '{}' outside any knowledge section", entry.disciplina);
            }
        }
    }

    fn finish(mut self) -> ConteudoProgramatico {
        self.flush();
        self.out
    }
}

/// Basic disciplines and specific disciplines per position scope.
pub fn extract_syllabus(
    patterns: &PatternLibrary,
    text: &str,
) -> Result<Option<ConteudoProgramatico>, ExtractError> {
    let mut parser = SyllabusParser::new(patterns);
    for line in text.lines() {
        parser.feed(line);
    }
    let syllabus = parser.finish();
    tracing::debug!(
        "Syllabus: {} basic disciplines, {} specific scopes",
        syllabus.conhecimentos_basicos.len(),
        syllabus.conhecimentos_especificos.len()
    );
    Ok((!syllabus.is_empty()).then_some(syllabus))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run(text: &str) -> ConteudoProgramatico {
        extract_syllabus(PatternLibrary::shared(), text)
            .unwrap()
            .unwrap_or_default()
    }

    fn disc(name: &str, topics: &[&str]) -> Disciplina {
        Disciplina {
            disciplina: name.to_string(),
            topicos: topics.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_basic_and_scoped_specific() {
        let syllabus = run("CONHECIMENTOS BÁSICOS\nPORTUGUÊS\n1. Interpretação de texto\nCONHECIMENTOS ESPECÍFICOS PARA ANALISTA\nDIREITO\n1. Lei 8.112");
        assert_eq!(
            syllabus.conhecimentos_basicos,
            vec![disc("PORTUGUÊS", &["Interpretação de texto"])]
        );
        assert_eq!(
            syllabus.specific("ANALISTA").unwrap(),
            &[disc("DIREITO", &["Lei 8.112"])][..]
        );
    }

    #[test]
    fn test_unscoped_specific_knowledge() {
        let syllabus = run("CONHECIMENTOS ESPECÍFICOS:\nINFORMÁTICA:\n- Redes\n- Banco de dados");
        assert_eq!(
            syllabus.specific(UNSCOPED_KEY).unwrap(),
            &[disc("INFORMÁTICA", &["Redes", "Banco de dados"])][..]
        );
    }

    #[test]
    fn test_blank_lines_do_not_change_state() {
        let syllabus = run("CONHECIMENTOS GERAIS\n\nMATEMÁTICA\n\n1. Frações\n\n2. Porcentagem\n");
        assert_eq!(
            syllabus.conhecimentos_basicos,
            vec![disc("MATEMÁTICA", &["Frações", "Porcentagem"])]
        );
    }

    #[test]
    fn test_discipline_without_topics_is_not_emitted() {
        let syllabus = run("CONHECIMENTOS BÁSICOS\nPORTUGUÊS\nMATEMÁTICA\n1. Álgebra");
        assert_eq!(syllabus.conhecimentos_basicos, vec![disc("MATEMÁTICA", &["Álgebra"])]);
    }

    #[test]
    fn test_topics_before_any_section_are_ignored() {
        let syllabus = run("PORTUGUÊS\n1. Crase\nCONHECIMENTOS BÁSICOS\nHISTÓRIA\n1. Brasil Colônia");
        assert_eq!(syllabus.conhecimentos_basicos, vec![disc("HISTÓRIA", &["Brasil Colônia"])]);
    }

    #[test]
    fn test_scopes_accumulate_per_position() {
        let text = "CONHECIMENTOS ESPECÍFICOS PARA TÉCNICO\nREDES\n1. TCP/IP\nCONHECIMENTOS ESPECÍFICOS PARA ANALISTA\nDIREITO\n1. Lei 8.112\nCONHECIMENTOS ESPECÍFICOS PARA TÉCNICO\nHARDWARE\n1. Memória";
        let syllabus = run(text);
        let tecnico = syllabus.specific("TÉCNICO").unwrap();
        assert_eq!(tecnico.len(), 2);
        assert_eq!(tecnico[1], disc("HARDWARE", &["Memória"]));
        let keys: Vec<_> = syllabus.conhecimentos_especificos.keys().cloned().collect();
        assert_eq!(keys, vec!["TÉCNICO", "ANALISTA"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(extract_syllabus(PatternLibrary::shared(), "").unwrap().is_none());
    }

    proptest! {
        #[test]
        fn prop_every_discipline_with_topics_is_emitted_once(
            groups in prop::collection::vec(
                (any::<bool>(), 0usize..4, prop::collection::vec("[a-z][a-z ]{0,15}", 0..4)),
                1..8,
            )
        ) {
            let names = ["PORTUGUÊS", "MATEMÁTICA", "DIREITO", "INFORMÁTICA"];
            let mut text = String::new();
            let mut expected_basic = Vec::new();
            let mut expected_specific = Vec::new();
            for (i, (basic, name_idx, topics)) in groups.iter().enumerate() {
                let name = format!("{} {}", names[*name_idx], "I".repeat(i + 1));
                text.push_str(if *basic { "CONHECIMENTOS BÁSICOS\n" } else { "CONHECIMENTOS ESPECÍFICOS\n" });
                text.push_str(&name);
                text.push('\n');
                for t in topics {
                    text.push_str("1. ");
                    text.push_str(t);
                    text.push('\n');
                }
                let cleaned: Vec<String> = topics.iter().map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect();
                if !cleaned.is_empty() {
                    let d = Disciplina { disciplina: name, topicos: cleaned };
                    if *basic { expected_basic.push(d) } else { expected_specific.push(d) }
                }
            }
            let syllabus = run(&text);
            prop_assert_eq!(syllabus.conhecimentos_basicos, expected_basic);
            let specific = syllabus.conhecimentos_especificos.get(UNSCOPED_KEY).cloned().unwrap_or_default();
            prop_assert_eq!(specific, expected_specific);
        }
    }
}
