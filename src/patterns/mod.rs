// src/patterns/mod.rs
//! The pattern library: section headings, keyword lists and value patterns.
//!
//! Built once and shared by reference between the segmenter and the field
//! extractor. Nothing in here changes after construction, so one library can
//! serve any number of concurrent document runs.

use crate::utils::error::PatternError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Upper-case letters accepted in position names and discipline headings.
const UPPER_CLASS: &str = r"A-ZÁÀÂÃÉÈÊÍÏÓÔÕÖÚÇÑ";

// --- Keyword lists (order matters: first hit wins) ---
pub const FEE_KEYWORDS: &[&str] = &[
    "taxa de inscrição",
    "valor da taxa",
    "valor da inscrição",
    "taxa de participação",
    "valor a ser pago",
];

pub const PERIOD_KEYWORDS: &[&str] = &[
    "período de inscrição",
    "prazo para inscrição",
    "data de inscrição",
    "inscrições serão realizadas",
    "inscrições estarão abertas",
];

pub const REQUIREMENT_KEYWORDS: &[&str] = &[
    "requisitos",
    "escolaridade",
    "formação mínima",
    "formação exigida",
    "pré-requisitos",
    "qualificação necessária",
];

pub const REMUNERATION_KEYWORDS: &[&str] = &[
    "remuneração",
    "vencimento básico",
    "salário",
    "vencimentos",
    "subsídio",
    "valor do salário",
];

/// Lines holding any of these terms are scanned for a fee when no keyword rule matched.
pub const FEE_FALLBACK_TERMS: &[&str] = &["taxa", "inscrição", "pagamento"];

/// Known organizing boards, tested in this order.
pub const BANCAS: &[&str] = &[
    "FGV",
    "CEBRASPE",
    "CESPE",
    "FCC",
    "VUNESP",
    "CESGRANRIO",
    "IBFC",
    "IADES",
    "AOCP",
    "QUADRIX",
    "CONSULPLAN",
    "IDECAN",
    "FUNDATEC",
];

/// Logical section of an edital.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionTag {
    Header,
    Identificacao,
    Cronograma,
    Inscricao,
    Cargos,
    Vagas,
    Requisitos,
    Remuneracao,
    ConteudoProgramatico,
    ConhecimentosBasicos,
    ConhecimentosEspecificos,
}

impl SectionTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionTag::Header => "header",
            SectionTag::Identificacao => "identificacao",
            SectionTag::Cronograma => "cronograma",
            SectionTag::Inscricao => "inscricao",
            SectionTag::Cargos => "cargos",
            SectionTag::Vagas => "vagas",
            SectionTag::Requisitos => "requisitos",
            SectionTag::Remuneracao => "remuneracao",
            SectionTag::ConteudoProgramatico => "conteudo_programatico",
            SectionTag::ConhecimentosBasicos => "conhecimentos_basicos",
            SectionTag::ConhecimentosEspecificos => "conhecimentos_especificos",
        }
    }

    /// Tags whose text feeds the syllabus parser.
    pub fn is_syllabus(&self) -> bool {
        matches!(
            self,
            SectionTag::ConteudoProgramatico
                | SectionTag::ConhecimentosBasicos
                | SectionTag::ConhecimentosEspecificos
        )
    }
}

impl fmt::Display for SectionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A keyword together with the regex built from it.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub keyword: &'static str,
    pub regex: Regex,
}

#[derive(Debug, Clone)]
pub struct PatternLibrary {
    /// Heading patterns in the order they are tested.
    pub sections: Vec<(SectionTag, Regex)>,

    // Dates and money
    pub date_slash: Regex,
    pub date_dash: Regex,
    pub date_range: Regex,
    pub date_written: Regex,
    pub money: Regex,

    // Identification
    pub edital_number: Regex,
    pub contest_year: Regex,
    pub bancas: Vec<KeywordRule>,

    // Registration
    pub period_rules: Vec<KeywordRule>,
    pub fee_rules: Vec<KeywordRule>,

    // Positions
    pub position_header: Regex,
    pub requirement_rules: Vec<KeywordRule>,
    pub remuneration_rules: Vec<KeywordRule>,

    // Vacancies
    pub vacancy_count: Regex,
    pub quota_ampla: Regex,
    pub quota_pcd: Regex,
    pub quota_negros: Regex,

    // Syllabus
    pub syllabus_basic: Regex,
    pub syllabus_specific: Regex,
    pub discipline: Regex,
    pub list_marker: Regex,
}

static SHARED: Lazy<PatternLibrary> =
    Lazy::new(|| PatternLibrary::new().expect("Failed to compile built-in pattern library"));

fn compile(name: &str, pattern: &str) -> Result<Regex, PatternError> {
    Regex::new(pattern).map_err(|source| PatternError::Compile {
        name: name.to_string(),
        source,
    })
}

fn keyword_rules(
    name: &str,
    keywords: &[&'static str],
    template: impl Fn(&str) -> String,
) -> Result<Vec<KeywordRule>, PatternError> {
    keywords
        .iter()
        .map(|&keyword| {
            let regex = compile(name, &template(&regex::escape(keyword)))?;
            Ok(KeywordRule { keyword, regex })
        })
        .collect()
}

impl PatternLibrary {
    pub fn new() -> Result<Self, PatternError> {
        let section_sources: [(SectionTag, &str); 10] = [
            (SectionTag::Identificacao, r"(?i)EDITAL\s+(?:N[º°\.])?\s*(\d+[/-]\d{4})"),
            (SectionTag::Cronograma, r"(?i)\b(CRONOGRAMA|DATAS\s+IMPORTANTES|CALEND[ÁA]RIO)\b"),
            (SectionTag::Inscricao, r"(?i)\b(INSCRI[ÇC][ÃA]O|DAS\s+INSCRI[ÇC][ÕO]ES)\b"),
            (SectionTag::Cargos, r"(?i)\b(CARGOS|DOS\s+CARGOS|QUADRO\s+DE\s+CARGOS)\b"),
            (
                SectionTag::Vagas,
                r"(?i)\b(VAGAS|DAS\s+VAGAS|QUADRO\s+DE\s+VAGAS|DISTRIBUI[ÇC][ÃA]O\s+DAS\s+VAGAS)\b",
            ),
            (SectionTag::Requisitos, r"(?i)\b(REQUISITOS|DOS\s+REQUISITOS|REQUISITOS\s+M[ÍI]NIMOS)\b"),
            (
                SectionTag::Remuneracao,
                r"(?i)\b(REMUNERA[ÇC][ÃA]O|DA\s+REMUNERA[ÇC][ÃA]O|VENCIMENTOS)\b",
            ),
            (
                SectionTag::ConteudoProgramatico,
                r"(?i)\b(CONTE[ÚU]DO\s+PROGRAM[ÁA]TICO|ANEXO\s+.*CONTE[ÚU]DO|PROGRAMA\s+DE\s+PROVAS)\b",
            ),
            (
                SectionTag::ConhecimentosBasicos,
                r"(?i)\b(CONHECIMENTOS\s+B[ÁA]SICOS|CONHECIMENTOS\s+GERAIS)\b",
            ),
            (SectionTag::ConhecimentosEspecificos, r"(?i)\b(CONHECIMENTOS\s+ESPEC[ÍI]FICOS)\b"),
        ];
        let sections = section_sources
            .iter()
            .map(|(tag, pat)| Ok((*tag, compile(tag.as_str(), pat)?)))
            .collect::<Result<Vec<_>, PatternError>>()?;

        let date = r"(?:0[1-9]|[12][0-9]|3[01])/(?:0[1-9]|1[0-2])/(?:19\d{2}|20\d{2})";
        let loose_date = r"(\d{1,2}/\d{1,2}/\d{4})";
        let position_header = format!(
            r"(?i:CARGO|FUNÇÃO)(?:\s*:|\s+(?i:DE)\b|\s+)\s*([{UPPER_CLASS}\s]+)(?:\s*-|\s*:|\s*\n)"
        );

        Ok(Self {
            sections,

            date_slash: compile("date_slash", &format!(r"\b{date}\b"))?,
            date_dash: compile(
                "date_dash",
                r"\b(?:0[1-9]|[12][0-9]|3[01])-(?:0[1-9]|1[0-2])-(?:19\d{2}|20\d{2})\b",
            )?,
            date_range: compile("date_range", &format!(r"\b{date}\s+a\s+{date}\b"))?,
            date_written: compile(
                "date_written",
                r"(?i)\b(?:0?[1-9]|[12][0-9]|3[01])\s+de\s+(?:janeiro|fevereiro|mar[çc]o|abril|maio|junho|julho|agosto|setembro|outubro|novembro|dezembro)\s+de\s+(?:19\d{2}|20\d{2})\b",
            )?,
            money: compile("money", r"R\$\s?(\d{1,3}(?:\.\d{3})*,\d{2})\b")?,

            edital_number: compile("edital_number", r"(?i)EDITAL\s+(?:N[º°\.])?\s*(\d+[/-]\d{4})")?,
            contest_year: compile("contest_year", r"(?i)(?:CONCURSO|SELE[ÇC][ÃA]O).*?(\d{4})")?,
            bancas: keyword_rules("banca", BANCAS, |kw| format!(r"(?i)\b{kw}\b"))?,

            period_rules: keyword_rules("period", PERIOD_KEYWORDS, |kw| {
                format!(r"(?i)(?:{kw}).*?{loose_date}\s*(?:a|até|e)\s*{loose_date}")
            })?,
            fee_rules: keyword_rules("fee", FEE_KEYWORDS, |kw| {
                format!(r"(?i)(?:{kw}).*?R\$\s?(\d{{1,3}}(?:\.\d{{3}})*,\d{{2}})")
            })?,

            position_header: compile("position_header", &position_header)?,
            requirement_rules: keyword_rules("requirement", REQUIREMENT_KEYWORDS, |kw| {
                format!(r"(?i:{kw})(?:\s*:|\s*-|\s*)\s*(?s:(.*?))(?:\n\s*\n|\n\p{{Lu}}\p{{Ll}}+:|\z)")
            })?,
            remuneration_rules: keyword_rules("remuneration", REMUNERATION_KEYWORDS, |kw| {
                format!(r"(?i){kw}")
            })?,

            vacancy_count: compile("vacancy_count", r"(?i)(\d+)\s+(?:vagas|vaga)")?,
            quota_ampla: compile(
                "quota_ampla",
                r"(?i)(\d+)\s+(?:vagas|vaga)?\s*(?:para)?\s*(?:ampla\s+concorr[êe]ncia|AC\b)",
            )?,
            quota_pcd: compile(
                "quota_pcd",
                r"(?i)(\d+)\s+(?:vagas|vaga)?\s*(?:para)?\s*(?:pessoas?|candidatos?)?\s*(?:com)?\s*(?:defici[êe]ncia|PcD\b)",
            )?,
            quota_negros: compile(
                "quota_negros",
                r"(?i)(\d+)\s+(?:vagas|vaga)?\s*(?:para)?\s*(?:pessoas?|candidatos?)?\s*(?:negras?|negros?|pretas?|pretos?|pardas?|pardos?)",
            )?,

            syllabus_basic: compile(
                "syllabus_basic",
                r"(?i)\b(CONHECIMENTOS\s+B[ÁA]SICOS|CONHECIMENTOS\s+GERAIS)\b",
            )?,
            syllabus_specific: compile(
                "syllabus_specific",
                r"(?i)\b(CONHECIMENTOS\s+ESPEC[ÍI]FICOS)(?:\s*(?:PARA|DO|DE|-)?\s*(.+))?\b",
            )?,
            discipline: compile("discipline", &format!(r"^[{UPPER_CLASS}\s]{{3,50}}:?$"))?,
            list_marker: compile(
                "list_marker",
                r"^\s*(?:[a-zA-Z][\.\)]\s+|[ivxlcdmIVXLCDM]+[\.\)]\s+|[\d\.\)\-•*]+\s*)",
            )?,
        })
    }

    /// Process-wide default library. Immutable; callers still pass it explicitly.
    pub fn shared() -> &'static PatternLibrary {
        &SHARED
    }

    /// First section tag whose heading pattern matches `text`.
    pub fn match_section(&self, text: &str) -> Option<SectionTag> {
        self.sections
            .iter()
            .find(|(_, re)| re.is_match(text))
            .map(|(tag, _)| *tag)
    }

    /// Strips a leading list marker ("1.", "a)", "iv.", "•", "-") from a syllabus line.
    pub fn strip_list_marker<'a>(&self, line: &'a str) -> &'a str {
        match self.list_marker.find(line) {
            Some(m) => line[m.end()..].trim(),
            None => line.trim(),
        }
    }
}
