// src/extractors/identification.rs
use crate::patterns::PatternLibrary;
use crate::record::Identificacao;
use crate::utils::error::ExtractError;

/// Only the first lines of the header are candidates for the organization name.
const ORGAO_LINE_WINDOW: usize = 10;

/// Edital number, organization, year and board from the header text.
pub fn extract_identification(
    patterns: &PatternLibrary,
    text: &str,
) -> Result<Option<Identificacao>, ExtractError> {
    let numero_edital = patterns
        .edital_number
        .captures(text)
        .map(|caps| caps[1].to_string());

    let orgao = text
        .lines()
        .take(ORGAO_LINE_WINDOW)
        .map(str::trim)
        .find(|line| line.chars().count() > 5 && !line.starts_with("EDITAL"))
        .map(str::to_string);

    let ano = patterns
        .contest_year
        .captures(text)
        .map(|caps| caps[1].to_string());

    let banca = patterns
        .bancas
        .iter()
        .find(|rule| rule.regex.is_match(text))
        .map(|rule| rule.keyword.to_string());

    let ident = Identificacao { numero_edital, orgao, ano, banca };
    tracing::debug!("Identification: {:?}", ident);
    Ok((!ident.is_empty()).then_some(ident))
}
