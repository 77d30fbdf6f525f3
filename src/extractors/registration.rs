// src/extractors/registration.rs
use crate::patterns::{PatternLibrary, FEE_FALLBACK_TERMS};
use crate::record::Inscricao;
use crate::utils::error::ExtractError;

/// Lines scanned for a fee after (and including) a line mentioning one.
const FEE_LOOKAHEAD_LINES: usize = 4;

/// Registration period and fee.
pub fn extract_registration(
    patterns: &PatternLibrary,
    text: &str,
) -> Result<Option<Inscricao>, ExtractError> {
    let mut info = Inscricao::default();

    if let Some(caps) = patterns.period_rules.iter().find_map(|rule| rule.regex.captures(text)) {
        info.periodo_inicio = Some(caps[1].to_string());
        info.periodo_fim = Some(caps[2].to_string());
    }

    info.taxa = patterns
        .fee_rules
        .iter()
        .find_map(|rule| rule.regex.captures(text))
        .map(|caps| caps[1].to_string())
        .or_else(|| fee_near_keywords(patterns, text));

    tracing::debug!("Registration: {:?}", info);
    Ok((!info.is_empty()).then_some(info))
}

/// First money value on a fee-related line or on one of the lines right after it.
fn fee_near_keywords(patterns: &PatternLibrary, text: &str) -> Option<String> {
    let lines: Vec<&str> = text.lines().collect();
    lines.iter().enumerate().find_map(|(i, line)| {
        let lower = line.to_lowercase();
        if !FEE_FALLBACK_TERMS.iter().any(|term| lower.contains(term)) {
            return None;
        }
        lines[i..lines.len().min(i + FEE_LOOKAHEAD_LINES)]
            .iter()
            .find_map(|l| patterns.money.captures(l))
            .map(|caps| caps[1].to_string())
    })
}
