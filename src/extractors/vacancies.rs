// src/extractors/vacancies.rs
use crate::patterns::PatternLibrary;
use crate::record::Vagas;
use crate::utils::error::ExtractError;
use crate::utils::text::{window_after, window_before};
use indexmap::IndexMap;
use regex::Regex;

/// Characters searched backwards for the position a count belongs to.
const LOOKBACK_CHARS: usize = 200;
/// Characters searched forward for the quota breakdown of a count.
const QUOTA_WINDOW_CHARS: usize = 500;

/// Vacancy totals and quota breakdown per position.
///
/// The total for a position is the largest count seen for it. Counts with
/// no position header shortly before them are dropped, and so are counts
/// that do not fit a `u32`.
pub fn extract_vacancies(
    patterns: &PatternLibrary,
    text: &str,
) -> Result<Option<IndexMap<String, Vagas>>, ExtractError> {
    let mut vacancies: IndexMap<String, Vagas> = IndexMap::new();

    for caps in patterns.vacancy_count.captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let (_, context) = window_before(text, whole.start(), LOOKBACK_CHARS);

        let Some(header) = patterns.position_header.captures_iter(context).last() else {
            tracing::trace!("No position before '{}', dropping", whole.as_str());
            continue;
        };
        let total = match parse_count(&caps[1]) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!("Skipping vacancy count: {}", e);
                continue;
            }
        };

        let nome = header[1].trim().to_string();
        let entry = vacancies.entry(nome).or_default();
        entry.total = entry.total.max(total);

        let window = window_after(text, whole.start(), QUOTA_WINDOW_CHARS);
        if let Some(n) = quota(&patterns.quota_ampla, window) {
            entry.ampla_concorrencia = n;
        }
        if let Some(n) = quota(&patterns.quota_pcd, window) {
            entry.pcd = n;
        }
        if let Some(n) = quota(&patterns.quota_negros, window) {
            entry.negros = n;
        }
    }

    tracing::debug!("Vacancies: {} positions", vacancies.len());
    Ok((!vacancies.is_empty()).then_some(vacancies))
}

/// First quota count in the window; an out-of-range count leaves the category untouched.
fn quota(re: &Regex, window: &str) -> Option<u32> {
    let caps = re.captures(window)?;
    parse_count(&caps[1])
        .map_err(|e| tracing::warn!("Skipping quota count: {}", e))
        .ok()
}

fn parse_count(digits: &str) -> Result<u32, ExtractError> {
    digits
        .parse()
        .map_err(|_| ExtractError::InvalidNumber(digits.to_string()))
}
