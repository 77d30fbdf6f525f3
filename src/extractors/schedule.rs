// src/extractors/schedule.rs
use crate::patterns::PatternLibrary;
use crate::record::EventoCronograma;
use crate::utils::error::ExtractError;

/// One entry per line holding a date and some text besides it.
/// A date range wins over the single dates it contains; numeric dates win
/// over written-out ones ("15 de março de 2024").
pub fn extract_schedule(
    patterns: &PatternLibrary,
    text: &str,
) -> Result<Option<Vec<EventoCronograma>>, ExtractError> {
    let schedule: Vec<EventoCronograma> = text
        .lines()
        .map(str::trim)
        .filter_map(|line| schedule_entry(patterns, line))
        .collect();

    tracing::debug!("Schedule: {} entries", schedule.len());
    Ok((!schedule.is_empty()).then_some(schedule))
}

fn schedule_entry(patterns: &PatternLibrary, line: &str) -> Option<EventoCronograma> {
    let shapes = [
        &patterns.date_range,
        &patterns.date_slash,
        &patterns.date_dash,
        &patterns.date_written,
    ];
    let date = shapes.iter().find_map(|re| re.find(line))?.as_str();

    let rest = line.replace(date, "");
    let descricao = rest
        .trim()
        .trim_start_matches(|c: char| matches!(c, ':' | '-' | '–' | '—') || c.is_whitespace());

    if descricao.is_empty() {
        return None;
    }
    Some(EventoCronograma {
        data: date.to_string(),
        descricao: descricao.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run(text: &str) -> Vec<EventoCronograma> {
        extract_schedule(PatternLibrary::shared(), text).unwrap().unwrap_or_default()
    }

    #[test]
    fn test_range_entry() {
        let entries = run("01/03/2024 a 10/03/2024 - Período de inscrições");
        assert_eq!(
            entries,
            vec![EventoCronograma {
                data: "01/03/2024 a 10/03/2024".into(),
                descricao: "Período de inscrições".into(),
            }]
        );
    }

    #[test]
    fn test_single_and_dash_dates() {
        let entries = run("Prova objetiva: 21/04/2024\n15-05-2024 – Resultado final\nsem data aqui");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].data, "21/04/2024");
        assert_eq!(entries[0].descricao, "Prova objetiva:");
        assert_eq!(entries[1].data, "15-05-2024");
        assert_eq!(entries[1].descricao, "Resultado final");
    }

    #[test]
    fn test_line_with_only_a_date_is_dropped() {
        assert!(extract_schedule(PatternLibrary::shared(), " 01/03/2024 - ").unwrap().is_none());
    }

    #[test]
    fn test_invalid_dates_are_ignored() {
        assert!(run("31/13/2024 Evento impossível").is_empty());
    }

    #[test]
    fn test_written_out_date() {
        let entries = run("15 de março de 2024 - Prova objetiva\nResultado em 02/04/2024, ou 3 de abril de 2024");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].data, "15 de março de 2024");
        assert_eq!(entries[0].descricao, "Prova objetiva");
        assert_eq!(entries[1].data, "02/04/2024");
    }

    proptest! {
        #[test]
        fn prop_range_is_never_split(d1 in 1u32..=28, d2 in 1u32..=28, m in 1u32..=12, desc in "[A-Za-z][A-Za-z ]{0,30}") {
            let range = format!("{:02}/{:02}/2024 a {:02}/{:02}/2024", d1, m, d2, m);
            let line = format!("{} - {}", range, desc);
            let entries = run(&line);
            prop_assert_eq!(entries.len(), 1);
            prop_assert_eq!(&entries[0].data, &range);
            prop_assert!(!entries[0].descricao.contains(&range));
        }
    }
}
