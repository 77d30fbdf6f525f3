// src/extractors/positions.rs
use crate::patterns::PatternLibrary;
use crate::record::Cargo;
use crate::utils::error::ExtractError;
use crate::utils::text::char_offset;

/// Marker that ends a position's scope.
const SCOPE_END_MARKER: &str = "CARGO";

/// Positions announced by `CARGO:`/`FUNÇÃO:` headers, with the requirement
/// text and salary found in the stretch of text that follows each header.
pub fn extract_positions(
    patterns: &PatternLibrary,
    text: &str,
) -> Result<Option<Vec<Cargo>>, ExtractError> {
    let mut positions = Vec::new();

    for caps in patterns.position_header.captures_iter(text) {
        let nome = caps[1].trim();
        let len = nome.chars().count();
        if len <= 3 || len >= 100 {
            tracing::trace!("Discarding position candidate '{}'", nome);
            continue;
        }

        let start = caps.get(0).map_or(0, |m| m.end());
        let end = text[start..]
            .find(SCOPE_END_MARKER)
            .map_or(text.len(), |pos| start + pos);
        let scope = &text[start..end];

        positions.push(Cargo {
            nome: nome.to_string(),
            requisitos: requirements_in(patterns, scope),
            remuneracao: remuneration_in(patterns, scope),
        });
    }

    tracing::debug!("Positions: {} found", positions.len());
    Ok((!positions.is_empty()).then_some(positions))
}

/// Text after the first requirement keyword that matches, up to a blank
/// line or the next `Label:` line.
pub fn requirements_in(patterns: &PatternLibrary, scope: &str) -> Option<String> {
    patterns
        .requirement_rules
        .iter()
        .find_map(|rule| rule.regex.captures(scope))
        .map(|caps| caps[1].trim().to_string())
        .filter(|req| !req.is_empty())
}

/// Money value closest to the first remuneration keyword present in the scope.
/// Equidistant candidates resolve to the earlier one.
pub fn remuneration_in(patterns: &PatternLibrary, scope: &str) -> Option<String> {
    let money: Vec<(usize, &str)> = patterns
        .money
        .captures_iter(scope)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let value = caps.get(1)?;
            Some((char_offset(scope, whole.start()), value.as_str()))
        })
        .collect();
    if money.is_empty() {
        return None;
    }

    let keyword_pos = patterns
        .remuneration_rules
        .iter()
        .find_map(|rule| rule.regex.find(scope))
        .map(|m| char_offset(scope, m.start()))?;

    let mut closest: Option<(usize, &str)> = None;
    for (pos, value) in money {
        let distance = pos.abs_diff(keyword_pos);
        if closest.map_or(true, |(best, _)| distance < best) {
            closest = Some((distance, value));
        }
    }
    closest.map(|(_, value)| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lib() -> &'static PatternLibrary {
        PatternLibrary::shared()
    }

    fn run(text: &str) -> Vec<Cargo> {
        extract_positions(lib(), text).unwrap().unwrap_or_default()
    }

    #[test]
    fn test_position_with_requirements_and_salary() {
        let cargos = run("CARGO: ANALISTA DE SISTEMAS - Requisitos: Graduação em Ciência da Computação.\nRemuneração: R$ 5.000,00");
        assert_eq!(cargos.len(), 1);
        let cargo = &cargos[0];
        assert_eq!(cargo.nome, "ANALISTA DE SISTEMAS");
        assert!(cargo
            .requisitos
            .as_deref()
            .unwrap()
            .contains("Graduação em Ciência da Computação"));
        assert_eq!(cargo.remuneracao.as_deref(), Some("5.000,00"));
    }

    #[test]
    fn test_scope_stops_at_next_cargo() {
        let text = "CARGO: TÉCNICO JUDICIÁRIO -\nEscolaridade: nível médio.\n\nSalário: R$ 3.000,00\nCARGO: ANALISTA JUDICIÁRIO -\nEscolaridade: nível superior.\n\nSalário: R$ 8.000,00";
        let cargos = run(text);
        assert_eq!(cargos.len(), 2);
        assert_eq!(cargos[0].nome, "TÉCNICO JUDICIÁRIO");
        assert_eq!(cargos[0].requisitos.as_deref(), Some("nível médio."));
        assert_eq!(cargos[0].remuneracao.as_deref(), Some("3.000,00"));
        assert_eq!(cargos[1].nome, "ANALISTA JUDICIÁRIO");
        assert_eq!(cargos[1].remuneracao.as_deref(), Some("8.000,00"));
    }

    #[test]
    fn test_short_names_are_discarded() {
        assert!(run("CARGO: TI -\nR$ 1.000,00").is_empty());
    }

    #[test]
    fn test_salary_without_keyword_is_absent() {
        let cargos = run("CARGO: MOTORISTA -\nGratificação de R$ 500,00");
        assert_eq!(cargos[0].remuneracao, None);
        assert_eq!(cargos[0].requisitos, None);
    }

    #[test]
    fn test_closest_money_wins() {
        // Keyword at char 41: 41 back to the bonus, 19 ahead to the salary, 41 to the aid.
        let scope = "R$ 100,00 bônus por produtividade anual. Vencimento básico: R$ 2.500,00 e auxílio R$ 900,00";
        assert_eq!(remuneration_in(lib(), scope).as_deref(), Some("2.500,00"));

        let scope = "R$ 100,00 bônus. Vencimento básico: R$ 2.500,00";
        assert_eq!(remuneration_in(lib(), scope).as_deref(), Some("100,00"));
    }

    #[test]
    fn test_equidistant_money_keeps_first() {
        let scope = "R$ 1,00   salário   R$ 2,00";
        let kw = char_offset(scope, scope.find("salário").unwrap());
        let second = char_offset(scope, scope.find("R$ 2").unwrap());
        assert_eq!((kw, second), (10, 20));
        assert_eq!(remuneration_in(lib(), scope).as_deref(), Some("1,00"));

        // One character closer flips the choice.
        let scope = "R$ 1,00   salário  R$ 2,00";
        assert_eq!(remuneration_in(lib(), scope).as_deref(), Some("2,00"));
    }

    #[test]
    fn test_first_present_keyword_is_used() {
        // "remuneração" precedes "salário" in the keyword list.
        let scope = "Salário R$ 1.000,00 ............................ Remuneração total R$ 4.000,00";
        assert_eq!(remuneration_in(lib(), scope).as_deref(), Some("4.000,00"));
    }
}
