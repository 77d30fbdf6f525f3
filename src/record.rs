// src/record.rs
//! Output record. Key names are the external contract consumed by the JSON
//! writer, so they stay in Portuguese.

use indexmap::IndexMap;
use serde::Serialize;

/// Key under which specific knowledge without a position scope is stored.
pub const UNSCOPED_KEY: &str = "geral";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Identificacao {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numero_edital: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orgao: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ano: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banca: Option<String>,
}

impl Identificacao {
    pub fn is_empty(&self) -> bool {
        self.numero_edital.is_none() && self.orgao.is_none() && self.ano.is_none() && self.banca.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventoCronograma {
    pub data: String,
    pub descricao: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inscricao {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periodo_inicio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periodo_fim: Option<String>,
    /// Money is kept in its printed form, e.g. "1.234,56".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxa: Option<String>,
}

impl Inscricao {
    pub fn is_empty(&self) -> bool {
        self.periodo_inicio.is_none() && self.periodo_fim.is_none() && self.taxa.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cargo {
    pub nome: String,
    pub requisitos: Option<String>,
    pub remuneracao: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Vagas {
    pub total: u32,
    pub ampla_concorrencia: u32,
    pub pcd: u32,
    pub negros: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Disciplina {
    pub disciplina: String,
    pub topicos: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConteudoProgramatico {
    pub conhecimentos_basicos: Vec<Disciplina>,
    /// Position scope (or [`UNSCOPED_KEY`]) to its disciplines.
    pub conhecimentos_especificos: IndexMap<String, Vec<Disciplina>>,
}

impl ConteudoProgramatico {
    pub fn is_empty(&self) -> bool {
        self.conhecimentos_basicos.is_empty() && self.conhecimentos_especificos.is_empty()
    }

    pub fn specific(&self, scope: &str) -> Option<&[Disciplina]> {
        self.conhecimentos_especificos.get(scope).map(Vec::as_slice)
    }
}

/// The aggregate record produced for one edital.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExtractionResult {
    pub identificacao: Identificacao,
    pub cronograma: Vec<EventoCronograma>,
    pub inscricao: Inscricao,
    pub cargos: Vec<Cargo>,
    pub vagas: IndexMap<String, Vagas>,
    /// Position name to requirement text.
    pub requisitos: IndexMap<String, String>,
    /// Position name to salary, printed form.
    pub remuneracao: IndexMap<String, String>,
    pub conteudo_programatico: ConteudoProgramatico,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_serializes_all_keys() {
        let value = serde_json::to_value(ExtractionResult::default()).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        for key in [
            "identificacao",
            "cronograma",
            "inscricao",
            "cargos",
            "vagas",
            "requisitos",
            "remuneracao",
            "conteudo_programatico",
        ] {
            assert!(keys.iter().any(|k| k == key), "missing key {}", key);
        }
        assert_eq!(value["identificacao"], serde_json::json!({}));
        assert_eq!(
            value["conteudo_programatico"],
            serde_json::json!({"conhecimentos_basicos": [], "conhecimentos_especificos": {}})
        );
    }

    #[test]
    fn test_cargo_absent_fields_are_null() {
        let cargo = Cargo { nome: "ANALISTA".into(), requisitos: None, remuneracao: Some("5.000,00".into()) };
        let value = serde_json::to_value(cargo).unwrap();
        assert_eq!(value["requisitos"], serde_json::Value::Null);
        assert_eq!(value["remuneracao"], "5.000,00");
    }
}
