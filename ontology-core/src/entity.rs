//! # Entidades Brutas e Registros Finais
//!
//! - [`RawEntity`]: entidade detectada pelo backend de NLP, com sentimento e saliência.
//! - [`FinalEntityRecord`]: unidade de trabalho que atravessa linking, backfill,
//!   deduplicação e ranking. É o item da lista `finalEntityTaggedList` no
//!   documento de saída.

use serde::{Deserialize, Serialize};

/// Entidade detectada pelo backend (uma por menção, na ordem interna do backend).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEntity {
    /// Nome da entidade como aparece no texto (ex: "battery").
    pub name: String,
    /// Tipo atribuído pelo backend (ex: "ORGANIZATION", "CONSUMER_GOOD").
    #[serde(default)]
    pub category: String,
    /// Sentimento com sinal: negativo < 0 < positivo.
    #[serde(default)]
    pub sentiment: f32,
    /// Importância da entidade no documento, entre 0 e 1.
    #[serde(default)]
    pub salience: f32,
}

impl RawEntity {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        sentiment: f32,
        salience: f32,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            sentiment,
            salience,
        }
    }
}

/// Entidade resolvida: dados da entidade bruta + frase nominal associada.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalEntityRecord {
    pub text: String,
    pub sentiment: f32,
    pub salience: f32,
    /// Tipo da entidade vindo do backend.
    pub category: String,
    /// Frase nominal que contém a entidade (vazia se nenhuma foi encontrada).
    pub noun_combination: String,
    /// Categoria de conceito da frase nominal, ou "Not Found".
    pub noun_combination_category: String,
}

impl FinalEntityRecord {
    /// Registro inicial a partir de uma entidade bruta, ainda sem frase nominal.
    pub fn from_raw(entity: &RawEntity) -> Self {
        Self {
            text: entity.name.clone(),
            sentiment: entity.sentiment,
            salience: entity.salience,
            category: entity.category.clone(),
            noun_combination: String::new(),
            noun_combination_category: String::new(),
        }
    }

    /// Dois registros descrevem a mesma entidade lógica quando o texto é igual
    /// (sem diferenciar maiúsculas) ou quando compartilham a mesma frase
    /// nominal não-vazia.
    pub fn refers_to_same(&self, other: &FinalEntityRecord) -> bool {
        if eq_ignore_case(&self.text, &other.text) {
            return true;
        }
        !self.noun_combination.is_empty()
            && !other.noun_combination.is_empty()
            && eq_ignore_case(&self.noun_combination, &other.noun_combination)
    }
}

/// Comparação sem diferenciar maiúsculas (inclui caracteres não-ASCII).
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.to_lowercase() == b.to_lowercase()
}
