//! # Avaliações e Documento de Saída
//!
//! [`Review`] é o registro de entrada vindo da coleta de avaliações
//! (id, conteúdo, nota). [`OntologyMap`] é o documento produzido por avaliação,
//! pronto para serialização em JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::FinalEntityRecord;
use crate::syntax::Token;

/// Categoria principal do documento e a sua confiança (no máximo uma entrada).
pub type CategoryMap = BTreeMap<String, f32>;

/// Uma avaliação de produto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub review_id: String,
    #[serde(rename = "reviewContent", alias = "content")]
    pub content: String,
    #[serde(default)]
    pub rating: f32,
}

impl Review {
    pub fn new(review_id: impl Into<String>, content: impl Into<String>, rating: f32) -> Self {
        Self {
            review_id: review_id.into(),
            content: content.into(),
            rating,
        }
    }
}

/// Resultado completo da análise de uma avaliação.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OntologyMap {
    pub review_id: String,
    /// Texto original da avaliação.
    pub review: String,
    pub review_rating: f32,
    pub category_map: CategoryMap,
    /// Tokens na ordem do documento.
    pub syntax_tag_list: Vec<Token>,
    /// Entidades deduplicadas e ordenadas por saliência.
    pub final_entity_tagged_list: Vec<FinalEntityRecord>,
}
