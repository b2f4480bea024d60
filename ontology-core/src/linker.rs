//! # Linking de Entidades a Frases Nominais
//!
//! O backend frequentemente devolve o nome da entidade como um pedaço de uma
//! frase nominal maior (entidade "battery" dentro da frase "battery life").
//! O linking recupera a frase envolvente por **contenção de substring**: a
//! primeira frase do mapa (na ordem de iteração) que contém o nome é escolhida,
//! sem pontuar candidatos alternativos.

use tracing::debug;

use crate::entity::{FinalEntityRecord, RawEntity};
use crate::phrases::PhraseMap;

/// Cria um registro por entidade, preservando a ordem de chegada, e associa
/// a frase nominal quando houver. Sem correspondência, `noun_combination` e
/// `noun_combination_category` ficam vazios.
pub fn link_entities(entities: &[RawEntity], phrases: &PhraseMap) -> Vec<FinalEntityRecord> {
    let records: Vec<FinalEntityRecord> = entities
        .iter()
        .map(|entity| {
            let mut record = FinalEntityRecord::from_raw(entity);
            if let Some(phrase) = phrases.first_containing(&entity.name) {
                record.noun_combination = phrase.text.clone();
                record.noun_combination_category = phrase.category.clone();
            }
            record
        })
        .collect();

    debug!(
        linked = records.iter().filter(|r| !r.noun_combination.is_empty()).count(),
        total = records.len(),
        "entities linked to noun phrases"
    );
    records
}
