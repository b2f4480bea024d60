//! # Backfill de Categorias
//!
//! Segunda tentativa de classificação: quando a frase associada a uma entidade
//! não foi classificada ("Not Found") e difere do próprio texto da entidade, o
//! nome isolado da entidade é consultado no serviço de conceitos e passa a ser
//! a sua frase nominal.

use tracing::debug;

use crate::concept::{ConceptLookup, NOT_FOUND};
use crate::entity::{eq_ignore_case, FinalEntityRecord};

/// Verdadeiro se o registro deve ser reclassificado pelo próprio texto.
///
/// Categoria vazia (entidade sem frase associada) não dispara o backfill.
pub fn needs_backfill(record: &FinalEntityRecord) -> bool {
    eq_ignore_case(&record.noun_combination_category, NOT_FOUND)
        && !eq_ignore_case(&record.text, &record.noun_combination)
}

/// Aplica o backfill a cada registro, na ordem recebida.
pub fn backfill_categories(
    mut records: Vec<FinalEntityRecord>,
    lookup: &dyn ConceptLookup,
) -> Vec<FinalEntityRecord> {
    for record in records.iter_mut().filter(|r| needs_backfill(r)) {
        let category = lookup.lookup(&record.text, NOT_FOUND);
        debug!(
            entity = %record.text,
            phrase = %record.noun_combination,
            category = %category,
            "category backfilled from entity text"
        );
        record.noun_combination = record.text.clone();
        record.noun_combination_category = category;
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::tests::RecordingLookup;

    fn record(text: &str, phrase: &str, category: &str) -> FinalEntityRecord {
        FinalEntityRecord {
            text: text.to_string(),
            noun_combination: phrase.to_string(),
            noun_combination_category: category.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_backfill_trigger() {
        let lookup = RecordingLookup::new(&[("screen", "component")]);
        let out = backfill_categories(vec![record("screen", "screen glare", NOT_FOUND)], &lookup);

        assert_eq!(lookup.calls(), vec!["screen"]);
        assert_eq!(out[0].noun_combination, "screen");
        assert_eq!(out[0].noun_combination_category, "component");
    }

    #[test]
    fn test_backfill_miss_keeps_sentinel() {
        let lookup = RecordingLookup::new(&[]);
        let out = backfill_categories(vec![record("glare", "screen glare", "not found")], &lookup);
        assert_eq!(out[0].noun_combination, "glare");
        assert_eq!(out[0].noun_combination_category, NOT_FOUND);
    }

    #[test]
    fn test_no_backfill_when_text_equals_phrase() {
        let lookup = RecordingLookup::new(&[("phone", "device")]);
        let out = backfill_categories(vec![record("Phone", "phone", NOT_FOUND)], &lookup);

        assert!(lookup.calls().is_empty());
        assert_eq!(out[0].noun_combination_category, NOT_FOUND);
    }

    #[test]
    fn test_no_backfill_for_classified_or_unlinked() {
        let lookup = RecordingLookup::new(&[("battery", "component")]);
        let out = backfill_categories(
            vec![
                record("battery", "battery life", "feature"),
                record("Apple", "", ""),
            ],
            &lookup,
        );

        assert!(lookup.calls().is_empty());
        assert_eq!(out[0].noun_combination_category, "feature");
        assert_eq!(out[1].noun_combination, "");
        assert_eq!(out[1].noun_combination_category, "");
    }
}
