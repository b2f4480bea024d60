//! # Deduplicação e Média de Scores
//!
//! Menções repetidas da mesma entidade lógica são colapsadas em um único
//! registro. O critério de agrupamento está em
//! [`FinalEntityRecord::refers_to_same`]: mesmo texto (sem diferenciar
//! maiúsculas) ou mesma frase nominal não-vazia.
//!
//! ## Algoritmo
//!
//! 1. O primeiro registro restante no pool vira a semente do grupo.
//! 2. O restante do pool é particionado em "casa com a semente" e "resto".
//! 3. O grupo gera um registro mesclado: campos descritivos da semente,
//!    sentimento e saliência pela média aritmética do grupo inteiro.
//! 4. Repete até o pool esvaziar; o resultado passa pelo ranking.
//!
//! São O(n²) comparações por documento, com n na casa das dezenas.

use std::collections::VecDeque;

use tracing::debug;

use crate::entity::FinalEntityRecord;
use crate::ranking::{rank, RankingPolicy};

/// Colapsa registros duplicados e ordena o resultado segundo `policy`.
pub fn dedupe(records: Vec<FinalEntityRecord>, policy: RankingPolicy) -> Vec<FinalEntityRecord> {
    let input_len = records.len();
    let mut pool: VecDeque<FinalEntityRecord> = records.into();
    let mut merged = Vec::new();

    while let Some(seed) = pool.pop_front() {
        let (group, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut pool)
            .into_iter()
            .partition(|candidate| seed.refers_to_same(candidate));
        pool = rest.into();
        merged.push(merge_group(seed, &group));
    }

    debug!(input = input_len, output = merged.len(), "entities deduplicated");
    rank(merged, policy)
}

/// Mescla a semente com os demais membros do grupo.
fn merge_group(seed: FinalEntityRecord, others: &[FinalEntityRecord]) -> FinalEntityRecord {
    let count = (others.len() + 1) as f32;
    let sentiment = others.iter().map(|r| r.sentiment).sum::<f32>() + seed.sentiment;
    let salience = others.iter().map(|r| r.salience).sum::<f32>() + seed.salience;

    FinalEntityRecord {
        sentiment: sentiment / count,
        salience: salience / count,
        ..seed
    }
}
