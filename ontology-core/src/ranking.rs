//! # Ranking por Saliência
//!
//! Ordena os registros pela saliência truncada em quatro casas decimais
//! (`trunc(salience * 10000)`). A ordenação é estável: empates preservam a
//! ordem de entrada, tornando execuções repetidas reprodutíveis.
//!
//! A direção é uma política única e trocável ([`RankingPolicy`]). O padrão é
//! **crescente** (menos saliente primeiro).

use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::entity::FinalEntityRecord;
use crate::error::Error;

/// Direção do ranking por saliência.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPolicy {
    /// Menos saliente primeiro.
    Ascending,
    /// Mais saliente primeiro.
    Descending,
}

impl Default for RankingPolicy {
    fn default() -> Self {
        RankingPolicy::Ascending
    }
}

impl RankingPolicy {
    /// Comparador da política.
    pub fn compare(&self, a: &FinalEntityRecord, b: &FinalEntityRecord) -> Ordering {
        let (ka, kb) = (salience_key(a.salience), salience_key(b.salience));
        match self {
            RankingPolicy::Ascending => ka.cmp(&kb),
            RankingPolicy::Descending => kb.cmp(&ka),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RankingPolicy::Ascending => "ascending",
            RankingPolicy::Descending => "descending",
        }
    }
}

impl FromStr for RankingPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ascending" | "asc" => Ok(RankingPolicy::Ascending),
            "descending" | "desc" => Ok(RankingPolicy::Descending),
            other => Err(Error::config(format!(
                "ranking desconhecido '{other}' (use ascending ou descending)"
            ))),
        }
    }
}

/// Saliência com quatro casas decimais de precisão (truncamento, não arredondamento).
fn salience_key(salience: f32) -> i64 {
    (salience * 10000.0) as i64
}

/// Ordena os registros segundo a política. Não altera o conteúdo dos registros.
pub fn rank(mut records: Vec<FinalEntityRecord>, policy: RankingPolicy) -> Vec<FinalEntityRecord> {
    records.sort_by(|a, b| policy.compare(a, b));
    records
}
