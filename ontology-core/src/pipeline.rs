//! # Pipeline de Entidades: Orquestrador com Eventos Observáveis
//!
//! O pipeline coordena os colaboradores externos (backend de NLP e serviço de
//! conceitos) e as etapas do motor de resolução:
//!
//! 1. Classificação do documento, entidades com sentimento e tokens ([`NlpBackend`]).
//! 2. Agrupamento de substantivos em frases nominais ([`merge_nouns`]).
//! 3. Linking das entidades às frases ([`link_entities`]).
//! 4. Backfill de categorias ([`backfill_categories`]).
//! 5. Ranking, deduplicação com média de scores e novo ranking ([`dedupe`]).
//!
//! Cada passo emite um [`PipelineEvent`] por um canal `mpsc`, permitindo que o
//! servidor WebSocket transmita o progresso em tempo real.

use std::sync::mpsc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::NlpBackend;
use crate::backfill::{backfill_categories, needs_backfill};
use crate::concept::{CachedLookup, ConceptLookup};
use crate::config::Config;
use crate::corpus::{demo_concept_table, CorpusBackend};
use crate::dedupe::dedupe;
use crate::entity::{FinalEntityRecord, RawEntity};
use crate::error::{Error, Result};
use crate::linker::link_entities;
use crate::phrases::{merge_nouns, NounPhrase};
use crate::ranking::{rank, RankingPolicy};
use crate::remote::{ConceptGraphClient, GoogleNlpClient};
use crate::review::{CategoryMap, OntologyMap, Review};
use crate::syntax::Token;

/// Eventos emitidos pelo pipeline durante o processamento de uma avaliação.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// **Passo 1**: Categoria principal do documento.
    DocumentClassified {
        category_map: CategoryMap,
    },
    /// **Passo 1**: Entidades devolvidas pelo backend, na ordem do backend.
    EntitiesDetected {
        entities: Vec<RawEntity>,
        total: usize,
    },
    /// **Passo 1**: Tokens sintáticos do documento.
    SyntaxDone {
        tokens: Vec<Token>,
        total: usize,
    },
    /// **Passo 2**: Frases nominais e suas categorias, na ordem do mapa.
    NounPhrasesMerged {
        phrases: Vec<NounPhrase>,
    },
    /// **Passo 3**: Registros após o linking.
    EntitiesLinked {
        records: Vec<FinalEntityRecord>,
    },
    /// **Passo 4**: Registros após o backfill; `backfilled` conta os reclassificados.
    CategoriesBackfilled {
        records: Vec<FinalEntityRecord>,
        backfilled: usize,
    },
    /// **Passo 5**: Lista final; `merged` conta os registros absorvidos por duplicatas.
    Deduplicated {
        records: Vec<FinalEntityRecord>,
        merged: usize,
    },
    /// **Conclusão**: Documento completo da avaliação.
    Done {
        ontology: OntologyMap,
        processing_ms: u64,
    },
    /// **Falha**: O backend falhou; não há saída parcial para este documento.
    Error {
        message: String,
    },
}

type EventSink<'a> = Option<&'a mpsc::Sender<PipelineEvent>>;

fn emit(tx: EventSink<'_>, event: impl FnOnce() -> PipelineEvent) {
    if let Some(tx) = tx {
        let _ = tx.send(event());
    }
}

/// Executa o motor de resolução sobre tokens e entidades já anotados.
///
/// As consultas ao serviço de conceitos são memoizadas durante a chamada.
/// Entradas vazias produzem saída vazia.
pub fn resolve_entities(
    tokens: &[Token],
    entities: &[RawEntity],
    lookup: &dyn ConceptLookup,
    policy: RankingPolicy,
) -> Vec<FinalEntityRecord> {
    resolve_observed(tokens, entities, lookup, policy, None)
}

fn resolve_observed(
    tokens: &[Token],
    entities: &[RawEntity],
    lookup: &dyn ConceptLookup,
    policy: RankingPolicy,
    tx: EventSink<'_>,
) -> Vec<FinalEntityRecord> {
    let lookup = CachedLookup::new(lookup);

    let phrases = merge_nouns(tokens, &lookup);
    emit(tx, || PipelineEvent::NounPhrasesMerged {
        phrases: phrases.as_slice().to_vec(),
    });

    let linked = link_entities(entities, &phrases);
    emit(tx, || PipelineEvent::EntitiesLinked {
        records: linked.clone(),
    });

    let backfilled = linked.iter().filter(|r| needs_backfill(r)).count();
    let records = backfill_categories(linked, &lookup);
    emit(tx, || PipelineEvent::CategoriesBackfilled {
        records: records.clone(),
        backfilled,
    });

    let before = records.len();
    let records = dedupe(rank(records, policy), policy);
    emit(tx, || PipelineEvent::Deduplicated {
        records: records.clone(),
        merged: before - records.len(),
    });

    debug!(
        lookups = lookup.cached_entries(),
        entities = records.len(),
        "final entity list resolved"
    );
    records
}

/// O pipeline principal.
///
/// Não guarda estado mutável entre documentos: pode ser compartilhado entre
/// threads e processar avaliações em paralelo.
pub struct EntityPipeline {
    backend: Arc<dyn NlpBackend + Send + Sync>,
    concepts: Arc<dyn ConceptLookup + Send + Sync>,
    ranking: RankingPolicy,
}

impl EntityPipeline {
    pub fn new(
        backend: Arc<dyn NlpBackend + Send + Sync>,
        concepts: Arc<dyn ConceptLookup + Send + Sync>,
    ) -> Self {
        Self {
            backend,
            concepts,
            ranking: RankingPolicy::default(),
        }
    }

    /// Pipeline offline: corpus anotado + tabela de conceitos local.
    pub fn offline() -> Self {
        Self::new(Arc::new(CorpusBackend::new()), Arc::new(demo_concept_table()))
    }

    /// Monta o pipeline a partir da configuração (clientes HTTP ou modo offline).
    pub fn from_config(config: &Config) -> Result<Self> {
        let pipeline = if config.offline {
            Self::offline()
        } else {
            let timeout = Duration::from_secs(config.http_timeout_secs);
            let backend = GoogleNlpClient::new(&config.nlp_base_url, &config.nlp_api_key, timeout)?;
            let concepts = ConceptGraphClient::new(&config.concept_base_url, timeout)?;
            Self::new(Arc::new(backend), Arc::new(concepts))
        };
        Ok(pipeline.with_ranking(config.ranking))
    }

    pub fn with_ranking(mut self, ranking: RankingPolicy) -> Self {
        self.ranking = ranking;
        self
    }

    pub fn ranking(&self) -> RankingPolicy {
        self.ranking
    }

    /// Resolve tokens e entidades já anotados com a política do pipeline.
    pub fn resolve(&self, tokens: &[Token], entities: &[RawEntity]) -> Vec<FinalEntityRecord> {
        self.resolve_with(tokens, entities, self.ranking)
    }

    /// Como [`EntityPipeline::resolve`], com outra política de ranking.
    pub fn resolve_with(
        &self,
        tokens: &[Token],
        entities: &[RawEntity],
        policy: RankingPolicy,
    ) -> Vec<FinalEntityRecord> {
        resolve_entities(tokens, entities, self.concepts.as_ref(), policy)
    }

    /// Processa uma avaliação de forma síncrona.
    pub fn analyze_review(&self, review: &Review) -> Result<OntologyMap> {
        self.run(review, None)
    }

    /// Processa uma avaliação enviando eventos de progresso pelo canal `tx`.
    ///
    /// O último evento é sempre `Done` ou `Error`.
    pub fn analyze_streaming(&self, review: &Review, tx: mpsc::Sender<PipelineEvent>) {
        let start = Instant::now();
        match self.run(review, Some(&tx)) {
            Ok(ontology) => {
                let _ = tx.send(PipelineEvent::Done {
                    ontology,
                    processing_ms: start.elapsed().as_millis() as u64,
                });
            }
            Err(e) => {
                warn!(review_id = %review.review_id, error = %e, "review analysis failed");
                let _ = tx.send(PipelineEvent::Error {
                    message: e.to_string(),
                });
            }
        }
    }

    /// Processa várias avaliações em paralelo, preservando a ordem de entrada.
    ///
    /// Cada avaliação tem o seu próprio resultado: uma falha não interrompe as demais.
    pub fn analyze_batch(&self, reviews: &[Review]) -> Vec<Result<OntologyMap>> {
        reviews
            .par_iter()
            .map(|review| {
                let result = self.analyze_review(review);
                if let Err(e) = &result {
                    warn!(
                        review_id = %review.review_id,
                        retryable = e.is_retryable(),
                        error = %e,
                        "review skipped"
                    );
                }
                result
            })
            .collect()
    }

    fn run(&self, review: &Review, tx: EventSink<'_>) -> Result<OntologyMap> {
        let text = review.content.as_str();
        if text.trim().is_empty() {
            return Err(Error::invalid_input("avaliação sem texto"));
        }

        let category_map = self.backend.classify(text)?;
        emit(tx, || PipelineEvent::DocumentClassified {
            category_map: category_map.clone(),
        });

        let entities = self.backend.entity_sentiments(text)?;
        emit(tx, || PipelineEvent::EntitiesDetected {
            entities: entities.clone(),
            total: entities.len(),
        });

        let tokens = self.backend.syntax_tokens(text)?;
        emit(tx, || PipelineEvent::SyntaxDone {
            tokens: tokens.clone(),
            total: tokens.len(),
        });

        let records = resolve_observed(&tokens, &entities, self.concepts.as_ref(), self.ranking, tx);
        info!(
            review_id = %review.review_id,
            tokens = tokens.len(),
            entities = records.len(),
            "review analyzed"
        );

        Ok(OntologyMap {
            review_id: review.review_id.clone(),
            review: review.content.clone(),
            review_rating: review.rating,
            category_map,
            syntax_tag_list: tokens,
            final_entity_tagged_list: records,
        })
    }
}

impl Default for EntityPipeline {
    fn default() -> Self {
        Self::offline()
    }
}
