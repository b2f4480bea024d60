//! # ontology-core: Resolução e Agregação de Entidades em Avaliações
//!
//! Este crate transforma as anotações de um backend de NLP (tokens sintáticos e
//! entidades com sentimento/saliência) em uma lista final de entidades
//! deduplicada, categorizada e ordenada por saliência.
//!
//! ## Arquitetura do Sistema
//!
//! O dado flui em um pipeline linear:
//!
//! 1.  **Entrada**: Avaliação ([`Review`]) anotada pelo backend ([`backend`]).
//! 2.  **Frases Nominais** ([`phrases`]): Substantivos contíguos viram uma frase
//!     classificada pelo serviço de conceitos ([`concept`]).
//! 3.  **Linking** ([`linker`]): Cada entidade é associada à primeira frase que a contém.
//! 4.  **Backfill** ([`backfill`]): Frases não classificadas são substituídas pelo
//!     texto da própria entidade, consultado de novo.
//! 5.  **Ranking e Deduplicação** ([`ranking`], [`dedupe`]): Menções repetidas são
//!     mescladas pela média dos scores e a lista é ordenada por saliência.
//! 6.  **Saída**: Documento [`OntologyMap`] por avaliação.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use ontology_core::{resolve_entities, RankingPolicy, RawEntity, StaticConceptTable, Token};
//!
//! // 1. Serviço de conceitos em memória
//! let concepts = StaticConceptTable::from_pairs([("battery life", "feature")]);
//!
//! // 2. Anotações do backend
//! let tokens = vec![
//!     Token::new("great", "ADJ", "great"),
//!     Token::new("battery", "NOUN", "battery"),
//!     Token::new("life", "NOUN", "life"),
//! ];
//! let entities = vec![RawEntity::new("battery", "OTHER", 0.8, 0.6)];
//!
//! // 3. Resolve
//! let records = resolve_entities(&tokens, &entities, &concepts, RankingPolicy::Ascending);
//!
//! assert_eq!(records[0].noun_combination, "battery life");
//! assert_eq!(records[0].noun_combination_category, "feature");
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: Orquestrador que conecta backend, serviço de conceitos e motor.
//! - [`remote`]: Clientes HTTP dos serviços externos.
//! - [`corpus`]: Avaliações anotadas para uso offline e testes.
//! - [`config`]: Configuração por variáveis de ambiente.

pub mod backend;
pub mod backfill;
pub mod concept;
pub mod config;
pub mod corpus;
pub mod dedupe;
pub mod entity;
pub mod error;
pub mod linker;
pub mod phrases;
pub mod pipeline;
pub mod ranking;
pub mod remote;
pub mod review;
pub mod syntax;

pub use backend::NlpBackend;
pub use concept::{CachedLookup, ConceptLookup, StaticConceptTable, NOT_FOUND};
pub use config::Config;
pub use entity::{FinalEntityRecord, RawEntity};
pub use error::{Error, Result};
pub use phrases::{NounPhrase, PhraseMap};
pub use pipeline::{resolve_entities, EntityPipeline, PipelineEvent};
pub use ranking::RankingPolicy;
pub use review::{CategoryMap, OntologyMap, Review};
pub use syntax::Token;
