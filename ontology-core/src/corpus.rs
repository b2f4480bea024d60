//! # Corpus de Avaliações Anotadas
//!
//! Avaliações de produtos (em inglês, como as coletadas das lojas) já anotadas
//! com tokens, entidades e categoria do documento, no mesmo formato que o
//! backend de NLP devolveria. Serve para:
//! - rodar o pipeline completo offline ([`CorpusBackend`]);
//! - demonstração na interface web;
//! - testes de ponta a ponta.
//!
//! A tabela [`demo_concept_table`] cumpre o papel do serviço de conceitos no
//! modo offline.

use crate::backend::NlpBackend;
use crate::concept::StaticConceptTable;
use crate::entity::RawEntity;
use crate::error::{Error, Result};
use crate::review::{CategoryMap, Review};
use crate::syntax::Token;

/// Uma avaliação com as anotações que o backend produziria.
pub struct AnnotatedReview {
    pub review_id: &'static str,
    pub text: &'static str,
    pub rating: f32,
    /// Categoria do documento e confiança.
    pub category: (&'static str, f32),
    /// Triplas (texto, POS tag, lema), na ordem do texto.
    pub tokens: &'static [(&'static str, &'static str, &'static str)],
    /// Entidades (nome, tipo, sentimento, saliência), na ordem do backend.
    pub entities: &'static [(&'static str, &'static str, f32, f32)],
}

impl AnnotatedReview {
    pub fn review(&self) -> Review {
        Review::new(self.review_id, self.text, self.rating)
    }

    pub fn tokens(&self) -> Vec<Token> {
        self.tokens
            .iter()
            .map(|(text, pos, lemma)| Token::new(*text, *pos, *lemma))
            .collect()
    }

    pub fn entities(&self) -> Vec<RawEntity> {
        self.entities
            .iter()
            .map(|(name, kind, sentiment, salience)| RawEntity::new(*name, *kind, *sentiment, *salience))
            .collect()
    }
}

/// Retorna o corpus completo.
pub fn get_corpus() -> Vec<AnnotatedReview> {
    vec![
        AnnotatedReview {
            review_id: "R1001",
            text: "The battery life of this phone is great, but the screen glare is annoying.",
            rating: 4.0,
            category: ("Computers & Electronics", 0.87),
            tokens: &[
                ("The", "DET", "The"), ("battery", "NOUN", "battery"), ("life", "NOUN", "life"),
                ("of", "ADP", "of"), ("this", "DET", "this"), ("phone", "NOUN", "phone"),
                ("is", "VERB", "be"), ("great", "ADJ", "great"), (",", "PUNCT", ","),
                ("but", "CONJ", "but"), ("the", "DET", "the"), ("screen", "NOUN", "screen"),
                ("glare", "NOUN", "glare"), ("is", "VERB", "be"), ("annoying", "ADJ", "annoying"),
                (".", "PUNCT", "."),
            ],
            entities: &[
                ("battery life", "OTHER", 0.8, 0.41),
                ("phone", "CONSUMER_GOOD", 0.5, 0.33),
                ("screen glare", "OTHER", -0.7, 0.26),
            ],
        },
        AnnotatedReview {
            review_id: "R1002",
            text: "Apple support replaced my iPhone screen quickly. The new screen looks sharp.",
            rating: 5.0,
            category: ("Computers & Electronics", 0.74),
            tokens: &[
                ("Apple", "NOUN", "Apple"), ("support", "NOUN", "support"),
                ("replaced", "VERB", "replace"), ("my", "PRON", "my"), ("iPhone", "NOUN", "iPhone"),
                ("screen", "NOUN", "screen"), ("quickly", "ADV", "quickly"), (".", "PUNCT", "."),
                ("The", "DET", "The"), ("new", "ADJ", "new"), ("screen", "NOUN", "screen"),
                ("looks", "VERB", "look"), ("sharp", "ADJ", "sharp"), (".", "PUNCT", "."),
            ],
            entities: &[
                ("Apple", "ORGANIZATION", 0.6, 0.38),
                ("iPhone", "CONSUMER_GOOD", 0.3, 0.27),
                ("screen", "CONSUMER_GOOD", 0.4, 0.2),
                ("Screen", "CONSUMER_GOOD", 0.8, 0.15),
            ],
        },
        AnnotatedReview {
            review_id: "R1003",
            text: "Camera quality is disappointing in low light",
            rating: 2.0,
            category: ("Computers & Electronics", 0.66),
            tokens: &[
                ("Camera", "NOUN", "Camera"), ("quality", "NOUN", "quality"), ("is", "VERB", "be"),
                ("disappointing", "ADJ", "disappointing"), ("in", "ADP", "in"), ("low", "ADJ", "low"),
                ("light", "NOUN", "light"),
            ],
            entities: &[
                ("Camera quality", "OTHER", -0.7, 0.72),
                ("light", "OTHER", -0.2, 0.28),
            ],
        },
    ]
}

/// Tabela de conceitos usada no modo offline.
pub fn demo_concept_table() -> StaticConceptTable {
    StaticConceptTable::from_pairs([
        ("battery life", "feature"),
        ("battery", "component"),
        ("phone", "device"),
        ("iphone", "device"),
        ("screen", "component"),
        ("apple support", "service"),
        ("apple", "company"),
        ("camera quality", "feature"),
        ("camera", "component"),
        ("light", "condition"),
    ])
}

/// Avaliações de demonstração (para a interface web).
pub fn demo_reviews() -> Vec<Review> {
    get_corpus().iter().map(AnnotatedReview::review).collect()
}

/// Backend offline que responde com as anotações do corpus.
///
/// Textos fora do corpus resultam em [`Error::Backend`].
pub struct CorpusBackend {
    reviews: Vec<AnnotatedReview>,
}

impl CorpusBackend {
    pub fn new() -> Self {
        Self {
            reviews: get_corpus(),
        }
    }

    fn find(&self, text: &str) -> Result<&AnnotatedReview> {
        let text = text.trim();
        self.reviews
            .iter()
            .find(|r| r.text == text)
            .ok_or_else(|| Error::backend("texto não anotado no corpus offline"))
    }
}

impl Default for CorpusBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NlpBackend for CorpusBackend {
    fn syntax_tokens(&self, text: &str) -> Result<Vec<Token>> {
        Ok(self.find(text)?.tokens())
    }

    fn entity_sentiments(&self, text: &str) -> Result<Vec<RawEntity>> {
        Ok(self.find(text)?.entities())
    }

    fn classify(&self, text: &str) -> Result<CategoryMap> {
        let (name, confidence) = self.find(text)?.category;
        Ok(CategoryMap::from([(name.to_string(), confidence)]))
    }
}
