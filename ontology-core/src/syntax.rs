//! # Tokens Sintáticos
//!
//! Unidade atômica recebida do backend de NLP: uma palavra ou pontuação com a
//! sua classe gramatical (POS tag) e o seu lema. A posição na sequência é
//! significativa, pois a adjacência entre substantivos define as frases
//! nominais (ver [`crate::phrases`]).
//!
//! ## Tags relevantes
//!
//! | Tag     | Tratamento no motor                         |
//! |---------|---------------------------------------------|
//! | NOUN    | Estende a frase nominal corrente            |
//! | (outra) | Encerra a frase nominal corrente, se houver |
//!
//! Tags desconhecidas não são erro: qualquer tag diferente de `NOUN` é
//! tratada como terminador.

use serde::{Deserialize, Serialize};

/// Tag de substantivo, comparada sem diferenciar maiúsculas.
pub const NOUN_TAG: &str = "NOUN";

/// Um token anotado pelo backend de NLP.
///
/// Serializado como `{ "text", "pos", "lemma" }`, o mesmo formato da lista
/// `syntaxTagList` do documento de saída.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// O texto do token (ex: "battery", ",", "is").
    pub text: String,
    /// Classe gramatical atribuída pelo backend (ex: "NOUN", "ADJ", "PUNCT").
    #[serde(rename = "pos")]
    pub part_of_speech: String,
    /// Forma canônica da palavra (ex: "is" -> "be").
    #[serde(default)]
    pub lemma: String,
}

impl Token {
    pub fn new(
        text: impl Into<String>,
        part_of_speech: impl Into<String>,
        lemma: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            part_of_speech: part_of_speech.into(),
            lemma: lemma.into(),
        }
    }

    /// Verdadeiro se o token é um substantivo (`NOUN`, sem diferenciar maiúsculas).
    pub fn is_noun(&self) -> bool {
        self.part_of_speech.eq_ignore_ascii_case(NOUN_TAG)
    }
}
