//! # Frases Nominais: Agrupamento de Substantivos Contíguos
//!
//! Percorre a sequência de tokens e junta substantivos adjacentes em uma única
//! frase ("battery" + "life" -> "battery life"). Cada frase é classificada pelo
//! serviço de conceitos no momento em que é fechada.
//!
//! ## Regras de fechamento
//!
//! Uma frase é fechada (e consultada) apenas na fronteira da sequência de
//! substantivos:
//! - ao encontrar um token que não é substantivo logo após a sequência, ou
//! - quando a sequência chega ao último token do documento.
//!
//! ## Exemplo
//!
//! `great/ADJ battery/NOUN life/NOUN is/VERB nice/ADJ` -> `{"battery life": <categoria>}`

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::concept::{ConceptLookup, NOT_FOUND};
use crate::syntax::Token;

/// Uma frase nominal e a sua categoria de conceito.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NounPhrase {
    pub text: String,
    pub category: String,
}

/// Mapa ordenado `texto -> categoria`.
///
/// A iteração segue a ordem da primeira inserção de cada texto. Reinserir um
/// texto já presente mantém a posição original e substitui a categoria
/// (a última consulta vence).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhraseMap {
    phrases: Vec<NounPhrase>,
    index: HashMap<String, usize>,
}

impl PhraseMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insere ou substitui a categoria de `text`. Retorna a categoria anterior, se havia.
    pub fn insert(&mut self, text: impl Into<String>, category: impl Into<String>) -> Option<String> {
        let text = text.into();
        let category = category.into();
        match self.index.get(&text) {
            Some(&pos) => Some(std::mem::replace(&mut self.phrases[pos].category, category)),
            None => {
                self.index.insert(text.clone(), self.phrases.len());
                self.phrases.push(NounPhrase { text, category });
                None
            }
        }
    }

    pub fn get(&self, text: &str) -> Option<&str> {
        self.index
            .get(text)
            .map(|&pos| self.phrases[pos].category.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &NounPhrase> {
        self.phrases.iter()
    }

    /// Frases na ordem de iteração.
    pub fn as_slice(&self) -> &[NounPhrase] {
        &self.phrases
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Primeira frase (na ordem de iteração) cujo texto contém `name`.
    /// A busca diferencia maiúsculas.
    pub fn first_containing(&self, name: &str) -> Option<&NounPhrase> {
        self.phrases.iter().find(|phrase| phrase.text.contains(name))
    }
}

/// Agrupa substantivos contíguos em frases e classifica cada uma.
///
/// Sequência vazia resulta em mapa vazio. Falhas do serviço de conceitos
/// aparecem como [`NOT_FOUND`] na categoria, nunca como erro.
pub fn merge_nouns(tokens: &[Token], lookup: &dyn ConceptLookup) -> PhraseMap {
    let mut phrases = PhraseMap::new();
    let mut accumulator = String::new();
    let mut run_length = 0usize;
    let last = tokens.len().saturating_sub(1);

    for (i, token) in tokens.iter().enumerate() {
        if token.is_noun() {
            if run_length > 0 {
                accumulator.push(' ');
            }
            accumulator.push_str(&token.text);
            run_length += 1;

            if i == last {
                flush(&mut phrases, &accumulator, lookup);
            }
        } else {
            if run_length > 0 {
                flush(&mut phrases, &accumulator, lookup);
            }
            accumulator.clear();
            run_length = 0;
        }
    }

    debug!(phrases = ?phrases.as_slice(), "noun combination sequences");
    phrases
}

fn flush(phrases: &mut PhraseMap, text: &str, lookup: &dyn ConceptLookup) {
    let category = lookup.lookup(text, NOT_FOUND);
    if let Some(previous) = phrases.insert(text, category) {
        debug!(phrase = text, previous = %previous, "repeated noun phrase, category replaced");
    }
}
