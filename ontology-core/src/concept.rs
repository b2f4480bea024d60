//! # Serviço de Conceitos: Classificação de Frases Curtas
//!
//! O motor classifica frases nominais e entidades isoladas em categorias
//! semânticas (ex: "battery life" -> "feature") por meio de um serviço externo.
//! Este módulo define o contrato ([`ConceptLookup`]) e duas implementações
//! locais:
//!
//! - [`StaticConceptTable`]: dicionário em memória (gazetteer), usado em modo
//!   offline e nos testes.
//! - [`CachedLookup`]: memoiza consultas dentro de um único documento, evitando
//!   chamadas repetidas ao serviço externo para a mesma frase.
//!
//! O cliente HTTP fica em [`crate::remote::ConceptGraphClient`].
//!
//! ## Falhas
//!
//! A consulta nunca falha do ponto de vista do motor: indisponibilidade ou
//! ausência de resultado viram o valor `fallback` (por convenção,
//! [`NOT_FOUND`]), mantendo resultados parciais utilizáveis.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

/// Sentinela de categoria não encontrada.
pub const NOT_FOUND: &str = "Not Found";

/// Contrato do serviço de conceitos: `lookup(texto, fallback) -> categoria`.
pub trait ConceptLookup {
    /// Retorna a categoria de `text`, ou `fallback` em caso de falha ou ausência.
    fn lookup(&self, text: &str, fallback: &str) -> String;
}

impl<T: ConceptLookup + ?Sized> ConceptLookup for &T {
    fn lookup(&self, text: &str, fallback: &str) -> String {
        (**self).lookup(text, fallback)
    }
}

impl<T: ConceptLookup + ?Sized> ConceptLookup for Box<T> {
    fn lookup(&self, text: &str, fallback: &str) -> String {
        (**self).lookup(text, fallback)
    }
}

impl<T: ConceptLookup + ?Sized> ConceptLookup for Arc<T> {
    fn lookup(&self, text: &str, fallback: &str) -> String {
        (**self).lookup(text, fallback)
    }
}

/// Dicionário de conceitos em memória.
///
/// As chaves são normalizadas em minúsculas; a busca é por igualdade exata
/// (sem diferenciar maiúsculas), como nos gazetteers de um motor de regras.
#[derive(Debug, Clone, Default)]
pub struct StaticConceptTable {
    entries: HashMap<String, String>,
}

impl StaticConceptTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, text: &str, category: &str) {
        self.entries.insert(text.to_lowercase(), category.to_string());
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut table = Self::new();
        for (text, category) in pairs {
            table.insert(text, category);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ConceptLookup for StaticConceptTable {
    fn lookup(&self, text: &str, fallback: &str) -> String {
        self.entries
            .get(&text.to_lowercase())
            .cloned()
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Memoização de consultas por `(texto, fallback)`.
///
/// Vive apenas durante o processamento de um documento; não é compartilhado
/// entre threads.
pub struct CachedLookup<'a, L: ConceptLookup + ?Sized> {
    inner: &'a L,
    cache: RefCell<HashMap<(String, String), String>>,
}

impl<'a, L: ConceptLookup + ?Sized> CachedLookup<'a, L> {
    pub fn new(inner: &'a L) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Número de consultas distintas já resolvidas.
    pub fn cached_entries(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl<L: ConceptLookup + ?Sized> ConceptLookup for CachedLookup<'_, L> {
    fn lookup(&self, text: &str, fallback: &str) -> String {
        let key = (text.to_string(), fallback.to_string());
        if let Some(hit) = self.cache.borrow().get(&key) {
            return hit.clone();
        }
        let category = self.inner.lookup(text, fallback);
        self.cache.borrow_mut().insert(key, category.clone());
        category
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Tabela estática que registra cada consulta recebida.
    pub(crate) struct RecordingLookup {
        pub table: StaticConceptTable,
        pub calls: Mutex<Vec<String>>,
    }

    impl RecordingLookup {
        pub fn new(pairs: &[(&str, &str)]) -> Self {
            Self {
                table: StaticConceptTable::from_pairs(pairs.iter().copied()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ConceptLookup for RecordingLookup {
        fn lookup(&self, text: &str, fallback: &str) -> String {
            self.calls.lock().unwrap().push(text.to_string());
            self.table.lookup(text, fallback)
        }
    }

    #[test]
    fn test_static_table_case_insensitive() {
        let table = StaticConceptTable::from_pairs([("Battery Life", "feature")]);
        assert_eq!(table.lookup("battery life", NOT_FOUND), "feature");
        assert_eq!(table.lookup("BATTERY LIFE", NOT_FOUND), "feature");
        assert_eq!(table.lookup("battery", NOT_FOUND), NOT_FOUND);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_fallback_is_caller_supplied() {
        let table = StaticConceptTable::new();
        assert!(table.is_empty());
        assert_eq!(table.lookup("anything", "unknown"), "unknown");
    }

    #[test]
    fn test_cached_lookup_calls_inner_once() {
        let inner = RecordingLookup::new(&[("screen", "component")]);
        let cached = CachedLookup::new(&inner);

        assert_eq!(cached.lookup("screen", NOT_FOUND), "component");
        assert_eq!(cached.lookup("screen", NOT_FOUND), "component");
        assert_eq!(cached.lookup("glare", NOT_FOUND), NOT_FOUND);
        assert_eq!(cached.lookup("glare", NOT_FOUND), NOT_FOUND);

        assert_eq!(inner.calls(), vec!["screen", "glare"]);
        assert_eq!(cached.cached_entries(), 2);
    }

    #[test]
    fn test_lookup_through_arc_and_box() {
        let shared: Arc<dyn ConceptLookup + Send + Sync> =
            Arc::new(StaticConceptTable::from_pairs([("phone", "device")]));
        assert_eq!(shared.lookup("phone", NOT_FOUND), "device");

        let boxed: Box<dyn ConceptLookup> = Box::new(StaticConceptTable::new());
        assert_eq!(boxed.lookup("phone", NOT_FOUND), NOT_FOUND);
    }
}
