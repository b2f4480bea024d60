//! Contrato do backend de NLP: tokens sintáticos, entidades com sentimento e
//! classificação do documento. Implementações: [`crate::remote::GoogleNlpClient`]
//! e [`crate::corpus::CorpusBackend`].

use std::sync::Arc;

use crate::entity::RawEntity;
use crate::error::Result;
use crate::review::CategoryMap;
use crate::syntax::Token;

/// Falhas aqui são fatais para o documento: não há saída parcial.
pub trait NlpBackend {
    /// Tokens do documento, na ordem do texto.
    fn syntax_tokens(&self, text: &str) -> Result<Vec<Token>>;

    /// Entidades detectadas, com sentimento e saliência.
    fn entity_sentiments(&self, text: &str) -> Result<Vec<RawEntity>>;

    /// Categoria principal do documento (apenas a primeira é mantida).
    fn classify(&self, text: &str) -> Result<CategoryMap>;
}

impl<T: NlpBackend + ?Sized> NlpBackend for Arc<T> {
    fn syntax_tokens(&self, text: &str) -> Result<Vec<Token>> {
        (**self).syntax_tokens(text)
    }

    fn entity_sentiments(&self, text: &str) -> Result<Vec<RawEntity>> {
        (**self).entity_sentiments(text)
    }

    fn classify(&self, text: &str) -> Result<CategoryMap> {
        (**self).classify(text)
    }
}
