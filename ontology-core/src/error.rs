//! Tipos de erro do ontology-core.
//!
//! Apenas falhas dos colaboradores externos (backend de NLP, configuração,
//! transporte HTTP) chegam até aqui. As etapas internas do motor (agrupamento,
//! linking, média, ranking) são funções totais e nunca falham.

use thiserror::Error;

/// Tipo de resultado das operações do ontology-core.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// O backend de NLP respondeu com erro ou conteúdo inesperado.
    /// É fatal para o documento em processamento.
    #[error("Backend error: {0}")]
    Backend(String),

    /// Falha de transporte HTTP (conexão, timeout, status não-2xx).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Entrada inválida fornecida pelo chamador.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Variável de ambiente ausente ou com valor inválido.
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    pub fn backend(msg: impl Into<String>) -> Self {
        Error::Backend(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Indica se vale a pena tentar o mesmo documento novamente
    /// (timeouts e falhas de conexão).
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}
