//! Configuração via variáveis de ambiente.
//!
//! | Variável            | Padrão                                                        |
//! |---------------------|---------------------------------------------------------------|
//! | `NLP_API_KEY`       | (vazio; obrigatório fora do modo offline)                     |
//! | `NLP_BASE_URL`      | `https://language.googleapis.com/v1`                          |
//! | `CONCEPT_BASE_URL`  | `https://concept.research.microsoft.com/api/Concept/ScoreByProb` |
//! | `HTTP_TIMEOUT_SECS` | `10`                                                          |
//! | `RANKING_ORDER`     | `ascending`                                                   |
//! | `OFFLINE`           | `false`                                                       |
//! | `BIND_ADDR`         | `0.0.0.0:3000`                                                |
//! | `CORS_ORIGIN`       | `*`                                                           |

use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::ranking::RankingPolicy;

pub const DEFAULT_NLP_BASE_URL: &str = "https://language.googleapis.com/v1";
pub const DEFAULT_CONCEPT_BASE_URL: &str =
    "https://concept.research.microsoft.com/api/Concept/ScoreByProb";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing, default)]
    pub nlp_api_key: String,
    pub nlp_base_url: String,
    pub concept_base_url: String,
    pub http_timeout_secs: u64,
    pub ranking: RankingPolicy,
    /// Usa o corpus anotado e a tabela de conceitos local em vez dos serviços HTTP.
    pub offline: bool,
    pub bind_addr: String,
    pub cors_origin: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nlp_api_key: String::new(),
            nlp_base_url: DEFAULT_NLP_BASE_URL.to_string(),
            concept_base_url: DEFAULT_CONCEPT_BASE_URL.to_string(),
            http_timeout_secs: 10,
            ranking: RankingPolicy::default(),
            offline: false,
            bind_addr: "0.0.0.0:3000".to_string(),
            cors_origin: "*".to_string(),
        }
    }
}

impl Config {
    /// Lê a configuração do ambiente do processo.
    pub fn from_env() -> Result<Self> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// Lê a configuração de uma fonte arbitrária de chave/valor.
    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        let value = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let http_timeout_secs = match value("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| Error::config(format!("HTTP_TIMEOUT_SECS inválido: '{raw}'")))?,
            None => defaults.http_timeout_secs,
        };
        let ranking = match value("RANKING_ORDER") {
            Some(raw) => raw.parse()?,
            None => defaults.ranking,
        };
        let offline = match value("OFFLINE") {
            Some(raw) => parse_flag(&raw)?,
            None => defaults.offline,
        };

        Ok(Self {
            nlp_api_key: value("NLP_API_KEY").unwrap_or(defaults.nlp_api_key),
            nlp_base_url: value("NLP_BASE_URL").unwrap_or(defaults.nlp_base_url),
            concept_base_url: value("CONCEPT_BASE_URL").unwrap_or(defaults.concept_base_url),
            http_timeout_secs,
            ranking,
            offline,
            bind_addr: value("BIND_ADDR").unwrap_or(defaults.bind_addr),
            cors_origin: value("CORS_ORIGIN").unwrap_or(defaults.cors_origin),
        })
    }
}

fn parse_flag(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::config(format!("OFFLINE inválido: '{raw}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn source(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_source(source(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.ranking, RankingPolicy::Ascending);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_source(source(&[
            ("NLP_API_KEY", "secret"),
            ("HTTP_TIMEOUT_SECS", "3"),
            ("RANKING_ORDER", "descending"),
            ("OFFLINE", "yes"),
            ("CORS_ORIGIN", "http://localhost:4200"),
            ("BIND_ADDR", "  "),
        ]))
        .unwrap();

        assert_eq!(config.nlp_api_key, "secret");
        assert_eq!(config.http_timeout_secs, 3);
        assert_eq!(config.ranking, RankingPolicy::Descending);
        assert!(config.offline);
        assert_eq!(config.cors_origin, "http://localhost:4200");
        // valor em branco cai no padrão
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            Config::from_source(source(&[("HTTP_TIMEOUT_SECS", "ten")])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_source(source(&[("RANKING_ORDER", "random")])),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_source(source(&[("OFFLINE", "maybe")])),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let config = Config {
            nlp_api_key: "secret".into(),
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
    }
}
