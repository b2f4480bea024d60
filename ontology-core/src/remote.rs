//! # Clientes HTTP dos Colaboradores Externos
//!
//! - [`GoogleNlpClient`]: Cloud Natural Language REST v1 (sintaxe, entidades
//!   com sentimento, classificação de texto).
//! - [`ConceptGraphClient`]: serviço de conceitos que devolve
//!   `{ "<rótulo>": score, ... }` para uma frase curta.
//!
//! Os clientes são síncronos (`reqwest::blocking`), como o restante do motor.
//! Em um runtime assíncrono devem ser usados dentro de
//! `tokio::task::spawn_blocking`. Timeouts são configurados no cliente e
//! aparecem como [`Error::Http`] retentável.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backend::NlpBackend;
use crate::concept::ConceptLookup;
use crate::entity::RawEntity;
use crate::error::{Error, Result};
use crate::review::CategoryMap;
use crate::syntax::Token;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateRequest<'a> {
    document: Document<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    encoding_type: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct Document<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct SyntaxResponse {
    #[serde(default)]
    tokens: Vec<ApiToken>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiToken {
    text: TextSpan,
    part_of_speech: PartOfSpeech,
    #[serde(default)]
    lemma: String,
}

#[derive(Debug, Deserialize)]
struct TextSpan {
    content: String,
}

#[derive(Debug, Deserialize)]
struct PartOfSpeech {
    tag: String,
}

#[derive(Debug, Deserialize)]
struct EntitySentimentResponse {
    #[serde(default)]
    entities: Vec<ApiEntity>,
}

#[derive(Debug, Deserialize)]
struct ApiEntity {
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    salience: f32,
    #[serde(default)]
    sentiment: Option<ApiSentiment>,
}

#[derive(Debug, Deserialize)]
struct ApiSentiment {
    #[serde(default)]
    score: f32,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    #[serde(default)]
    categories: Vec<ApiCategory>,
}

#[derive(Debug, Deserialize)]
struct ApiCategory {
    name: String,
    confidence: f32,
}

/// Cliente do Cloud Natural Language.
#[derive(Debug, Clone)]
pub struct GoogleNlpClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GoogleNlpClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        if api_key.is_empty() {
            return Err(Error::config("NLP_API_KEY não definido"));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn annotate<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        text: &str,
        encoding_type: Option<&'static str>,
    ) -> Result<T> {
        let url = format!("{}/documents:{}", self.base_url, method);
        let request = AnnotateRequest {
            document: Document {
                kind: "PLAIN_TEXT",
                content: text,
            },
            encoding_type,
        };
        debug!(method, chars = text.len(), "nlp backend request");

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::backend(format!("{method} retornou {status}: {body}")));
        }
        Ok(response.json()?)
    }
}

impl NlpBackend for GoogleNlpClient {
    fn syntax_tokens(&self, text: &str) -> Result<Vec<Token>> {
        let response: SyntaxResponse = self.annotate("analyzeSyntax", text, Some("UTF8"))?;
        Ok(response
            .tokens
            .into_iter()
            .map(|t| Token::new(t.text.content, t.part_of_speech.tag, t.lemma))
            .collect())
    }

    fn entity_sentiments(&self, text: &str) -> Result<Vec<RawEntity>> {
        let response: EntitySentimentResponse =
            self.annotate("analyzeEntitySentiment", text, Some("UTF8"))?;
        Ok(response
            .entities
            .into_iter()
            .map(|e| {
                let sentiment = e.sentiment.map(|s| s.score).unwrap_or_default();
                RawEntity::new(e.name, e.kind, sentiment, e.salience)
            })
            .collect())
    }

    fn classify(&self, text: &str) -> Result<CategoryMap> {
        let response: ClassifyResponse = self.annotate("classifyText", text, None)?;
        Ok(top_category(response.categories))
    }
}

/// Mantém apenas a primeira categoria, reduzida ao primeiro segmento do caminho
/// (`"/Computers & Electronics/Consumer Electronics"` -> `"Computers & Electronics"`).
fn top_category(categories: Vec<ApiCategory>) -> CategoryMap {
    let mut map = CategoryMap::new();
    if let Some(first) = categories.into_iter().next() {
        let name = first
            .name
            .split('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or_default()
            .to_string();
        map.insert(name, first.confidence);
    }
    map
}

/// Cliente do serviço de conceitos (`GET {base}?instance=<texto>&topK=1`).
#[derive(Debug, Clone)]
pub struct ConceptGraphClient {
    client: Client,
    base_url: String,
}

impl ConceptGraphClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
        })
    }

    fn fetch(&self, text: &str) -> Result<Option<String>> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("instance", text), ("topK", "1")])
            .send()?
            .error_for_status()?;
        let scores: std::collections::HashMap<String, f64> = response.json()?;
        Ok(best_label(scores))
    }
}

impl ConceptLookup for ConceptGraphClient {
    fn lookup(&self, text: &str, fallback: &str) -> String {
        label_or_fallback(self.fetch(text), text, fallback)
    }
}

/// Sem rótulo ou com falha de transporte, a consulta degrada para `fallback`.
fn label_or_fallback(fetched: Result<Option<String>>, text: &str, fallback: &str) -> String {
    match fetched {
        Ok(Some(label)) => label,
        Ok(None) => fallback.to_string(),
        Err(e) => {
            warn!(phrase = text, error = %e, "concept lookup failed, using fallback");
            fallback.to_string()
        }
    }
}

/// Rótulo de maior score; empates resolvidos pela ordem alfabética.
fn best_label(scores: std::collections::HashMap<String, f64>) -> Option<String> {
    scores
        .into_iter()
        .max_by(|(la, sa), (lb, sb)| {
            sa.partial_cmp(sb)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| lb.cmp(la))
        })
        .map(|(label, _)| label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::concept::NOT_FOUND;

    #[test]
    fn test_parse_syntax_response() {
        let body = r#"{
            "sentences": [],
            "tokens": [
                {"text": {"content": "Battery", "beginOffset": 0},
                 "partOfSpeech": {"tag": "NOUN", "number": "SINGULAR"},
                 "dependencyEdge": {"headTokenIndex": 1, "label": "NN"},
                 "lemma": "Battery"},
                {"text": {"content": "is", "beginOffset": 8},
                 "partOfSpeech": {"tag": "VERB"},
                 "lemma": "be"}
            ],
            "language": "en"
        }"#;
        let parsed: SyntaxResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.tokens.len(), 2);
        assert_eq!(parsed.tokens[0].part_of_speech.tag, "NOUN");
        assert_eq!(parsed.tokens[1].lemma, "be");
    }

    #[test]
    fn test_parse_entity_sentiment_response() {
        let body = r#"{
            "entities": [
                {"name": "battery", "type": "OTHER", "salience": 0.61,
                 "sentiment": {"magnitude": 0.8, "score": 0.8}, "mentions": []},
                {"name": "Apple", "type": "ORGANIZATION", "salience": 0.39}
            ],
            "language": "en"
        }"#;
        let parsed: EntitySentimentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.entities[0].kind, "OTHER");
        assert!(parsed.entities[1].sentiment.is_none());
    }

    #[test]
    fn test_top_category_keeps_first_segment() {
        let map = top_category(vec![
            ApiCategory {
                name: "/Computers & Electronics/Consumer Electronics".into(),
                confidence: 0.93,
            },
            ApiCategory {
                name: "/Shopping".into(),
                confidence: 0.5,
            },
        ]);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("Computers & Electronics"), Some(&0.93));
        assert!(top_category(vec![]).is_empty());
    }

    #[test]
    fn test_request_body_shape() {
        let request = AnnotateRequest {
            document: Document {
                kind: "PLAIN_TEXT",
                content: "Nice phone.",
            },
            encoding_type: Some("UTF8"),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["document"]["type"], "PLAIN_TEXT");
        assert_eq!(json["encodingType"], "UTF8");

        let classify = AnnotateRequest {
            document: Document {
                kind: "PLAIN_TEXT",
                content: "x",
            },
            encoding_type: None,
        };
        assert!(serde_json::to_value(&classify).unwrap().get("encodingType").is_none());
    }

    #[test]
    fn test_best_label() {
        let scores = std::collections::HashMap::from([
            ("feature".to_string(), 0.7),
            ("attribute".to_string(), 0.2),
        ]);
        assert_eq!(best_label(scores), Some("feature".to_string()));
        assert_eq!(best_label(Default::default()), None);
    }

    #[test]
    fn test_label_or_fallback() {
        assert_eq!(
            label_or_fallback(Ok(Some("feature".into())), "battery life", NOT_FOUND),
            "feature"
        );
        assert_eq!(label_or_fallback(Ok(None), "glare", NOT_FOUND), NOT_FOUND);
        assert_eq!(
            label_or_fallback(Err(Error::backend("boom")), "glare", NOT_FOUND),
            NOT_FOUND
        );
    }

    #[test]
    fn test_unreachable_concept_service_degrades() {
        let client = ConceptGraphClient::new("http://127.0.0.1:9/concept", Duration::from_millis(500)).unwrap();
        assert_eq!(client.lookup("battery life", NOT_FOUND), NOT_FOUND);
        assert_eq!(client.lookup("battery life", "unknown"), "unknown");
    }

    #[test]
    fn test_client_requires_api_key() {
        let err = GoogleNlpClient::new("https://language.googleapis.com/v1", "", Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
