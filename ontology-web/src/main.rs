//! Servidor web Axum com WebSocket para análise de entidades em avaliações

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use ontology_core::{
    corpus::demo_reviews, Config, EntityPipeline, Error, FinalEntityRecord, OntologyMap,
    PipelineEvent, RankingPolicy, RawEntity, Review, Token,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Estado compartilhado da aplicação
struct AppState {
    pipeline: EntityPipeline,
}

#[derive(Deserialize)]
struct ResolveRequest {
    tokens: Vec<Token>,
    entities: Vec<RawEntity>,
    #[serde(default)]
    ranking: Option<RankingPolicy>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchItem {
    review_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    ontology: Option<OntologyMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let cors = cors_layer(&config.cors_origin)?;

    // Os clientes HTTP são bloqueantes: constrói fora do runtime
    let pipeline = tokio::task::spawn_blocking(move || EntityPipeline::from_config(&config)).await??;
    info!(ranking = pipeline.ranking().name(), "pipeline pronto");

    let state = Arc::new(AppState { pipeline });
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("🚀 Servidor de ontologia iniciado em http://{}", bind_addr);
    let served = axum::serve(listener, app(Arc::clone(&state), cors)).await;

    release_state(state).await;
    served?;
    Ok(())
}

/// Descarta o estado fora do runtime: os clientes HTTP bloqueantes não podem
/// ser destruídos dentro de um contexto assíncrono.
async fn release_state(state: Arc<AppState>) {
    if let Err(e) = tokio::task::spawn_blocking(move || drop(state)).await {
        warn!(error = %e, "falha ao liberar o estado");
    }
}

fn app(state: Arc<AppState>, cors: CorsLayer) -> Router {
    Router::new()
        .route("/analyze", post(analyze_handler))
        .route("/analyze-batch", post(analyze_batch_handler))
        .route("/resolve", post(resolve_handler))
        .route("/demo-reviews", get(demo_reviews_handler))
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(state)
}

/// `*` libera qualquer origem; qualquer outro valor é tratado como uma origem exata.
fn cors_layer(origin: &str) -> Result<CorsLayer, axum::http::header::InvalidHeaderValue> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origin == "*" {
        Ok(layer.allow_origin(Any))
    } else {
        Ok(layer.allow_origin(HeaderValue::from_str(origin)?))
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({"error": message.into()}))).into_response()
}

fn pipeline_error(err: &Error) -> Response {
    let status = match err {
        Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::Backend(_) | Error::Http(_) | Error::Json(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}

/// Análise de uma avaliação via HTTP POST (sem streaming)
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Json(review): Json<Review>,
) -> Response {
    let result = tokio::task::spawn_blocking(move || state.pipeline.analyze_review(&review)).await;
    match result {
        Ok(Ok(ontology)) => Json(ontology).into_response(),
        Ok(Err(e)) => pipeline_error(&e),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Análise em lote; cada avaliação tem o seu próprio resultado
async fn analyze_batch_handler(
    State(state): State<Arc<AppState>>,
    Json(reviews): Json<Vec<Review>>,
) -> Response {
    let result = tokio::task::spawn_blocking(move || {
        let results = state.pipeline.analyze_batch(&reviews);
        reviews
            .into_iter()
            .zip(results)
            .map(|(review, result)| match result {
                Ok(ontology) => BatchItem {
                    review_id: review.review_id,
                    ontology: Some(ontology),
                    error: None,
                },
                Err(e) => BatchItem {
                    review_id: review.review_id,
                    ontology: None,
                    error: Some(e.to_string()),
                },
            })
            .collect::<Vec<_>>()
    })
    .await;

    match result {
        Ok(items) => Json(items).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Executa apenas o motor de resolução sobre anotações já prontas
async fn resolve_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResolveRequest>,
) -> Response {
    let policy = req.ranking.unwrap_or(state.pipeline.ranking());
    let result = tokio::task::spawn_blocking(move || {
        state.pipeline.resolve_with(&req.tokens, &req.entities, policy)
    })
    .await;

    match result {
        Ok(records) => Json::<Vec<FinalEntityRecord>>(records).into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

/// Retorna as avaliações de demonstração
async fn demo_reviews_handler() -> impl IntoResponse {
    Json(demo_reviews())
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Aceita JSON `{review_id, reviewContent, rating}`; senão usa a mensagem como texto puro.
/// Mensagens sem conteúdo são ignoradas.
fn parse_ws_review(text: &str) -> Option<Review> {
    let review = serde_json::from_str::<Review>(text)
        .unwrap_or_else(|_| Review::new("ws", text.trim(), 0.0));
    if review.content.trim().is_empty() {
        None
    } else {
        Some(review)
    }
}

/// Lógica do WebSocket: recebe uma avaliação, executa o pipeline e envia os eventos
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let Some(review) = parse_ws_review(&text) else {
                    continue;
                };

                info!(review_id = %review.review_id, chars = review.content.len(), "analisando via WebSocket");

                let (tx, rx) = std::sync::mpsc::channel::<PipelineEvent>();
                let state = Arc::clone(&state);
                let handle = tokio::task::spawn_blocking(move || {
                    state.pipeline.analyze_streaming(&review, tx);
                });
                if let Err(e) = handle.await {
                    warn!(error = %e, "pipeline interrompido");
                }

                let events: Vec<PipelineEvent> = rx.try_iter().collect();
                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json)).await.is_err() {
                            return; // cliente desconectou
                        }
                        // Pequena pausa para a interface mostrar passo a passo
                        tokio::time::sleep(tokio::time::Duration::from_millis(35)).await;
                    }
                }
            }
            Message::Close(_) => {
                info!("WebSocket desconectado");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let state = Arc::new(AppState {
            pipeline: EntityPipeline::offline(),
        });
        app(state, cors_layer("*").unwrap())
    }

    async fn post_json(uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_demo_reviews() {
        let request = Request::builder().uri("/demo-reviews").body(Body::empty()).unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let reviews: Vec<Review> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(reviews.len(), 3);
    }

    #[tokio::test]
    async fn test_analyze_review() {
        let review = &demo_reviews()[0];
        let (status, body) = post_json("/analyze", serde_json::to_value(review).unwrap()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reviewId"], "R1001");
        assert_eq!(body["finalEntityTaggedList"][0]["text"], "screen glare");
        assert_eq!(body["finalEntityTaggedList"][2]["nounCombinationCategory"], "feature");
        assert_eq!(body["syntaxTagList"][1]["pos"], "NOUN");
    }

    #[tokio::test]
    async fn test_analyze_empty_text() {
        let (status, body) = post_json(
            "/analyze",
            serde_json::json!({"review_id": "r", "reviewContent": "   "}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_analyze_backend_failure() {
        let (status, _) = post_json(
            "/analyze",
            serde_json::json!({"review_id": "r", "reviewContent": "not annotated anywhere"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_analyze_batch_reports_each_review() {
        let mut reviews = serde_json::to_value(demo_reviews()).unwrap();
        if let Some(list) = reviews.as_array_mut() {
            list.push(serde_json::json!({"review_id": "bad", "reviewContent": "unknown"}));
        }
        let (status, body) = post_json("/analyze-batch", reviews).await;

        assert_eq!(status, StatusCode::OK);
        let items = body.as_array().unwrap();
        assert_eq!(items.len(), 4);
        assert_eq!(items[0]["reviewId"], "R1001");
        assert!(items[0]["ontology"].is_object());
        assert_eq!(items[3]["reviewId"], "bad");
        assert!(items[3]["error"].is_string());
        assert!(items[3].get("ontology").is_none());
    }

    #[tokio::test]
    async fn test_resolve_with_ranking_override() {
        let body = serde_json::json!({
            "tokens": [
                {"text": "battery", "pos": "NOUN", "lemma": "battery"},
                {"text": "life", "pos": "NOUN", "lemma": "life"},
                {"text": "and", "pos": "CONJ"},
                {"text": "phone", "pos": "NOUN"}
            ],
            "entities": [
                {"name": "battery", "category": "OTHER", "sentiment": 0.5, "salience": 0.7},
                {"name": "phone", "category": "CONSUMER_GOOD", "sentiment": 0.1, "salience": 0.3}
            ],
            "ranking": "descending"
        });
        let (status, body) = post_json("/resolve", body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["text"], "battery");
        assert_eq!(body[0]["nounCombination"], "battery life");
        assert_eq!(body[0]["nounCombinationCategory"], "feature");
        assert_eq!(body[1]["nounCombinationCategory"], "device");
    }

    #[test]
    fn test_parse_ws_review() {
        let review = parse_ws_review(r#"{"review_id":"R9","reviewContent":"Nice phone.","rating":5}"#).unwrap();
        assert_eq!(review, Review::new("R9", "Nice phone.", 5.0));

        let plain = parse_ws_review("  The screen looks sharp.  ").unwrap();
        assert_eq!(plain, Review::new("ws", "The screen looks sharp.", 0.0));

        assert!(parse_ws_review("   ").is_none());
        assert!(parse_ws_review(r#"{"review_id":"R9","reviewContent":" "}"#).is_none());
    }

    #[tokio::test]
    async fn test_ws_review_streams_to_done() {
        let state = Arc::new(AppState {
            pipeline: EntityPipeline::offline(),
        });
        let review = parse_ws_review(&serde_json::to_string(&demo_reviews()[0]).unwrap()).unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        let worker = Arc::clone(&state);
        tokio::task::spawn_blocking(move || worker.pipeline.analyze_streaming(&review, tx))
            .await
            .unwrap();

        let events: Vec<PipelineEvent> = rx.try_iter().collect();
        let last = serde_json::to_value(events.last().unwrap()).unwrap();
        assert_eq!(last["type"], "Done");
        assert_eq!(last["data"]["ontology"]["reviewId"], "R1001");
    }

    #[tokio::test]
    async fn test_release_state_with_http_clients() {
        let config = Config {
            nlp_api_key: "test-key".into(),
            ..Config::default()
        };
        let pipeline = tokio::task::spawn_blocking(move || EntityPipeline::from_config(&config))
            .await
            .unwrap()
            .unwrap();
        let state = Arc::new(AppState { pipeline });

        release_state(state).await;
    }

    #[test]
    fn test_cors_layer_origins() {
        assert!(cors_layer("*").is_ok());
        assert!(cors_layer("http://localhost:4200").is_ok());
        assert!(cors_layer("bad\norigin").is_err());
    }
}
