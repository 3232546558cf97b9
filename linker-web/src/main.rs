//! Servidor web Axum com WebSocket para ligação de entidades e extração de
//! relações sobre documentos anotados.
//!
//! Variáveis de ambiente:
//! - `LINKER_CONFIG`: arquivo TOML de configuração (opcional).
//! - `LINKER_ADDR`: endereço de escuta (padrão `0.0.0.0:3000`).
//! - `LINKER_DEMO_KB`: se definida, usa a base em memória do corpus de
//!   exemplo em vez do DBpedia.
//! - `LINKER_CACHE_SNAPSHOT`: arquivo JSON com um cache de resolução salvo
//!   (`ResolutionCache::to_json`) para iniciar com as menções já resolvidas.
//! - `RUST_LOG`: filtro de logs (padrão `info`).

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use linker_core::{
    corpus,
    scoring::{score, RecordKind},
    AnnotatedDocument, DocumentResult, LinkEvent, Linker, LinkerConfig, ResolutionCache, SharedResolutionCache,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Estado compartilhado da aplicação.
///
/// O cache é compartilhado entre requisições: uma menção resolvida numa
/// chamada não é consultada de novo nas seguintes.
struct AppState {
    linker: Linker,
    cache: SharedResolutionCache,
}

#[derive(Serialize)]
struct LinkResponse {
    #[serde(flatten)]
    result: DocumentResult,
    lines: Vec<String>,
    processing_ms: u64,
}

#[derive(Serialize)]
struct BatchResponse {
    documents: usize,
    lines: Vec<String>,
    processing_ms: u64,
}

#[derive(Deserialize)]
struct ScoreRequest {
    gold: String,
    predictions: String,
    #[serde(default)]
    kind: RecordKind,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config_path = std::env::var_os("LINKER_CONFIG").map(PathBuf::from);
    let config = LinkerConfig::load(config_path.as_deref())?;

    let linker = if std::env::var_os("LINKER_DEMO_KB").is_some() {
        info!("Using in-memory demo knowledge base");
        Linker::new(
            Box::new(corpus::demo_knowledge_base()),
            Some(Box::new(corpus::demo_popularity())),
            &config,
        )
    } else {
        Linker::from_config(&config)?
    };
    info!(strategy = linker.extractor_name(), "Linker ready");

    let cache = match std::env::var_os("LINKER_CACHE_SNAPSHOT") {
        Some(path) => {
            let restored = ResolutionCache::from_json(&std::fs::read_to_string(&path)?)?;
            info!(entries = restored.len(), "Resolution cache restored from snapshot");
            SharedResolutionCache::from_cache(restored)
        }
        None => SharedResolutionCache::new(),
    };

    let state = Arc::new(AppState { linker, cache });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/link", post(link_handler))
        .route("/link/batch", post(batch_handler))
        .route("/score", post(score_handler))
        .route("/demo-documents", get(demo_documents_handler))
        .route("/ws", get(ws_handler))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state);

    let addr = std::env::var("LINKER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Servidor de linking iniciado em http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

/// Liga um documento (HTTP POST, sem streaming).
async fn link_handler(State(state): State<Arc<AppState>>, Json(doc): Json<AnnotatedDocument>) -> Response {
    if doc.key.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Documento sem chave");
    }

    let start = Instant::now();
    let worker_state = Arc::clone(&state);
    let joined = tokio::task::spawn_blocking(move || {
        let mut cache = worker_state.cache.clone();
        worker_state.linker.process_document(&doc, &mut cache)
    })
    .await;

    match joined {
        Ok(result) => {
            let lines = result.lines();
            Json(LinkResponse {
                result,
                lines,
                processing_ms: start.elapsed().as_millis() as u64,
            })
            .into_response()
        }
        Err(e) => {
            error!(error = %e, "Linking task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Falha ao processar documento")
        }
    }
}

/// Liga um lote de documentos em paralelo; as linhas saem ordenadas pela
/// chave do documento.
async fn batch_handler(State(state): State<Arc<AppState>>, Json(docs): Json<Vec<AnnotatedDocument>>) -> Response {
    let start = Instant::now();
    let worker_state = Arc::clone(&state);
    let joined = tokio::task::spawn_blocking(move || worker_state.linker.run_corpus(docs)).await;

    match joined {
        Ok(Ok(results)) => Json(BatchResponse {
            documents: results.len(),
            lines: results.iter().flat_map(DocumentResult::lines).collect(),
            processing_ms: start.elapsed().as_millis() as u64,
        })
        .into_response(),
        Ok(Err(e)) => {
            error!(error = %e, "Batch linking failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        Err(e) => {
            error!(error = %e, "Batch task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Falha ao processar lote")
        }
    }
}

/// Avalia predições contra um gold.
async fn score_handler(Json(req): Json<ScoreRequest>) -> impl IntoResponse {
    Json(score(&req.gold, &req.predictions, req.kind))
}

/// Retorna os documentos de demonstração já anotados.
async fn demo_documents_handler() -> impl IntoResponse {
    Json(corpus::demo_documents())
}

/// Upgrade HTTP → WebSocket
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Recebe um documento anotado em JSON e devolve os eventos do pipeline.
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("WebSocket conectado");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                let doc = match serde_json::from_str::<AnnotatedDocument>(&text) {
                    Ok(doc) => doc,
                    Err(e) => {
                        warn!(error = %e, "Invalid document over WebSocket");
                        let reply = serde_json::json!({"type": "Error", "data": {"message": e.to_string()}});
                        if socket.send(Message::Text(reply.to_string())).await.is_err() {
                            return;
                        }
                        continue;
                    }
                };
                info!(doc = %doc.key, sentences = doc.sentences.len(), "Linking via WebSocket");

                // O pipeline é síncrono: roda fora do runtime async
                let (tx_std, rx_std) = std::sync::mpsc::channel::<LinkEvent>();
                let worker_state = Arc::clone(&state);
                let handle = tokio::task::spawn_blocking(move || {
                    let mut cache = worker_state.cache.clone();
                    worker_state.linker.process_streaming(&doc, &mut cache, tx_std);
                });
                if let Err(e) = handle.await {
                    error!(error = %e, "Linking task failed");
                }

                // Coleta todos os eventos numa Vec (o Receiver não é Sync)
                let events: Vec<LinkEvent> = rx_std.try_iter().collect();
                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json)).await.is_err() {
                            return; // cliente desconectou
                        }
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
