//! HTTP routes and handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/upload` | Ingest a PDF document into the vector index |
//! | `POST` | `/chat` | Ask a question; answer streams back as SSE |
//! | `GET`  | `/` | Static liveness message |
//! | `GET`  | `/health` | Health check |
//!
//! # Error contract
//!
//! Structured failures use the shape
//! `{ "error": { "code": "...", "message": "..." } }` with codes
//! `bad_request` (400) and `internal` (500). Retrieval degradation
//! never produces an error response; it is absorbed inside the
//! pipeline.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::channel::mpsc;
use futures::{SinkExt, StreamExt};
use grounded_core::AppError;
use grounded_llm::GenerationRequest;
use grounded_retrieval::Document;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::convert::Infallible;
use tower_http::cors::{Any, CorsLayer};

use crate::events::StreamEvent;
use crate::state::AppState;
use crate::stream::emit_answer;

/// Events buffered between the pipeline task and the SSE writer.
/// Small on purpose: backpressure reaches the generator quickly.
const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/upload", post(upload))
        .route("/chat", post(chat))
        .layer(cors)
        .with_state(state)
}

/// Structured error response for synchronous endpoints.
struct ApiError(AppError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            AppError::UnsupportedInput(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        };
        let body = json!({ "error": { "code": code, "message": self.0.to_string() } });
        (status, Json(body)).into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub document_count: usize,
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({ "message": "LLM is running" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "message": "Backend service is running" }))
}

/// Ingest an uploaded PDF: extract text, chunk, upsert.
///
/// `document_count` in the response is the number of chunks produced,
/// not documents. Non-PDF uploads are rejected synchronously.
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::UnsupportedInput(format!("Malformed multipart body: {}", e)))?
    {
        if let Some(filename) = field.file_name().map(str::to_string) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::UnsupportedInput(format!("Failed to read upload: {}", e)))?;
            upload = Some((filename, bytes.to_vec()));
            break;
        }
    }

    let Some((filename, bytes)) = upload else {
        return Err(AppError::UnsupportedInput("No file field in upload".to_string()).into());
    };

    if !filename.to_lowercase().ends_with(".pdf") {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(UploadResponse {
                message: "Only PDF files are supported".to_string(),
                document_count: 0,
            }),
        ));
    }

    // PDF parsing is CPU-bound; keep it off the async executor.
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
        .await
        .map_err(|e| AppError::Other(format!("Extraction task failed: {}", e)))?
        .map_err(|e| AppError::UnsupportedInput(format!("Failed to extract PDF text: {}", e)))?;

    let document = Document::new(text).with_metadata("filename", filename.clone());
    let chunks = state.chunker.split(&[document.text]);
    let count = state.index.upsert(chunks).await?;

    tracing::info!("Ingested '{}' as {} chunks", filename, count);

    Ok((
        StatusCode::OK,
        Json(UploadResponse {
            message: format!("Successfully processed and added {}", filename),
            document_count: count,
        }),
    ))
}

/// Answer a question over a persistent SSE stream.
///
/// The response is a long-lived `text/event-stream` carrying the
/// `Token* Sources Done` protocol; each event is flushed as it is
/// produced. Dropping the connection cancels the pipeline task's sends,
/// which stops generation promptly.
async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<StreamEvent>(EVENT_CHANNEL_CAPACITY);

    tokio::spawn(run_pipeline(state, request.question, tx));

    Sse::new(rx.map(|event| Ok(event.into_sse()))).keep_alive(KeepAlive::default())
}

/// The per-request pipeline: fuse retrieval sources, assemble the
/// prompt, stream the answer. One lightweight task per request; a
/// failure here never affects other requests.
async fn run_pipeline(state: AppState, question: String, mut tx: mpsc::Sender<StreamEvent>) {
    tracing::info!("Answering question: {}", question);

    let fused = state.fusion.fuse(&question).await;

    let prompt = match grounded_prompt::assemble(&fused.context(), &question) {
        Ok(prompt) => prompt,
        Err(e) => {
            tracing::error!("Prompt assembly failed: {}", e);
            // Still close out the protocol so the caller sees stream end.
            let _ = tx
                .send(StreamEvent::Token(format!("\n*Internal error: {}*\n", e)))
                .await;
            let _ = tx.send(StreamEvent::Sources(fused.sources)).await;
            let _ = tx.send(StreamEvent::Done).await;
            return;
        }
    };

    let request = GenerationRequest::new(prompt, state.config.model.clone());
    emit_answer(state.generator.clone(), request, fused.sources, tx).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_index_payload() {
        let Json(body) = index().await;
        assert_eq!(body["message"], "LLM is running");
    }

    #[tokio::test]
    async fn test_health_payload() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["message"], "Backend service is running");
    }

    #[test]
    fn test_api_error_status_mapping() {
        let response =
            ApiError(AppError::UnsupportedInput("nope".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = ApiError(AppError::Other("boom".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_chat_request_deserialization() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"question": "What is RAG?"}"#).unwrap();
        assert_eq!(request.question, "What is RAG?");
    }

    #[test]
    fn test_upload_response_shape() {
        let response = UploadResponse {
            message: "ok".to_string(),
            document_count: 3,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["document_count"], 3);
        assert_eq!(json["message"], "ok");
    }
}
