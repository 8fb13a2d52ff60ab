//! Web GUI and JSON API.
//!
//! - GET  /             - the single-page GUI
//! - POST /api/submit   - record a prompt, return caption + both images
//! - GET  /api/history  - prompts recorded for a session
//! - GET  /api/status   - health check

use anyhow::Result;
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::consts::DEFAULT_SESSION;
use crate::engine::{Engine, Submission};
use crate::error::SubmitError;
use crate::image::DecodedImage;

const INDEX_HTML: &str = include_str!("../assets/index.html");

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub text: String,
    #[serde(default)]
    pub session: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImagePayload {
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub data_url: String,
}

impl From<&DecodedImage> for ImagePayload {
    fn from(image: &DecodedImage) -> Self {
        Self {
            format: image.format.to_string(),
            width: image.width,
            height: image.height,
            data_url: image.to_data_url(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub caption: String,
    pub ordinal: usize,
    pub combined: String,
    pub prompt_image: ImagePayload,
    pub combined_image: ImagePayload,
}

impl From<Submission> for SubmitResponse {
    fn from(s: Submission) -> Self {
        Self {
            prompt_image: ImagePayload::from(&s.prompt_image),
            combined_image: ImagePayload::from(&s.combined_image),
            caption: s.caption,
            ordinal: s.ordinal,
            combined: s.combined,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub session: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session: String,
    pub prompts: Vec<String>,
}

/// Submission failure as an HTTP response.
pub struct ApiError(pub SubmitError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            SubmitError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SubmitError::Upstream(_) | SubmitError::Decode(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.0.to_string();
        if self.0.is_config() {
            tracing::warn!(error = %message, "submission rejected");
        } else {
            tracing::error!(error = %message, "submission failed");
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

// ============================================================================
// Server State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<dyn Engine>,
    pub model: String,
    pub history_scope: &'static str,
}

// ============================================================================
// Routes
// ============================================================================

/// Create the router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/submit", post(submit_handler))
        .route("/api/history", get(history_handler))
        .route("/api/status", get(status_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl+C.
pub async fn run(listener: TcpListener, state: AppState) -> Result<()> {
    let app = create_router(state);
    tracing::info!(addr = %listener.local_addr()?, "serving GUI");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutting down");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Handlers
// ============================================================================

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn status_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "model": state.model,
        "history": state.history_scope,
    }))
}

async fn submit_handler(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let session = req.session.as_deref().unwrap_or(DEFAULT_SESSION);
    let submission = state
        .engine
        .submit(session, &req.text)
        .await
        .map_err(ApiError)?;
    Ok(Json(submission.into()))
}

async fn history_handler(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Json<HistoryResponse> {
    let session = params
        .session
        .unwrap_or_else(|| DEFAULT_SESSION.to_string());
    let prompts = state.engine.history(&session).await;
    Json(HistoryResponse { session, prompts })
}
