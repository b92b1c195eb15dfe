use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use planwise_core::{Persistence, PlanService};
use planwise_db::models::Plan;

use crate::error::AppError;
use crate::upload::{self, MULTIPART_OVERHEAD_BYTES, UploadError};

/// Multipart part that carries the uploaded document.
const UPLOAD_FIELD: &str = "file";

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Handles shared by every request.
pub struct AppState {
    pub service: PlanService,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(service: PlanService, max_upload_bytes: usize) -> Self {
        Self {
            service,
            max_upload_bytes,
        }
    }
}

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /analyze`. Absent or null fields, and null steps, are
/// treated as empty.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub steps: Option<Vec<Option<String>>>,
}

impl AnalyzeRequest {
    /// Decode a request body regardless of its declared content type.
    fn from_body(body: &[u8]) -> Result<(String, Vec<String>), serde_json::Error> {
        let request: Self = serde_json::from_slice(body)?;
        let steps = request
            .steps
            .unwrap_or_default()
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect();
        Ok((request.title.unwrap_or_default(), steps))
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub title: String,
    pub steps: Vec<String>,
    pub suggestions: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub summary: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: Arc<AppState>) -> Router {
    let upload_body_limit = state
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .route("/ping", get(ping))
        .route("/analyze", post(analyze))
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(upload_body_limit)),
        )
        .route("/plans", get(list_plans))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(Arc::new(state));
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("planwise listening on http://{addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("planwise shut down");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn ping() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "pong" }))
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let (title, steps) = AnalyzeRequest::from_body(&body).map_err(|e| {
        debug!(error = %e, "rejected analyze body");
        AppError::bad_request("Invalid request JSON")
    })?;

    let outcome = state
        .service
        .analyze(&title, &steps)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;

    if let Persistence::Failed(reason) = &outcome.persistence {
        warn!(%title, %reason, "failed to save plan");
    }

    Ok(Json(AnalyzeResponse {
        title,
        steps,
        suggestions: outcome.suggestions,
    }))
}

async fn upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!(reason = %rejection.body_text(), "upload is not multipart");
        UploadError::MissingFile
    })?;

    let bytes = upload::read_file_field(&mut multipart, UPLOAD_FIELD, state.max_upload_bytes)
        .await
        .inspect_err(|e| debug!(error = %e, "upload rejected"))?;
    let text = String::from_utf8_lossy(&bytes);

    let summary = state
        .service
        .summarize(&text)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(Json(UploadResponse { summary }))
}

async fn list_plans(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Plan>>, AppError> {
    let listing = state
        .service
        .recent_plans()
        .await
        .map_err(|_| AppError::internal("Failed to fetch plans"))?;

    if listing.is_partial() {
        for row in &listing.skipped {
            warn!(id = ?row.id, reason = %row.reason, "skipped undecodable plan row");
        }
    }

    Ok(Json(listing.plans))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
