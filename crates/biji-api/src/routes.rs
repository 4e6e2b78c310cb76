use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use biji_core::sync::{
    NotesResponse, RegisterResponse, SyncRequest, SyncResponse, SYNC_CODE_HEADER,
};
use chrono::Utc;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::AppError;
use crate::registry::{code_fingerprint, SyncRegistry};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    registry: Arc<SyncRegistry>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, registry: SyncRegistry) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/register", post(register))
        .route("/notes", get(get_notes))
        .route("/sync", post(sync));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", api_routes)
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
    accounts: usize,
}

async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().timestamp(),
        accounts: state.registry.account_count().await,
    })
}

async fn register(State(state): State<AppState>) -> Result<Json<RegisterResponse>, AppError> {
    let sync_code = state.registry.register_account().await?;
    Ok(Json(RegisterResponse { sync_code }))
}

async fn get_notes(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<NotesResponse>, AppError> {
    let sync_code = extract_sync_code(&headers)?;
    let notes = state.registry.get_notes(sync_code).await?;
    tracing::info!(
        endpoint = "notes",
        account = code_fingerprint(sync_code),
        count = notes.len(),
        "Served notes"
    );
    Ok(Json(NotesResponse { notes }))
}

async fn sync(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SyncResponse>, AppError> {
    let sync_code = extract_sync_code(&headers)?;
    let request: SyncRequest = serde_json::from_slice(&body)
        .map_err(|error| AppError::bad_request(format!("Invalid JSON: {error}")))?;

    let response = state
        .registry
        .sync(sync_code, request.notes, request.last_sync)
        .await?;
    Ok(Json(response))
}

fn extract_sync_code(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(SYNC_CODE_HEADER)
        .ok_or_else(|| AppError::unauthorized("Missing X-Sync-Code header"))?
        .to_str()
        .map_err(|_| AppError::unauthorized("X-Sync-Code header is not valid UTF-8"))?
        .trim();

    if value.is_empty() {
        return Err(AppError::unauthorized("Missing X-Sync-Code header"));
    }
    Ok(value)
}
