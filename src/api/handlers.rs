//! API Handlers
//!
//! HTTP request handlers translating store results into responses.

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{Result, StoreError};
use crate::models::{
    CompactResponse, DeleteResponse, GetResponse, HealthResponse, SetRequest, SetResponse,
};
use crate::store::{StatsSnapshot, Store};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The durable store; clones share one instance
    pub store: Store,
}

impl AppState {
    /// Creates a new AppState around an initialized store.
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

/// Handler for POST /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    state.store.set(req.key.clone(), req.value, req.ttl).await?;
    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    match state.store.get(&key).await? {
        Some(value) => Ok(Json(GetResponse::new(key, value))),
        None => Err(StoreError::NotFound(key)),
    }
}

/// Handler for DELETE /delete/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if state.store.delete(&key).await? {
        Ok(Json(DeleteResponse::new(key)))
    } else {
        Err(StoreError::NotFound(key))
    }
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.store.stats().await)
}

/// Handler for POST /compact
pub async fn compact_handler(State(state): State<AppState>) -> Result<Json<CompactResponse>> {
    let report = state.store.compact().await?;
    Ok(Json(CompactResponse::from_report(report)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
