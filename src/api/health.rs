use axum::{extract::State, Json};

use crate::api::models::HealthResponse;
use crate::api::AppState;

/// Light check that never blocks on, or fails because of, the cache.
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let redis = state.cache.ping().await;
    Json(HealthResponse { ok: true, redis })
}
