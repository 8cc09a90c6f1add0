//! HTTP routes.
//!
//! # Routes
//! ```text
//! {root_path}/                      GET   → root
//! {root_path}/api/v1/healthz        GET   → health::healthz
//! {root_path}/api/v1/llm/generate   POST  → llm::generate
//! anything else                           → 404 / 405 JSON
//! ```

pub mod health;
pub mod llm;
pub mod models;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Json, Router,
};

use crate::cache::LivenessCheck;
use crate::error::ApiError;
use self::models::RootResponse;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<dyn LivenessCheck>,
}

impl AppState {
    pub fn new(cache: Arc<dyn LivenessCheck>) -> Self {
        Self { cache }
    }
}

/// Build the route table, nested under `root_path` when it is non-empty.
///
/// `max_body_bytes` replaces axum's 2 MiB default body cap on the generate
/// route; bodies over it are answered with 413.
pub fn router(state: AppState, root_path: &str, max_body_bytes: usize) -> Router {
    let v1 = Router::new()
        .route("/healthz", get(health::healthz))
        .route(
            "/llm/generate",
            post(llm::generate).layer(DefaultBodyLimit::max(max_body_bytes)),
        );

    let app = Router::new().route("/", get(root)).nest("/api/v1", v1);

    let app = if root_path.is_empty() {
        app
    } else {
        Router::new().nest(root_path, app)
    };

    app.fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
}

async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok".to_string(),
    })
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
