//! Placeholder generation endpoint.
//!
//! Validates the prompt and answers with the prompt reversed plus synthetic
//! token counts of one token per four characters, at least one.

use axum::{extract::rejection::JsonRejection, Json};

use crate::api::models::{GenerateRequest, GenerateResponse};
use crate::error::ApiError;

/// Synthetic token count: `max(1, chars / 4)`.
pub fn approx_tokens(text: &str) -> usize {
    (text.chars().count() / 4).max(1)
}

/// Pure transform behind the endpoint.
pub fn generate_text(prompt: &str) -> Result<GenerateResponse, ApiError> {
    if prompt.trim().is_empty() {
        return Err(ApiError::Validation("prompt required".to_string()));
    }

    let text: String = prompt.chars().rev().collect();
    Ok(GenerateResponse {
        tokens_in: approx_tokens(prompt),
        tokens_out: approx_tokens(&text),
        text,
    })
}

pub async fn generate(
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(request) = payload?;

    tracing::debug!(
        model = request.model.as_deref().unwrap_or("default"),
        temperature = request.temperature,
        "Generate request"
    );

    let prompt = request.prompt.unwrap_or_default();
    generate_text(&prompt).map(Json)
}
