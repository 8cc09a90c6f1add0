//! Error taxonomy for the HTTP surface.
//!
//! # Responsibilities
//! - Name every failure category a response can carry
//! - Map each category to exactly one status code
//! - Render the JSON body for that category
//!
//! # Design Decisions
//! - Client mistakes use the `{"detail": ...}` shape
//! - Server-side failures use the normalized `{"error": ..., "detail"?: ...}` shape
//! - Internal detail is only rendered when the caller allows it

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Normalized error body for server-side failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Body for client-side rejections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

/// Every failure a handler or middleware can turn into a response.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    /// Body the JSON extractor refused; keeps the extractor's own status
    /// (413 too large, 415 wrong content type, 400/422 bad JSON).
    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },

    #[error("Not Found")]
    NotFound,

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("timeout")]
    Timeout,

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected { status, .. } => *status,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the response, optionally withholding internal failure text.
    pub fn into_response_with_detail(self, expose_detail: bool) -> Response {
        let status = self.status();
        match self {
            ApiError::Timeout => (
                status,
                Json(ErrorResponse {
                    error: "timeout",
                    detail: None,
                }),
            )
                .into_response(),
            ApiError::Internal(message) => (
                status,
                Json(ErrorResponse {
                    error: "internal_error",
                    detail: expose_detail.then_some(message),
                }),
            )
                .into_response(),
            other => (
                status,
                Json(DetailResponse {
                    detail: other.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Rejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    /// Withholds internal text; see [`ApiError::into_response_with_detail`].
    fn into_response(self) -> Response {
        self.into_response_with_detail(false)
    }
}
