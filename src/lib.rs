//! AI for Science API library.
//!
//! A small HTTP service: a health endpoint backed by a cache liveness check,
//! a placeholder generation endpoint, and a request lifecycle chain that
//! bounds handling time and normalizes failures into JSON.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod middleware;
pub mod observability;

pub use config::ApiConfig;
pub use error::ApiError;
pub use http::ApiServer;
pub use lifecycle::{Shutdown, StopReason};
