//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → api (route dispatch, handlers)
//!     → JSON response, x-request-id attached
//! ```

pub mod server;

pub use server::{apply_middleware, ApiServer, X_REQUEST_ID};
