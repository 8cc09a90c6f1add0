//! Request lifecycle middleware.
//!
//! # Data Flow
//! ```text
//! incoming request
//!     → errors.rs  (NormalizeErrorLayer, outermost)
//!     → timeout.rs (RequestTimeoutLayer)
//!     → route dispatch
//! ```
//!
//! The order is fixed: the timeout guard answers with a normal 504 response,
//! which the normalization layer must see as a success.

pub mod errors;
pub mod timeout;

pub use errors::{NormalizeError, NormalizeErrorLayer};
pub use timeout::{RequestTimeout, RequestTimeoutLayer, DEFAULT_REQUEST_TIMEOUT};
