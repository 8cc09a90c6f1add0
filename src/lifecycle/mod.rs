//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build cache client → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Record reason → Stop accepting → Drain in-flight requests → Exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last, so traffic only arrives once state is ready

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownListener, StopReason};
