//! Graceful stop for the API server.
//!
//! A [`Shutdown`] handle records *why* the server is stopping; every
//! [`ShutdownListener`] (the serve loop, background tasks) resolves once a
//! reason is recorded, including listeners created after the trigger.

use std::fmt;
use std::sync::Arc;

use tokio::sync::watch;

/// What asked the server to stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// An OS signal, by name (`SIGINT`, `SIGTERM`).
    Signal(&'static str),
    /// Programmatic stop, e.g. from a test harness or an embedding binary.
    Requested,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Signal(name) => write!(f, "signal {name}"),
            StopReason::Requested => f.write_str("requested"),
        }
    }
}

/// Cloneable handle that fires the stop. Clones share one state.
#[derive(Clone)]
pub struct Shutdown {
    state: Arc<watch::Sender<Option<StopReason>>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            state: Arc::new(state),
        }
    }

    /// Record `reason` and wake every listener. Only the first reason is
    /// kept; later calls return `false`.
    pub fn trigger(&self, reason: StopReason) -> bool {
        let first = self.state.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        });
        if first {
            tracing::info!(%reason, listeners = self.state.receiver_count(), "Shutdown triggered");
        }
        first
    }

    /// The recorded reason, if the stop has fired.
    pub fn reason(&self) -> Option<StopReason> {
        *self.state.borrow()
    }

    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            state: self.state.subscribe(),
        }
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side handed to the serve loop.
pub struct ShutdownListener {
    state: watch::Receiver<Option<StopReason>>,
}

impl ShutdownListener {
    /// Resolve with the reason once the stop fires; immediately if it
    /// already has. Never resolves if every [`Shutdown`] handle is dropped
    /// without firing.
    pub async fn signalled(mut self) -> StopReason {
        let fired = self.state.wait_for(Option::is_some).await.ok().and_then(|r| *r);
        match fired {
            Some(reason) => reason,
            None => std::future::pending().await,
        }
    }

    pub fn is_signalled(&self) -> bool {
        self.state.borrow().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_trigger_reaches_every_listener() {
        let shutdown = Shutdown::new();
        let a = shutdown.listener();
        let b = shutdown.clone().listener();
        assert!(!a.is_signalled());

        assert!(shutdown.trigger(StopReason::Signal("SIGTERM")));
        assert_eq!(a.signalled().await, StopReason::Signal("SIGTERM"));
        assert_eq!(b.signalled().await, StopReason::Signal("SIGTERM"));
    }

    #[tokio::test]
    async fn test_late_listener_sees_earlier_trigger() {
        let shutdown = Shutdown::new();
        shutdown.trigger(StopReason::Requested);

        let late = shutdown.listener();
        assert!(late.is_signalled());
        assert_eq!(late.signalled().await, StopReason::Requested);
    }

    #[test]
    fn test_first_reason_wins() {
        let shutdown = Shutdown::default();
        assert_eq!(shutdown.reason(), None);
        assert!(shutdown.trigger(StopReason::Signal("SIGINT")));
        assert!(!shutdown.trigger(StopReason::Requested));
        assert_eq!(shutdown.reason(), Some(StopReason::Signal("SIGINT")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_listener_waits_while_untriggered() {
        let shutdown = Shutdown::new();
        let pending = tokio::time::timeout(Duration::from_secs(60), shutdown.listener().signalled()).await;
        assert!(pending.is_err());
    }
}
