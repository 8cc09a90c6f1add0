//! Cache liveness client.
//!
//! # Responsibilities
//! - Own the Redis client handle for the life of the process
//! - Answer "is the cache reachable?" without ever failing the caller
//!
//! # Design Decisions
//! - Constructed once at startup and injected into handlers through state
//! - URL parsing happens at construction; no network I/O until the first ping
//! - Every ping carries its own deadline, shorter than the request budget
//! - The connection slot is behind an async mutex so concurrent first
//!   pings cannot each dial a connection
//! - A failed ping drops the connection it used, and only that one: each
//!   dial gets a generation number, and a stale failure leaves a newer
//!   connection in place

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tokio::sync::Mutex;

use crate::observability::metrics;

/// Something whose reachability can be checked.
#[async_trait]
pub trait LivenessCheck: Send + Sync {
    /// `true` when the dependency answered in time. Never fails.
    async fn ping(&self) -> bool;
}

/// Cached connection tagged with the dial that produced it.
#[derive(Debug)]
struct Slot<C> {
    conn: Option<C>,
    generation: u64,
}

impl<C: Clone> Slot<C> {
    fn new() -> Self {
        Self {
            conn: None,
            generation: 0,
        }
    }

    fn current(&self) -> Option<(C, u64)> {
        self.conn.clone().map(|conn| (conn, self.generation))
    }

    fn store(&mut self, conn: C) -> u64 {
        self.generation += 1;
        self.conn = Some(conn);
        self.generation
    }

    /// Drop the connection if it is still the one from `generation`.
    fn clear_if(&mut self, generation: u64) -> bool {
        if self.generation == generation && self.conn.is_some() {
            self.conn = None;
            true
        } else {
            false
        }
    }
}

/// Redis-backed liveness client.
pub struct RedisCache {
    client: redis::Client,
    ping_timeout: Duration,
    slot: Mutex<Slot<MultiplexedConnection>>,
}

impl RedisCache {
    /// Parse `url` and prepare a client. Does not connect.
    pub fn new(url: &str, ping_timeout: Duration) -> redis::RedisResult<Self> {
        Ok(Self {
            client: redis::Client::open(url)?,
            ping_timeout,
            slot: Mutex::new(Slot::new()),
        })
    }

    async fn connection(&self) -> redis::RedisResult<(MultiplexedConnection, u64)> {
        let mut slot = self.slot.lock().await;
        if let Some(current) = slot.current() {
            return Ok(current);
        }
        let conn = self.client.get_multiplexed_async_connection().await?;
        let generation = slot.store(conn.clone());
        Ok((conn, generation))
    }

    /// PING over the cached connection. `used` is set as soon as a
    /// connection is in hand, so a caller that times out still knows it.
    async fn round_trip(&self, used: &mut Option<u64>) -> redis::RedisResult<bool> {
        let (mut conn, generation) = self.connection().await?;
        *used = Some(generation);
        let reply: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(reply == "PONG")
    }
}

#[async_trait]
impl LivenessCheck for RedisCache {
    async fn ping(&self) -> bool {
        let mut used = None;
        let healthy = match tokio::time::timeout(self.ping_timeout, self.round_trip(&mut used)).await {
            Ok(Ok(pong)) => pong,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Cache ping failed");
                false
            }
            Err(_) => {
                tracing::warn!(
                    timeout_ms = self.ping_timeout.as_millis() as u64,
                    "Cache ping timed out"
                );
                false
            }
        };

        if !healthy {
            if let Some(generation) = used {
                if self.slot.lock().await.clear_if(generation) {
                    tracing::debug!(generation, "Dropped cache connection");
                }
            }
        }
        metrics::record_cache_ping(healthy);
        healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_url_is_rejected_at_construction() {
        assert!(RedisCache::new("not a url", Duration::from_millis(100)).is_err());
    }

    #[test]
    fn test_stale_failure_keeps_newer_connection() {
        let mut slot = Slot::new();
        let first = slot.store("first");
        assert!(slot.clear_if(first));

        // A concurrent caller redials while the first failure is reported late.
        let second = slot.store("second");
        assert!(!slot.clear_if(first));
        assert_eq!(slot.current(), Some(("second", second)));

        assert!(slot.clear_if(second));
        assert_eq!(slot.current(), None);
        assert!(!slot.clear_if(second));
    }

    #[tokio::test]
    async fn test_unreachable_cache_reports_false() {
        // Port 1 on loopback refuses connections.
        let cache = RedisCache::new("redis://127.0.0.1:1/0", Duration::from_millis(500)).unwrap();
        assert!(!cache.ping().await);
        // The handle survives a failed ping and can be asked again.
        assert!(!cache.ping().await);
        assert!(cache.slot.lock().await.current().is_none());
    }

    #[tokio::test]
    async fn test_ping_honors_its_deadline() {
        // Non-routable address: the connect attempt hangs until the deadline.
        let cache = RedisCache::new("redis://10.255.255.1:6379/0", Duration::from_millis(50)).unwrap();
        let started = std::time::Instant::now();
        assert!(!cache.ping().await);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
