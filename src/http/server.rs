//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the cache client and application state
//! - Wire up middleware (tracing, request ID, CORS, error normalization, timeout)
//! - Bind the router to a listener and serve until shutdown
//!
//! # Layer order (outermost first)
//! ```text
//! SetRequestId → Trace → PropagateRequestId → metrics → CORS
//!     → NormalizeError → RequestTimeout → routes
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{http::HeaderName, middleware::from_fn, Router};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::api::{self, AppState};
use crate::cache::{LivenessCheck, RedisCache};
use crate::config::ApiConfig;
use crate::lifecycle::ShutdownListener;
use crate::middleware::{NormalizeErrorLayer, RequestTimeoutLayer};
use crate::observability::metrics;

pub const X_REQUEST_ID: &str = "x-request-id";

/// HTTP server for the API.
pub struct ApiServer {
    router: Router,
    config: ApiConfig,
}

impl ApiServer {
    /// Create a server backed by the Redis cache named in the config.
    pub fn new(config: ApiConfig) -> Result<Self, redis::RedisError> {
        let cache = RedisCache::new(
            &config.redis_url,
            Duration::from_millis(config.cache.ping_timeout_ms),
        )?;
        Ok(Self::with_cache(config, Arc::new(cache)))
    }

    /// Create a server with an explicit liveness check.
    pub fn with_cache(config: ApiConfig, cache: Arc<dyn LivenessCheck>) -> Self {
        let state = AppState::new(cache);
        let routes = api::router(state, &config.root_path, config.listener.max_body_bytes);
        let router = apply_middleware(routes, &config);
        Self { router, config }
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            root_path = %self.config.root_path,
            request_timeout_ms = self.config.timeouts.request_ms,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let reason = shutdown.signalled().await;
                tracing::info!(%reason, "Draining in-flight requests");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wrap `router` in the request lifecycle stack.
pub fn apply_middleware(router: Router, config: &ApiConfig) -> Router {
    let request_id = HeaderName::from_static(X_REQUEST_ID);

    router
        .layer(RequestTimeoutLayer::from_millis(config.timeouts.request_ms))
        .layer(NormalizeErrorLayer::new(config.expose_error_detail()))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(from_fn(metrics::track_requests))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
}
