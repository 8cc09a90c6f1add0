//! Request timeout guard.
//!
//! # Responsibilities
//! - Bound the wall-clock time of everything downstream of this layer
//! - Cancel the downstream future when the budget elapses
//! - Answer with a fixed `504 {"error": "timeout"}`
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - A timeout is a normal response, not an error, so outer layers pass it through
//! - Cancellation means dropping the downstream future; work it spawned
//!   elsewhere keeps running
//! - One global budget for all routes, no retry

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::error::ApiError;
use crate::observability::metrics;

/// Budget used when the layer is built without an explicit duration.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Layer that applies [`RequestTimeout`] to a service.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimeoutLayer {
    budget: Duration,
}

impl RequestTimeoutLayer {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }
}

impl Default for RequestTimeoutLayer {
    fn default() -> Self {
        Self::new(DEFAULT_REQUEST_TIMEOUT)
    }
}

impl<S> Layer<S> for RequestTimeoutLayer {
    type Service = RequestTimeout<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestTimeout {
            inner,
            budget: self.budget,
        }
    }
}

/// Runs the inner service under a deadline.
#[derive(Debug, Clone)]
pub struct RequestTimeout<S> {
    inner: S,
    budget: Duration,
}

impl<S> Service<Request> for RequestTimeout<S>
where
    S: Service<Request, Response = Response>,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let method = request.method().clone();
        let path = request.uri().path().to_owned();
        let budget = self.budget;
        let downstream = self.inner.call(request);

        Box::pin(async move {
            match tokio::time::timeout(budget, downstream).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        method = %method,
                        path = %path,
                        budget_ms = budget.as_millis() as u64,
                        "Request exceeded time budget"
                    );
                    metrics::record_timeout();
                    Ok(ApiError::Timeout.into_response())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode};
    use std::convert::Infallible;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tower::util::BoxCloneService;
    use tower::{service_fn, ServiceExt};

    fn slow_service(delay: Duration, finished: Arc<AtomicBool>) -> BoxCloneService<Request, Response, Infallible> {
        BoxCloneService::new(service_fn(move |_req: Request| {
            let finished = finished.clone();
            async move {
                tokio::time::sleep(delay).await;
                finished.store(true, Ordering::SeqCst);
                Ok::<_, Infallible>(
                    Response::builder()
                        .status(StatusCode::CREATED)
                        .header("x-downstream", "yes")
                        .body(Body::from("done"))
                        .unwrap(),
                )
            }
        }))
    }

    #[test]
    fn test_default_budget() {
        assert_eq!(RequestTimeoutLayer::default().budget(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_fast_response_passes_through() {
        let finished = Arc::new(AtomicBool::new(false));
        let svc = RequestTimeoutLayer::from_millis(200)
            .layer(slow_service(Duration::from_millis(5), finished.clone()));

        let response = svc
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["x-downstream"], "yes");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"done");
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_response_times_out_and_is_cancelled() {
        let finished = Arc::new(AtomicBool::new(false));
        let svc = RequestTimeoutLayer::from_millis(50)
            .layer(slow_service(Duration::from_secs(5), finished.clone()));

        let response = svc
            .oneshot(Request::builder().uri("/slow").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(&body).unwrap(),
            serde_json::json!({"error": "timeout"})
        );

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(!finished.load(Ordering::SeqCst), "downstream future should be dropped");
    }
}
