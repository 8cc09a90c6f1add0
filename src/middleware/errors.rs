//! Error normalization layer.
//!
//! # Responsibilities
//! - Pass every downstream response through untouched
//! - Turn downstream errors and panics into `500 {"error": "internal_error"}`
//! - Decide whether the failure description reaches the client
//!
//! # Design Decisions
//! - Installed outside the timeout guard; a 504 is an `Ok` response here
//! - The wrapped service is infallible, so hyper never sees a raw failure
//! - Panics are caught both while building and while polling the future

use std::any::Any;
use std::convert::Infallible;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::{extract::Request, response::Response};
use futures_util::FutureExt;
use tower::{BoxError, Layer, Service};

use crate::error::ApiError;
use crate::observability::metrics;

/// Layer that applies [`NormalizeError`] to a service.
#[derive(Debug, Clone, Copy)]
pub struct NormalizeErrorLayer {
    expose_detail: bool,
}

impl NormalizeErrorLayer {
    /// `expose_detail` controls whether the failure text is put in the body.
    pub fn new(expose_detail: bool) -> Self {
        Self { expose_detail }
    }
}

impl<S> Layer<S> for NormalizeErrorLayer {
    type Service = NormalizeError<S>;

    fn layer(&self, inner: S) -> Self::Service {
        NormalizeError {
            inner,
            expose_detail: self.expose_detail,
            not_ready: None,
        }
    }
}

/// Converts every downstream failure into the normalized 500 response.
#[derive(Debug)]
pub struct NormalizeError<S> {
    inner: S,
    expose_detail: bool,
    // Readiness failure, answered by the next `call`.
    not_ready: Option<String>,
}

impl<S: Clone> Clone for NormalizeError<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            expose_detail: self.expose_detail,
            not_ready: None,
        }
    }
}

impl<S> Service<Request> for NormalizeError<S>
where
    S: Service<Request, Response = Response>,
    S::Error: Into<BoxError>,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        match self.inner.poll_ready(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(())) => Poll::Ready(Ok(())),
            Poll::Ready(Err(e)) => {
                let error: BoxError = e.into();
                self.not_ready = Some(error.to_string());
                Poll::Ready(Ok(()))
            }
        }
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let expose_detail = self.expose_detail;
        let method = request.method().clone();
        let path = request.uri().path().to_owned();

        let fail = move |message: String| -> Result<Response, Infallible> {
            tracing::error!(method = %method, path = %path, error = %message, "Unhandled failure");
            metrics::record_internal_error();
            Ok(ApiError::Internal(message).into_response_with_detail(expose_detail))
        };

        if let Some(message) = self.not_ready.take() {
            return Box::pin(std::future::ready(fail(message)));
        }

        let downstream = match catch_unwind(AssertUnwindSafe(|| self.inner.call(request))) {
            Ok(future) => future,
            Err(payload) => {
                return Box::pin(std::future::ready(fail(panic_message(payload.as_ref()))));
            }
        };

        Box::pin(async move {
            match AssertUnwindSafe(downstream).catch_unwind().await {
                Ok(Ok(response)) => Ok(response),
                Ok(Err(e)) => {
                    let error: BoxError = e.into();
                    fail(error.to_string())
                }
                Err(payload) => fail(panic_message(payload.as_ref())),
            }
        })
    }
}

/// Best-effort string form of a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
