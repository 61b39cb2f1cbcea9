//! Request tracking and tracing middleware.
//!
//! # Flow
//!
//! 1. **Assign** an `x-request-id` (kept if the client sent one, otherwise a new UUID)
//! 2. **Open a span** named `http_request` carrying the id, method and URI
//! 3. **Log** the response status and latency when the handler finishes
//! 4. **Echo** the id in the response `x-request-id` header
//!
//! # Example
//!
//! ```
//! use axum::{Router, routing::get};
//! use yamdb_web::middleware::with_request_tracing;
//!
//! let app: Router = with_request_tracing(Router::new().route("/health", get(|| async { "ok" })));
//! ```

use axum::Router;
use axum::http::{HeaderName, Request};
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span};

/// Header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Span factory that tags every request span with its request id.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "http_request",
            request_id = %request_id,
            method = %request.method(),
            uri = %request.uri(),
        )
    }
}

/// `TraceLayer` logging one line per response at INFO.
#[must_use]
pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, RequestSpan> {
    TraceLayer::new_for_http()
        .make_span_with(RequestSpan)
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

/// Wrap a router with request-id assignment, tracing and id propagation.
pub fn with_request_tracing<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let header = HeaderName::from_static(REQUEST_ID_HEADER);
    // Layers added last run first: the id must exist before the span opens.
    router
        .layer(PropagateRequestIdLayer::new(header.clone()))
        .layer(trace_layer())
        .layer(SetRequestIdLayer::new(header, MakeRequestUuid))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{body::Body, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        with_request_tracing(Router::new().route("/test", get(|| async { "ok" })))
    }

    #[tokio::test]
    async fn request_id_generated_if_missing() {
        let response = app()
            .oneshot(Request::builder().uri("/test").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response.headers().get(REQUEST_ID_HEADER).unwrap();
        assert!(!id.to_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn request_id_preserved_from_request() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/test")
                    .header(REQUEST_ID_HEADER, "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers().get(REQUEST_ID_HEADER).unwrap(), "req-42");
    }
}
