use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, routing::any};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub mod command;
pub mod config;
pub mod github;
pub mod handlers;
pub mod interactions;

/// Builds the HTTP application.
///
/// The webhook lives at `path`. Every other route answers `ok` as well.
pub fn app(ctx: Arc<handlers::Context>, path: &str) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<axum::body::Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|id| id.to_str().ok())
                    .unwrap_or_default();
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id,
                )
            },
        ))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(CatchPanicLayer::new())
        .layer(DefaultBodyLimit::max(github::MAX_PAYLOAD_SIZE));

    Router::new()
        .route(path, any(github::webhook))
        .fallback(|| async { github::ACK })
        .layer(middleware)
        .with_state(ctx)
}
