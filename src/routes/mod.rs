pub mod passwords;

use axum::{middleware as ax_middleware, Router};
use tower_http::{
    compression::CompressionLayer, decompression::DecompressionLayer, limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::{error_handlers::handler_404, middleware, state::AppState};

/// Builds the full service: routes, fallback and middleware stack.
pub fn app(state: AppState) -> Router {
    let request_timeout = state.config.request_timeout;

    Router::new()
        .nest("/passwords", passwords::router())
        .fallback(handler_404)
        // Keep above request_id().
        .layer(ax_middleware::from_fn(middleware::response_meta))
        .layer(TraceLayer::new_for_http())
        .layer(
            CompressionLayer::new()
                .br(true)
                .gzip(true)
                .deflate(true)
                .zstd(true),
        )
        .layer(
            DecompressionLayer::new()
                .br(true)
                .gzip(true)
                .deflate(true)
                .zstd(true),
        )
        .layer(RequestBodyLimitLayer::new(8192))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(ax_middleware::from_fn(middleware::request_id))
        .with_state(state)
}
