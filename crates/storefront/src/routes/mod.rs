//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /sitemap.xml            - Sitemap (proxied from the backend)
//! GET  /*                      - Built static site (fallback service)
//! ```

pub mod sitemap;

use axum::{Router, routing::get};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::middleware::normalize_middleware;
use crate::state::AppState;

/// Create the dynamic routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/sitemap.xml", get(sitemap::show))
}

/// Build the full application: dynamic routes, the static site behind them,
/// URL normalization in front of both, and request tracing.
pub fn app(state: AppState) -> Router {
    let static_site = ServeDir::new(&state.config().static_dir);

    Router::new()
        .merge(routes())
        .fallback_service(static_site)
        .layer(axum::middleware::from_fn(normalize_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check the backend.
pub async fn health() -> &'static str {
    "ok"
}
