//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. URL normalization (deep links, collection casing)

pub mod normalize;

pub use normalize::normalize_middleware;
