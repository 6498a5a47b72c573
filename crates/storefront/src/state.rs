//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::api::{ApiClient, ApiError, ShopApi};
use crate::config::StorefrontConfig;

/// How long a proxied sitemap is served from memory.
pub const SITEMAP_TTL: Duration = Duration::from_secs(3600);

/// Cache key of the one sitemap document.
pub(crate) const SITEMAP_KEY: &str = "sitemap";

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: Arc<dyn ShopApi>,
    sitemap_cache: Cache<&'static str, String>,
}

impl AppState {
    /// Create the state with an HTTP client for `config.api_base`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API base URL is invalid.
    pub fn new(config: StorefrontConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config.api_base)?;
        Ok(Self::with_api(config, Arc::new(api)))
    }

    /// Create the state around an existing backend.
    #[must_use]
    pub fn with_api(config: StorefrontConfig, api: Arc<dyn ShopApi>) -> Self {
        let sitemap_cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(SITEMAP_TTL)
            .build();

        Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                sitemap_cache,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the backend API.
    #[must_use]
    pub fn api(&self) -> &Arc<dyn ShopApi> {
        &self.inner.api
    }

    /// Get a reference to the proxied sitemap cache.
    #[must_use]
    pub fn sitemap_cache(&self) -> &Cache<&'static str, String> {
        &self.inner.sitemap_cache
    }
}
