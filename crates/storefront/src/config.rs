//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional; defaults point at the production backend.
//!
//! - `STOREFRONT_API_BASE` - Backend API base URL (default: <https://api.svrve.com>)
//! - `STOREFRONT_SITE_URL` - Public site URL used for SEO and the fallback sitemap
//!   (default: <https://svrve.com>)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_STATIC_DIR` - Built site served by the server (default: dist)
//! - `STOREFRONT_STORAGE_DIR` - Local storage directory used by the terminal client
//!   (default: .storefront)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

/// Production backend, used when `STOREFRONT_API_BASE` is unset.
pub const DEFAULT_API_BASE: &str = "https://api.svrve.com";

/// Production site, used when `STOREFRONT_SITE_URL` is unset.
pub const DEFAULT_SITE_URL: &str = "https://svrve.com";

/// Profile file loaded before `.env`.
pub const LOCAL_ENV_FILE: &str = ".env.local";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend API base URL, without a trailing slash
    pub api_base: String,
    /// Public URL of the site
    pub site_url: String,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory holding the built static site
    pub static_dir: PathBuf,
    /// Directory backing local storage for the terminal client
    pub storage_dir: PathBuf,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone, Default)]
pub struct SentryConfig {
    /// Sentry DSN; tracking is disabled when unset
    pub dsn: Option<String>,
    /// Environment tag attached to events
    pub environment: Option<String>,
    /// Error event sample rate
    pub sample_rate: f32,
    /// Performance trace sample rate
    pub traces_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Loads `.env.local` and then `.env` via `dotenvy` if present. Variables
    /// already set in the process environment are never overridden.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // .env.local (written by `ca-cli env`) wins over .env; neither is required
        let _ = dotenvy::from_filename(LOCAL_ENV_FILE);
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_base = validated_url("STOREFRONT_API_BASE", &env_or("STOREFRONT_API_BASE", DEFAULT_API_BASE))?;
        let site_url = validated_url("STOREFRONT_SITE_URL", &env_or("STOREFRONT_SITE_URL", DEFAULT_SITE_URL))?;
        let host = env_or("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string()))?;
        let port = env_or("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string()))?;
        let static_dir = PathBuf::from(env_or("STOREFRONT_STATIC_DIR", "dist"));
        let storage_dir = PathBuf::from(env_or("STOREFRONT_STORAGE_DIR", ".storefront"));

        let sentry = SentryConfig {
            dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.trim().is_empty()),
            environment: lookup("SENTRY_ENVIRONMENT"),
            sample_rate: parse_rate("SENTRY_SAMPLE_RATE", &env_or("SENTRY_SAMPLE_RATE", "1.0"))?,
            traces_sample_rate: parse_rate(
                "SENTRY_TRACES_SAMPLE_RATE",
                &env_or("SENTRY_TRACES_SAMPLE_RATE", "0.0"),
            )?,
        };

        Ok(Self {
            api_base,
            site_url,
            host,
            port,
            static_dir,
            storage_dir,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Strip trailing slashes so endpoint paths can be appended directly.
#[must_use]
pub fn trim_base_url(url: &str) -> &str {
    url.trim().trim_end_matches('/')
}

/// Check that a variable holds an absolute URL and return it without a trailing slash.
fn validated_url(key: &str, value: &str) -> Result<String, ConfigError> {
    let trimmed = trim_base_url(value);
    if trimmed.is_empty() {
        return Err(ConfigError::MissingEnvVar(key.to_string()));
    }
    Url::parse(trimmed).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(trimmed.to_string())
}

/// Parse a sample rate in `0.0..=1.0`.
fn parse_rate(key: &str, value: &str) -> Result<f32, ConfigError> {
    let rate = value
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}
