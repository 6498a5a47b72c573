//! Backend API client.
//!
//! # Architecture
//!
//! - The backend owns accounts and server-side carts; this crate only calls it
//! - Every call is a plain HTTP request with parameters in the query string
//! - [`ShopApi`] is the seam the stores depend on, so tests can swap in stubs
//!
//! # Endpoints
//!
//! ```text
//! POST {base}/user/login?phoneNumber=            - Look up an account
//! POST {base}/user/create?id=0&username=&...     - Create an account
//! POST {base}/user/cart?id=0&userId=&productId=  - Set a cart line quantity
//! GET  {base}/sitemap                            - Sitemap payload
//! ```

mod client;

pub use client::ApiClient;

use async_trait::async_trait;
use ceramic_artistry_core::{CartSync, NewUser, User};
use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend replied with 404.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend replied with another non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Base URL or endpoint could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// Whether the backend reported that the resource does not exist.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::Status { status, .. } => *status == 404,
            _ => false,
        }
    }
}

/// Operations the storefront needs from the backend.
///
/// Account endpoints return `Ok(None)` when the backend answers with an empty
/// body; a 404 surfaces as [`ApiError::NotFound`].
#[async_trait]
pub trait ShopApi: Send + Sync {
    /// Look up the account registered to `phone_number`.
    async fn login(&self, phone_number: &str) -> Result<Option<User>, ApiError>;

    /// Create an account from a signup form.
    async fn create_user(&self, form: &NewUser) -> Result<Option<User>, ApiError>;

    /// Set the server-side quantity of one cart line.
    async fn sync_cart(&self, sync: CartSync) -> Result<(), ApiError>;

    /// Fetch the sitemap payload (XML or JSON, passed through untouched).
    async fn sitemap(&self) -> Result<String, ApiError>;
}
