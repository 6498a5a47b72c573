//! HTTP implementation of [`ShopApi`] using `reqwest`.

use std::sync::Arc;

use async_trait::async_trait;
use ceramic_artistry_core::{CartSync, NewUser, User};
use reqwest::StatusCode;
use tracing::{debug, instrument};
use url::Url;

use super::{ApiError, ShopApi};
use crate::config::trim_base_url;

/// Sent with account and cart calls.
const ACCEPT_ANY: &str = "*/*";

/// Sent with the sitemap call.
const ACCEPT_SITEMAP: &str = "application/xml, text/xml, */*";

/// Longest slice of an error body kept in [`ApiError::Status`].
const ERROR_BODY_LIMIT: usize = 200;

/// Client for the storefront backend.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the backend rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if `base_url` is not an absolute URL.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = trim_base_url(base_url).to_string();
        Url::parse(&base_url)?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url,
            }),
        })
    }

    /// The base URL requests are made against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Build `{base}{path}?{params}`.
    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}{path}", self.inner.base_url))?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: reqwest::RequestBuilder, path: &str) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(path.to_string()));
        }

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: body.chars().take(ERROR_BODY_LIMIT).collect(),
            });
        }

        Ok(body)
    }

    async fn post(&self, path: &str, params: &[(&str, String)]) -> Result<String, ApiError> {
        let url = self.endpoint(path, params)?;
        let request = self
            .inner
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, ACCEPT_ANY);
        self.send(request, path).await
    }
}

/// Parse an account response, treating an empty or `null` body as "no account".
fn parse_user(body: &str) -> Result<Option<User>, ApiError> {
    let body = body.trim();
    if body.is_empty() || body == "null" {
        return Ok(None);
    }
    Ok(serde_json::from_str::<Option<User>>(body)?)
}

#[async_trait]
impl ShopApi for ApiClient {
    #[instrument(skip(self, phone_number))]
    async fn login(&self, phone_number: &str) -> Result<Option<User>, ApiError> {
        let body = self
            .post("/user/login", &[("phoneNumber", phone_number.to_string())])
            .await?;
        debug!(bytes = body.len(), "Login response received");
        parse_user(&body)
    }

    #[instrument(skip(self, form), fields(username = %form.username))]
    async fn create_user(&self, form: &NewUser) -> Result<Option<User>, ApiError> {
        let params = [
            ("id", "0".to_string()),
            ("username", form.username.clone()),
            ("phoneNumber", form.phone_number.clone()),
            ("email", form.email.clone()),
            ("address", form.address.clone()),
            ("pincode", form.pincode.clone()),
        ];
        let body = self.post("/user/create", &params).await?;
        parse_user(&body)
    }

    #[instrument(skip(self), fields(user_id = %sync.user_id, product_id = %sync.product_id))]
    async fn sync_cart(&self, sync: CartSync) -> Result<(), ApiError> {
        let params = [
            ("id", sync.id.to_string()),
            ("userId", sync.user_id.to_string()),
            ("productId", sync.product_id.to_string()),
            ("quantity", sync.quantity.to_string()),
        ];
        // Body is an acknowledgement only
        self.post("/user/cart", &params).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn sitemap(&self) -> Result<String, ApiError> {
        let url = self.endpoint("/sitemap", &[])?;
        let request = self
            .inner
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, ACCEPT_SITEMAP);
        self.send(request, "/sitemap").await
    }
}
