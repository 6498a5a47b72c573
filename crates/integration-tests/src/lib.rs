//! Integration tests for Ceramic Artistry.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p ceramic-artistry-integration-tests
//! ```
//!
//! Nothing external is needed: [`ScriptedApi`] stands in for the backend
//! when driving the stores directly, and [`StubBackend`] serves the backend
//! HTTP contract on a local port for tests that go through the real
//! `ApiClient`.
//!
//! # Test Categories
//!
//! - `store_scenarios` - identity and cart flows over a scripted backend
//! - `api_client` - the HTTP client against the stub backend
//! - `server_routes` - the storefront router (sitemap, redirects, static files)

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header::ACCEPT},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use ceramic_artistry_core::{CartSync, NewUser, Product, ProductId, User, UserId};
use ceramic_artistry_storefront::api::{ApiError, ShopApi};
use ceramic_artistry_storefront::storage::MemoryStorage;
use ceramic_artistry_storefront::stores::Stores;
use rust_decimal::Decimal;

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A product priced in whole rupees.
#[must_use]
pub fn product(id: i64, name: &str, price: i64) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: Decimal::from(price),
        image: None,
        slug: None,
    }
}

/// A registered account.
#[must_use]
pub fn account(id: i64, phone_number: &str) -> User {
    User {
        id: UserId::new(id),
        username: format!("user{id}"),
        phone_number: phone_number.to_string(),
        email: format!("user{id}@example.com"),
        address: String::new(),
        pincode: String::new(),
    }
}

// =============================================================================
// ScriptedApi
// =============================================================================

/// In-process backend with scripted accounts and an observable cart log.
#[derive(Default)]
pub struct ScriptedApi {
    accounts: Mutex<HashMap<String, User>>,
    next_id: AtomicI64,
    syncs: Mutex<Vec<CartSync>>,
    fail_syncs: AtomicBool,
    fail_sitemap: AtomicBool,
    sitemap: Mutex<String>,
    sitemap_calls: AtomicI64,
}

impl ScriptedApi {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicI64::new(100),
            ..Self::default()
        })
    }

    /// Register an account that `login` will find.
    pub fn register(&self, user: User) {
        lock(&self.accounts).insert(user.phone_number.clone(), user);
    }

    /// Make every following cart sync fail (or succeed again).
    pub fn fail_syncs(&self, fail: bool) {
        self.fail_syncs.store(fail, Ordering::SeqCst);
    }

    /// Make the sitemap call fail (or succeed again).
    pub fn fail_sitemap(&self, fail: bool) {
        self.fail_sitemap.store(fail, Ordering::SeqCst);
    }

    /// Replace the sitemap document.
    pub fn set_sitemap(&self, body: &str) {
        *lock(&self.sitemap) = body.to_string();
    }

    /// Every cart sync received so far, in arrival order.
    #[must_use]
    pub fn syncs(&self) -> Vec<CartSync> {
        lock(&self.syncs).clone()
    }

    /// Number of sitemap requests received.
    #[must_use]
    pub fn sitemap_calls(&self) -> i64 {
        self.sitemap_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ShopApi for ScriptedApi {
    async fn login(&self, phone_number: &str) -> Result<Option<User>, ApiError> {
        lock(&self.accounts)
            .get(phone_number)
            .cloned()
            .map(Some)
            .ok_or_else(|| ApiError::NotFound("/user/login".to_string()))
    }

    async fn create_user(&self, form: &NewUser) -> Result<Option<User>, ApiError> {
        let user = User {
            id: UserId::new(self.next_id.fetch_add(1, Ordering::SeqCst)),
            username: form.username.clone(),
            phone_number: form.phone_number.clone(),
            email: form.email.clone(),
            address: form.address.clone(),
            pincode: form.pincode.clone(),
        };
        self.register(user.clone());
        Ok(Some(user))
    }

    async fn sync_cart(&self, sync: CartSync) -> Result<(), ApiError> {
        // Yield so concurrent syncs interleave like real requests
        tokio::task::yield_now().await;
        if self.fail_syncs.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 503,
                message: "cart service unavailable".to_string(),
            });
        }
        lock(&self.syncs).push(sync);
        Ok(())
    }

    async fn sitemap(&self) -> Result<String, ApiError> {
        self.sitemap_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sitemap.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 502,
                message: "bad gateway".to_string(),
            });
        }
        Ok(lock(&self.sitemap).clone())
    }
}

/// Stores over a scripted backend and fresh in-memory storage, initialized.
#[must_use]
pub fn scripted_stores(api: &Arc<ScriptedApi>) -> (Stores, Arc<MemoryStorage>) {
    let storage = Arc::new(MemoryStorage::new());
    let stores = Stores::new(api.clone(), storage.clone());
    stores.init();
    (stores, storage)
}

// =============================================================================
// StubBackend
// =============================================================================

/// Requests seen by the stub backend.
#[derive(Debug, Default)]
pub struct BackendLog {
    accounts: Mutex<HashMap<String, User>>,
    /// Query parameters of every `/user/create` call.
    pub creates: Mutex<Vec<HashMap<String, String>>>,
    /// Query parameters of every `/user/cart` call.
    pub cart_calls: Mutex<Vec<HashMap<String, String>>>,
    /// `Accept` header of every `/sitemap` call.
    pub sitemap_accepts: Mutex<Vec<String>>,
}

impl BackendLog {
    /// Register an account that `/user/login` will find.
    pub fn register(&self, user: User) {
        lock(&self.accounts).insert(user.phone_number.clone(), user);
    }
}

/// The backend HTTP contract served on a local port.
pub struct StubBackend {
    pub addr: SocketAddr,
    pub log: Arc<BackendLog>,
}

/// Sitemap served by [`StubBackend`].
pub const STUB_SITEMAP: &str = r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"><url><loc>https://svrve.com/collections/mugs</loc></url></urlset>"#;

impl StubBackend {
    /// Start the stub on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn spawn() -> Self {
        let log = Arc::new(BackendLog::default());
        let app = Router::new()
            .route("/user/login", post(stub_login))
            .route("/user/create", post(stub_create))
            .route("/user/cart", post(stub_cart))
            .route("/sitemap", get(stub_sitemap))
            .route("/broken/user/login", post(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .with_state(log.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("bind stub backend: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("stub backend address: {e}"));
        tokio::spawn(async move { axum::serve(listener, app).await });

        Self { addr, log }
    }

    /// Base URL to hand to `ApiClient::new`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

async fn stub_login(
    State(log): State<Arc<BackendLog>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let phone_number = params.get("phoneNumber").cloned().unwrap_or_default();
    match lock(&log.accounts).get(&phone_number) {
        Some(user) => Json(user.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn stub_create(
    State(log): State<Arc<BackendLog>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let field = |key: &str| params.get(key).cloned().unwrap_or_default();
    let user = User {
        id: UserId::new(77),
        username: field("username"),
        phone_number: field("phoneNumber"),
        email: field("email"),
        address: field("address"),
        pincode: field("pincode"),
    };
    lock(&log.creates).push(params.clone());
    Json(user).into_response()
}

async fn stub_cart(
    State(log): State<Arc<BackendLog>>,
    Query(params): Query<HashMap<String, String>>,
) -> StatusCode {
    lock(&log.cart_calls).push(params);
    StatusCode::OK
}

async fn stub_sitemap(State(log): State<Arc<BackendLog>>, headers: HeaderMap) -> Response {
    let accept = headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    lock(&log.sitemap_accepts).push(accept);
    ([("content-type", "application/xml")], STUB_SITEMAP).into_response()
}
