//! Client-side state: the current account and the cart.
//!
//! Both stores follow the same shape: in-memory state is authoritative for
//! the session, a JSON mirror in [`LocalStorage`] reseeds it on the next
//! start, and the backend behind [`ShopApi`] holds the durable copy.
//!
//! [`Stores`] builds both once and hands them out by reference:
//!
//! ```rust,ignore
//! let stores = Stores::new(api, storage);
//! stores.init();
//! stores.identity().login("9876543210").await?;
//! stores.cart().add_item(product, 1).await;
//! stores.teardown();
//! ```

pub mod cart;
pub mod identity;
mod persisted;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use cart::{CartStore, MutationPolicy};
pub use identity::IdentityStore;

use crate::api::ShopApi;
use crate::storage::LocalStorage;

/// The identity and cart stores of one session.
#[derive(Debug, Clone)]
pub struct Stores {
    identity: Arc<IdentityStore>,
    cart: Arc<CartStore>,
}

impl Stores {
    /// Build both stores over the same backend and storage.
    ///
    /// Nothing is read until [`init`](Self::init) is called.
    #[must_use]
    pub fn new(api: Arc<dyn ShopApi>, storage: Arc<dyn LocalStorage>) -> Self {
        let identity = Arc::new(IdentityStore::new(api.clone(), storage.clone()));
        let cart = Arc::new(CartStore::new(api, storage, identity.clone()));
        Self { identity, cart }
    }

    /// Hydrate both stores from storage. Safe to call more than once.
    pub fn init(&self) {
        self.identity.hydrate();
        self.cart.hydrate();
    }

    /// Flush both stores to storage before the session ends.
    ///
    /// Retries mirrors whose last write failed; errors are logged only.
    pub fn teardown(&self) {
        if let Err(e) = self.identity.persist() {
            tracing::warn!(error = %e, "Failed to flush user on teardown");
        }
        if let Err(e) = self.cart.persist() {
            tracing::warn!(error = %e, "Failed to flush cart on teardown");
        }
    }

    /// The identity store.
    #[must_use]
    pub const fn identity(&self) -> &Arc<IdentityStore> {
        &self.identity
    }

    /// The cart store.
    #[must_use]
    pub const fn cart(&self) -> &Arc<CartStore> {
        &self.cart
    }
}

// A panic while holding a store lock leaves plain data behind, so poisoning
// is not treated as fatal.
fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use async_trait::async_trait;
    use ceramic_artistry_core::{CartSync, NewUser, User};

    use super::*;
    use crate::api::ApiError;
    use crate::storage::{CART_KEY, MemoryStorage, StorageError, USER_KEY};

    struct OfflineApi;

    #[async_trait]
    impl ShopApi for OfflineApi {
        async fn login(&self, _phone_number: &str) -> Result<Option<User>, ApiError> {
            Ok(None)
        }

        async fn create_user(&self, _form: &NewUser) -> Result<Option<User>, ApiError> {
            Ok(None)
        }

        async fn sync_cart(&self, _sync: CartSync) -> Result<(), ApiError> {
            Ok(())
        }

        async fn sitemap(&self) -> Result<String, ApiError> {
            Ok(String::new())
        }
    }

    /// Storage that cannot be read or written.
    struct BrokenStorage;

    impl LocalStorage for BrokenStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk gone")))
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk gone")))
        }

        fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk gone")))
        }
    }

    #[test]
    fn test_init_hydrates_both_stores() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set_item(USER_KEY, r#"{"id":3,"phoneNumber":"98765"}"#)
            .unwrap();
        storage
            .set_item(CART_KEY, r#"[{"id":1,"name":"Mug","price":200,"qty":1}]"#)
            .unwrap();

        let stores = Stores::new(Arc::new(OfflineApi), storage);
        stores.init();
        assert!(stores.identity().is_authenticated());
        assert_eq!(stores.cart().total_qty(), 1);
    }

    #[test]
    fn test_broken_storage_still_initializes() {
        let stores = Stores::new(Arc::new(OfflineApi), Arc::new(BrokenStorage));
        stores.init();
        assert!(stores.identity().is_initialized());
        assert!(stores.cart().is_initialized());
        assert!(stores.cart().items().is_empty());

        // Teardown swallows the write errors
        stores.teardown();
        stores.identity().logout();
    }

    #[test]
    fn test_teardown_writes_mirrors() {
        let storage = Arc::new(MemoryStorage::new());
        let stores = Stores::new(Arc::new(OfflineApi), storage.clone());
        stores.init();
        stores.teardown();

        assert_eq!(storage.get_item(CART_KEY).unwrap().as_deref(), Some("[]"));
        assert!(storage.get_item(USER_KEY).unwrap().is_none());
    }
}
