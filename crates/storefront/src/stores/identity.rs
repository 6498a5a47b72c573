//! Identity store: the logged-in account.
//!
//! Holds at most one [`User`], mirrored into local storage under
//! [`USER_KEY`]. Login and signup are loud (errors propagate to the caller);
//! storage problems are logged and otherwise ignored.

use std::sync::{Arc, RwLock};

use ceramic_artistry_core::{NewUser, User, UserId};
use tracing::{debug, info, instrument, warn};

use super::{persisted, read_lock, write_lock};
use crate::api::ShopApi;
use crate::error::{Result, StoreError, clear_sentry_user, set_sentry_user};
use crate::storage::{LocalStorage, StorageError, USER_KEY, write_json};

#[derive(Debug, Default)]
struct IdentityState {
    user: Option<User>,
    initialized: bool,
}

/// Holds the current account and talks to the account endpoints.
pub struct IdentityStore {
    api: Arc<dyn ShopApi>,
    storage: Arc<dyn LocalStorage>,
    state: RwLock<IdentityState>,
}

impl std::fmt::Debug for IdentityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityStore")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl IdentityStore {
    /// Create an empty, not yet hydrated store.
    #[must_use]
    pub fn new(api: Arc<dyn ShopApi>, storage: Arc<dyn LocalStorage>) -> Self {
        Self {
            api,
            storage,
            state: RwLock::default(),
        }
    }

    /// Load the persisted account, once.
    ///
    /// Unreadable or malformed data leaves the store logged out. The store is
    /// marked initialized either way, and later calls do nothing.
    pub fn hydrate(&self) {
        let mut state = write_lock(&self.state);
        if state.initialized {
            return;
        }

        match self.read_persisted() {
            Ok(user) => state.user = user,
            Err(e) => warn!(error = %e, "Failed to read persisted user"),
        }
        state.initialized = true;
        debug!(authenticated = state.user.is_some(), "Identity store hydrated");
    }

    /// Whether [`hydrate`](Self::hydrate) has run.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        read_lock(&self.state).initialized
    }

    /// Snapshot of the current account.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        read_lock(&self.state).user.clone()
    }

    /// Id of the current account, if it is a registered one.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        read_lock(&self.state)
            .user
            .as_ref()
            .filter(|user| user.is_registered())
            .map(|user| user.id)
    }

    /// True iff there is a current account with a non-zero id.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user_id().is_some()
    }

    /// Look up the account registered to `phone_number` and make it current.
    ///
    /// Returns `Ok(None)` if the backend has no such account; the current
    /// account is left unchanged in that case.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidInput` if `phone_number` is blank
    /// - `StoreError::Remote` for any backend failure other than "not found"
    #[instrument(skip(self, phone_number))]
    pub async fn login(&self, phone_number: &str) -> Result<Option<User>> {
        let phone_number = phone_number.trim();
        if phone_number.is_empty() {
            return Err(StoreError::InvalidInput("Phone number"));
        }

        match self.api.login(phone_number).await {
            Ok(Some(user)) if user.is_registered() => {
                info!(user_id = %user.id, "User logged in");
                self.remember(user.clone());
                Ok(Some(user))
            }
            Ok(_) => {
                debug!("Login returned no usable account");
                Ok(None)
            }
            Err(e) if e.is_not_found() => {
                debug!("No account for phone number");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Create an account and make it current.
    ///
    /// All fields are trimmed before they are sent.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidInput` if phone number, username or email is blank
    /// - `StoreError::CreationFailed` if the backend returns no account id
    /// - `StoreError::Remote` for backend failures
    #[instrument(skip(self, form))]
    pub async fn signup(&self, form: &NewUser) -> Result<User> {
        let form = form.trimmed();
        if form.phone_number.is_empty() {
            return Err(StoreError::InvalidInput("Phone number"));
        }
        if form.username.is_empty() {
            return Err(StoreError::InvalidInput("Username"));
        }
        if form.email.is_empty() {
            return Err(StoreError::InvalidInput("Email"));
        }

        match self.api.create_user(&form).await? {
            Some(user) if user.is_registered() => {
                info!(user_id = %user.id, "User signed up");
                self.remember(user.clone());
                Ok(user)
            }
            _ => Err(StoreError::CreationFailed),
        }
    }

    /// Forget the current account and its persisted mirror. Never fails.
    pub fn logout(&self) {
        write_lock(&self.state).user = None;
        if let Err(e) = self.storage.remove_item(USER_KEY) {
            warn!(error = %e, "Failed to remove persisted user");
        }
        clear_sentry_user();
        info!("User logged out");
    }

    /// Write the current account (or its absence) to storage.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend rejects the write.
    pub fn persist(&self) -> std::result::Result<(), StorageError> {
        match self.user() {
            Some(user) => write_json(self.storage.as_ref(), USER_KEY, &user),
            None => self.storage.remove_item(USER_KEY),
        }
    }

    /// Read the persisted account. `Ok(None)` means absent or unusable.
    fn read_persisted(&self) -> std::result::Result<Option<User>, StorageError> {
        Ok(self
            .storage
            .get_item(USER_KEY)?
            .and_then(|raw| persisted::decode_user(&raw)))
    }

    /// Make `user` current and mirror it to storage.
    fn remember(&self, user: User) {
        set_sentry_user(&user.id, Some(&user.email));
        write_lock(&self.state).user = Some(user);
        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to persist user");
        }
    }
}
