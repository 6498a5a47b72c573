//! Local key-value storage.
//!
//! The stores mirror their state into a small string key-value store, the
//! same way a browser tab uses `localStorage`. Backends:
//!
//! - [`MemoryStorage`] - process memory, optionally with a byte quota
//! - [`FileStorage`] - one JSON file per key inside a directory
//!
//! Storage is a secondary mirror, never the source of truth. Callers collapse
//! every [`StorageError`] to "no data" on read and to a no-op on write.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use thiserror::Error;

/// Key under which the current user is mirrored.
pub const USER_KEY: &str = "ceramic_user_v1";

/// Key under which the cart line items are mirrored.
pub const CART_KEY: &str = "ceramic_cart_v1";

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing would exceed the backend's capacity.
    #[error("storage quota of {limit} bytes exceeded")]
    QuotaExceeded { limit: usize },

    /// Key contains characters the backend cannot store.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// Value could not be serialized.
    #[error("storage serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A string key-value store with `localStorage` semantics.
pub trait LocalStorage: Send + Sync {
    /// Read the value under `key`; `Ok(None)` if absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Serialize `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns `StorageError` if serialization or the write fails.
pub fn write_json<T>(storage: &dyn LocalStorage, key: &str, value: &T) -> Result<(), StorageError>
where
    T: serde::Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)?;
    storage.set_item(key, &raw)
}

/// Keys must be non-empty and limited to `[A-Za-z0-9_.-]`.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
