//! `ca-cli` subcommands.

pub mod account;
pub mod cart;
pub mod env;

use std::sync::Arc;

use ceramic_artistry_storefront::api::{ApiClient, ApiError};
use ceramic_artistry_storefront::config::{ConfigError, StorefrontConfig};
use ceramic_artistry_storefront::error::StoreError;
use ceramic_artistry_storefront::storage::FileStorage;
use ceramic_artistry_storefront::stores::Stores;
use thiserror::Error;

/// Errors that can end a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("API client error: {0}")]
    Api(#[from] ApiError),

    #[error("{0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No account matched the phone number.
    #[error("No account found for {0}")]
    UnknownAccount(String),

    /// The product needs a positive id, a name and a non-negative price.
    #[error("Invalid product {0}: needs a positive id, a name and a price of at least 0")]
    InvalidProduct(String),

    /// The backend rejected or never saw a cart change.
    #[error("Cart was not updated (is an account logged in?)")]
    CartNotUpdated,
}

/// Build the stores over the configured backend and storage directory.
///
/// # Errors
///
/// Returns an error if the API base URL is invalid.
pub fn open_stores(config: &StorefrontConfig) -> Result<Stores, CliError> {
    let api = ApiClient::new(&config.api_base)?;
    let storage = FileStorage::new(config.storage_dir.clone());
    tracing::debug!(
        api_base = %config.api_base,
        storage_dir = %config.storage_dir.display(),
        "Opening stores"
    );
    Ok(Stores::new(Arc::new(api), Arc::new(storage)))
}
