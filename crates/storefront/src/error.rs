//! Store error types and Sentry helpers.
//!
//! Failures are deliberately asymmetric:
//! - account operations are loud and return [`StoreError`]
//! - cart sync failures are quiet and surface as a `false` outcome
//! - storage failures are always swallowed and only logged

use thiserror::Error;

use crate::api::ApiError;

/// Errors returned by account operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required field was blank. Raised before any network call.
    #[error("{0} is required")]
    InvalidInput(&'static str),

    /// The backend accepted the signup but returned no usable account id.
    #[error("Failed to create user")]
    CreationFailed,

    /// Any other backend or transport failure.
    #[error("Remote error: {0}")]
    Remote(#[from] ApiError),
}

/// Result type alias for `StoreError`.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Set the Sentry user context from an account.
///
/// Call this after a successful login or signup so errors are associated
/// with the account.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.filter(|e| !e.is_empty()).map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the account.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
