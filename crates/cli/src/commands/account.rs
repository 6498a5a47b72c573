//! Account commands.
//!
//! # Usage
//!
//! ```bash
//! ca-cli account login 9876543210
//! ca-cli account signup -u asha -p 9876543210 -e asha@example.com -a "12 Kiln Road" -z 560001
//! ca-cli account whoami
//! ca-cli account logout
//! ```

use ceramic_artistry_core::NewUser;
use ceramic_artistry_storefront::stores::IdentityStore;

use super::CliError;

/// Log in with a phone number.
///
/// # Errors
///
/// Returns an error if the phone number is blank, no account matches, or
/// the backend fails.
pub async fn login(identity: &IdentityStore, phone_number: &str) -> Result<(), CliError> {
    match identity.login(phone_number).await? {
        Some(user) => {
            tracing::info!("Logged in as {} (id {})", display_name(&user.username), user.id);
            Ok(())
        }
        None => Err(CliError::UnknownAccount(phone_number.trim().to_string())),
    }
}

/// Create an account and log in as it.
///
/// # Errors
///
/// Returns an error if a required field is blank or the backend does not
/// create the account.
pub async fn signup(identity: &IdentityStore, form: &NewUser) -> Result<(), CliError> {
    let user = identity.signup(form).await?;
    tracing::info!("Account created for {} (id {})", display_name(&user.username), user.id);
    Ok(())
}

/// Forget the current account.
pub fn logout(identity: &IdentityStore) {
    if identity.user().is_some() {
        identity.logout();
        tracing::info!("Logged out");
    } else {
        tracing::info!("Not logged in");
    }
}

/// Show the current account.
pub fn whoami(identity: &IdentityStore) {
    let Some(user) = identity.user() else {
        tracing::info!("Not logged in");
        return;
    };

    tracing::info!("{} (id {})", display_name(&user.username), user.id);
    tracing::info!("  Phone:   {}", user.phone_number);
    if !user.email.is_empty() {
        tracing::info!("  Email:   {}", user.email);
    }
    if !user.address.is_empty() {
        tracing::info!("  Address: {} {}", user.address, user.pincode);
    }
    if !identity.is_authenticated() {
        tracing::warn!("Stored account has no id; cart changes will not sync");
    }
}

fn display_name(username: &str) -> &str {
    if username.is_empty() { "(no name)" } else { username }
}
