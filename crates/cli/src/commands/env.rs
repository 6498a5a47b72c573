//! Environment profile commands.
//!
//! # Usage
//!
//! ```bash
//! # Point the storefront at a backend running on this machine
//! ca-cli env local
//!
//! # Point the storefront at production
//! ca-cli env prod
//! ```
//!
//! Both write `.env.local` in the current directory, which
//! `StorefrontConfig::from_env` loads ahead of `.env`.

use std::fs;
use std::path::Path;

use clap::ValueEnum;

use super::CliError;

/// A named backend/site pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Profile {
    /// Backend on localhost:9090, site on localhost:3000
    Local,
    /// Production backend and site
    Prod,
}

impl Profile {
    /// Backend API base URL.
    #[must_use]
    pub const fn api_base(self) -> &'static str {
        match self {
            Self::Local => "http://localhost:9090",
            Self::Prod => "https://api.svrve.com",
        }
    }

    /// Public site URL.
    #[must_use]
    pub const fn site_url(self) -> &'static str {
        match self {
            Self::Local => "http://localhost:3000",
            Self::Prod => "https://www.svrve.com",
        }
    }

    /// Contents of the env file for this profile.
    #[must_use]
    pub fn render(self) -> String {
        format!(
            "STOREFRONT_API_BASE={}\nSTOREFRONT_SITE_URL={}\n",
            self.api_base(),
            self.site_url()
        )
    }
}

/// Write the profile to `path`, replacing any previous file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_profile(profile: Profile, path: &Path) -> Result<(), CliError> {
    fs::write(path, profile.render())?;

    tracing::info!("Created {} with {:?} configuration", path.display(), profile);
    tracing::info!("  API Base: {}", profile.api_base());
    tracing::info!("  Site URL: {}", profile.site_url());
    Ok(())
}
