//! Ceramic Artistry storefront library.
//!
//! The client side of the shop as a library:
//! - [`stores`] holds the account and cart state over a [`storage`] mirror
//!   and the backend [`api`]
//! - [`routing`] canonicalizes incoming URLs
//! - [`routes`] and [`middleware`] serve the static site and the sitemap
//!
//! The `ceramic-artistry-storefront` binary runs the server; `ca-cli` drives
//! the stores from a terminal.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod routing;
pub mod state;
pub mod storage;
pub mod stores;
