//! Ceramic Artistry Core - Shared types library.
//!
//! This crate provides common types used across all storefront components:
//! - `storefront` - Client stores, URL normalization and the static-site server
//! - `cli` - Terminal client for accounts and the cart
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, users and cart line items

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
