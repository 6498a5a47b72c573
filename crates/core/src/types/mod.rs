//! Core types for the storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod user;

pub use cart::{CartItem, CartSync, Product};
pub use id::*;
pub use user::{NewUser, User};
