//! Clementine Core - Shared types library.
//!
//! This crate provides common types used across all Clementine components:
//! - `api` - JSON REST backend (auth, catalog, cart, wishlist, orders, reviews)
//! - `cli` - Command-line tools for migrations and bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, roles, and order status

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
