//! CanteenCraze Core - Shared domain types.
//!
//! This crate provides the types used across all CanteenCraze components:
//! - `storefront` - Client-side session state (cart, addresses, auth, catalog)
//! - `cli` - Command-line driver for a storefront session
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, prices, emails, cart lines, addresses, users and
//!   catalog records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
