//! Core types for CanteenCraze.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod address;
pub mod cart;
pub mod catalog;
pub mod email;
pub mod id;
pub mod price;
pub mod user;

pub use address::{Address, AddressUpdate, NewAddress};
pub use cart::CartLine;
pub use catalog::{MenuItem, PriceTier, PriceTierError, Restaurant, Review};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price};
pub use user::User;
