//! Session state services.
//!
//! # Services
//!
//! - `cart` - Cart lines and derived totals
//! - `addresses` - Saved delivery addresses, default and selection
//! - `auth` - Mocked email/password sign-in
//! - `checkout` - Order summary from cart and selected address

pub mod addresses;
pub mod auth;
pub mod cart;
pub mod checkout;
mod persistence;

pub use addresses::{AddressBook, seed_addresses};
pub use auth::{AuthError, AuthSession, UserDirectory};
pub use cart::{CartState, QuantityChange};
pub use checkout::{CheckoutError, CheckoutSummary};
