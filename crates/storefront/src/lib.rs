//! CanteenCraze storefront library.
//!
//! Session state for the food-ordering client: the cart and saved
//! addresses over a durable key-value store, mocked sign-in, restaurant
//! search and the checkout summary.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod models;
pub mod search;
pub mod services;
pub mod state;
pub mod storage;

pub use config::{ConfigError, StorefrontConfig};
pub use error::StateError;
pub use models::WriteMode;
pub use state::{Session, SessionError};
