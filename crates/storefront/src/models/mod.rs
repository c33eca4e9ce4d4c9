//! Domain models for the storefront session.
//!
//! Record types live in `canteen_core`; this module holds the storefront's
//! own session-level definitions.

pub mod session;

pub use session::WriteMode;
