//! Session-related types.
//!
//! Keys and write policy for state stored in the durable key-value area.

use std::str::FromStr;

/// Storage keys for session state.
///
/// The names match what the web client wrote to local storage, so an
/// exported browser profile can be dropped into a data directory as-is.
pub mod keys {
    /// Key for the saved delivery address collection.
    pub const SAVED_ADDRESSES: &str = "savedAddresses";

    /// Key for the cart lines (only used when cart persistence is enabled).
    pub const CART_ITEMS: &str = "cartItems";

    /// Key for the signed-in user.
    pub const CURRENT_USER: &str = "CanteenCraze_user";
}

/// How a state container treats a failed write to its store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Apply the change in memory, then write. A failed write is logged and
    /// remembered; the in-memory state stays authoritative.
    #[default]
    BestEffort,
    /// Write first and commit the change only once the write succeeded.
    Strict,
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "best-effort" | "best_effort" => Ok(Self::BestEffort),
            "strict" => Ok(Self::Strict),
            other => Err(format!("invalid write mode: {other}")),
        }
    }
}
