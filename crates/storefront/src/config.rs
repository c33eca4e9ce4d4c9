//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CANTEEN_DATA_DIR` - Directory for saved session state (default: `.canteen`)
//! - `CANTEEN_PERSIST_CART` - Keep the cart between runs (default: false)
//! - `CANTEEN_WRITE_MODE` - `best-effort` or `strict` (default: best-effort)
//! - `CANTEEN_DELIVERY_FEE` - Flat delivery fee in rupees (default: 49)

use std::path::PathBuf;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::WriteMode;

const DEFAULT_DATA_DIR: &str = ".canteen";
const DEFAULT_DELIVERY_FEE: &str = "49";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront session configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontConfig {
    /// Directory holding one JSON file per saved key
    pub data_dir: PathBuf,
    /// Whether the cart is written to the store
    pub persist_cart: bool,
    /// How state containers react to failed writes
    pub write_mode: WriteMode,
    /// Flat delivery fee added at checkout
    pub delivery_fee: Decimal,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            persist_cart: false,
            write_mode: WriteMode::default(),
            delivery_fee: Decimal::new(49, 0),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a variable is set to a value
    /// that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for unparseable values.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let data_dir = PathBuf::from(env.get_or_default("CANTEEN_DATA_DIR", DEFAULT_DATA_DIR));

        let persist_cart = env
            .get_optional("CANTEEN_PERSIST_CART")
            .map(|v| parse_bool("CANTEEN_PERSIST_CART", &v))
            .transpose()?
            .unwrap_or(false);

        let write_mode = env
            .get_optional("CANTEEN_WRITE_MODE")
            .map(|v| {
                v.parse::<WriteMode>()
                    .map_err(|e| ConfigError::InvalidEnvVar("CANTEEN_WRITE_MODE".to_string(), e))
            })
            .transpose()?
            .unwrap_or_default();

        let delivery_fee = env
            .get_or_default("CANTEEN_DELIVERY_FEE", DEFAULT_DELIVERY_FEE)
            .trim()
            .parse::<Decimal>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CANTEEN_DELIVERY_FEE".to_string(), e.to_string())
            })?;
        if delivery_fee.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar(
                "CANTEEN_DELIVERY_FEE".to_string(),
                "must not be negative".to_string(),
            ));
        }

        Ok(Self {
            data_dir,
            persist_cart,
            write_mode,
            delivery_fee,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable; blank values count as unset.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key)
            .unwrap_or_else(|| default.to_string())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got {other:?}"),
        )),
    }
}
