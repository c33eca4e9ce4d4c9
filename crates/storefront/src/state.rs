//! Per-session state bundle.

use std::sync::Arc;

use thiserror::Error;

use crate::config::StorefrontConfig;
use crate::search::{Catalog, CatalogError};
use crate::services::auth::{AuthError, AuthSession, UserDirectory};
use crate::services::checkout::{CheckoutError, CheckoutSummary};
use crate::services::{AddressBook, CartState};
use crate::storage::{FileStore, SharedStore};

/// Error creating a session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),
}

/// Everything one shopper interacts with: cart, addresses, sign-in and the
/// restaurant catalog.
///
/// Each session owns its containers; only the catalog is shared.
#[derive(Debug)]
pub struct Session {
    config: StorefrontConfig,
    store: SharedStore,
    catalog: Arc<Catalog>,
    pub cart: CartState,
    pub addresses: AddressBook,
    pub auth: AuthSession,
}

impl Session {
    /// Open a session over `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the demo account cannot be set up.
    pub fn new(
        config: StorefrontConfig,
        store: SharedStore,
        catalog: Arc<Catalog>,
    ) -> Result<Self, SessionError> {
        let mode = config.write_mode;
        let cart = if config.persist_cart {
            CartState::persistent(Arc::clone(&store), mode)
        } else {
            CartState::new()
        };
        let addresses = AddressBook::new(Arc::clone(&store), mode);
        let auth = AuthSession::new(UserDirectory::with_demo_account()?, Arc::clone(&store), mode);

        tracing::debug!(
            persist_cart = config.persist_cart,
            write_mode = ?mode,
            "Session opened"
        );

        Ok(Self {
            config,
            store,
            catalog,
            cart,
            addresses,
            auth,
        })
    }

    /// Open a session backed by files under `config.data_dir`, with the
    /// bundled catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog or demo account cannot be set up.
    pub fn open(config: StorefrontConfig) -> Result<Self, SessionError> {
        let store: SharedStore = Arc::new(FileStore::new(config.data_dir.clone()));
        let catalog = Arc::new(Catalog::seeded()?);
        Self::new(config, store, catalog)
    }

    #[must_use]
    pub const fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    #[must_use]
    pub const fn store(&self) -> &SharedStore {
        &self.store
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Summary of the current cart for the selected address.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError` if the cart is empty or no address is selected.
    pub fn checkout(&self) -> Result<CheckoutSummary, CheckoutError> {
        CheckoutSummary::build(&self.cart, &self.addresses, self.config.delivery_fee)
    }
}
