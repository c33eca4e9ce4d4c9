//! Integration tests for CanteenCraze session state.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p canteen-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `address_book` - Address scenarios and invariants over a file store
//! - `cart` - Cart scenarios and totals
//! - `session` - Whole sessions across restarts

use std::path::Path;
use std::sync::Arc;

use canteen_core::{AddressId, MenuItem, MenuItemId};
use canteen_storefront::search::Catalog;
use canteen_storefront::services::AddressBook;
use canteen_storefront::storage::{FileStore, SharedStore};
use canteen_storefront::{Session, StorefrontConfig};
use rust_decimal::Decimal;
use tempfile::TempDir;

/// A scratch data directory that lives as long as the context.
pub struct TestContext {
    dir: TempDir,
}

impl TestContext {
    /// Create a fresh, empty data directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A new store handle over the data directory.
    #[must_use]
    pub fn store(&self) -> SharedStore {
        Arc::new(FileStore::new(self.dir.path()))
    }

    /// Configuration pointing at the data directory.
    #[must_use]
    pub fn config(&self) -> StorefrontConfig {
        StorefrontConfig {
            data_dir: self.dir.path().to_path_buf(),
            ..StorefrontConfig::default()
        }
    }

    /// Open a session over the data directory with default settings.
    ///
    /// # Panics
    ///
    /// Panics if the session cannot be opened.
    #[must_use]
    pub fn session(&self) -> Session {
        self.session_with(|_| {})
    }

    /// Open a session after adjusting the configuration.
    ///
    /// # Panics
    ///
    /// Panics if the session cannot be opened.
    #[must_use]
    pub fn session_with(&self, adjust: impl FnOnce(&mut StorefrontConfig)) -> Session {
        let mut config = self.config();
        adjust(&mut config);
        Session::open(config).expect("Failed to open session")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared seed catalog.
///
/// # Panics
///
/// Panics if the bundled catalog is invalid.
#[must_use]
pub fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::seeded().expect("Bundled catalog should parse"))
}

/// A minimal menu item with the given price in whole rupees.
#[must_use]
pub fn dish(id: &str, price: i64) -> MenuItem {
    MenuItem {
        id: MenuItemId::new(id),
        name: format!("Dish {id}"),
        description: String::new(),
        price: Decimal::new(price, 0),
        image: None,
        category: "Mains".to_owned(),
        veg: true,
        bestseller: false,
        spicy: false,
        rating: None,
    }
}

/// Check the address book's structural rules, describing the first
/// violation found.
///
/// # Errors
///
/// Returns a description of the broken rule.
pub fn check_address_invariants(book: &AddressBook) -> Result<(), String> {
    let addresses = book.addresses();

    let defaults = addresses.iter().filter(|a| a.is_default).count();
    let expected = usize::from(!addresses.is_empty());
    if defaults != expected {
        return Err(format!(
            "{defaults} defaults among {} addresses",
            addresses.len()
        ));
    }

    let mut ids: Vec<&AddressId> = addresses.iter().map(|a| &a.id).collect();
    ids.sort();
    ids.dedup();
    if ids.len() != addresses.len() {
        return Err("duplicate address ids".to_owned());
    }

    match (book.selected_address(), addresses.is_empty()) {
        (None, false) => Err("nothing selected in a non-empty book".to_owned()),
        (Some(selected), _) if book.get(&selected.id) != Some(selected) => {
            Err(format!("selection {} is stale", selected.id))
        }
        _ => Ok(()),
    }
}
