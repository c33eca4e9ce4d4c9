//! Restaurant catalog and discovery search.
//!
//! The catalog is a fixed list of restaurants loaded once per process from
//! seed JSON embedded in the crate. Search is a linear filter over that
//! list; result order is catalog order.

mod menu;

use std::collections::BTreeSet;

use canteen_core::{MenuItem, MenuItemId, PriceTier, Restaurant, RestaurantId};
use thiserror::Error;
use tracing::instrument;

pub use menu::{MenuFilter, MenuSort};

/// Seed catalog bundled with the crate.
const SEED_CATALOG: &str = include_str!("../../content/restaurants.json");

/// Errors from catalog lookups.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog JSON could not be parsed.
    #[error("invalid catalog data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("restaurant not found: {0}")]
    RestaurantNotFound(RestaurantId),
}

/// Discovery page filters.
///
/// Every populated field narrows the result; the default query matches all
/// restaurants.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestaurantQuery {
    /// Case-insensitive substring of the name or of any cuisine.
    pub text: Option<String>,
    /// Case-insensitive exact cuisine, as linked from the home page.
    pub cuisine: Option<String>,
    /// Restaurant must serve at least one of these cuisines.
    pub cuisines: Vec<String>,
    pub veg_only: bool,
    pub min_rating: Option<f32>,
    /// Restaurant must be in one of these tiers.
    pub price_tiers: Vec<PriceTier>,
}

impl RestaurantQuery {
    /// Query matching `text` only.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Whether `restaurant` passes every populated filter.
    #[must_use]
    pub fn matches(&self, restaurant: &Restaurant) -> bool {
        if let Some(text) = non_blank(self.text.as_deref()) {
            let needle = text.to_lowercase();
            let hit = restaurant.name.to_lowercase().contains(&needle)
                || restaurant
                    .cuisines
                    .iter()
                    .any(|c| c.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        if let Some(cuisine) = non_blank(self.cuisine.as_deref()) {
            if !restaurant
                .cuisines
                .iter()
                .any(|c| c.eq_ignore_ascii_case(cuisine.trim()))
            {
                return false;
            }
        }

        if !self.cuisines.is_empty()
            && !restaurant.cuisines.iter().any(|c| self.cuisines.contains(c))
        {
            return false;
        }

        if self.veg_only && !restaurant.veg {
            return false;
        }

        if let Some(min) = self.min_rating {
            if restaurant.rating < min {
                return false;
            }
        }

        self.price_tiers.is_empty() || self.price_tiers.contains(&restaurant.price_range)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// The restaurant catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    restaurants: Vec<Restaurant>,
}

impl Catalog {
    #[must_use]
    pub const fn new(restaurants: Vec<Restaurant>) -> Self {
        Self { restaurants }
    }

    /// Load the bundled seed catalog.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` if the bundled JSON is invalid.
    pub fn seeded() -> Result<Self, CatalogError> {
        Self::from_json(SEED_CATALOG)
    }

    /// Parse a catalog from a JSON array of restaurants.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` if `json` is not a valid catalog.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let restaurants: Vec<Restaurant> = serde_json::from_str(json)?;
        tracing::debug!(count = restaurants.len(), "Catalog loaded");
        Ok(Self::new(restaurants))
    }

    #[must_use]
    pub fn restaurants(&self) -> &[Restaurant] {
        &self.restaurants
    }

    #[must_use]
    pub fn restaurant(&self, id: &RestaurantId) -> Option<&Restaurant> {
        self.restaurants.iter().find(|r| &r.id == id)
    }

    /// Look up a menu item across all restaurants.
    #[must_use]
    pub fn menu_item(&self, id: &MenuItemId) -> Option<&MenuItem> {
        self.restaurants
            .iter()
            .flat_map(|r| r.menu.iter())
            .find(|item| &item.id == id)
    }

    /// Distinct cuisines across the catalog, sorted.
    #[must_use]
    pub fn cuisines(&self) -> Vec<&str> {
        self.restaurants
            .iter()
            .flat_map(|r| r.cuisines.iter().map(String::as_str))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Restaurants matching `query`, in catalog order.
    #[instrument(skip(self))]
    #[must_use]
    pub fn search(&self, query: &RestaurantQuery) -> Vec<&Restaurant> {
        let results: Vec<&Restaurant> = self
            .restaurants
            .iter()
            .filter(|r| query.matches(r))
            .collect();
        tracing::debug!(results = results.len(), "Search completed");
        results
    }

    /// Filtered and sorted menu of one restaurant.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::RestaurantNotFound` for an unknown id.
    pub fn menu(
        &self,
        id: &RestaurantId,
        filter: &MenuFilter,
        sort: MenuSort,
    ) -> Result<Vec<&MenuItem>, CatalogError> {
        let restaurant = self
            .restaurant(id)
            .ok_or_else(|| CatalogError::RestaurantNotFound(id.clone()))?;

        let mut items: Vec<&MenuItem> = restaurant
            .menu
            .iter()
            .filter(|item| filter.matches(item))
            .collect();
        sort.apply(&mut items);
        Ok(items)
    }
}
