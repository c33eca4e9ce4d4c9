//! Restaurant catalog records.
//!
//! The catalog is static seed data; these types mirror its JSON layout
//! (camelCase keys).

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{MenuItemId, RestaurantId, ReviewId};

/// A restaurant listed on the discovery pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: String,
    /// Average rating out of 5.
    pub rating: f32,
    pub review_count: u32,
    pub price_range: PriceTier,
    pub cuisines: Vec<String>,
    pub address: String,
    pub distance: String,
    pub delivery_time: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub promoted: bool,
    /// Pure vegetarian kitchen.
    pub veg: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<String>,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub menu: Vec<MenuItem>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// A dish on a restaurant's menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: MenuItemId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub category: String,
    pub veg: bool,
    #[serde(default)]
    pub bestseller: bool,
    #[serde(default)]
    pub spicy: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
}

/// A customer review of a restaurant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub user: String,
    pub user_image: String,
    pub rating: f32,
    pub comment: String,
    pub date: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub dislikes: u32,
}

/// Error returned when a price tier string is not one of `₹` to `₹₹₹₹`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown price tier: {0:?}")]
pub struct PriceTierError(pub String);

/// Relative cost of eating at a restaurant, written as one to four `₹`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PriceTier {
    Budget,
    Moderate,
    Premium,
    Luxury,
}

impl PriceTier {
    /// All tiers, cheapest first.
    pub const ALL: [Self; 4] = [Self::Budget, Self::Moderate, Self::Premium, Self::Luxury];

    #[must_use]
    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Budget => "₹",
            Self::Moderate => "₹₹",
            Self::Premium => "₹₹₹",
            Self::Luxury => "₹₹₹₹",
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for PriceTier {
    type Err = PriceTierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.symbol() == s.trim())
            .ok_or_else(|| PriceTierError(s.to_owned()))
    }
}

impl TryFrom<String> for PriceTier {
    type Error = PriceTierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PriceTier> for String {
    fn from(tier: PriceTier) -> Self {
        tier.symbol().to_owned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_tier_round_trips_symbols() {
        for tier in PriceTier::ALL {
            assert_eq!(tier.symbol().parse::<PriceTier>().unwrap(), tier);
        }
        assert!("$$".parse::<PriceTier>().is_err());
    }

    #[test]
    fn test_menu_item_defaults() {
        let item: MenuItem = serde_json::from_value(serde_json::json!({
            "id": "m1",
            "name": "Paneer Tikka",
            "description": "Char-grilled cottage cheese",
            "price": 249.00,
            "category": "Starters",
            "veg": true
        }))
        .unwrap();
        assert!(!item.bestseller);
        assert!(!item.spicy);
        assert_eq!(item.rating, None);
        assert_eq!(item.price, Decimal::new(24900, 2));
    }
}
