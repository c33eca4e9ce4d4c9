//! Cart line type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::MenuItem;
use super::id::MenuItemId;

/// One line of the cart: a menu item and how many of it were ordered.
///
/// A line is keyed by the menu item id it was created from. While a line is
/// in a cart its `quantity` is at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: MenuItemId,
    pub name: String,
    /// Unit price, never negative. Stored as a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartLine {
    /// Start a new line for `item` with a quantity of one.
    #[must_use]
    pub fn from_menu_item(item: &MenuItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            price: item.price.max(Decimal::ZERO),
            quantity: 1,
            image: item.image.clone(),
        }
    }

    /// `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}
