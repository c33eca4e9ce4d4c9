//! Cart state container.
//!
//! Holds the ordered cart lines for one session. Lines are unique by menu
//! item id and always have a quantity of at least one; totals are derived on
//! every read.
//!
//! The cart is ephemeral by default. [`CartState::persistent`] binds it to
//! the `cartItems` key of a store instead.

use std::collections::HashSet;

use canteen_core::{CartLine, MenuItem, MenuItemId};
use rust_decimal::Decimal;
use tracing::instrument;

use super::persistence::Persistence;
use crate::error::{Result, StateError};
use crate::models::WriteMode;
use crate::models::session::keys;
use crate::storage::{self, SharedStore};

/// Result of [`CartState::update_quantity`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// The line now has `current` units.
    Updated { previous: u32, current: u32 },
    /// The line was removed because the new quantity was zero or less.
    Removed { previous: u32 },
}

/// The cart for one session.
#[derive(Debug)]
pub struct CartState {
    lines: Vec<CartLine>,
    persistence: Persistence,
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}

impl CartState {
    /// Create an empty cart that is never written anywhere.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lines: Vec::new(),
            persistence: Persistence::ephemeral(keys::CART_ITEMS),
        }
    }

    /// Create a cart bound to `store`, restoring any saved lines.
    ///
    /// Missing or malformed saved data yields an empty cart.
    #[must_use]
    pub fn persistent(store: SharedStore, mode: WriteMode) -> Self {
        let saved: Vec<CartLine> = storage::load(&*store, keys::CART_ITEMS).unwrap_or_default();
        let (lines, repaired) = normalize(saved);

        let mut persistence = Persistence::durable(store, keys::CART_ITEMS, mode);
        if repaired {
            persistence.write_best_effort(&lines);
        }
        tracing::debug!(lines = lines.len(), "Cart restored");

        Self { lines, persistence }
    }

    /// Lines in the order they were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, id: &MenuItemId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.id == id)
    }

    /// Units of `id` in the cart, zero if absent.
    #[must_use]
    pub fn quantity_of(&self, id: &MenuItemId) -> u32 {
        self.line(id).map_or(0, |line| line.quantity)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Message of the last write that failed, if the failure has not been
    /// superseded by a successful write.
    #[must_use]
    pub fn last_write_error(&self) -> Option<&str> {
        self.persistence.last_error()
    }

    /// Add one unit of `item`.
    ///
    /// An existing line for the same id gains one unit and keeps its name,
    /// price and image; otherwise a new line with one unit is appended.
    /// Returns the line's new quantity.
    ///
    /// # Errors
    ///
    /// Returns `StateError::QuantityOutOfRange` if the line already holds
    /// `u32::MAX` units, or `StateError::Storage` under strict writes.
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    pub fn add_to_cart(&mut self, item: &MenuItem) -> Result<u32> {
        let mut next = self.lines.clone();
        let quantity = match next.iter_mut().find(|line| line.id == item.id) {
            Some(line) => {
                let previous = line.quantity;
                line.quantity = previous
                    .checked_add(1)
                    .ok_or_else(|| StateError::QuantityOutOfRange(i64::from(previous) + 1))?;
                line.quantity
            }
            None => {
                next.push(CartLine::from_menu_item(item));
                1
            }
        };

        self.persistence.commit(&mut self.lines, next)?;
        tracing::debug!(quantity, "Added to cart");
        Ok(quantity)
    }

    /// Remove the line for `id`, returning it.
    ///
    /// # Errors
    ///
    /// Returns `StateError::NotFound` if no line has that id, or
    /// `StateError::Storage` under strict writes.
    #[instrument(skip(self))]
    pub fn remove_from_cart(&mut self, id: &MenuItemId) -> Result<CartLine> {
        let index = self.position(id)?;
        let mut next = self.lines.clone();
        let removed = next.remove(index);

        self.persistence.commit(&mut self.lines, next)?;
        tracing::debug!(quantity = removed.quantity, "Removed from cart");
        Ok(removed)
    }

    /// Set the quantity of the line for `id`. Zero or less removes the line.
    ///
    /// # Errors
    ///
    /// Returns `StateError::NotFound` if no line has that id,
    /// `StateError::QuantityOutOfRange` above `u32::MAX`, or
    /// `StateError::Storage` under strict writes.
    #[instrument(skip(self))]
    pub fn update_quantity(&mut self, id: &MenuItemId, quantity: i64) -> Result<QuantityChange> {
        let index = self.position(id)?;
        let mut next = self.lines.clone();

        let change = if quantity <= 0 {
            let removed = next.remove(index);
            QuantityChange::Removed {
                previous: removed.quantity,
            }
        } else {
            let current = u32::try_from(quantity)
                .map_err(|_| StateError::QuantityOutOfRange(quantity))?;
            let line = next
                .get_mut(index)
                .ok_or_else(|| StateError::not_found("cart line", id))?;
            let previous = line.quantity;
            line.quantity = current;
            QuantityChange::Updated { previous, current }
        };

        self.persistence.commit(&mut self.lines, next)?;
        tracing::debug!(?change, "Cart quantity changed");
        Ok(change)
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Only fails with `StateError::Storage` under strict writes.
    #[instrument(skip(self))]
    pub fn clear(&mut self) -> Result<()> {
        self.persistence.commit(&mut self.lines, Vec::new())?;
        Ok(())
    }

    fn position(&self, id: &MenuItemId) -> Result<usize> {
        self.lines
            .iter()
            .position(|line| &line.id == id)
            .ok_or_else(|| StateError::not_found("cart line", id))
    }
}

/// Drop empty and duplicate lines from restored data (first occurrence wins).
fn normalize(lines: Vec<CartLine>) -> (Vec<CartLine>, bool) {
    let original = lines.len();
    let mut seen = HashSet::new();
    let kept: Vec<CartLine> = lines
        .into_iter()
        .filter(|line| line.quantity > 0 && line.price >= Decimal::ZERO)
        .filter(|line| seen.insert(line.id.clone()))
        .collect();

    let repaired = kept.len() != original;
    if repaired {
        tracing::warn!(
            dropped = original - kept.len(),
            "Dropped invalid cart lines from saved state"
        );
    }
    (kept, repaired)
}
