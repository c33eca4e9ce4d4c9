//! Order summary shown before placing an order.

use canteen_core::{Address, CartLine, Price};
use rust_decimal::Decimal;
use thiserror::Error;

use super::addresses::AddressBook;
use super::cart::CartState;

/// Why a checkout summary could not be built.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("cart is empty")]
    EmptyCart,

    #[error("no delivery address selected")]
    NoAddress,
}

/// Snapshot of the cart and delivery details at checkout time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub lines: Vec<CartLine>,
    pub item_count: u64,
    pub subtotal: Price,
    pub delivery_fee: Price,
    pub total: Price,
    pub address: Address,
}

impl CheckoutSummary {
    /// Build a summary from the current cart and selected address.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if there is nothing to order, or
    /// `CheckoutError::NoAddress` if no address is selected.
    pub fn build(
        cart: &CartState,
        addresses: &AddressBook,
        delivery_fee: Decimal,
    ) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let address = addresses
            .selected_address()
            .cloned()
            .ok_or(CheckoutError::NoAddress)?;

        let subtotal = cart.total_price();
        Ok(Self {
            lines: cart.lines().to_vec(),
            item_count: cart.total_items(),
            subtotal: Price::from_amount(subtotal),
            delivery_fee: Price::from_amount(delivery_fee),
            total: Price::from_amount(subtotal + delivery_fee),
            address,
        })
    }
}
