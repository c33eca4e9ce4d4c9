//! Cart and checkout commands.

use std::io::Write;

use clap::Subcommand;

use canteen_core::{MenuItemId, Price};
use canteen_storefront::Session;
use canteen_storefront::services::QuantityChange;

use super::CommandError;

#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add one unit of a dish
    Add {
        /// Menu item id
        item: String,
    },
    /// Remove a dish entirely
    Remove { item: String },
    /// Set the quantity of a dish (0 or less removes it)
    Set {
        item: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

pub fn run(
    session: &mut Session,
    action: CartAction,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        CartAction::Show => show(session, out)?,
        CartAction::Add { item } => {
            let id = MenuItemId::new(item);
            let dish = session
                .catalog()
                .menu_item(&id)
                .cloned()
                .ok_or_else(|| CommandError::UnknownMenuItem(id.to_string()))?;
            let quantity = session.cart.add_to_cart(&dish)?;
            writeln!(out, "Added {} (x{quantity})", dish.name)?;
        }
        CartAction::Remove { item } => {
            let line = session.cart.remove_from_cart(&MenuItemId::new(item))?;
            writeln!(out, "Removed {}", line.name)?;
        }
        CartAction::Set { item, quantity } => {
            let id = MenuItemId::new(item);
            match session.cart.update_quantity(&id, quantity)? {
                QuantityChange::Updated { previous, current } => {
                    writeln!(out, "Updated {id}: {previous} -> {current}")?;
                }
                QuantityChange::Removed { .. } => writeln!(out, "Removed {id}")?,
            }
        }
        CartAction::Clear => {
            session.cart.clear()?;
            writeln!(out, "Cart cleared")?;
        }
    }

    if let Some(error) = session.cart.last_write_error() {
        tracing::warn!(%error, "Cart changes were not saved");
    }
    Ok(())
}

fn show(session: &Session, out: &mut impl Write) -> Result<(), Box<dyn std::error::Error>> {
    let cart = &session.cart;
    if cart.is_empty() {
        writeln!(out, "Your cart is empty")?;
        return Ok(());
    }

    let count = cart.total_items();
    writeln!(
        out,
        "Your Cart ({count} {})",
        if count == 1 { "item" } else { "items" }
    )?;
    for line in cart.lines() {
        writeln!(
            out,
            "  [{}] {} x{} | {}",
            line.id,
            line.name,
            line.quantity,
            Price::from_amount(line.line_total())
        )?;
    }
    writeln!(out, "Subtotal: {}", Price::from_amount(cart.total_price()))?;
    Ok(())
}

pub fn checkout(
    session: &mut Session,
    place: bool,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = session.checkout()?;

    writeln!(out, "Deliver to: {} ({})", summary.address.title, summary.address.full_address)?;
    for line in &summary.lines {
        writeln!(
            out,
            "  {} x{} | {}",
            line.name,
            line.quantity,
            Price::from_amount(line.line_total())
        )?;
    }
    writeln!(out, "Subtotal: {}", summary.subtotal)?;
    writeln!(out, "Delivery Fee: {}", summary.delivery_fee)?;
    writeln!(out, "Total: {}", summary.total)?;

    if place {
        session.cart.clear()?;
        tracing::info!(items = summary.item_count, total = %summary.total, "Order placed");
        writeln!(out, "Order placed")?;
    }
    Ok(())
}
