//! Saved address commands.

use std::io::Write;

use clap::Subcommand;

use canteen_core::{Address, AddressId, NewAddress};
use canteen_storefront::Session;

#[derive(Debug, Subcommand)]
pub enum AddressAction {
    /// List saved addresses
    List,
    /// Save a new address
    Add {
        title: String,
        full_address: String,
        /// Make it the default address
        #[arg(long)]
        default: bool,
    },
    /// Replace an address's fields
    Update {
        id: String,
        title: String,
        full_address: String,
        #[arg(long)]
        default: bool,
    },
    /// Delete an address
    Remove { id: String },
    /// Make an address the default (and select it)
    Default { id: String },
    /// Deliver to an address without changing the default
    Select { id: String },
}

pub fn run(
    session: &mut Session,
    action: AddressAction,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let book = &mut session.addresses;
    match action {
        AddressAction::List => {}
        AddressAction::Add {
            title,
            full_address,
            default,
        } => {
            let address = book.add_address(NewAddress::new(title, full_address, default))?;
            writeln!(out, "Saved {} [{}]", address.title, address.id)?;
        }
        AddressAction::Update {
            id,
            title,
            full_address,
            default,
        } => {
            let address = book.update_address(
                &AddressId::new(id),
                NewAddress::new(title, full_address, default),
            )?;
            writeln!(out, "Updated {} [{}]", address.title, address.id)?;
        }
        AddressAction::Remove { id } => {
            let address = book.remove_address(&AddressId::new(id))?;
            writeln!(out, "Removed {} [{}]", address.title, address.id)?;
        }
        AddressAction::Default { id } => {
            let address = book.set_default_address(&AddressId::new(id))?;
            writeln!(out, "Default address is now {}", address.title)?;
        }
        AddressAction::Select { id } => {
            let address = book.select_address(&AddressId::new(id))?;
            writeln!(out, "Delivering to {}", address.title)?;
        }
    }

    if let Some(error) = book.last_write_error() {
        tracing::warn!(%error, "Address changes were not saved");
    }

    let selected = book.selected_address().map(|a| a.id.clone());
    if book.is_empty() {
        writeln!(out, "No saved addresses")?;
    }
    for address in book.addresses() {
        writeln!(out, "{}", address_line(address, selected.as_ref()))?;
    }
    Ok(())
}

fn address_line(address: &Address, selected: Option<&AddressId>) -> String {
    format!(
        "{} [{}] {}: {}{}",
        if selected == Some(&address.id) { "*" } else { " " },
        address.id,
        address.title,
        address.full_address,
        if address.is_default { " (default)" } else { "" }
    )
}
