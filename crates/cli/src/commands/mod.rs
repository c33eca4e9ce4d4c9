//! Session commands shared by one-shot invocations and the shell.

pub mod account;
pub mod address;
pub mod cart;
pub mod catalog;
pub mod shell;

use std::io::Write;

use clap::Subcommand;
use thiserror::Error;

use canteen_storefront::Session;

/// Errors raised by command handlers themselves.
#[derive(Debug, Error)]
pub enum CommandError {
    /// No restaurant serves a dish with this id.
    #[error("Unknown menu item: {0}")]
    UnknownMenuItem(String),
}

/// A command that acts on the open session.
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Search restaurants
    Restaurants(catalog::SearchArgs),

    /// Show a restaurant's menu
    Menu(catalog::MenuArgs),

    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: cart::CartAction,
    },

    /// Manage saved delivery addresses
    Address {
        #[command(subcommand)]
        action: address::AddressAction,
    },

    /// Sign in with email and password
    Login { email: String, password: String },

    /// Create an account and sign in
    Signup {
        email: String,
        password: String,
        /// Display name
        name: String,
    },

    /// Sign out
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Show the order summary
    Checkout {
        /// Place the order and empty the cart
        #[arg(long)]
        place: bool,
    },
}

/// Run `command` against `session`, writing human-readable output to `out`.
///
/// # Errors
///
/// Returns an error if the operation fails or output cannot be written.
pub fn execute(
    session: &mut Session,
    command: SessionCommand,
    out: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        SessionCommand::Restaurants(args) => catalog::search(session, &args, out)?,
        SessionCommand::Menu(args) => catalog::menu(session, &args, out)?,
        SessionCommand::Cart { action } => cart::run(session, action, out)?,
        SessionCommand::Address { action } => address::run(session, action, out)?,
        SessionCommand::Login { email, password } => {
            account::login(session, &email, password, out)?;
        }
        SessionCommand::Signup {
            email,
            password,
            name,
        } => account::signup(session, &email, password, &name, out)?,
        SessionCommand::Logout => account::logout(session, out)?,
        SessionCommand::Whoami => account::whoami(session, out)?,
        SessionCommand::Checkout { place } => cart::checkout(session, place, out)?,
    }
    Ok(())
}
