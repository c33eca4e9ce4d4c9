//! CanteenCraze CLI - browse restaurants and manage a session from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Search restaurants
//! canteen restaurants --query biryani --min-rating 4
//!
//! # Show a filtered menu
//! canteen menu 1 --veg --sort price-low-to-high
//!
//! # Manage saved addresses
//! canteen address add "Gym" "7 Hill Road" --default
//! canteen address list
//!
//! # Sign in as the demo user
//! canteen login demo@example.com password123
//!
//! # Structured logs on stderr
//! CANTEEN_LOG_JSON=1 canteen cart show
//!
//! # Interactive session (cart lives as long as the shell unless
//! # CANTEEN_PERSIST_CART is set)
//! canteen shell
//! ```
//!
//! # Commands
//!
//! - `restaurants` / `menu` - Catalog search
//! - `cart` - Cart operations
//! - `address` - Saved address operations
//! - `login` / `signup` / `logout` / `whoami` - Mocked sign-in
//! - `checkout` - Order summary
//! - `shell` - Read commands from stdin

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use canteen_storefront::{Session, StorefrontConfig};

mod commands;

use commands::SessionCommand;

#[derive(Parser)]
#[command(name = "canteen")]
#[command(author, version, about = "CanteenCraze command-line client")]
struct Cli {
    /// Directory for saved session state (overrides `CANTEEN_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read commands from stdin, one per line, against a single session
    Shell,

    #[command(flatten)]
    Session(SessionCommand),
}

fn main() {
    // Defaults to info for our crates if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("canteen_storefront=info,canteen_cli=info"));

    // JSON lines for log shippers, text otherwise
    let json = std::env::var_os("CANTEEN_LOG_JSON").is_some();
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli);

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = StorefrontConfig::from_env()?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    tracing::debug!(data_dir = %config.data_dir.display(), "Opening session");
    let mut session = Session::open(config)?;

    match cli.command {
        Commands::Shell => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            commands::shell::run(&mut session, stdin.lock(), stdout.lock())?;
        }
        Commands::Session(command) => {
            let mut out = std::io::stdout().lock();
            commands::execute(&mut session, command, &mut out)?;
        }
    }
    Ok(())
}
