//! Line-oriented shell over one session.
//!
//! Each input line is parsed as a session command. Blank lines and lines
//! starting with `#` are skipped; `exit` or `quit` ends the shell. A failing
//! command is reported and the shell carries on.

use std::io::{BufRead, Write};

use clap::Parser;
use thiserror::Error;

use canteen_storefront::Session;

use super::SessionCommand;

#[derive(Parser)]
#[command(name = "canteen", no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: SessionCommand,
}

/// Error splitting a shell line into words.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitError {
    #[error("unterminated quote")]
    UnterminatedQuote,
}

/// Run commands from `input` until it ends or `exit` is read.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails.
pub fn run(
    session: &mut Session,
    input: impl BufRead,
    mut out: impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if matches!(trimmed, "exit" | "quit") {
            break;
        }

        let words = match split_words(trimmed) {
            Ok(words) => words,
            Err(e) => {
                writeln!(out, "error: {e}")?;
                continue;
            }
        };

        match ShellLine::try_parse_from(words) {
            Ok(parsed) => {
                if let Err(e) = super::execute(session, parsed.command, &mut out) {
                    tracing::debug!(error = %e, line = trimmed, "Shell command failed");
                    writeln!(out, "error: {e}")?;
                }
            }
            Err(e) => write!(out, "{}", e.render())?,
        }
    }
    out.flush()?;
    Ok(())
}

/// Split a line on whitespace, keeping single- or double-quoted runs together.
pub fn split_words(line: &str) -> Result<Vec<String>, SplitError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in line.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(SplitError::UnterminatedQuote);
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use canteen_storefront::StorefrontConfig;
    use canteen_storefront::search::Catalog;
    use canteen_storefront::storage::{FileStore, MemoryStore, SharedStore};

    use super::*;

    fn session_over(store: SharedStore) -> Session {
        Session::new(
            StorefrontConfig::default(),
            store,
            Arc::new(Catalog::seeded().unwrap()),
        )
        .unwrap()
    }

    fn run_script(session: &mut Session, script: &str) -> String {
        let mut out = Vec::new();
        run(session, script.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_split_words() {
        assert_eq!(
            split_words(r#"address add Gym "7 Hill Road, Pune"  --default"#).unwrap(),
            ["address", "add", "Gym", "7 Hill Road, Pune", "--default"]
        );
        assert_eq!(split_words("cart set 101 ''").unwrap(), ["cart", "set", "101", ""]);
        assert_eq!(
            split_words("say \"unterminated"),
            Err(SplitError::UnterminatedQuote)
        );
    }

    #[test]
    fn test_cart_lives_for_the_shell() {
        let mut session = session_over(Arc::new(MemoryStore::new()));
        let output = run_script(
            &mut session,
            "# order lunch\n\
             cart add 101\n\
             cart add 101\n\
             cart add 105\n\
             cart set 101 5\n\
             cart show\n",
        );

        assert!(output.contains("Added Paneer Butter Masala (x2)"));
        assert!(output.contains("Updated 101: 2 -> 5"));
        assert!(output.contains("Your Cart (6 items)"));
        assert!(output.contains("Subtotal: ₹1334.00"));
    }

    #[test]
    fn test_errors_do_not_stop_the_shell() {
        let mut session = session_over(Arc::new(MemoryStore::new()));
        let output = run_script(
            &mut session,
            "cart add 999\n\
             cart remove 101\n\
             frobnicate\n\
             cart add 201\n\
             exit\n\
             cart add 201\n",
        );

        assert!(output.contains("error: Unknown menu item: 999"));
        assert!(output.contains("error: Not found: cart line 101"));
        assert_eq!(session.cart.total_items(), 1);
    }

    #[test]
    fn test_checkout_places_order() {
        let mut session = session_over(Arc::new(MemoryStore::new()));
        let output = run_script(
            &mut session,
            "checkout\n\
             cart add 201\n\
             checkout --place\n",
        );

        assert!(output.contains("error: cart is empty"));
        assert!(output.contains("Deliver to: Home"));
        assert!(output.contains("Total: ₹169.00"));
        assert!(output.contains("Order placed"));
        assert!(session.cart.is_empty());
    }

    #[test]
    fn test_addresses_and_login_survive_restart() {
        let dir = tempfile::tempdir().unwrap();
        let store = || -> SharedStore { Arc::new(FileStore::new(dir.path())) };

        let mut first = session_over(store());
        let output = run_script(
            &mut first,
            "address add Gym \"7 Hill Road\" --default\n\
             login demo@example.com password123\n",
        );
        assert!(output.contains("Welcome back, Demo User!"));

        let mut second = session_over(store());
        assert_eq!(second.addresses.selected_address().unwrap().title, "Gym");
        let output = run_script(&mut second, "whoami\n");
        assert!(output.contains("Demo User <demo@example.com>"));
    }
}
