//! Signed-in user type.

use serde::{Deserialize, Serialize};

use super::email::Email;
use super::id::UserId;

/// The user record kept for the current session.
///
/// Never carries credentials; this is what gets persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl User {
    /// Name to greet the user with, falling back to the email.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            self.email.as_str()
        } else {
            &self.name
        }
    }
}
