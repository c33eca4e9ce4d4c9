//! Authentication service.
//!
//! Mocked email/password sign-in. Accounts live in an in-memory
//! [`UserDirectory`]; only the signed-in [`User`] is written to the store so
//! a later run starts signed in.

mod error;

pub use error::AuthError;

use std::collections::HashMap;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use canteen_core::{Email, User, UserId};

use super::persistence::Persistence;
use crate::models::WriteMode;
use crate::models::session::keys;
use crate::storage::{self, KeyValueStore, SharedStore};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Email of the built-in demo account.
pub const DEMO_EMAIL: &str = "demo@example.com";

/// Password of the built-in demo account.
pub const DEMO_PASSWORD: &str = "password123";

/// Avatar URL handed to every account.
#[must_use]
pub fn avatar_url(email: &Email) -> String {
    format!("https://i.pravatar.cc/150?u={email}")
}

#[derive(Debug, Clone)]
struct Account {
    user: User,
    password_hash: String,
}

/// Registered accounts, keyed by lower-cased email.
#[derive(Debug, Default)]
pub struct UserDirectory {
    accounts: HashMap<String, Account>,
}

impl UserDirectory {
    /// An empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory holding only the demo account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::PasswordHash` if hashing the demo password fails.
    pub fn with_demo_account() -> Result<Self, AuthError> {
        let email = Email::parse(DEMO_EMAIL)?;
        let user = User {
            id: UserId::new("1"),
            avatar: Some(avatar_url(&email)),
            email,
            name: "Demo User".to_owned(),
        };

        let mut directory = Self::new();
        directory.insert(user, &SecretString::from(DEMO_PASSWORD))?;
        Ok(directory)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    #[must_use]
    pub fn contains(&self, email: &Email) -> bool {
        self.accounts.contains_key(&directory_key(email))
    }

    /// Register `user` with `password`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the email is taken, or
    /// `AuthError::PasswordHash` if hashing fails.
    pub fn insert(&mut self, user: User, password: &SecretString) -> Result<(), AuthError> {
        let key = directory_key(&user.email);
        if self.accounts.contains_key(&key) {
            return Err(AuthError::UserAlreadyExists);
        }
        let password_hash = hash_password(password.expose_secret())?;
        self.accounts.insert(
            key,
            Account {
                user,
                password_hash,
            },
        );
        Ok(())
    }

    /// Check `password` for `email`, returning the account's user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email or a
    /// wrong password.
    pub fn verify(&self, email: &Email, password: &SecretString) -> Result<User, AuthError> {
        let account = self
            .accounts
            .get(&directory_key(email))
            .ok_or(AuthError::InvalidCredentials)?;
        verify_password(password.expose_secret(), &account.password_hash)?;
        Ok(account.user.clone())
    }
}

/// The signed-in user for one session.
#[derive(Debug)]
pub struct AuthSession {
    directory: UserDirectory,
    current: Option<User>,
    persistence: Persistence,
}

impl AuthSession {
    /// Restore the signed-in user from `store`.
    ///
    /// A stored entry that cannot be parsed is removed and the session
    /// starts signed out.
    #[instrument(skip(directory, store))]
    pub fn new(directory: UserDirectory, store: SharedStore, mode: WriteMode) -> Self {
        let current = storage::load::<User>(&*store, keys::CURRENT_USER);
        let mut persistence = Persistence::durable(store, keys::CURRENT_USER, mode);

        if current.is_none() {
            let has_entry = persistence
                .store()
                .is_some_and(|s| matches!(s.get(keys::CURRENT_USER), Ok(Some(_))));
            if has_entry {
                tracing::warn!("Discarding unreadable signed-in user");
                let mut slot: Option<User> = None;
                // Best effort even under strict writes; nothing to roll back.
                let _ = persistence.clear(&mut slot);
            }
        }

        if let Some(user) = &current {
            tracing::debug!(user_id = %user.id, "Restored signed-in user");
        }

        Self {
            directory,
            current,
            persistence,
        }
    }

    #[must_use]
    pub const fn current_user(&self) -> Option<&User> {
        self.current.as_ref()
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    #[must_use]
    pub const fn directory(&self) -> &UserDirectory {
        &self.directory
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub fn login(&mut self, email: &str, password: &SecretString) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        let user = match self.directory.verify(&email, password) {
            Ok(user) => user,
            Err(e) => {
                tracing::info!(email = %email, "Login rejected");
                return Err(e);
            }
        };

        self.persistence.commit(&mut self.current, Some(user.clone()))?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(user)
    }

    /// Create an account and sign in as it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, password, name))]
    pub fn signup(
        &mut self,
        email: &str,
        password: &SecretString,
        name: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        if self.directory.contains(&email) {
            return Err(AuthError::UserAlreadyExists);
        }
        validate_password(password.expose_secret())?;

        let user = User {
            id: UserId::generate(),
            avatar: Some(avatar_url(&email)),
            email,
            name: name.trim().to_owned(),
        };
        self.directory.insert(user.clone(), password)?;

        self.persistence.commit(&mut self.current, Some(user.clone()))?;
        tracing::info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    /// Sign out and forget the stored user.
    ///
    /// # Errors
    ///
    /// Only fails with `AuthError::Storage` under strict writes.
    #[instrument(skip(self))]
    pub fn logout(&mut self) -> Result<(), AuthError> {
        self.persistence.clear(&mut self.current)?;
        tracing::info!("User logged out");
        Ok(())
    }
}

fn directory_key(email: &Email) -> String {
    email.as_str().to_lowercase()
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::{KeyValueStore, MemoryStore};

    fn secret(s: &str) -> SecretString {
        SecretString::from(s)
    }

    fn session(store: &SharedStore) -> AuthSession {
        AuthSession::new(
            UserDirectory::with_demo_account().unwrap(),
            store.clone(),
            WriteMode::BestEffort,
        )
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("1234567").is_err());
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_demo_login_persists_user() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut auth = session(&store);

        let user = auth.login(DEMO_EMAIL, &secret(DEMO_PASSWORD)).unwrap();
        assert_eq!(user.name, "Demo User");
        assert_eq!(
            user.avatar.as_deref(),
            Some("https://i.pravatar.cc/150?u=demo@example.com")
        );

        let restored = session(&store);
        assert_eq!(restored.current_user(), Some(&user));
    }

    #[test]
    fn test_login_rejections() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut auth = session(&store);

        assert!(matches!(
            auth.login("not-an-email", &secret(DEMO_PASSWORD)),
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            auth.login(DEMO_EMAIL, &secret("nope")),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("ghost@example.com", &secret(DEMO_PASSWORD)),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(!auth.is_authenticated());
        assert_eq!(store.get(keys::CURRENT_USER).unwrap(), None);
    }

    #[test]
    fn test_login_email_is_case_insensitive() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut auth = session(&store);
        assert!(auth.login("Demo@Example.com", &secret(DEMO_PASSWORD)).is_ok());
    }

    #[test]
    fn test_signup_then_login() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut auth = session(&store);

        let user = auth
            .signup("asha@example.com", &secret("tandoori!"), " Asha ")
            .unwrap();
        assert_eq!(user.name, "Asha");
        assert_eq!(auth.current_user(), Some(&user));
        assert_eq!(auth.directory().len(), 2);

        auth.logout().unwrap();
        let again = auth.login("asha@example.com", &secret("tandoori!")).unwrap();
        assert_eq!(again.id, user.id);
    }

    #[test]
    fn test_signup_rejections() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut auth = session(&store);

        let err = auth
            .signup(DEMO_EMAIL, &secret("whatever123"), "Again")
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));
        assert_eq!(err.to_string(), "email already in use");

        assert!(matches!(
            auth.signup("new@example.com", &secret("short"), "New"),
            Err(AuthError::WeakPassword(_))
        ));
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn test_logout_clears_store() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        let mut auth = session(&store);
        auth.login(DEMO_EMAIL, &secret(DEMO_PASSWORD)).unwrap();

        auth.logout().unwrap();
        assert!(auth.current_user().is_none());
        assert_eq!(store.get(keys::CURRENT_USER).unwrap(), None);
    }

    #[test]
    fn test_malformed_stored_user_is_discarded() {
        let store: SharedStore = Arc::new(MemoryStore::new());
        store.set(keys::CURRENT_USER, "{\"id\":").unwrap();

        let auth = session(&store);
        assert!(!auth.is_authenticated());
        assert_eq!(store.get(keys::CURRENT_USER).unwrap(), None);
    }
}
