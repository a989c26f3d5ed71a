//! Authentication service.
//!
//! Email and password accounts with argon2 password hashes.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tracing::instrument;

use techmart_core::Email;
use techmart_core::user::{MIN_PASSWORD_LENGTH, NewUser, User, password_acceptable};
use techmart_store::{Store, StoreError};

/// Authentication service.
///
/// Handles customer registration and login.
pub struct AuthService<'a> {
    store: &'a dyn Store,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Register a new customer with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::MissingName` if the name is blank.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    #[instrument(skip(self, password, name))]
    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingName);
        }

        let password_hash = hash_password(password)?;

        let user = self
            .store
            .create_user(NewUser {
                email,
                name: name.to_owned(),
                password_hash,
                is_admin: false,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Store(other),
            })?;

        tracing::info!(user_id = %user.id, "Customer registered");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let credentials = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &credentials.password_hash)?;

        Ok(credentials.user)
    }
}

// =============================================================================
// Password Helpers
// =============================================================================

fn validate_password(password: &str) -> Result<(), AuthError> {
    if !password_acceptable(password) {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password into a PHC string.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

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
    use super::*;
    use techmart_store::MemoryStore;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("hunter22", &hash).is_ok());
        assert!(matches!(
            verify_password("hunter23", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_verify_garbage_hash() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        let user = auth
            .register(" Ada@Example.com ", "secret1", "Ada")
            .await
            .unwrap();
        assert_eq!(user.email.as_str(), "ada@example.com");
        assert!(!user.is_admin);

        let logged_in = auth.login("ada@example.com", "secret1").await.unwrap();
        assert_eq!(logged_in.id, user.id);

        assert!(matches!(
            auth.login("ada@example.com", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("nobody@example.com", "secret1").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        assert!(matches!(
            auth.register("not-an-email", "secret1", "Ada").await,
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            auth.register("ada@example.com", "short", "Ada").await,
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            auth.register("ada@example.com", "secret1", "  ").await,
            Err(AuthError::MissingName)
        ));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let store = MemoryStore::new();
        let auth = AuthService::new(&store);

        auth.register("ada@example.com", "secret1", "Ada")
            .await
            .unwrap();
        assert!(matches!(
            auth.register("ADA@example.com", "secret2", "Ada Again").await,
            Err(AuthError::UserAlreadyExists)
        ));
    }
}
