//! Admin authentication.
//!
//! Admins are ordinary users with `is_admin` set; they sign in with the same
//! argon2 password hashes the storefront writes.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;
use tracing::instrument;

use techmart_core::Email;
use techmart_core::user::User;
use techmart_store::{Store, StoreError};

/// Errors that can occur during admin login.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Unknown email or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Credentials are valid but the account is not an admin.
    #[error("admin access required")]
    NotAdmin,

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Admin login service.
pub struct AdminAuthService<'a> {
    store: &'a dyn Store,
}

impl<'a> AdminAuthService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Verify credentials and require admin rights.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` if the email/password is
    /// wrong and `AdminAuthError::NotAdmin` for a valid non-admin account.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AdminAuthError> {
        let email = Email::parse(email).map_err(|_| AdminAuthError::InvalidCredentials)?;

        let credentials = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        if !verify_password(password, &credentials.password_hash) {
            return Err(AdminAuthError::InvalidCredentials);
        }

        if !credentials.user.is_admin {
            tracing::warn!(user_id = %credentials.user.id, "Non-admin login attempt");
            return Err(AdminAuthError::NotAdmin);
        }

        Ok(credentials.user)
    }
}

/// Hash a password into an argon2 PHC string.
///
/// # Errors
///
/// Returns the underlying hasher error if hashing fails.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
}

/// Check a password against a PHC string. Malformed hashes never match.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}
