//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin account
//! tm-cli admin create -e admin@example.com -n "Admin Name" -p 'long password'
//!
//! # Grant or revoke admin rights on an existing account
//! tm-cli admin promote -e someone@example.com
//! tm-cli admin demote -e someone@example.com
//! ```

use techmart_admin::services::auth::hash_password;
use techmart_core::Email;
use techmart_core::user::{MIN_PASSWORD_LENGTH, NewUser, User, password_acceptable};
use techmart_store::{Store, StoreError};

use super::{CommandError, connect};

fn parse_email(email: &str) -> Result<Email, CommandError> {
    Email::parse(email).map_err(|_| CommandError::InvalidEmail(email.to_owned()))
}

/// Create an admin account.
///
/// # Errors
///
/// Returns an error for an invalid email or short password, or if an
/// account with this email already exists.
pub async fn create_admin(
    store: &dyn Store,
    email: &str,
    name: &str,
    password: &str,
) -> Result<User, CommandError> {
    let email = parse_email(email)?;
    if !password_acceptable(password) {
        return Err(CommandError::InvalidPassword(format!(
            "must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    let password_hash =
        hash_password(password).map_err(|e| CommandError::InvalidPassword(e.to_string()))?;

    store
        .create_user(NewUser {
            email: email.clone(),
            name: name.trim().to_owned(),
            password_hash,
            is_admin: true,
        })
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => CommandError::UserExists(email.to_string()),
            other => CommandError::Store(other),
        })
}

/// Grant (`true`) or revoke (`false`) admin rights.
///
/// # Errors
///
/// Returns `CommandError::UserNotFound` if no account has this email.
pub async fn set_admin(store: &dyn Store, email: &str, is_admin: bool) -> Result<(), CommandError> {
    let email = parse_email(email)?;
    if store.set_admin(&email, is_admin).await? {
        Ok(())
    } else {
        Err(CommandError::UserNotFound(email.to_string()))
    }
}

/// `tm-cli admin create`
///
/// # Errors
///
/// See [`create_admin`].
pub async fn create(email: &str, name: &str, password: &str) -> Result<(), CommandError> {
    let store = connect().await?;
    let user = create_admin(&store, email, name, password).await?;
    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user.id,
        user.email
    );
    Ok(())
}

/// `tm-cli admin promote` / `tm-cli admin demote`
///
/// # Errors
///
/// See [`set_admin`].
pub async fn toggle(email: &str, is_admin: bool) -> Result<(), CommandError> {
    let store = connect().await?;
    set_admin(&store, email, is_admin).await?;
    if is_admin {
        tracing::info!("{email} is now an admin");
    } else {
        tracing::info!("{email} is no longer an admin");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use techmart_store::MemoryStore;

    #[tokio::test]
    async fn test_create_admin() {
        let store = MemoryStore::new();
        let user = create_admin(&store, "Root@TechMart.example", "Root", "s3cret-pass")
            .await
            .unwrap();
        assert!(user.is_admin);
        assert_eq!(user.email.as_str(), "root@techmart.example");

        let credentials = store
            .find_user_by_email(&user.email)
            .await
            .unwrap()
            .unwrap();
        assert!(credentials.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_create_admin_rejects_bad_input() {
        let store = MemoryStore::new();
        assert!(matches!(
            create_admin(&store, "nope", "Root", "s3cret-pass").await,
            Err(CommandError::InvalidEmail(_))
        ));
        assert!(matches!(
            create_admin(&store, "root@techmart.example", "Root", "abc").await,
            Err(CommandError::InvalidPassword(_))
        ));

        create_admin(&store, "root@techmart.example", "Root", "s3cret-pass")
            .await
            .unwrap();
        assert!(matches!(
            create_admin(&store, "root@techmart.example", "Root", "s3cret-pass").await,
            Err(CommandError::UserExists(_))
        ));
    }

    #[tokio::test]
    async fn test_promote_and_demote() {
        let store = MemoryStore::new();
        let user = create_admin(&store, "ops@techmart.example", "Ops", "s3cret-pass")
            .await
            .unwrap();

        set_admin(&store, "ops@techmart.example", false).await.unwrap();
        assert!(!store.get_user(user.id).await.unwrap().unwrap().is_admin);

        set_admin(&store, "ops@techmart.example", true).await.unwrap();
        assert!(store.get_user(user.id).await.unwrap().unwrap().is_admin);

        assert!(matches!(
            set_admin(&store, "ghost@techmart.example", true).await,
            Err(CommandError::UserNotFound(_))
        ));
    }
}
