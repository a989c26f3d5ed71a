//! Cart ownership.
//!
//! Every cart line belongs to exactly one [`CartOwner`]: an authenticated
//! user, or a guest identified by an opaque key the browser keeps (sent in the
//! `x-session-id` header) or the server generates and stores in the session.

use core::fmt;

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Errors that can occur when parsing a [`GuestId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GuestIdError {
    /// The input string is empty.
    #[error("guest id cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("guest id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains characters outside `[A-Za-z0-9_-]`.
    #[error("guest id may only contain letters, digits, '-' and '_'")]
    InvalidCharacter,
}

/// Opaque key identifying a guest shopper's cart.
///
/// ```
/// use techmart_core::GuestId;
///
/// assert!(GuestId::parse("guest-1700000000000-k3j9x2m1q").is_ok());
/// assert!(GuestId::parse("").is_err());
/// assert!(GuestId::parse("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestId(String);

impl GuestId {
    /// Maximum length of a guest id.
    pub const MAX_LENGTH: usize = 128;

    /// Parse a guest id.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, longer than 128 characters, or
    /// contains anything but ASCII letters, digits, `-` and `_`.
    pub fn parse(s: &str) -> Result<Self, GuestIdError> {
        if s.is_empty() {
            return Err(GuestIdError::Empty);
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(GuestIdError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(GuestIdError::InvalidCharacter);
        }
        Ok(Self(s.to_owned()))
    }

    /// Generate a new random guest id.
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("guest-{}", uuid::Uuid::new_v4().simple()))
    }

    /// Returns the guest id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The owner of a cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum CartOwner {
    /// An authenticated customer.
    User(UserId),
    /// An anonymous shopper.
    Guest(GuestId),
}

impl CartOwner {
    /// Key used to group cart lines in storage: `user:<uuid>` or `guest:<id>`.
    #[must_use]
    pub fn storage_key(&self) -> String {
        match self {
            Self::User(id) => format!("user:{id}"),
            Self::Guest(id) => format!("guest:{id}"),
        }
    }

    /// Parse a key produced by [`CartOwner::storage_key`].
    #[must_use]
    pub fn parse_storage_key(key: &str) -> Option<Self> {
        if let Some(rest) = key.strip_prefix("user:") {
            return rest.parse().ok().map(Self::User);
        }
        key.strip_prefix("guest:")
            .and_then(|rest| GuestId::parse(rest).ok())
            .map(Self::Guest)
    }

    /// The user behind this cart, if any.
    #[must_use]
    pub const fn user_id(&self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(*id),
            Self::Guest(_) => None,
        }
    }
}

impl fmt::Display for CartOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.storage_key())
    }
}
