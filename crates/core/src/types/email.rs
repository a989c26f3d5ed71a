//! Account and order contact addresses.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Why an address was refused.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    #[error("email is required")]
    Empty,
    #[error("email is longer than {} characters", Email::MAX_LENGTH)]
    TooLong,
    #[error("email must look like name@domain")]
    Malformed,
}

/// A lower-cased email address.
///
/// Customers sign in with whatever casing they registered with, and guest
/// orders are matched to accounts by address, so both sides compare the
/// normalized form.
///
/// ```
/// use techmart_core::Email;
///
/// let email = Email::parse(" Grace@Example.com ").unwrap();
/// assert_eq!(email.as_str(), "grace@example.com");
/// assert!(Email::parse("grace@").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    pub const MAX_LENGTH: usize = 254;

    /// Trim, check for a single `@` with text on both sides, and lower-case.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] describing the first rule the input breaks.
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }
        if trimmed.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong);
        }
        let well_formed = trimmed.split_once('@').is_some_and(|(name, domain)| {
            !name.is_empty() && !domain.is_empty() && !domain.contains('@')
        });
        if !well_formed {
            return Err(EmailError::Malformed);
        }
        Ok(Self(trimmed.to_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_casing_is_ignored() {
        let registered = Email::parse("Grace.Hopper+shop@TechMart.example").unwrap();
        let login = Email::parse("  grace.hopper+shop@techmart.example\n").unwrap();
        assert_eq!(registered, login);
        assert_eq!(registered.to_string(), "grace.hopper+shop@techmart.example");
    }

    #[test]
    fn test_refuses_addresses_without_both_halves() {
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
        for raw in ["grace", "@techmart.example", "grace@", "grace@shop@techmart.example"] {
            assert_eq!(Email::parse(raw), Err(EmailError::Malformed), "{raw}");
        }
    }

    #[test]
    fn test_length_limit() {
        let domain = "@techmart.example";
        let fits = format!("{}{domain}", "a".repeat(Email::MAX_LENGTH - domain.len()));
        assert!(Email::parse(&fits).is_ok());
        assert_eq!(
            Email::parse(&format!("a{fits}")),
            Err(EmailError::TooLong)
        );
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let email: Email = "ops@techmart.example".parse().unwrap();
        assert_eq!(
            serde_json::to_value(&email).unwrap(),
            serde_json::json!("ops@techmart.example")
        );
    }
}
