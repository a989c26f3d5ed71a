//! Customer and admin accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::order::ShippingAddress;
use crate::types::{Email, UserId};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// A registered user. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub name: String,
    pub phone: Option<String>,
    pub shipping_address: Option<ShippingAddress>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub name: String,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Profile fields a customer may change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
}

impl ProfileUpdate {
    /// Trim fields; a blank phone clears it, a blank name is ignored.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self {
            name: self
                .name
                .map(|n| n.trim().to_owned())
                .filter(|n| !n.is_empty()),
            phone: self.phone.map(|p| p.trim().to_owned()),
        }
    }

    /// Apply the update to a user.
    pub fn apply(self, user: &mut User) {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(phone) = self.phone {
            user.phone = Some(phone).filter(|p| !p.is_empty());
        }
    }
}

/// Whether a password is long enough to be accepted.
#[must_use]
pub fn password_acceptable(password: &str) -> bool {
    password.chars().count() >= MIN_PASSWORD_LENGTH
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: UserId::new_v4(),
            email: Email::parse("ana@example.com").unwrap(),
            name: "Ana".into(),
            phone: Some("555-0100".into()),
            shipping_address: None,
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_length() {
        assert!(!password_acceptable("12345"));
        assert!(password_acceptable("123456"));
    }

    #[test]
    fn test_profile_update_blank_phone_clears() {
        let mut user = user();
        ProfileUpdate {
            name: Some("  ".into()),
            phone: Some(" ".into()),
        }
        .normalized()
        .apply(&mut user);
        assert_eq!(user.name, "Ana");
        assert_eq!(user.phone, None);
    }

    #[test]
    fn test_user_json_has_no_password() {
        let json = serde_json::to_value(user()).unwrap();
        assert_eq!(json["email"], "ana@example.com");
        assert_eq!(json["isAdmin"], false);
        assert!(json.get("passwordHash").is_none());
    }
}
