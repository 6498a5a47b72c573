//! Storefront account types.
//!
//! Identity is the phone number as far as callers are concerned; the numeric
//! `id` is assigned by the backend when the account is created.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// A storefront account as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Backend-assigned id. Zero means "not created".
    pub id: UserId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub pincode: String,
}

impl User {
    /// Whether this record refers to an account the backend knows about.
    #[must_use]
    pub const fn is_registered(&self) -> bool {
        self.id.is_assigned()
    }
}

/// Signup form submitted to the account creation endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub username: String,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub pincode: String,
}

impl NewUser {
    /// Copy of the form with surrounding whitespace removed from every field.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            email: self.email.trim().to_string(),
            address: self.address.trim().to_string(),
            pincode: self.pincode.trim().to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_uses_camel_case_fields() {
        let user = User {
            id: UserId::new(3),
            username: "asha".to_string(),
            phone_number: "9876543210".to_string(),
            email: "asha@example.com".to_string(),
            address: "12 Kiln Road".to_string(),
            pincode: "560001".to_string(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["phoneNumber"], "9876543210");
        assert_eq!(json["id"], 3);
    }

    #[test]
    fn test_user_missing_strings_default_to_empty() {
        let user: User = serde_json::from_str(r#"{"id": 9, "phoneNumber": "123"}"#).unwrap();
        assert_eq!(user.id, UserId::new(9));
        assert!(user.username.is_empty());
        assert!(user.is_registered());
    }

    #[test]
    fn test_zero_id_is_not_registered() {
        let user: User = serde_json::from_str(r#"{"id": 0}"#).unwrap();
        assert!(!user.is_registered());
    }

    #[test]
    fn test_new_user_trimmed() {
        let form = NewUser {
            username: "  asha ".to_string(),
            phone_number: " 98765 ".to_string(),
            email: "a@b.c\n".to_string(),
            address: String::new(),
            pincode: " 560001".to_string(),
        };
        let trimmed = form.trimmed();
        assert_eq!(trimmed.username, "asha");
        assert_eq!(trimmed.phone_number, "98765");
        assert_eq!(trimmed.email, "a@b.c");
        assert_eq!(trimmed.pincode, "560001");
    }
}
