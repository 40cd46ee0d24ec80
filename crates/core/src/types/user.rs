//! Shopper identity.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Identity carried in the session cookie.
///
/// The sign-in flow stores URL-encoded JSON such as `{"id":"u1"}`; only the id
/// is needed to scope requests to the current shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
}

/// Shopper profile from the marketplace API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl UserProfile {
    /// Upper-cased first letter of the name, used for the avatar.
    #[must_use]
    pub fn initial(&self) -> Option<char> {
        self.name.chars().next().map(|c| c.to_ascii_uppercase())
    }
}
