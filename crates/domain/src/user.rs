//! Storefront users.

use chrono::{DateTime, Utc};
use common::UserId;
use serde::{Deserialize, Serialize};

/// Profile fields supplied by the chat platform on every contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
}

/// A known user. Created on first contact, never deleted; profile fields
/// and `last_seen` are refreshed on each upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub profile: UserProfile,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl User {
    /// Display name for greetings: first name, else username, else the id.
    pub fn display_name(&self) -> String {
        if let Some(first) = &self.profile.first_name {
            first.clone()
        } else if let Some(username) = &self.profile.username {
            format!("@{username}")
        } else {
            format!("user {}", self.id)
        }
    }
}
