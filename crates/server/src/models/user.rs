//! User domain types.

use chrono::{DateTime, Utc};

use punchlist_core::{Credential, UserId, Username};

use super::session::CurrentUser;

/// A Punchlist account (domain type).
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login username, case-sensitive and unique.
    pub username: Username,
    /// Optional human-readable name; presentation falls back to the username.
    pub display_name: Option<String>,
    /// The account's authentication paths.
    pub credential: Credential,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The name shown in the UI: the display name when set, else the
    /// username.
    #[must_use]
    pub fn display(&self) -> &str {
        self.display_name
            .as_deref()
            .unwrap_or_else(|| self.username.as_str())
    }

    /// The minimal identity attached to a request after session resolution.
    #[must_use]
    pub fn to_current(&self) -> CurrentUser {
        CurrentUser {
            id: self.id,
            username: self.username.as_str().to_owned(),
            display_name: self.display_name.clone(),
        }
    }
}

/// Fields for creating a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login username; uniqueness is enforced by the store.
    pub username: Username,
    /// At least one authentication path.
    pub credential: Credential,
    /// Optional human-readable name.
    pub display_name: Option<String>,
}
