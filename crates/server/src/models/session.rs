//! Session-related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use punchlist_core::UserId;

/// A bearer-token session row.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque token held by the client in the session cookie.
    pub token: String,
    /// The account this session authenticates.
    pub user_id: UserId,
    /// When the session was created.
    pub created_at: DateTime<Utc>,
    /// Absolute expiry, 24 hours from creation (non-sliding).
    pub expires_at: DateTime<Utc>,
}

/// The resolved principal for the current request.
///
/// Minimal data handed to route handlers after the session cookie has been
/// resolved against the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// The account's database ID.
    pub id: UserId,
    /// Login username.
    pub username: String,
    /// Optional human-readable name.
    pub display_name: Option<String>,
}

impl CurrentUser {
    /// The name shown in the UI.
    #[must_use]
    pub fn display(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}
