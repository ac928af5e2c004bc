//! Authentication credential union.

use serde::{Deserialize, Serialize};

/// The authentication paths attached to a user identity.
///
/// Every identity carries at least one path; an account with no way to
/// authenticate is unrepresentable. Password hashes are Argon2id PHC strings
/// produced by the server's auth service - plaintext passwords are never
/// stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Credential {
    /// Local password account.
    Password {
        /// Argon2id hash in PHC string format.
        hash: String,
    },
    /// External-identity-only account (e.g. Google sign-in).
    External {
        /// The identity provider's subject id.
        subject: String,
    },
    /// Local password plus a linked external identity.
    PasswordAndExternal {
        /// Argon2id hash in PHC string format.
        hash: String,
        /// The identity provider's subject id.
        subject: String,
    },
}

impl Credential {
    /// Reconstruct a credential from its stored columns.
    ///
    /// Returns `None` when both parts are absent, which violates the
    /// at-least-one-path invariant and is treated as data corruption by the
    /// repository layer.
    #[must_use]
    pub fn from_parts(hash: Option<String>, subject: Option<String>) -> Option<Self> {
        match (hash, subject) {
            (Some(hash), None) => Some(Self::Password { hash }),
            (None, Some(subject)) => Some(Self::External { subject }),
            (Some(hash), Some(subject)) => Some(Self::PasswordAndExternal { hash, subject }),
            (None, None) => None,
        }
    }

    /// Split into the stored columns `(password_hash, external_subject)`.
    #[must_use]
    pub fn into_parts(self) -> (Option<String>, Option<String>) {
        match self {
            Self::Password { hash } => (Some(hash), None),
            Self::External { subject } => (None, Some(subject)),
            Self::PasswordAndExternal { hash, subject } => (Some(hash), Some(subject)),
        }
    }

    /// The password hash, when a local password is set.
    #[must_use]
    pub fn password_hash(&self) -> Option<&str> {
        match self {
            Self::Password { hash } | Self::PasswordAndExternal { hash, .. } => Some(hash),
            Self::External { .. } => None,
        }
    }

    /// The external provider subject, when one is linked.
    #[must_use]
    pub fn external_subject(&self) -> Option<&str> {
        match self {
            Self::External { subject } | Self::PasswordAndExternal { subject, .. } => Some(subject),
            Self::Password { .. } => None,
        }
    }

    /// Replace or add the local password, preserving any external linkage.
    #[must_use]
    pub fn with_password(self, hash: String) -> Self {
        match self {
            Self::Password { .. } => Self::Password { hash },
            Self::External { subject } | Self::PasswordAndExternal { subject, .. } => {
                Self::PasswordAndExternal { hash, subject }
            }
        }
    }
}
