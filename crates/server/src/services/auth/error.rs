//! Authentication error types.

use thiserror::Error;

use punchlist_core::UsernameError;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong password or unknown username. One signal for both, so a failed
    /// login never discloses whether the account exists.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account exists but has no local password; it signs in through
    /// its external identity provider.
    #[error("this account signs in with Google")]
    WrongAuthMethod,

    /// Registration attempted with a username that is already taken.
    #[error("username already taken")]
    UsernameTaken,

    /// The external identity is already linked to another account.
    #[error("external identity already linked")]
    DuplicateExternalRef,

    /// User lookup by id or name came up empty (management paths only -
    /// login failures use `InvalidCredentials`).
    #[error("user not found")]
    UserNotFound,

    /// Username failed validation.
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Password policy violation.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}
