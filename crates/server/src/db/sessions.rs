//! Session repository: bearer tokens with absolute expiry.
//!
//! Tokens are 32 random bytes encoded as URL-safe base64. Expiry is a fixed
//! 24-hour window from creation - non-sliding, matching the session model of
//! the rest of the system. The expiry comparison happens in Rust rather than
//! in SQL so it does not depend on text-timestamp collation.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sqlx::{Row, SqlitePool};

use punchlist_core::UserId;

use super::RepositoryError;
use super::users::row_to_user;
use crate::models::session::Session;
use crate::models::user::User;

/// Fixed session lifetime in hours.
pub const SESSION_TTL_HOURS: i64 = 24;

/// Number of random bytes in a session token.
const TOKEN_BYTES: usize = 32;

/// Repository for session database operations.
pub struct SessionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a session for the given principal.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (including a
    /// nonexistent user, via the foreign key).
    pub async fn create(&self, user_id: UserId) -> Result<Session, RepositoryError> {
        let created_at = Utc::now();
        let session = Session {
            token: generate_token(),
            user_id,
            created_at,
            expires_at: created_at + Duration::hours(SESSION_TTL_HOURS),
        };

        sqlx::query(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&session.token)
        .bind(session.user_id.as_i64())
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(self.pool)
        .await?;

        Ok(session)
    }

    /// Resolve a token to its principal.
    ///
    /// Fails softly: an unknown, malformed or expired token yields `None`,
    /// never an error the caller has to distinguish.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query itself fails, or
    /// `RepositoryError::DataCorruption` if the joined user row is invalid.
    pub async fn resolve(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(
            "SELECT u.id, u.username, u.password_hash, u.google_subject, u.display_name,
                    u.created_at, u.updated_at, s.expires_at AS session_expires_at
             FROM sessions s
             JOIN users u ON u.id = s.user_id
             WHERE s.token = ?1",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let expires_at: DateTime<Utc> = row.try_get("session_expires_at")?;
        if expires_at <= Utc::now() {
            return Ok(None);
        }

        row_to_user(&row).map(Some)
    }

    /// Destroy a session. Unknown tokens are a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn destroy(&self, token: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?1")
            .bind(token)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    /// Destroy every session belonging to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn destroy_all_for_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?1")
            .bind(user_id.as_i64())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Remove expired rows. Returns the number deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn purge_expired(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?1")
            .bind(Utc::now())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Generate a cryptographically unguessable session token.
fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
