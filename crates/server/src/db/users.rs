//! User repository for database operations.
//!
//! All queries go through the runtime sqlx API and map rows into domain
//! types at the edge; invalid stored values surface as
//! `RepositoryError::DataCorruption`.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use punchlist_core::{Credential, UserId, Username};

use super::RepositoryError;
use crate::models::user::{NewUser, User};

const USER_COLUMNS: &str =
    "id, username, password_hash, google_subject, display_name, created_at, updated_at";

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by username (case-sensitive).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
        ))
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Get a user by the external identity provider's subject id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn find_by_google_subject(
        &self,
        subject: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE google_subject = ?1"
        ))
        .bind(subject)
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` when the username or the external
    /// subject is already taken, `RepositoryError::Database` for other
    /// database errors.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let now = Utc::now();
        let (password_hash, google_subject) = new_user.credential.clone().into_parts();

        let row = sqlx::query(&format!(
            "INSERT INTO users (username, password_hash, google_subject, display_name, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new_user.username.as_str())
        .bind(password_hash.as_deref())
        .bind(google_subject.as_deref())
        .bind(new_user.display_name.as_deref())
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await
        .map_err(map_unique_violation)?;

        row_to_user(&row)
    }

    /// Replace a user's credential (e.g. a password change).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist,
    /// `RepositoryError::Database` for other database errors.
    pub async fn update_credential(
        &self,
        id: UserId,
        credential: &Credential,
    ) -> Result<(), RepositoryError> {
        let (password_hash, google_subject) = credential.clone().into_parts();

        let result = sqlx::query(
            "UPDATE users SET password_hash = ?1, google_subject = ?2, updated_at = ?3 WHERE id = ?4",
        )
        .bind(password_hash.as_deref())
        .bind(google_subject.as_deref())
        .bind(Utc::now())
        .bind(id.as_i64())
        .execute(self.pool)
        .await
        .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Set the display name, but only when none is stored yet.
    ///
    /// Used by the external-identity login path to back-fill the name from
    /// the provider profile without clobbering a user-chosen one.
    ///
    /// # Returns
    ///
    /// `true` when a name was written, `false` when one was already present
    /// (or the user doesn't exist).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn backfill_display_name(
        &self,
        id: UserId,
        display_name: &str,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE users SET display_name = ?1, updated_at = ?2 WHERE id = ?3 AND display_name IS NULL",
        )
        .bind(display_name)
        .bind(Utc::now())
        .bind(id.as_i64())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Map unique-constraint violations to `Conflict`, everything else to
/// `Database`.
fn map_unique_violation(e: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(db_err.message().to_owned());
    }
    RepositoryError::Database(e)
}

/// Convert a `users` row into the domain type.
pub(crate) fn row_to_user(row: &SqliteRow) -> Result<User, RepositoryError> {
    let username_raw: String = row.try_get("username")?;
    let username = Username::parse(&username_raw).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
    })?;

    let credential = Credential::from_parts(
        row.try_get("password_hash")?,
        row.try_get("google_subject")?,
    )
    .ok_or_else(|| {
        RepositoryError::DataCorruption("user has no authentication path".to_owned())
    })?;

    Ok(User {
        id: UserId::new(row.try_get("id")?),
        username,
        display_name: row.try_get("display_name")?,
        credential,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use punchlist_core::Credential;
    use punchlist_core::Username;

    use crate::db::testing;
    use crate::models::user::NewUser;

    use super::*;

    #[tokio::test]
    async fn test_create_then_find_by_username() {
        let pool = testing::pool().await;
        let repo = UserRepository::new(&pool);

        let created = testing::seed_user(&pool, "alice").await;
        let found = repo
            .find_by_username(&Username::parse("alice").unwrap())
            .await
            .unwrap()
            .expect("alice exists");

        assert_eq!(found.id, created.id);
        assert_eq!(found.username.as_str(), "alice");
        assert!(found.credential.password_hash().is_some());
    }

    #[tokio::test]
    async fn test_find_by_username_is_case_sensitive() {
        let pool = testing::pool().await;
        let repo = UserRepository::new(&pool);
        testing::seed_user(&pool, "alice").await;

        let found = repo
            .find_by_username(&Username::parse("Alice").unwrap())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let pool = testing::pool().await;
        let repo = UserRepository::new(&pool);
        testing::seed_user(&pool, "alice").await;

        let err = repo
            .create(&NewUser {
                username: Username::parse("alice").unwrap(),
                credential: Credential::Password {
                    hash: "$argon2id$other".to_owned(),
                },
                display_name: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_duplicate_google_subject_conflicts() {
        let pool = testing::pool().await;
        let repo = UserRepository::new(&pool);

        let external = |name: &str| NewUser {
            username: Username::parse(name).unwrap(),
            credential: Credential::External {
                subject: "10001".to_owned(),
            },
            display_name: None,
        };

        repo.create(&external("first_login")).await.unwrap();
        let err = repo.create(&external("second_login")).await.unwrap_err();

        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_find_by_google_subject() {
        let pool = testing::pool().await;
        let repo = UserRepository::new(&pool);

        let created = repo
            .create(&NewUser {
                username: Username::parse("extid_10002").unwrap(),
                credential: Credential::External {
                    subject: "10002".to_owned(),
                },
                display_name: Some("Ada".to_owned()),
            })
            .await
            .unwrap();

        let found = repo
            .find_by_google_subject("10002")
            .await
            .unwrap()
            .expect("linked user exists");
        assert_eq!(found.id, created.id);
        assert_eq!(found.display(), "Ada");
    }

    #[tokio::test]
    async fn test_update_credential() {
        let pool = testing::pool().await;
        let repo = UserRepository::new(&pool);
        let user = testing::seed_user(&pool, "alice").await;

        let updated = user.credential.clone().with_password("$argon2id$new".to_owned());
        repo.update_credential(user.id, &updated).await.unwrap();

        let reloaded = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.credential.password_hash(), Some("$argon2id$new"));
    }

    #[tokio::test]
    async fn test_backfill_display_name_only_when_unset() {
        let pool = testing::pool().await;
        let repo = UserRepository::new(&pool);
        let user = testing::seed_user(&pool, "alice").await;

        assert!(repo.backfill_display_name(user.id, "Alice L.").await.unwrap());
        // Second back-fill is a no-op: the name is already set.
        assert!(!repo.backfill_display_name(user.id, "Other").await.unwrap());

        let reloaded = repo.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.display(), "Alice L.");
    }
}
