//! Authentication service.
//!
//! Decides, per attempt, who the caller is: local registration and login
//! against Argon2id password hashes, and external-identity login from a
//! verified Google profile. Registration and login are strictly separate
//! operations - registering an existing username always fails, it never
//! degrades into a login.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;

use punchlist_core::{Credential, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::user::{NewUser, User};

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (bounds Argon2 input).
const MAX_PASSWORD_LENGTH: usize = 128;

/// A verified profile from the external identity provider.
///
/// How it was obtained (code exchange, userinfo fetch) is the Google
/// client's business; by the time it reaches this service it is trusted.
#[derive(Debug, Clone)]
pub struct ExternalProfile {
    /// The provider's stable subject id.
    pub subject: String,
    /// Verified email address, when the provider shares it.
    pub email: Option<String>,
    /// Human-readable name, when the provider shares it.
    pub name: Option<String>,
}

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new local account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` or `AuthError::WeakPassword` on
    /// policy violations, and `AuthError::UsernameTaken` when the username
    /// exists - regardless of the submitted password.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        validate_password(password)?;

        if self.users.find_by_username(&username).await?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        let hash = hash_password(password)?;
        let user = self
            .users
            .create(&NewUser {
                username,
                credential: Credential::Password { hash },
                display_name: None,
            })
            .await
            .map_err(|e| match e {
                // Lost the race against a concurrent registration.
                RepositoryError::Conflict(_) => AuthError::UsernameTaken,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Login with username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown username or a
    /// wrong password (indistinguishable), and `AuthError::WrongAuthMethod`
    /// for an account that only has an external identity.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        // A name that cannot pass validation cannot name an account.
        let username = Username::parse(username).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .users
            .find_by_username(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let Some(hash) = user.credential.password_hash() else {
            return Err(AuthError::WrongAuthMethod);
        };

        verify_password(password, hash)?;

        Ok(user)
    }

    /// Login from a verified external-identity profile.
    ///
    /// First sign-in creates the account (no password credential, subject
    /// linked, display name from the profile when present). Later sign-ins
    /// back-fill the display name only while it is unset. This path never
    /// touches an existing password credential.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::DuplicateExternalRef` when account creation
    /// collides with an existing linkage, `AuthError::Repository` on store
    /// failures.
    pub async fn login_external(&self, profile: &ExternalProfile) -> Result<User, AuthError> {
        if let Some(user) = self.users.find_by_google_subject(&profile.subject).await? {
            if user.display_name.is_none()
                && let Some(name) = &profile.name
                && self.users.backfill_display_name(user.id, name).await?
            {
                return self
                    .users
                    .find_by_id(user.id)
                    .await?
                    .ok_or(AuthError::UserNotFound);
            }
            return Ok(user);
        }

        let username = external_username(&profile.subject)?;
        let user = self
            .users
            .create(&NewUser {
                username,
                credential: Credential::External {
                    subject: profile.subject.clone(),
                },
                display_name: profile.name.clone(),
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::DuplicateExternalRef,
                other => AuthError::Repository(other),
            })?;

        Ok(user)
    }

    /// Set (or replace) an account's password, preserving any external
    /// linkage. Used by the CLI.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` for an unknown username,
    /// `AuthError::WeakPassword` on policy violations.
    pub async fn set_password(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let username = Username::parse(username)?;
        validate_password(password)?;

        let user = self
            .users
            .find_by_username(&username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let credential = user.credential.clone().with_password(hash_password(password)?);
        self.users.update_credential(user.id, &credential).await?;

        Ok(())
    }
}

/// The deterministic identifier for accounts created by external sign-in:
/// `extid_<subject>`, restricted to the username alphabet and truncated to
/// the maximum length.
fn external_username(subject: &str) -> Result<Username, AuthError> {
    const PREFIX: &str = "extid_";
    let mut name = String::with_capacity(Username::MAX_LENGTH);
    name.push_str(PREFIX);
    name.extend(
        subject
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .take(Username::MAX_LENGTH - PREFIX.len()),
    );
    Ok(Username::parse(&name)?)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
