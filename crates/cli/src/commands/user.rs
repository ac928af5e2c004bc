//! User management commands.

use punchlist_server::db::users::UserRepository;
use punchlist_server::services::auth::AuthService;

/// Create a local-password user, optionally with a display name.
///
/// # Errors
///
/// Returns an error for policy violations (username/password rules), a
/// taken username, or database failures.
pub async fn create(
    username: &str,
    password: &str,
    display_name: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    let user = AuthService::new(&pool).register(username, password).await?;
    if let Some(name) = display_name {
        UserRepository::new(&pool)
            .backfill_display_name(user.id, name)
            .await?;
    }

    tracing::info!(user = %user.username, id = %user.id, "user created");
    Ok(())
}

/// Set (or reset) a user's password.
///
/// # Errors
///
/// Returns an error for an unknown user, policy violations, or database
/// failures.
pub async fn set_password(username: &str, password: &str) -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    AuthService::new(&pool).set_password(username, password).await?;

    tracing::info!(user = username, "password updated");
    Ok(())
}
