//! Session maintenance commands.

use punchlist_server::db::sessions::SessionRepository;

/// Delete expired sessions.
///
/// Expired rows are already invisible to resolution; this reclaims the
/// space.
///
/// # Errors
///
/// Returns an error on database failures.
pub async fn purge() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    let removed = SessionRepository::new(&pool).purge_expired().await?;
    tracing::info!(removed, "expired sessions purged");

    Ok(())
}
