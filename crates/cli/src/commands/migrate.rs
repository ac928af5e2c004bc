//! Database migration command.
//!
//! Applies the server's embedded migrations. The server never migrates on
//! startup; this command is the one place schema changes happen.

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error when the database is unreachable or a migration fails.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let pool = super::connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;
    tracing::info!("Migrations complete");

    Ok(())
}
