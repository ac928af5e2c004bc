//! CLI command implementations.

pub mod migrate;
pub mod sessions;
pub mod user;

use sqlx::SqlitePool;

use punchlist_server::config::ServerConfig;
use punchlist_server::db;

/// Connect to the configured database, the same way the server does.
pub(crate) async fn connect() -> Result<SqlitePool, Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    Ok(pool)
}
