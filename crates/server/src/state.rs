//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::ServerConfig;
use crate::services::google::GoogleClient;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to shared
/// resources like the database pool and configuration. There is no ambient
/// global state anywhere in the application - everything a handler needs
/// flows through here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: SqlitePool,
    google: Option<GoogleClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The Google client is only constructed when OAuth credentials are
    /// configured; routes consult [`Self::google`] to decide whether the
    /// sign-in option exists.
    #[must_use]
    pub fn new(config: ServerConfig, pool: SqlitePool) -> Self {
        let google = config.google.as_ref().map(GoogleClient::new);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                google,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get the Google OAuth client, when configured.
    #[must_use]
    pub fn google(&self) -> Option<&GoogleClient> {
        self.inner.google.as_ref()
    }
}
