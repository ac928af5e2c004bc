//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Redirect to /tasks (or login)
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Google OAuth
//! GET  /auth/google/login      - Redirect to Google consent screen
//! GET  /auth/google/callback   - Handle OAuth callback
//!
//! # Tasks (requires auth)
//! GET  /tasks                  - Task list, ordered
//! POST /tasks                  - Create task
//! POST /tasks/{id}/update      - Partial field update
//! POST /tasks/{id}/status      - Status change (pending|done)
//! POST /tasks/{id}/delete      - Hard delete
//! POST /api/tasks/reorder      - Atomic reorder (JSON)
//!
//! # Calendar (requires auth)
//! GET  /calendar               - Current month
//! GET  /calendar/{year}/{month} - Specific month
//! ```

pub mod auth;
pub mod calendar;
pub mod google_auth;
pub mod home;
pub mod tasks;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        // Google OAuth
        .route("/google/login", get(google_auth::login))
        .route("/google/callback", get(google_auth::callback))
}

/// Create the task routes router.
pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list).post(tasks::create))
        .route("/{id}/update", post(tasks::update))
        .route("/{id}/status", post(tasks::update_status))
        .route("/{id}/delete", post(tasks::delete))
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new().route("/tasks/reorder", post(tasks::reorder))
}

/// Create the calendar routes router.
pub fn calendar_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(calendar::current_month))
        .route("/{year}/{month}", get(calendar::month))
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home redirect
        .route("/", get(home::home))
        // Task routes
        .nest("/tasks", task_routes())
        // Calendar routes
        .nest("/calendar", calendar_routes())
        // Auth routes
        .nest("/auth", auth_routes())
        // JSON API (drag-and-drop reorder)
        .nest("/api", api_routes())
}
