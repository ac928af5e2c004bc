//! Google OAuth route handlers.
//!
//! Handles the OAuth flow for Google sign-in:
//! - Login: sets the CSRF state cookie and redirects to Google's consent
//!   screen
//! - Callback: checks the state, exchanges the code, fetches the profile and
//!   hands it to the auth service
//!
//! OAuth failures redirect back to the login form with an error code rather
//! than surfacing as server errors; the user can simply retry.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use serde::Deserialize;
use tower_cookies::cookie::SameSite;
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies};

use crate::db::sessions::SessionRepository;
use crate::middleware::set_session_cookie;
use crate::services::auth::AuthService;
use crate::state::AppState;

/// Cookie holding the one-time OAuth state value.
const OAUTH_STATE_COOKIE: &str = "pl_oauth_state";

/// How long the state cookie stays valid.
const OAUTH_STATE_TTL_MINUTES: i64 = 10;

/// Query parameters from the Google OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for tokens.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

/// Generate a cryptographically secure random string.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            char::from(CHARSET.get(idx).copied().unwrap_or(b'A'))
        })
        .collect()
}

fn state_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((OAUTH_STATE_COOKIE, value))
        .path("/auth/google")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::minutes(OAUTH_STATE_TTL_MINUTES))
        .build()
}

/// Initiate Google OAuth login.
///
/// # Route
///
/// `GET /auth/google/login`
pub async fn login(State(state): State<AppState>, cookies: Cookies) -> Response {
    let Some(google) = state.google() else {
        return Redirect::to("/auth/login?error=google_unconfigured").into_response();
    };

    // One-time CSRF state, checked on callback
    let oauth_state = generate_random_string(32);
    cookies.add(state_cookie(
        oauth_state.clone(),
        state.config().cookies_secure(),
    ));

    let redirect_uri = format!("{}/auth/google/callback", state.config().base_url);
    let auth_url = google.authorization_url(&redirect_uri, &oauth_state);

    Redirect::to(&auth_url).into_response()
}

/// Handle the Google OAuth callback.
///
/// Validates the state parameter, exchanges the authorization code, fetches
/// the verified profile and signs the user in (creating the account on
/// first sign-in).
///
/// # Route
///
/// `GET /auth/google/callback`
pub async fn callback(
    State(app): State<AppState>,
    cookies: Cookies,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(google) = app.google() else {
        return Redirect::to("/auth/login?error=google_unconfigured").into_response();
    };

    // Check for OAuth errors from Google
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!("Google OAuth error: {} - {}", error, description);
        return Redirect::to("/auth/login?error=google_denied").into_response();
    }

    // Verify we have an authorization code
    let Some(code) = query.code else {
        tracing::warn!("Google OAuth callback missing code");
        return Redirect::to("/auth/login?error=missing_code").into_response();
    };

    // Verify state parameter (CSRF protection)
    let Some(returned_state) = query.state else {
        tracing::warn!("Google OAuth callback missing state");
        return Redirect::to("/auth/login?error=missing_state").into_response();
    };

    let stored_state = cookies
        .get(OAUTH_STATE_COOKIE)
        .map(|c| c.value().to_owned());

    if stored_state.as_deref() != Some(returned_state.as_str()) {
        tracing::warn!("Google OAuth state mismatch");
        return Redirect::to("/auth/login?error=invalid_state").into_response();
    }

    // Clear the stored state (one-time use)
    cookies.remove(state_cookie(String::new(), app.config().cookies_secure()));

    // Redirect URI must match the one used in the authorization request
    let redirect_uri = format!("{}/auth/google/callback", app.config().base_url);

    // Exchange the code and fetch the verified profile
    let profile = match google.fetch_profile(&code, &redirect_uri).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!("Google OAuth exchange failed: {}", e);
            return Redirect::to("/auth/login?error=token_exchange").into_response();
        }
    };

    // Resolve (or create) the account and bind a session
    let user = match AuthService::new(app.pool()).login_external(&profile).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!("Google sign-in rejected: {}", e);
            return Redirect::to("/auth/login?error=google_failed").into_response();
        }
    };

    let session = match SessionRepository::new(app.pool()).create(user.id).await {
        Ok(session) => session,
        Err(e) => {
            tracing::error!("Failed to create session: {}", e);
            return Redirect::to("/auth/login?error=google_failed").into_response();
        }
    };

    set_session_cookie(&cookies, &session.token, app.config().cookies_secure());
    tracing::info!(user = %user.username, "google sign-in succeeded");

    Redirect::to("/tasks").into_response()
}
