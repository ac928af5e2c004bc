//! Authentication route handlers.
//!
//! Handles login, registration and logout. Failures that the user can fix
//! redirect back to the form with a short error code in the query string;
//! the page handler turns the code into a message. Server faults propagate
//! as `AppError`.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_cookies::Cookies;

use crate::db::sessions::SessionRepository;
use crate::error::AppError;
use crate::middleware::{SESSION_COOKIE_NAME, clear_session_cookie, set_session_cookie};
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
    pub google_enabled: bool,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
}

/// Turn a redirect error code into the message shown on the form.
fn error_message(code: &str) -> String {
    match code {
        "invalid" => "Invalid username or password.",
        "google" => "This account signs in with Google.",
        "mismatch" => "Passwords do not match.",
        "taken" => "That username is already taken.",
        "username" => "Usernames are 3-30 letters, digits or underscores.",
        "password" => "Passwords must be 8-128 characters.",
        "google_denied" => "Google sign-in was cancelled.",
        "google_unconfigured" => "Google sign-in is not configured on this server.",
        "missing_code" | "missing_state" | "invalid_state" | "token_exchange" | "google_failed" => {
            "Google sign-in failed, please try again."
        }
        _ => "Something went wrong, please try again.",
    }
    .to_owned()
}

/// Turn a redirect success code into the message shown on the form.
fn success_message(code: &str) -> String {
    match code {
        "logged_out" => "Signed out.",
        _ => "Done.",
    }
    .to_owned()
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        error: query.error.as_deref().map(error_message),
        success: query.success.as_deref().map(success_message),
        google_enabled: state.google().is_some(),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let auth = AuthService::new(state.pool());

    match auth.login(&form.username, &form.password).await {
        Ok(user) => {
            let session = SessionRepository::new(state.pool()).create(user.id).await?;
            set_session_cookie(&cookies, &session.token, state.config().cookies_secure());
            tracing::info!(user = %user.username, "user logged in");
            Ok(Redirect::to("/tasks").into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            Ok(Redirect::to("/auth/login?error=invalid").into_response())
        }
        Err(AuthError::WrongAuthMethod) => {
            Ok(Redirect::to("/auth/login?error=google").into_response())
        }
        Err(other) => Err(other.into()),
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        error: query.error.as_deref().map(error_message),
    }
}

/// Handle registration form submission.
///
/// Registration never degrades into a login: an existing username is
/// rejected no matter what password was submitted. A fresh account does get
/// a session straight away, so the new user lands on their (empty) list.
pub async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if form.password != form.password_confirm {
        return Ok(Redirect::to("/auth/register?error=mismatch").into_response());
    }

    let auth = AuthService::new(state.pool());

    match auth.register(&form.username, &form.password).await {
        Ok(user) => {
            let session = SessionRepository::new(state.pool()).create(user.id).await?;
            set_session_cookie(&cookies, &session.token, state.config().cookies_secure());
            tracing::info!(user = %user.username, "user registered");
            Ok(Redirect::to("/tasks").into_response())
        }
        Err(AuthError::UsernameTaken) => {
            Ok(Redirect::to("/auth/register?error=taken").into_response())
        }
        Err(AuthError::InvalidUsername(_)) => {
            Ok(Redirect::to("/auth/register?error=username").into_response())
        }
        Err(AuthError::WeakPassword(_)) => {
            Ok(Redirect::to("/auth/register?error=password").into_response())
        }
        Err(other) => Err(other.into()),
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Destroy the current session and clear the cookie.
pub async fn logout(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Redirect, AppError> {
    if let Some(cookie) = cookies.get(SESSION_COOKIE_NAME) {
        SessionRepository::new(state.pool())
            .destroy(cookie.value())
            .await?;
    }
    clear_session_cookie(&cookies, state.config().cookies_secure());

    Ok(Redirect::to("/auth/login?success=logged_out"))
}
