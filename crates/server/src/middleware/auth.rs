//! Authentication extractors.
//!
//! Provides extractors for requiring a resolved principal in route
//! handlers. The session cookie is resolved against the session store on
//! every request; there is no in-process session state.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_cookies::Cookies;

use crate::db::sessions::SessionRepository;
use crate::models::session::CurrentUser;
use crate::state::AppState;

use super::session::SESSION_COOKIE_NAME;

/// Extractor that requires an authenticated principal.
///
/// If no valid session is attached, browsers are redirected to the login
/// page and API requests get 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(user): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.display())
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but absent.
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match resolve_from_parts(parts, state).await {
            Some(user) => Ok(Self(user)),
            None => {
                let is_api = parts.uri.path().starts_with("/api/");
                if is_api {
                    Err(AuthRejection::Unauthorized)
                } else {
                    Err(AuthRejection::RedirectToLogin)
                }
            }
        }
    }
}

/// Extractor that optionally resolves the current principal.
///
/// Unlike `RequireAuth`, this does not reject anonymous requests.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_from_parts(parts, state).await))
    }
}

/// Resolve the session cookie to a principal, failing softly.
///
/// Store errors during resolution read as "no session" - the user is sent
/// through login rather than shown a 500.
async fn resolve_from_parts(parts: &Parts, state: &AppState) -> Option<CurrentUser> {
    // CookieManagerLayer stores the jar in request extensions.
    let cookies = parts.extensions.get::<Cookies>()?;
    let token = cookies.get(SESSION_COOKIE_NAME)?.value().to_owned();

    SessionRepository::new(state.pool())
        .resolve(&token)
        .await
        .ok()
        .flatten()
        .map(|user| user.to_current())
}
