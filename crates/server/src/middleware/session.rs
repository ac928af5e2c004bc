//! Session cookie helpers.
//!
//! The cookie carries only the opaque session token; everything else lives
//! in the store. HttpOnly keeps it away from scripts, SameSite=Lax from
//! cross-site posts, and Secure is set whenever the configured base URL is
//! https.

use tower_cookies::cookie::SameSite;
use tower_cookies::cookie::time::Duration;
use tower_cookies::{Cookie, Cookies};

use crate::db::sessions::SESSION_TTL_HOURS;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "pl_session";

/// Attach the session token to the response.
///
/// The cookie's max-age matches the server-side expiry; the store remains
/// authoritative either way.
pub fn set_session_cookie(cookies: &Cookies, token: &str, secure: bool) {
    let cookie = Cookie::build((SESSION_COOKIE_NAME, token.to_owned()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::hours(SESSION_TTL_HOURS))
        .build();
    cookies.add(cookie);
}

/// Expire the session cookie on the client.
pub fn clear_session_cookie(cookies: &Cookies, secure: bool) {
    let cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::ZERO)
        .build();
    cookies.add(cookie);
}
