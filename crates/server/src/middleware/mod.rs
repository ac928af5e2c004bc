//! Request middleware: session cookie transport and auth extractors.

pub mod auth;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth};
pub use session::{SESSION_COOKIE_NAME, clear_session_cookie, set_session_cookie};
