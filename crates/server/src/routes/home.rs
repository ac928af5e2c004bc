//! Home route.

use axum::response::Redirect;

use crate::middleware::OptionalAuth;

/// Send authenticated users to their task list, everyone else to login.
pub async fn home(OptionalAuth(user): OptionalAuth) -> Redirect {
    if user.is_some() {
        Redirect::to("/tasks")
    } else {
        Redirect::to("/auth/login")
    }
}
