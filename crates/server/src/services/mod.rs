//! Domain services.
//!
//! Services sit between the HTTP routes and the repositories: they own
//! validation and the business rules, and they are where the error taxonomy
//! of the application lives.

pub mod auth;
pub mod google;
pub mod tasks;
