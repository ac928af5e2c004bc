//! Core types for Punchlist.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod credential;
pub mod id;
pub mod task;
pub mod username;

pub use credential::Credential;
pub use id::*;
pub use task::{Priority, TaskStatus};
pub use username::{Username, UsernameError};
