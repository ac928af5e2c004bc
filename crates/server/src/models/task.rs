//! Task domain type.

use chrono::{DateTime, NaiveDate, Utc};

use punchlist_core::{Priority, TaskId, TaskStatus, UserId};

/// A task (domain type).
///
/// Every task belongs to exactly one owner; repositories only ever read or
/// mutate tasks through the owner's id.
#[derive(Debug, Clone)]
pub struct Task {
    /// Unique task ID.
    pub id: TaskId,
    /// Owning account; immutable after creation.
    pub owner_id: UserId,
    /// Short summary, 1-200 characters.
    pub title: String,
    /// Optional detail text, up to 2000 characters.
    pub description: Option<String>,
    /// Low, medium or high.
    pub priority: Priority,
    /// Pending or done.
    pub status: TaskStatus,
    /// Optional due date.
    pub deadline: Option<NaiveDate>,
    /// Position within the owner's list.
    pub order_index: i64,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was last updated.
    pub updated_at: DateTime<Utc>,
}
