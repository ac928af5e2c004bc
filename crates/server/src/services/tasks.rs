//! Ownership-scoped task operations.
//!
//! Every operation takes the resolved principal and only ever sees that
//! principal's tasks. "Doesn't exist" and "exists but belongs to someone
//! else" are the same `NotFound` to the caller, so nothing leaks across
//! accounts. Reorder is all-or-nothing: the whole id set is verified before
//! a single position changes.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use thiserror::Error;

use punchlist_core::{Priority, TaskId, TaskStatus, UserId};

use crate::db::RepositoryError;
use crate::db::tasks::TaskRepository;
use crate::models::task::Task;

/// Maximum title length in characters.
const MAX_TITLE_LENGTH: usize = 200;

/// Maximum description length in characters.
const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Errors that can occur during task operations.
#[derive(Debug, Error)]
pub enum TaskError {
    /// No task with that id is owned by the caller - absent and foreign
    /// tasks are deliberately indistinguishable.
    #[error("task not found")]
    NotFound,

    /// A reorder named a task the caller does not own (or named one twice);
    /// the whole operation was rejected.
    #[error("reorder rejected")]
    Forbidden,

    /// A field failed validation.
    #[error("{0}")]
    Validation(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Unvalidated fields for creating a task, as they arrive from a form.
#[derive(Debug, Default, Clone)]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub deadline: Option<String>,
}

/// Unvalidated partial update. `None` leaves a field unchanged; an empty
/// string clears the optional fields.
#[derive(Debug, Default, Clone)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub deadline: Option<String>,
}

/// Task service.
pub struct TaskService<'a> {
    tasks: TaskRepository<'a>,
}

impl<'a> TaskService<'a> {
    /// Create a new task service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            tasks: TaskRepository::new(pool),
        }
    }

    /// The principal's tasks, ordered by position (deadline breaks ties,
    /// undated last).
    ///
    /// # Errors
    ///
    /// Returns `TaskError::Repository` on store failures.
    pub async fn list(&self, principal: UserId) -> Result<Vec<Task>, TaskError> {
        Ok(self.tasks.list_for_owner(principal).await?)
    }

    /// Create a task owned by the principal, appended to the end of the
    /// list.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::Validation` when a field violates its
    /// constraints.
    pub async fn create(&self, principal: UserId, input: TaskInput) -> Result<Task, TaskError> {
        let title = validate_title(&input.title)?;
        let description = validate_description(input.description.as_deref())?;
        let priority = parse_priority(input.priority.as_deref())?;
        let deadline = parse_deadline(input.deadline.as_deref())?;

        Ok(self
            .tasks
            .insert(principal, &title, description.as_deref(), priority, deadline)
            .await?)
    }

    /// Apply a partial update to an owned task. Only the fields present in
    /// the patch change.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::NotFound` when the task is absent or foreign,
    /// `TaskError::Validation` when a patched field violates its
    /// constraints.
    pub async fn update_fields(
        &self,
        principal: UserId,
        task_id: TaskId,
        patch: TaskPatch,
    ) -> Result<Task, TaskError> {
        let current = self
            .tasks
            .find_owned(principal, task_id)
            .await?
            .ok_or(TaskError::NotFound)?;

        let title = match patch.title {
            Some(t) => validate_title(&t)?,
            None => current.title,
        };
        let description = match patch.description {
            Some(d) => validate_description(Some(&d))?,
            None => current.description,
        };
        let priority = match patch.priority.as_deref() {
            Some(p) if !p.is_empty() => parse_priority(Some(p))?,
            _ => current.priority,
        };
        let deadline = match patch.deadline {
            Some(d) => parse_deadline(Some(&d))?,
            None => current.deadline,
        };

        self.tasks
            .update_fields(
                principal,
                task_id,
                &title,
                description.as_deref(),
                priority,
                deadline,
            )
            .await?
            .ok_or(TaskError::NotFound)
    }

    /// Set the status of an owned task.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::Validation` for a status outside
    /// {pending, done}, `TaskError::NotFound` when the task is absent or
    /// foreign.
    pub async fn update_status(
        &self,
        principal: UserId,
        task_id: TaskId,
        status: &str,
    ) -> Result<Task, TaskError> {
        let status: TaskStatus = status.parse().map_err(TaskError::Validation)?;

        self.tasks
            .update_status(principal, task_id, status)
            .await?
            .ok_or(TaskError::NotFound)
    }

    /// Hard-delete an owned task.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::NotFound` when the task is absent or foreign.
    pub async fn delete(&self, principal: UserId, task_id: TaskId) -> Result<(), TaskError> {
        if self.tasks.delete(principal, task_id).await? {
            Ok(())
        } else {
            Err(TaskError::NotFound)
        }
    }

    /// Atomically reassign positions to match the given id sequence.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::Forbidden` - with no partial application - unless
    /// every id names a distinct task owned by the principal.
    pub async fn reorder(&self, principal: UserId, ids: &[TaskId]) -> Result<(), TaskError> {
        if self.tasks.reorder(principal, ids).await? {
            Ok(())
        } else {
            Err(TaskError::Forbidden)
        }
    }

    /// The principal's tasks with a deadline inside the given month,
    /// ordered by deadline then position.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::Validation` for an impossible year/month.
    pub async fn calendar_month(
        &self,
        principal: UserId,
        year: i32,
        month: u32,
    ) -> Result<Vec<Task>, TaskError> {
        let from = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| TaskError::Validation(format!("invalid month: {year}-{month}")))?;
        let until = next_month(from);

        Ok(self.tasks.deadlines_in_range(principal, from, until).await?)
    }
}

/// First day of the following month.
fn next_month(first_of_month: NaiveDate) -> NaiveDate {
    use chrono::Datelike;

    let (year, month) = if first_of_month.month() == 12 {
        (first_of_month.year() + 1, 1)
    } else {
        (first_of_month.year(), first_of_month.month() + 1)
    };
    // The first of a month always exists.
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(first_of_month)
}

fn validate_title(title: &str) -> Result<String, TaskError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(TaskError::Validation("title must not be empty".to_owned()));
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(TaskError::Validation(format!(
            "title must be at most {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_owned())
}

fn validate_description(description: Option<&str>) -> Result<Option<String>, TaskError> {
    let Some(raw) = description else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(TaskError::Validation(format!(
            "description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(Some(trimmed.to_owned()))
}

fn parse_priority(priority: Option<&str>) -> Result<Priority, TaskError> {
    match priority {
        None | Some("") => Ok(Priority::default()),
        Some(raw) => raw.parse().map_err(TaskError::Validation),
    }
}

fn parse_deadline(deadline: Option<&str>) -> Result<Option<NaiveDate>, TaskError> {
    match deadline {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                TaskError::Validation("deadline must be a date in YYYY-MM-DD format".to_owned())
            }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::db::testing;

    use super::*;

    fn input(title: &str) -> TaskInput {
        TaskInput {
            title: title.to_owned(),
            ..TaskInput::default()
        }
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let service = TaskService::new(&pool);

        let task = service.create(alice.id, input("Buy milk")).await.unwrap();

        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.owner_id, alice.id);
        assert_eq!(task.order_index, 0);
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.description.is_none());
        assert!(task.deadline.is_none());
    }

    #[tokio::test]
    async fn test_create_parses_fields() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let service = TaskService::new(&pool);

        let task = service
            .create(
                alice.id,
                TaskInput {
                    title: "  Ship release  ".to_owned(),
                    description: Some("cut the tag, publish notes".to_owned()),
                    priority: Some("high".to_owned()),
                    deadline: Some("2026-09-30".to_owned()),
                },
            )
            .await
            .unwrap();

        assert_eq!(task.title, "Ship release");
        assert_eq!(task.priority, Priority::High);
        assert_eq!(
            task.deadline,
            NaiveDate::from_ymd_opt(2026, 9, 30)
        );
    }

    #[tokio::test]
    async fn test_create_validation() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let service = TaskService::new(&pool);

        let cases = [
            TaskInput {
                title: "   ".to_owned(),
                ..TaskInput::default()
            },
            TaskInput {
                title: "x".repeat(201),
                ..TaskInput::default()
            },
            TaskInput {
                title: "ok".to_owned(),
                description: Some("d".repeat(2001)),
                ..TaskInput::default()
            },
            TaskInput {
                title: "ok".to_owned(),
                priority: Some("urgent".to_owned()),
                ..TaskInput::default()
            },
            TaskInput {
                title: "ok".to_owned(),
                deadline: Some("30/09/2026".to_owned()),
                ..TaskInput::default()
            },
        ];

        for case in cases {
            let err = service.create(alice.id, case).await.unwrap_err();
            assert!(matches!(err, TaskError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn test_update_fields_is_partial() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let service = TaskService::new(&pool);

        let task = service
            .create(
                alice.id,
                TaskInput {
                    title: "Original".to_owned(),
                    description: Some("keep me".to_owned()),
                    priority: Some("high".to_owned()),
                    deadline: Some("2026-09-30".to_owned()),
                },
            )
            .await
            .unwrap();

        let updated = service
            .update_fields(
                alice.id,
                task.id,
                TaskPatch {
                    title: Some("Renamed".to_owned()),
                    ..TaskPatch::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description.as_deref(), Some("keep me"));
        assert_eq!(updated.priority, Priority::High);
        assert_eq!(updated.deadline, NaiveDate::from_ymd_opt(2026, 9, 30));
    }

    #[tokio::test]
    async fn test_update_fields_clears_with_empty_strings() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let service = TaskService::new(&pool);

        let task = service
            .create(
                alice.id,
                TaskInput {
                    title: "t".to_owned(),
                    description: Some("old".to_owned()),
                    deadline: Some("2026-09-30".to_owned()),
                    ..TaskInput::default()
                },
            )
            .await
            .unwrap();

        let updated = service
            .update_fields(
                alice.id,
                task.id,
                TaskPatch {
                    description: Some(String::new()),
                    deadline: Some(String::new()),
                    ..TaskPatch::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.description.is_none());
        assert!(updated.deadline.is_none());
    }

    #[tokio::test]
    async fn test_cross_owner_operations_yield_not_found() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let bob = testing::seed_user(&pool, "bob").await;
        let service = TaskService::new(&pool);

        let task = service.create(alice.id, input("private")).await.unwrap();

        assert!(service.list(bob.id).await.unwrap().is_empty());
        assert!(matches!(
            service
                .update_fields(bob.id, task.id, TaskPatch::default())
                .await
                .unwrap_err(),
            TaskError::NotFound
        ));
        assert!(matches!(
            service
                .update_status(bob.id, task.id, "done")
                .await
                .unwrap_err(),
            TaskError::NotFound
        ));
        assert!(matches!(
            service.delete(bob.id, task.id).await.unwrap_err(),
            TaskError::NotFound
        ));

        // Alice still sees her task, untouched.
        let mine = service.list(alice.id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine.first().map(|t| t.status), Some(TaskStatus::Pending));
    }

    #[tokio::test]
    async fn test_status_toggle_roundtrip_leaves_fields_unchanged() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let service = TaskService::new(&pool);

        let task = service
            .create(
                alice.id,
                TaskInput {
                    title: "Water plants".to_owned(),
                    description: Some("the big one too".to_owned()),
                    priority: Some("low".to_owned()),
                    deadline: Some("2026-09-01".to_owned()),
                },
            )
            .await
            .unwrap();

        let done = service
            .update_status(alice.id, task.id, "done")
            .await
            .unwrap();
        assert_eq!(done.status, TaskStatus::Done);

        let back = service
            .update_status(alice.id, task.id, "pending")
            .await
            .unwrap();
        assert_eq!(back.status, TaskStatus::Pending);
        assert_eq!(back.title, task.title);
        assert_eq!(back.description, task.description);
        assert_eq!(back.priority, task.priority);
        assert_eq!(back.deadline, task.deadline);
        assert_eq!(back.order_index, task.order_index);
    }

    #[tokio::test]
    async fn test_update_status_rejects_unknown_status() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let service = TaskService::new(&pool);
        let task = service.create(alice.id, input("t")).await.unwrap();

        let err = service
            .update_status(alice.id, task.id, "archived")
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Validation(_)));
    }

    #[tokio::test]
    async fn test_reorder_applies_and_list_follows() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let service = TaskService::new(&pool);

        let a = service.create(alice.id, input("A")).await.unwrap();
        let b = service.create(alice.id, input("B")).await.unwrap();
        let c = service.create(alice.id, input("C")).await.unwrap();

        service.reorder(alice.id, &[c.id, a.id, b.id]).await.unwrap();

        let listed: Vec<(String, i64)> = service
            .list(alice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| (t.title, t.order_index))
            .collect();
        assert_eq!(
            listed,
            [
                ("C".to_owned(), 0),
                ("A".to_owned(), 1),
                ("B".to_owned(), 2)
            ]
        );
    }

    #[tokio::test]
    async fn test_reorder_with_foreign_id_is_forbidden_and_atomic() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let bob = testing::seed_user(&pool, "bob").await;
        let service = TaskService::new(&pool);

        let a = service.create(alice.id, input("A")).await.unwrap();
        let b = service.create(alice.id, input("B")).await.unwrap();
        let foreign = service.create(bob.id, input("F")).await.unwrap();

        let err = service
            .reorder(alice.id, &[b.id, foreign.id, a.id])
            .await
            .unwrap_err();
        assert!(matches!(err, TaskError::Forbidden));

        // No partial reorder happened.
        let orders: Vec<i64> = service
            .list(alice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.order_index)
            .collect();
        assert_eq!(orders, [0, 1]);
    }

    #[tokio::test]
    async fn test_calendar_month_filters_and_orders() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let service = TaskService::new(&pool);

        for (title, deadline) in [
            ("late", Some("2026-09-20")),
            ("early", Some("2026-09-02")),
            ("other_month", Some("2026-10-02")),
            ("undated", None),
        ] {
            service
                .create(
                    alice.id,
                    TaskInput {
                        title: title.to_owned(),
                        deadline: deadline.map(str::to_owned),
                        ..TaskInput::default()
                    },
                )
                .await
                .unwrap();
        }

        let titles: Vec<String> = service
            .calendar_month(alice.id, 2026, 9)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["early", "late"]);

        assert!(matches!(
            service.calendar_month(alice.id, 2026, 13).await.unwrap_err(),
            TaskError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn test_december_calendar_wraps_year() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let service = TaskService::new(&pool);

        service
            .create(
                alice.id,
                TaskInput {
                    title: "nye".to_owned(),
                    deadline: Some("2026-12-31".to_owned()),
                    ..TaskInput::default()
                },
            )
            .await
            .unwrap();

        let december = service.calendar_month(alice.id, 2026, 12).await.unwrap();
        assert_eq!(december.len(), 1);
        let january = service.calendar_month(alice.id, 2027, 1).await.unwrap();
        assert!(january.is_empty());
    }
}
