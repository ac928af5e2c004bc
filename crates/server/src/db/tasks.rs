//! Task repository for database operations.
//!
//! Every query filters on the owner's id; a task is never visible to or
//! mutable by anyone but its owner. The reorder operation verifies the whole
//! id set before touching a single row.

use chrono::{NaiveDate, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use punchlist_core::{Priority, TaskId, TaskStatus, UserId};

use super::RepositoryError;
use crate::models::task::Task;

const TASK_COLUMNS: &str = "id, owner_id, title, description, priority, status, deadline, \
                            order_index, created_at, updated_at";

/// Repository for task database operations.
pub struct TaskRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TaskRepository<'a> {
    /// Create a new task repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// All tasks owned by `owner`, sorted by position, ties broken by
    /// deadline with undated tasks last.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn list_for_owner(&self, owner: UserId) -> Result<Vec<Task>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE owner_id = ?1
             ORDER BY order_index ASC, deadline IS NULL ASC, deadline ASC"
        ))
        .bind(owner.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(row_to_task).collect()
    }

    /// A single task, if it exists and is owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn find_owned(
        &self,
        owner: UserId,
        id: TaskId,
    ) -> Result<Option<Task>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1 AND owner_id = ?2"
        ))
        .bind(id.as_i64())
        .bind(owner.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(row_to_task).transpose()
    }

    /// Insert a task at the end of the owner's list.
    ///
    /// The position is `max(order_index) + 1` over the owner's tasks (0 for
    /// an empty list), computed inside the same transaction as the insert.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(
        &self,
        owner: UserId,
        title: &str,
        description: Option<&str>,
        priority: Priority,
        deadline: Option<NaiveDate>,
    ) -> Result<Task, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let next_index: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(order_index) + 1, 0) FROM tasks WHERE owner_id = ?1",
        )
        .bind(owner.as_i64())
        .fetch_one(&mut *tx)
        .await?;

        let now = Utc::now();
        let row = sqlx::query(&format!(
            "INSERT INTO tasks (owner_id, title, description, priority, status, deadline, order_index, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(owner.as_i64())
        .bind(title)
        .bind(description)
        .bind(priority.as_str())
        .bind(TaskStatus::Pending.as_str())
        .bind(deadline)
        .bind(next_index)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        row_to_task(&row)
    }

    /// Overwrite the mutable fields of an owned task.
    ///
    /// Returns `None` when no task with that id is owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_fields(
        &self,
        owner: UserId,
        id: TaskId,
        title: &str,
        description: Option<&str>,
        priority: Priority,
        deadline: Option<NaiveDate>,
    ) -> Result<Option<Task>, RepositoryError> {
        let row = sqlx::query(&format!(
            "UPDATE tasks
             SET title = ?1, description = ?2, priority = ?3, deadline = ?4, updated_at = ?5
             WHERE id = ?6 AND owner_id = ?7
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(title)
        .bind(description)
        .bind(priority.as_str())
        .bind(deadline)
        .bind(Utc::now())
        .bind(id.as_i64())
        .bind(owner.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(row_to_task).transpose()
    }

    /// Set the status of an owned task.
    ///
    /// Returns `None` when no task with that id is owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_status(
        &self,
        owner: UserId,
        id: TaskId,
        status: TaskStatus,
    ) -> Result<Option<Task>, RepositoryError> {
        let row = sqlx::query(&format!(
            "UPDATE tasks SET status = ?1, updated_at = ?2
             WHERE id = ?3 AND owner_id = ?4
             RETURNING {TASK_COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id.as_i64())
        .bind(owner.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.as_ref().map(row_to_task).transpose()
    }

    /// Hard-delete an owned task. Returns `false` when no task with that id
    /// is owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, owner: UserId, id: TaskId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1 AND owner_id = ?2")
            .bind(id.as_i64())
            .bind(owner.as_i64())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Reassign `order_index = position` for the given id sequence,
    /// all-or-nothing.
    ///
    /// Returns `false` without mutating anything unless every id in the list
    /// names a distinct task owned by `owner` - the owned-row count must
    /// equal the input length, which also rejects duplicates and unknown
    /// ids.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a statement fails; the
    /// transaction rolls back.
    pub async fn reorder(&self, owner: UserId, ids: &[TaskId]) -> Result<bool, RepositoryError> {
        if ids.is_empty() {
            return Ok(true);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let count_sql =
            format!("SELECT COUNT(*) FROM tasks WHERE owner_id = ? AND id IN ({placeholders})");

        let mut tx = self.pool.begin().await?;

        let mut count_query = sqlx::query_scalar(&count_sql).bind(owner.as_i64());
        for id in ids {
            count_query = count_query.bind(id.as_i64());
        }
        let matched: i64 = count_query.fetch_one(&mut *tx).await?;

        if matched != i64::try_from(ids.len()).unwrap_or(i64::MAX) {
            tx.rollback().await?;
            return Ok(false);
        }

        let now = Utc::now();
        for (position, id) in ids.iter().enumerate() {
            sqlx::query(
                "UPDATE tasks SET order_index = ?1, updated_at = ?2 WHERE id = ?3 AND owner_id = ?4",
            )
            .bind(i64::try_from(position).unwrap_or(i64::MAX))
            .bind(now)
            .bind(id.as_i64())
            .bind(owner.as_i64())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    /// Owned tasks whose deadline falls in `[from, until)`, ordered by
    /// deadline then position.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails, or
    /// `RepositoryError::DataCorruption` if a stored row is invalid.
    pub async fn deadlines_in_range(
        &self,
        owner: UserId,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<Task>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks
             WHERE owner_id = ?1 AND deadline IS NOT NULL AND deadline >= ?2 AND deadline < ?3
             ORDER BY deadline ASC, order_index ASC"
        ))
        .bind(owner.as_i64())
        .bind(from)
        .bind(until)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(row_to_task).collect()
    }
}

/// Convert a `tasks` row into the domain type.
fn row_to_task(row: &SqliteRow) -> Result<Task, RepositoryError> {
    let priority_raw: String = row.try_get("priority")?;
    let priority: Priority = priority_raw.parse().map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid priority in database: {e}"))
    })?;

    let status_raw: String = row.try_get("status")?;
    let status: TaskStatus = status_raw
        .parse()
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid status in database: {e}")))?;

    Ok(Task {
        id: TaskId::new(row.try_get("id")?),
        owner_id: UserId::new(row.try_get("owner_id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        priority,
        status,
        deadline: row.try_get("deadline")?,
        order_index: row.try_get("order_index")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::db::testing;

    use super::*;

    async fn insert_simple(repo: &TaskRepository<'_>, owner: UserId, title: &str) -> Task {
        repo.insert(owner, title, None, Priority::Medium, None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_insert_appends() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let repo = TaskRepository::new(&pool);

        let first = insert_simple(&repo, alice.id, "a").await;
        let second = insert_simple(&repo, alice.id, "b").await;
        let third = insert_simple(&repo, alice.id, "c").await;

        assert_eq!(first.order_index, 0);
        assert_eq!(second.order_index, 1);
        assert_eq!(third.order_index, 2);
        assert_eq!(first.status, TaskStatus::Pending);
        assert_eq!(first.priority, Priority::Medium);
    }

    #[tokio::test]
    async fn test_list_tie_break_on_deadline_with_undated_last() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let repo = TaskRepository::new(&pool);

        let date = |d: u32| NaiveDate::from_ymd_opt(2026, 9, d).unwrap();
        repo.insert(alice.id, "undated", None, Priority::Medium, None)
            .await
            .unwrap();
        repo.insert(alice.id, "later", None, Priority::Medium, Some(date(20)))
            .await
            .unwrap();
        repo.insert(alice.id, "sooner", None, Priority::Medium, Some(date(5)))
            .await
            .unwrap();

        // Collapse all positions so only the deadline tie-break decides.
        sqlx::query("UPDATE tasks SET order_index = 0 WHERE owner_id = ?1")
            .bind(alice.id.as_i64())
            .execute(&pool)
            .await
            .unwrap();

        let titles: Vec<String> = repo
            .list_for_owner(alice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["sooner", "later", "undated"]);
    }

    #[tokio::test]
    async fn test_cross_owner_reads_and_writes_miss() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let bob = testing::seed_user(&pool, "bob").await;
        let repo = TaskRepository::new(&pool);

        let task = insert_simple(&repo, alice.id, "private").await;

        assert!(repo.list_for_owner(bob.id).await.unwrap().is_empty());
        assert!(repo.find_owned(bob.id, task.id).await.unwrap().is_none());
        assert!(
            repo.update_status(bob.id, task.id, TaskStatus::Done)
                .await
                .unwrap()
                .is_none()
        );
        assert!(!repo.delete(bob.id, task.id).await.unwrap());

        // Alice's task is untouched.
        let reloaded = repo.find_owned(alice.id, task.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn test_reorder_rewrites_positions() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let repo = TaskRepository::new(&pool);

        let a = insert_simple(&repo, alice.id, "a").await;
        let b = insert_simple(&repo, alice.id, "b").await;
        let c = insert_simple(&repo, alice.id, "c").await;

        assert!(repo.reorder(alice.id, &[c.id, a.id, b.id]).await.unwrap());

        let ordered: Vec<(String, i64)> = repo
            .list_for_owner(alice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|t| (t.title, t.order_index))
            .collect();
        assert_eq!(
            ordered,
            [
                ("c".to_owned(), 0),
                ("a".to_owned(), 1),
                ("b".to_owned(), 2)
            ]
        );
    }

    #[tokio::test]
    async fn test_reorder_rejects_foreign_id_without_mutation() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let bob = testing::seed_user(&pool, "bob").await;
        let repo = TaskRepository::new(&pool);

        let a = insert_simple(&repo, alice.id, "a").await;
        let b = insert_simple(&repo, alice.id, "b").await;
        let bobs = insert_simple(&repo, bob.id, "bobs").await;

        assert!(!repo.reorder(alice.id, &[bobs.id, a.id, b.id]).await.unwrap());

        // Nothing moved, on either side.
        let a2 = repo.find_owned(alice.id, a.id).await.unwrap().unwrap();
        let b2 = repo.find_owned(alice.id, b.id).await.unwrap().unwrap();
        let bobs2 = repo.find_owned(bob.id, bobs.id).await.unwrap().unwrap();
        assert_eq!(a2.order_index, 0);
        assert_eq!(b2.order_index, 1);
        assert_eq!(bobs2.order_index, 0);
    }

    #[tokio::test]
    async fn test_reorder_rejects_unknown_and_duplicate_ids() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let repo = TaskRepository::new(&pool);

        let a = insert_simple(&repo, alice.id, "a").await;
        let b = insert_simple(&repo, alice.id, "b").await;

        assert!(
            !repo
                .reorder(alice.id, &[a.id, b.id, TaskId::new(9999)])
                .await
                .unwrap()
        );
        assert!(!repo.reorder(alice.id, &[a.id, a.id]).await.unwrap());

        // The empty reorder is trivially consistent.
        assert!(repo.reorder(alice.id, &[]).await.unwrap());
    }

    #[tokio::test]
    async fn test_deadlines_in_range() {
        let pool = testing::pool().await;
        let alice = testing::seed_user(&pool, "alice").await;
        let repo = TaskRepository::new(&pool);

        let date = |y: i32, m: u32, d: u32| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        repo.insert(alice.id, "in", None, Priority::Medium, Some(date(2026, 9, 15)))
            .await
            .unwrap();
        repo.insert(alice.id, "before", None, Priority::Medium, Some(date(2026, 8, 31)))
            .await
            .unwrap();
        repo.insert(alice.id, "after", None, Priority::Medium, Some(date(2026, 10, 1)))
            .await
            .unwrap();
        repo.insert(alice.id, "undated", None, Priority::Medium, None)
            .await
            .unwrap();

        let titles: Vec<String> = repo
            .deadlines_in_range(alice.id, date(2026, 9, 1), date(2026, 10, 1))
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, ["in"]);
    }
}
