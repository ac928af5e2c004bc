//! Task route handlers.
//!
//! The list page and its form actions, plus the JSON reorder endpoint used
//! by the drag-and-drop glue. Every handler takes the resolved principal
//! through `RequireAuth`; the services never see a request that hasn't been
//! attributed to an account.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use punchlist_core::TaskId;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::task::Task;
use crate::routes::auth::MessageQuery;
use crate::services::tasks::{TaskError, TaskInput, TaskPatch, TaskService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Create-task form data.
#[derive(Debug, Deserialize)]
pub struct NewTaskForm {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub deadline: Option<String>,
}

/// Edit-task form data; absent fields stay unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub deadline: Option<String>,
}

/// Status form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// Reorder request body: the owner's task ids in their new order.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<i64>,
}

// =============================================================================
// Templates
// =============================================================================

/// Display model for a task row.
#[derive(Debug, Clone)]
pub struct TaskView {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: &'static str,
    pub status: &'static str,
    pub done: bool,
    pub deadline: Option<String>,
}

impl TaskView {
    pub(crate) fn from_task(task: Task) -> Self {
        Self {
            id: task.id.as_i64(),
            title: task.title,
            description: task.description,
            priority: task.priority.as_str(),
            status: task.status.as_str(),
            done: task.status == punchlist_core::TaskStatus::Done,
            deadline: task.deadline.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}

/// Task list page template.
#[derive(Template, WebTemplate)]
#[template(path = "tasks/list.html")]
pub struct TasksTemplate {
    pub user_name: String,
    pub tasks: Vec<TaskView>,
    pub error: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the task list, ordered by position.
pub async fn list(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<TasksTemplate, AppError> {
    let tasks = TaskService::new(state.pool()).list(user.id).await?;

    Ok(TasksTemplate {
        user_name: user.display().to_owned(),
        tasks: tasks.into_iter().map(TaskView::from_task).collect(),
        error: query.error,
    })
}

/// Handle the create-task form.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Form(form): Form<NewTaskForm>,
) -> Result<Response, AppError> {
    let input = TaskInput {
        title: form.title,
        description: form.description,
        priority: form.priority,
        deadline: form.deadline,
    };

    match TaskService::new(state.pool()).create(user.id, input).await {
        Ok(_) => Ok(Redirect::to("/tasks").into_response()),
        Err(TaskError::Validation(msg)) => Ok(validation_redirect(&msg).into_response()),
        Err(other) => Err(other.into()),
    }
}

/// Handle the edit-task form.
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
    Form(form): Form<UpdateTaskForm>,
) -> Result<Response, AppError> {
    let patch = TaskPatch {
        title: form.title,
        description: form.description,
        priority: form.priority,
        deadline: form.deadline,
    };

    match TaskService::new(state.pool())
        .update_fields(user.id, TaskId::new(id), patch)
        .await
    {
        Ok(_) => Ok(Redirect::to("/tasks").into_response()),
        Err(TaskError::Validation(msg)) => Ok(validation_redirect(&msg).into_response()),
        Err(other) => Err(other.into()),
    }
}

/// Handle the status toggle form.
pub async fn update_status(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
    Form(form): Form<StatusForm>,
) -> Result<Redirect, AppError> {
    TaskService::new(state.pool())
        .update_status(user.id, TaskId::new(id), &form.status)
        .await?;

    Ok(Redirect::to("/tasks"))
}

/// Handle the delete form.
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    TaskService::new(state.pool())
        .delete(user.id, TaskId::new(id))
        .await?;

    Ok(Redirect::to("/tasks"))
}

/// Handle the drag-and-drop reorder request.
///
/// All-or-nothing: any id that isn't one of the caller's tasks rejects the
/// whole request with 403 and no position changes.
///
/// # Route
///
/// `POST /api/tasks/reorder`
pub async fn reorder(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<ReorderRequest>,
) -> Result<StatusCode, AppError> {
    let ids: Vec<TaskId> = request.order.into_iter().map(TaskId::new).collect();

    TaskService::new(state.pool()).reorder(user.id, &ids).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Redirect back to the list with a correctable validation message.
fn validation_redirect(message: &str) -> Redirect {
    let encoded: String = url::form_urlencoded::byte_serialize(message.as_bytes()).collect();
    Redirect::to(&format!("/tasks?error={encoded}"))
}
