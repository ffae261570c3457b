//! Task routes
//!
//! Every handler here runs behind the authentication gate, so the
//! principal extension is always present. All task operations are scoped
//! to that principal; a missing task and a foreign task are handled
//! identically.

use axum::{
    extract::{Extension, Form, Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    flash,
    models::{NewTask, Principal, TaskFilter, TaskStatus, UpdateTask},
    validation, views,
};

/// Task list query parameters
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

/// Task creation / edit form fields
#[derive(Debug, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: String,
    pub status: Option<String>,
}

/// Status toggle form fields
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub status: String,
}

/// List the current user's tasks
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(query): Query<ListQuery>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let filter = TaskFilter::from_query(query.status.as_deref());
    let tasks = state.tasks.list_for_user(principal.id, filter).await?;

    let (notice, jar) = flash::take(jar);
    Ok((
        jar,
        views::tasks_page(&principal, notice.as_ref(), &tasks, filter),
    )
        .into_response())
}

/// Render the creation form
pub async fn new_form(
    Extension(principal): Extension<Principal>,
    jar: CookieJar,
) -> impl IntoResponse {
    let (notice, jar) = flash::take(jar);
    (jar, views::task_new_page(&principal, notice.as_ref()))
}

/// Create a task
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Form(form): Form<TaskForm>,
) -> Result<Response, AppError> {
    let new_task = match validate_task_form(&form) {
        Ok(new_task) => new_task,
        Err(message) => return Ok(flash::redirect_with_error("/tasks/new", &message)),
    };

    let task = state.tasks.create(principal.id, &new_task).await?;
    info!("New task {} created by user {}", task.id, principal.email);

    Ok(flash::redirect_with_success(
        "/tasks",
        "Task created successfully",
    ))
}

/// Render the edit form; unknown or foreign tasks bounce back to the list
pub async fn edit_form(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let Some(task) = state.tasks.find_for_user(principal.id, id).await? else {
        return Ok(flash::redirect_with_error("/tasks", "Task not found"));
    };

    let (notice, jar) = flash::take(jar);
    Ok((
        jar,
        views::task_edit_page(&principal, notice.as_ref(), &task),
    )
        .into_response())
}

/// Update a task from the edit form
pub async fn update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Form(form): Form<TaskForm>,
) -> Result<Response, AppError> {
    let edit_path = format!("/tasks/{}/edit", id);

    let base = match validate_task_form(&form) {
        Ok(base) => base,
        Err(message) => return Ok(flash::redirect_with_error(&edit_path, &message)),
    };

    let status = match form.status.as_deref() {
        None | Some("") => TaskStatus::Pending,
        Some(raw) => match TaskStatus::parse(raw) {
            Some(TaskStatus::Pending) => TaskStatus::Pending,
            Some(TaskStatus::Completed) => TaskStatus::Completed,
            // deletion has its own route; the edit form never offers it
            _ => return Ok(flash::redirect_with_error(&edit_path, "Invalid status")),
        },
    };

    let fields = UpdateTask {
        title: base.title,
        description: base.description,
        due_date: base.due_date,
        status,
    };

    // NotFound propagates into a task-list redirect with the uniform notice
    let task = state.tasks.update(principal.id, id, &fields).await?;
    info!("Task {} updated by user {}", task.id, principal.email);

    Ok(flash::redirect_with_success(
        "/tasks",
        "Task updated successfully",
    ))
}

/// Flip a task between pending and completed
pub async fn update_status(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
    Form(form): Form<StatusForm>,
) -> Result<Response, AppError> {
    let status = match TaskStatus::parse(&form.status) {
        Some(TaskStatus::Pending) => TaskStatus::Pending,
        Some(TaskStatus::Completed) => TaskStatus::Completed,
        _ => return Ok(flash::redirect_with_error("/tasks", "Invalid status")),
    };

    let task = state.tasks.update_status(principal.id, id, status).await?;
    info!(
        "Task {} status updated to {} by user {}",
        task.id, status, principal.email
    );

    Ok(flash::redirect_with_success("/tasks", "Task status updated"))
}

/// Soft-delete a task
pub async fn remove(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.tasks.soft_delete(principal.id, id).await?;
    info!("Task {} deleted by user {}", id, principal.email);

    Ok(flash::redirect_with_success(
        "/tasks",
        "Task deleted successfully",
    ))
}

fn validate_task_form(form: &TaskForm) -> Result<NewTask, String> {
    validation::validate_title(&form.title)?;
    validation::validate_description(&form.description)?;
    let due_date = validation::parse_due_date(&form.due_date)?;

    let description = form.description.trim();
    let description = if description.is_empty() {
        None
    } else {
        Some(description.to_string())
    };

    Ok(NewTask {
        title: form.title.trim().to_string(),
        description,
        due_date,
    })
}
