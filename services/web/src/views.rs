//! Server-rendered HTML views
//!
//! The view layer is deliberately small: a shared layout plus one function
//! per page, rendered into strings. All user-supplied data passes through
//! `escape` before interpolation.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::flash::{Flash, FlashKind};
use crate::models::{Principal, Task, TaskFilter, TaskStatus};

/// Escape text for safe HTML interpolation
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(
    title: &str,
    principal: Option<&Principal>,
    flash: Option<&Flash>,
    body: &str,
) -> Html<String> {
    let nav = match principal {
        Some(p) => format!(
            r#"<span>Hello, {}</span> <a href="/tasks">My Tasks</a> <a href="/auth/logout">Logout</a>"#,
            escape(&p.name)
        ),
        None => r#"<a href="/auth/login">Login</a> <a href="/auth/register">Register</a>"#
            .to_string(),
    };

    let banner = match flash {
        Some(f) => {
            let class = match f.kind {
                FlashKind::Success => "flash success",
                FlashKind::Error => "flash error",
            };
            format!(r#"<div class="{}">{}</div>"#, class, escape(&f.message))
        }
        None => String::new(),
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>{} · Todo</title></head>
<body>
<nav><a href="/">Todo</a> {}</nav>
{}
<main>
{}
</main>
</body>
</html>"#,
        escape(title),
        nav,
        banner,
        body
    ))
}

/// Home page
pub fn home_page(principal: Option<&Principal>, flash: Option<&Flash>) -> Html<String> {
    let body = match principal {
        Some(_) => r#"<h1>Todo</h1><p><a href="/tasks">Go to your tasks</a></p>"#,
        None => {
            r#"<h1>Todo</h1><p>A simple multi-user task list. <a href="/auth/login">Log in</a> or <a href="/auth/register">register</a> to get started.</p>"#
        }
    };
    layout("Home", principal, flash, body)
}

/// Login form
pub fn login_page(flash: Option<&Flash>) -> Html<String> {
    let body = r#"<h1>Login</h1>
<form method="post" action="/auth/login">
  <label>Email <input type="email" name="email" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">Login</button>
</form>
<p>No account? <a href="/auth/register">Register</a></p>"#;
    layout("Login", None, flash, body)
}

/// Registration form
pub fn register_page(flash: Option<&Flash>) -> Html<String> {
    let body = r#"<h1>Register</h1>
<form method="post" action="/auth/register">
  <label>Name <input type="text" name="name" required></label>
  <label>Email <input type="email" name="email" required></label>
  <label>Password <input type="password" name="password" required></label>
  <button type="submit">Register</button>
</form>
<p>Already registered? <a href="/auth/login">Login</a></p>"#;
    layout("Register", None, flash, body)
}

/// Task list with status filter links
pub fn tasks_page(
    principal: &Principal,
    flash: Option<&Flash>,
    tasks: &[Task],
    filter: TaskFilter,
) -> Html<String> {
    let filters = [
        (TaskFilter::All, "/tasks", "All"),
        (TaskFilter::Pending, "/tasks?status=pending", "Pending"),
        (TaskFilter::Completed, "/tasks?status=completed", "Completed"),
    ]
    .iter()
    .map(|(value, href, label)| {
        if *value == filter {
            format!("<strong>{}</strong>", label)
        } else {
            format!(r#"<a href="{}">{}</a>"#, href, label)
        }
    })
    .collect::<Vec<_>>()
    .join(" ");

    let rows = if tasks.is_empty() {
        "<p>No tasks yet. <a href=\"/tasks/new\">Create one</a>.</p>".to_string()
    } else {
        let items = tasks.iter().map(render_task).collect::<Vec<_>>().join("\n");
        format!("<ul class=\"tasks\">\n{}\n</ul>", items)
    };

    let body = format!(
        r#"<h1>My Tasks</h1>
<p><a href="/tasks/new">New task</a></p>
<p class="filters">{}</p>
{}"#,
        filters, rows
    );
    layout("My Tasks", Some(principal), flash, &body)
}

fn render_task(task: &Task) -> String {
    let due = match task.due_date {
        Some(date) => format!(
            r#" <span class="due">due {}</span>"#,
            date.format("%Y-%m-%d")
        ),
        None => String::new(),
    };

    let description = match &task.description {
        Some(text) => format!(r#"<p class="description">{}</p>"#, escape(text)),
        None => String::new(),
    };

    let toggle = match task.status {
        TaskStatus::Completed => format!(
            r#"<form method="post" action="/tasks/{}/status?_method=PUT"><input type="hidden" name="status" value="pending"><button type="submit">Mark pending</button></form>"#,
            task.id
        ),
        _ => format!(
            r#"<form method="post" action="/tasks/{}/status?_method=PUT"><input type="hidden" name="status" value="completed"><button type="submit">Mark completed</button></form>"#,
            task.id
        ),
    };

    format!(
        r#"<li class="task {status}">
  <span class="title">{title}</span>{due}
  {description}
  {toggle}
  <a href="/tasks/{id}/edit">Edit</a>
  <form method="post" action="/tasks/{id}?_method=DELETE"><button type="submit">Delete</button></form>
</li>"#,
        status = task.status,
        title = escape(&task.title),
        due = due,
        description = description,
        toggle = toggle,
        id = task.id,
    )
}

/// Task creation form
pub fn task_new_page(principal: &Principal, flash: Option<&Flash>) -> Html<String> {
    let body = r#"<h1>New Task</h1>
<form method="post" action="/tasks">
  <label>Title <input type="text" name="title" maxlength="100" required></label>
  <label>Description <textarea name="description" maxlength="500"></textarea></label>
  <label>Due date <input type="date" name="due_date"></label>
  <button type="submit">Create</button>
</form>
<p><a href="/tasks">Back to tasks</a></p>"#;
    layout("New Task", Some(principal), flash, body)
}

/// Task edit form, prefilled
pub fn task_edit_page(principal: &Principal, flash: Option<&Flash>, task: &Task) -> Html<String> {
    let due_value = task
        .due_date
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let (pending_selected, completed_selected) = match task.status {
        TaskStatus::Completed => ("", " selected"),
        _ => (" selected", ""),
    };

    let body = format!(
        r#"<h1>Edit Task</h1>
<form method="post" action="/tasks/{id}?_method=PUT">
  <label>Title <input type="text" name="title" maxlength="100" value="{title}" required></label>
  <label>Description <textarea name="description" maxlength="500">{description}</textarea></label>
  <label>Due date <input type="date" name="due_date" value="{due}"></label>
  <label>Status <select name="status">
    <option value="pending"{pending}>Pending</option>
    <option value="completed"{completed}>Completed</option>
  </select></label>
  <button type="submit">Save</button>
</form>
<p><a href="/tasks">Back to tasks</a></p>"#,
        id = task.id,
        title = escape(&task.title),
        description = escape(task.description.as_deref().unwrap_or("")),
        due = due_value,
        pending = pending_selected,
        completed = completed_selected,
    );
    layout("Edit Task", Some(principal), flash, &body)
}

/// 404 page
pub fn not_found_page(principal: Option<&Principal>) -> Response {
    let page = layout(
        "Not Found",
        principal,
        None,
        r#"<h1>Page not found</h1><p><a href="/">Back to the home page</a></p>"#,
    );
    (StatusCode::NOT_FOUND, page).into_response()
}

/// Generic failure page; detail stays in the server log
pub fn error_page() -> Response {
    let page = layout(
        "Something went wrong",
        None,
        None,
        r#"<h1>Something went wrong</h1><p>Please try again later.</p>"#,
    );
    (StatusCode::INTERNAL_SERVER_ERROR, page).into_response()
}
