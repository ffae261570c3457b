//! HTTP routes

pub mod auth;
pub mod tasks;

use axum::{
    Json, Router,
    extract::Extension,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;

use crate::{
    AppState, flash,
    middleware::{load_principal, method_override, redirect_if_authenticated, require_auth},
    models::Principal,
    views,
};

/// Assemble the application router
pub fn create_router(state: AppState) -> Router {
    let guest_pages = Router::new()
        .route("/auth/login", get(auth::login_form))
        .route("/auth/register", get(auth::register_form))
        .route_layer(middleware::from_fn(redirect_if_authenticated));

    let task_pages = Router::new()
        .route("/tasks", get(tasks::list).post(tasks::create))
        .route("/tasks/new", get(tasks::new_form))
        .route("/tasks/:id", put(tasks::update).delete(tasks::remove))
        .route("/tasks/:id/edit", get(tasks::edit_form))
        .route("/tasks/:id/status", put(tasks::update_status))
        .route_layer(middleware::from_fn(require_auth));

    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
        .route("/auth/login", post(auth::login))
        .route("/auth/register", post(auth::register))
        .route("/auth/logout", get(auth::logout))
        .merge(guest_pages)
        .merge(task_pages)
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), load_principal))
        .layer(middleware::from_fn(method_override))
        .with_state(state)
}

/// Home page
pub async fn home(principal: Option<Extension<Principal>>, jar: CookieJar) -> impl IntoResponse {
    let principal = principal.map(|Extension(p)| p);
    let (notice, jar) = flash::take(jar);
    (jar, views::home_page(principal.as_ref(), notice.as_ref()))
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "todo-web"
    }))
}

/// Fallback 404 page
pub async fn not_found(principal: Option<Extension<Principal>>) -> Response {
    let principal = principal.map(|Extension(p)| p);
    views::not_found_page(principal.as_ref())
}
