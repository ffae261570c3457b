//! Authentication routes

use axum::{
    extract::{Form, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use tracing::info;

use crate::{
    AppState,
    error::AppError,
    flash,
    models::NewUser,
    validation, views,
};

/// Login form fields
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form fields
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Render the login form
pub async fn login_form(jar: CookieJar) -> impl IntoResponse {
    let (notice, jar) = flash::take(jar);
    (jar, views::login_page(notice.as_ref()))
}

/// Handle a login attempt: on success the session cookie is set and the
/// user lands on their task list
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    if let Err(message) = validation::validate_email(&form.email) {
        return Ok(flash::redirect_with_error("/auth/login", &message));
    }
    if form.password.is_empty() {
        return Ok(flash::redirect_with_error(
            "/auth/login",
            "Password is required",
        ));
    }

    // InvalidCredentials propagates into a login redirect with the uniform
    // notice
    let principal = state
        .authenticator
        .authenticate(&form.email, &form.password)
        .await?;

    let token = state
        .sessions
        .create(&principal)
        .await
        .map_err(AppError::Internal)?;

    let cookie = session_cookie(&state, token);
    Ok((
        jar.add(cookie),
        flash::redirect_with_success("/tasks", "Welcome back!"),
    )
        .into_response())
}

/// Render the registration form
pub async fn register_form(jar: CookieJar) -> impl IntoResponse {
    let (notice, jar) = flash::take(jar);
    (jar, views::register_page(notice.as_ref()))
}

/// Handle a registration attempt; the new user is sent to the login form
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    for check in [
        validation::validate_email(&form.email),
        validation::validate_name(&form.name),
        validation::validate_password(&form.password),
    ] {
        if let Err(message) = check {
            return Ok(flash::redirect_with_error("/auth/register", &message));
        }
    }

    let new_user = NewUser {
        email: form.email,
        name: form.name,
        password: form.password,
    };

    // DuplicateEmail propagates into a registration redirect with the
    // conflict notice
    let user = state.users.create(&new_user).await?;
    info!("New user registered: {}", user.email);

    Ok(flash::redirect_with_success(
        "/auth/login",
        "You are now registered and can log in",
    ))
}

/// Destroy the session and clear its cookie
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> Result<Response, AppError> {
    if let Some(cookie) = jar.get(state.sessions.cookie_name()) {
        state
            .sessions
            .destroy(cookie.value())
            .await
            .map_err(AppError::Internal)?;
    }

    let removal = Cookie::build(state.sessions.cookie_name().to_string())
        .path("/")
        .build();
    let jar = jar.remove(removal);

    Ok((jar, flash::redirect_with_success("/", "You are logged out")).into_response())
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((state.sessions.cookie_name().to_string(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(state.sessions.ttl_seconds() as i64))
        .build()
}
