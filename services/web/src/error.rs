//! Application error taxonomy and its HTTP translation
//!
//! Domain errors become a redirect plus a one-shot flash notice; handlers
//! that need a form-specific redirect target handle validation at the point
//! of occurrence. Unexpected failures are logged with full detail
//! server-side and rendered as a generic failure page, never leaking
//! internals to the client.

use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::{flash, views};

/// Errors surfaced by handlers and the layers below them
#[derive(Error, Debug)]
pub enum AppError {
    /// Bad input shape; the message is surfaced on the originating form
    #[error("{0}")]
    Validation(String),

    /// Unknown email and wrong password are deliberately indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Registration conflict on the unique email index
    #[error("Email already exists")]
    DuplicateEmail,

    /// Missing task, or a task owned by another user; the two cases are not
    /// distinguished
    #[error("Task not found")]
    NotFound,

    /// Guard rejection for a route that requires a principal
    #[error("Please log in to view this resource")]
    Unauthenticated,

    /// Storage failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Any other unexpected failure
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(message) => flash::redirect_with_error("/", &message),
            AppError::InvalidCredentials => {
                flash::redirect_with_error("/auth/login", "Invalid email or password")
            }
            AppError::DuplicateEmail => {
                flash::redirect_with_error("/auth/register", "Email already exists")
            }
            AppError::NotFound => flash::redirect_with_error("/tasks", "Task not found"),
            AppError::Unauthenticated => {
                flash::redirect_with_error("/auth/login", "Please log in to view this resource")
            }
            AppError::Database(e) => {
                error!("Database error: {}", e);
                views::error_page()
            }
            AppError::Internal(e) => {
                error!("Unexpected error: {:#}", e);
                views::error_page()
            }
        }
    }
}
