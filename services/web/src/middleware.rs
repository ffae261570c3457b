//! Request gates and session restoration

use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::error;

use crate::{AppState, error::AppError, models::Principal};

/// Restore the principal referenced by the session cookie, if any.
///
/// Runs on every request and never rejects; handlers and the gates below
/// read the principal from request extensions.
pub async fn load_principal(
    State(state): State<AppState>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(cookie) = jar.get(state.sessions.cookie_name()) {
        match state.sessions.resolve(cookie.value()).await {
            Ok(Some(principal)) => {
                req.extensions_mut().insert(principal);
            }
            Ok(None) => {}
            Err(e) => {
                // treat an unreachable session store as "no session" for
                // the request; the error is still worth an operator's eye
                error!("Failed to resolve session: {}", e);
            }
        }
    }

    next.run(req).await
}

/// Gate: reject requests without a resolved principal, redirecting to the
/// login entry point
pub async fn require_auth(req: Request, next: Next) -> Response {
    if req.extensions().get::<Principal>().is_some() {
        next.run(req).await
    } else {
        AppError::Unauthenticated.into_response()
    }
}

/// Gate: send already-authenticated users away from guest-only pages
pub async fn redirect_if_authenticated(req: Request, next: Next) -> Response {
    if req.extensions().get::<Principal>().is_some() {
        Redirect::to("/tasks").into_response()
    } else {
        next.run(req).await
    }
}

/// Rewrite `POST /x?_method=PUT` style submissions to the verb the route
/// table expects; HTML forms can only emit GET and POST
pub async fn method_override(mut req: Request, next: Next) -> Response {
    if req.method() == Method::POST {
        if let Some(target) = req.uri().query().and_then(override_target) {
            *req.method_mut() = target;
        }
    }

    next.run(req).await
}

fn override_target(query: &str) -> Option<Method> {
    query.split('&').find_map(|pair| {
        let value = pair.strip_prefix("_method=")?;
        match value.to_ascii_uppercase().as_str() {
            "PUT" => Some(Method::PUT),
            "DELETE" => Some(Method::DELETE),
            _ => None,
        }
    })
}
