//! Users Middleware
//!
//! Login gate for the account routes.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::presentation::handlers::LOGIN_PATH;
use crate::presentation::session::SessionContext;

/// Let the request through only for a logged-in session
///
/// Anonymous visitors are redirected to the login form.
///
/// Layered with the app state, which the session extractor reads.
pub async fn require_login(session: SessionContext, req: Request, next: Next) -> Response {
    if !session.is_logged_in() {
        tracing::debug!(path = %req.uri().path(), "Login required; redirecting");
        return Redirect::to(LOGIN_PATH).into_response();
    }

    next.run(req).await
}
