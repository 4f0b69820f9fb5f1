use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use twixxer_core::session::SESSION_TTL_SECS;

use crate::state::AppState;

pub const SESSION_COOKIE: &str = "__twixxer_session";

/// Where unauthenticated requests to protected routes are sent.
pub const LOGIN_PATH: &str = "/login";

/// `Set-Cookie` value carrying a signed session.
pub fn session_cookie(value: &str, secure: bool) -> String {
    cookie(value, SESSION_TTL_SECS, secure)
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    cookie("", 0, secure)
}

fn cookie(value: &str, max_age: i64, secure: bool) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Extract the session cookie value from the request's `Cookie` headers.
pub fn read_session_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// Middleware that requires a valid session cookie.
///
/// On success the [`SessionUser`](twixxer_core::SessionUser) is stored in the
/// request extensions; otherwise the client is redirected to the login page.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let user = read_session_cookie(request.headers()).and_then(|value| state.signer.verify(value));

    let Some(user) = user else {
        tracing::debug!(path = %request.uri().path(), "No valid session, redirecting to login");
        return Redirect::to(LOGIN_PATH).into_response();
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}
