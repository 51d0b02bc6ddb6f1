//! Route guard applied to every request.
//!
//! Policy, first match wins:
//! 1. Excluded assets and the auth callback pass through untouched.
//! 2. No identity on a protected path redirects to the login page.
//! 3. An identity on the login page redirects to the dashboard.
//! 4. Everything else is forwarded with the resolved identity attached.
//!
//! The cookie delta from session resolution (rotated or cleared tokens) is
//! attached to every response the guard produces.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use crate::config::GuardConfig;
use crate::extractors::CurrentIdentity;
use crate::services::SessionResolution;
use crate::state::AppState;

/// Routing decision for a request that went through session resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    RedirectToLogin,
    RedirectToDashboard,
    Forward,
}

/// Whether the guard skips `path` without resolving a session.
pub fn bypasses_guard(guard: &GuardConfig, path: &str) -> bool {
    guard.exclude_pattern.is_match(path) || guard.auth_callback_pattern.is_match(path)
}

/// `path` is a protected prefix or lies below one.
pub fn is_protected(guard: &GuardConfig, path: &str) -> bool {
    guard.protected_prefixes.iter().any(|prefix| {
        let prefix = prefix.trim_end_matches('/');
        path == prefix
            || path
                .strip_prefix(prefix)
                .is_some_and(|rest| rest.starts_with('/'))
    })
}

fn is_login_path(guard: &GuardConfig, path: &str) -> bool {
    let normalized = path.trim_end_matches('/');
    !normalized.is_empty() && normalized == guard.login_path.trim_end_matches('/')
}

pub fn decide(guard: &GuardConfig, path: &str, authenticated: bool) -> GuardDecision {
    if !authenticated && is_protected(guard, path) {
        GuardDecision::RedirectToLogin
    } else if authenticated && is_login_path(guard, path) {
        GuardDecision::RedirectToDashboard
    } else {
        GuardDecision::Forward
    }
}

/// Guard middleware, installed with `middleware::from_fn_with_state`.
pub async fn route_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let guard = &state.config.guard;
    let path = request.uri().path().to_string();

    if bypasses_guard(guard, &path) {
        return next.run(request).await;
    }

    let SessionResolution { identity, cookies } = state.sessions.resolve(jar).await;

    match decide(guard, &path, identity.is_some()) {
        GuardDecision::RedirectToLogin => {
            debug!(path = %path, "unauthenticated request to protected path");
            (cookies, Redirect::temporary(&guard.login_path)).into_response()
        }
        GuardDecision::RedirectToDashboard => {
            debug!(path = %path, "authenticated request to login page");
            (cookies, Redirect::temporary(&guard.dashboard_path)).into_response()
        }
        GuardDecision::Forward => {
            if let Some(identity) = identity {
                request.extensions_mut().insert(CurrentIdentity(identity));
            }
            (cookies, next.run(request).await).into_response()
        }
    }
}
