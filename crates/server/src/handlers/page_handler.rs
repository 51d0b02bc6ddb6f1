//! JSON stand-ins for the login and dashboard pages.

use axum::{extract::State, response::Json, routing::get, Router};
use serde::Serialize;
use utoipa::ToSchema;

use domain::{UserProfile, UserRole};

use crate::extractors::CurrentIdentity;
use crate::state::AppState;

/// Sign-in hint served at the login path
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginPage {
    pub login: String,
    pub signup: String,
}

/// Dashboard landing document
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardView {
    pub user_id: String,
    pub email: Option<String>,
    pub role: UserRole,
    pub is_super_admin: bool,
    pub profile: Option<UserProfile>,
}

/// Create page routes
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page))
        .route("/dashboard", get(dashboard))
}

/// Login page
#[utoipa::path(
    get,
    path = "/login",
    tag = "Pages",
    responses((status = 200, description = "Where to sign in", body = LoginPage))
)]
pub async fn login_page() -> Json<LoginPage> {
    Json(LoginPage {
        login: "/auth/login".to_string(),
        signup: "/auth/signup".to_string(),
    })
}

/// Dashboard root
///
/// The role comes from the profile row and falls back to the base role when
/// the row is missing or unreadable.
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Pages",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Current user and role", body = DashboardView),
        (status = 307, description = "Redirect to login without a session")
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Json<DashboardView> {
    let profile = state.roles.profile(&identity).await;
    let role = profile.as_ref().map(|p| p.role).unwrap_or_default();

    Json(DashboardView {
        user_id: identity.id,
        email: identity.email,
        role,
        is_super_admin: role.is_super_admin(),
        profile,
    })
}
