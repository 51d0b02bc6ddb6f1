//! Profile and role management handlers.

use axum::{
    extract::State,
    response::Json,
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use common::{AppError, AppResult, OptionExt};
use domain::{UserProfile, UserRole};

use crate::extractors::{CurrentIdentity, ValidatedJson};
use crate::state::AppState;

/// Role change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    /// Profile to change
    #[validate(length(min = 1, message = "User ID is required"))]
    pub user_id: String,
    /// New role: user, admin or super_admin
    #[schema(example = "admin")]
    pub role: String,
}

/// Create profile routes
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile))
        .route("/users/role", put(update_role))
}

/// Get the current user's profile
#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Users",
    security(("session_cookie" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserProfile),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No profile for this identity")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> AppResult<Json<UserProfile>> {
    let profile = state.profiles.find(&identity.id).await?.ok_or_not_found()?;
    Ok(Json(profile))
}

/// Change a user's role (super admin only)
#[utoipa::path(
    put,
    path = "/api/users/role",
    tag = "Users",
    security(("session_cookie" = [])),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Unknown role"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Super admin only"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_role(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    ValidatedJson(request): ValidatedJson<UpdateRoleRequest>,
) -> AppResult<Json<UserProfile>> {
    if !state.roles.is_super_admin(&identity).await {
        return Err(AppError::Forbidden);
    }

    let role: UserRole = request.role.parse()?;
    let profile = state
        .profiles
        .update_role(&request.user_id, role)
        .await?
        .ok_or_not_found()?;

    info!(
        changed_by = %identity.id,
        user_id = %profile.id,
        role = %role,
        "user role updated"
    );
    Ok(Json(profile))
}
