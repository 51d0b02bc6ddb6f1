//! Route configuration.

use axum::{http::StatusCode, middleware, Router};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers::{auth_routes, health_routes, page_routes, profile_routes, record_routes};
use crate::middleware::route_guard;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Create the main router with all routes.
///
/// The guard wraps every route, the fallback included, so unknown paths
/// under a protected prefix still redirect anonymous visitors.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .nest("/health", health_routes())
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Sign in, sign up, sign out, callback
        .nest("/auth", auth_routes())
        // Login and dashboard documents
        .merge(page_routes())
        // Business entities, profile and roles
        .nest("/api", record_routes().merge(profile_routes()))
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(middleware::from_fn_with_state(state.clone(), route_guard))
        .with_state(state)
}
