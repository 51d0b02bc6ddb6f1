//! Sign in, sign up, sign out and the auth code flow.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use common::{AppError, AppResult};
use domain::{Identity, UserProfile};

use crate::extractors::ValidatedJson;
use crate::services::PkcePair;
use crate::state::AppState;

/// Email/password sign in request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "baker@example.com")]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Account creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email address"))]
    #[schema(example = "baker@example.com")]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(default)]
    #[schema(example = "Ada")]
    pub first_name: Option<String>,
    #[serde(default)]
    #[schema(example = "Baker")]
    pub last_name: Option<String>,
}

/// Signed in identity
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub user_id: String,
    pub email: Option<String>,
}

impl From<Identity> for SessionResponse {
    fn from(identity: Identity) -> Self {
        Self {
            user_id: identity.id,
            email: identity.email,
        }
    }
}

/// Auth code flow start
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuthorizeQuery {
    /// Identity provider to sign in with
    #[param(example = "github")]
    pub provider: Option<String>,
}

/// Auth callback query
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CallbackQuery {
    /// Auth code issued by the identity provider
    pub code: Option<String>,
}

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/signup", post(signup))
        .route("/logout", post(logout))
        .route("/authorize", get(authorize))
        .route("/callback", get(callback))
}

/// Sign in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session cookies set", body = SessionResponse),
        (status = 400, description = "Invalid payload"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<SessionResponse>)> {
    let session = state
        .identity
        .sign_in_with_password(&request.email, &request.password)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let identity = match session.user.clone() {
        Some(identity) => identity,
        None => state
            .identity
            .get_user(&session.access_token)
            .await?
            .ok_or(AppError::InvalidCredentials)?,
    };

    info!(user_id = %identity.id, "user signed in");
    let jar = state
        .sessions
        .store_session(jar, &session, Utc::now().timestamp());
    Ok((jar, Json(SessionResponse::from(identity))))
}

/// Create an account and its profile
///
/// The profile always starts with the base role.
#[utoipa::path(
    post,
    path = "/auth/signup",
    tag = "Authentication",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = UserProfile),
        (status = 400, description = "Invalid payload or account rejected")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<UserProfile>)> {
    let metadata = json!({
        "first_name": request.first_name,
        "last_name": request.last_name,
    });

    let identity = state
        .identity
        .sign_up(&request.email, &request.password, metadata)
        .await
        .map_err(|e| match e {
            AppError::Rejected(msg) => AppError::BadRequest(msg),
            other => other,
        })?;

    let profile = UserProfile::for_signup(&identity, request.first_name, request.last_name);
    let profile = state.profiles.create(profile).await?;

    info!(user_id = %profile.id, "account created");
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Sign out and clear the session cookies
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Authentication",
    responses((status = 204, description = "Session cleared"))
)]
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let access_cookie = state.sessions.config().access_cookie();
    if let Some(token) = jar.get(&access_cookie).map(|c| c.value().to_string()) {
        if let Err(e) = state.identity.sign_out(&token).await {
            warn!(error = %e, "remote sign out failed, clearing cookies anyway");
        }
    }

    (state.sessions.clear_session(jar), StatusCode::NO_CONTENT)
}

/// Start the auth code flow with an identity provider
///
/// Stores a fresh code verifier in a cookie and redirects to the provider
/// with its challenge.
#[utoipa::path(
    get,
    path = "/auth/authorize",
    tag = "Authentication",
    responses(
        (status = 307, description = "Redirect to the identity provider"),
        (status = 400, description = "Provider is required")
    )
)]
pub async fn authorize(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<AuthorizeQuery>,
) -> AppResult<(CookieJar, Redirect)> {
    let provider = query
        .provider
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest("Provider is required".to_string()))?;

    let pkce = PkcePair::generate();
    let url = state.identity.authorize_url(
        &provider,
        &pkce.challenge,
        &state.sessions.config().callback_url,
    )?;

    info!(provider = %provider, "starting auth code flow");
    let jar = state.sessions.store_code_verifier(jar, &pkce.verifier);
    Ok((jar, Redirect::temporary(&url)))
}

/// Exchange an auth callback code for a session
///
/// Spends the code verifier stored by `/auth/authorize`.
#[utoipa::path(
    get,
    path = "/auth/callback",
    tag = "Authentication",
    responses(
        (status = 307, description = "Session set and redirected to the dashboard, or back to login with an error")
    )
)]
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let guard = &state.config.guard;
    let failed = || Redirect::temporary(&format!("{}?error=auth_callback", guard.login_path));

    let Some(code) = query.code.filter(|c| !c.is_empty()) else {
        return failed().into_response();
    };
    let Some(verifier) = state.sessions.code_verifier(&jar) else {
        warn!("auth callback without a code verifier");
        return failed().into_response();
    };

    match state.identity.exchange_code(&code, &verifier).await {
        Ok(Some(session)) => {
            let jar = state
                .sessions
                .store_session(jar, &session, Utc::now().timestamp());
            let jar = state.sessions.clear_code_verifier(jar);
            (jar, Redirect::temporary(&guard.dashboard_path)).into_response()
        }
        Ok(None) => {
            warn!("auth callback code rejected");
            failed().into_response()
        }
        Err(e) => {
            warn!(error = %e, "auth callback exchange failed");
            failed().into_response()
        }
    }
}
