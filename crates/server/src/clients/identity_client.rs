//! Client for the hosted identity API (`/auth/v1`).

use async_trait::async_trait;
use reqwest::{Method, StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use common::{AppError, AppResult};
use domain::Identity;

use super::remote::{rejection, RemoteHttp};
use crate::services::CHALLENGE_METHOD;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Session issued by the identity API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds
    pub expires_in: i64,
    /// Absolute expiry as unix seconds, when the API reports it
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub user: Option<Identity>,
}

impl AuthSession {
    /// Absolute expiry, derived from `expires_in` when not reported.
    pub fn expiry(&self, now: i64) -> i64 {
        self.expires_at.unwrap_or(now + self.expires_in)
    }
}

/// Identity API operations used by the application.
///
/// `Ok(None)` means the API answered and refused the credential; `Err` is a
/// transport fault or an unexpected response.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// Identity for an access token
    async fn get_user(&self, access_token: &str) -> AppResult<Option<Identity>>;

    /// Exchange a refresh token for a new session
    async fn refresh_session(&self, refresh_token: &str) -> AppResult<Option<AuthSession>>;

    /// Email/password sign in
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<Option<AuthSession>>;

    /// Provider sign-in URL that sends the auth code back to `redirect_to`
    fn authorize_url(
        &self,
        provider: &str,
        code_challenge: &str,
        redirect_to: &str,
    ) -> AppResult<String>;

    /// Exchange an auth callback code for a session
    async fn exchange_code(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> AppResult<Option<AuthSession>>;

    /// Create a new identity
    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> AppResult<Identity>;

    /// Revoke the session behind an access token
    async fn sign_out(&self, access_token: &str) -> AppResult<()>;
}

/// HTTP implementation of `IdentityApi`.
pub struct IdentityClient {
    remote: RemoteHttp,
}

impl IdentityClient {
    pub fn new(remote: RemoteHttp) -> Self {
        Self { remote }
    }

    async fn token_grant(&self, grant_type: &str, body: Value) -> AppResult<Option<AuthSession>> {
        debug!(grant_type, "identity token grant");
        let response = self
            .remote
            .request(Method::POST, "/auth/v1/token")
            .query(&[("grant_type", grant_type)])
            .json(&body)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(Some(response.json().await?)),
            StatusCode::BAD_REQUEST
            | StatusCode::UNAUTHORIZED
            | StatusCode::FORBIDDEN
            | StatusCode::NOT_FOUND => Ok(None),
            _ => Err(rejection(response).await),
        }
    }
}

#[async_trait]
impl IdentityApi for IdentityClient {
    async fn get_user(&self, access_token: &str) -> AppResult<Option<Identity>> {
        let response = self
            .remote
            .user_request(Method::GET, "/auth/v1/user", access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(Some(response.json().await?)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(None),
            _ => Err(rejection(response).await),
        }
    }

    async fn refresh_session(&self, refresh_token: &str) -> AppResult<Option<AuthSession>> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<Option<AuthSession>> {
        self.token_grant("password", json!({ "email": email, "password": password }))
            .await
    }

    fn authorize_url(
        &self,
        provider: &str,
        code_challenge: &str,
        redirect_to: &str,
    ) -> AppResult<String> {
        let url = Url::parse_with_params(
            &self.remote.url("/auth/v1/authorize"),
            &[
                ("provider", provider),
                ("code_challenge", code_challenge),
                ("code_challenge_method", CHALLENGE_METHOD),
                ("redirect_to", redirect_to),
            ],
        )
        .map_err(|e| AppError::internal(format!("Invalid identity API URL: {}", e)))?;
        Ok(url.into())
    }

    async fn exchange_code(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> AppResult<Option<AuthSession>> {
        self.token_grant(
            "pkce",
            json!({ "auth_code": auth_code, "code_verifier": code_verifier }),
        )
        .await
    }

    async fn sign_up(&self, email: &str, password: &str, metadata: Value) -> AppResult<Identity> {
        let response = self
            .remote
            .request(Method::POST, "/auth/v1/signup")
            .json(&json!({ "email": email, "password": password, "data": metadata }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(rejection(response).await);
        }

        // With email confirmation off the API answers with a session wrapping the user.
        let body: Value = response.json().await?;
        let user = body.get("user").cloned().unwrap_or(body);
        serde_json::from_value(user)
            .map_err(|e| AppError::upstream(format!("Unexpected signup response: {}", e)))
    }

    async fn sign_out(&self, access_token: &str) -> AppResult<()> {
        let response = self
            .remote
            .user_request(Method::POST, "/auth/v1/logout", access_token)
            .send()
            .await?;

        if !response.status().is_success() && response.status() != StatusCode::UNAUTHORIZED {
            return Err(rejection(response).await);
        }
        Ok(())
    }
}
