//! Shared HTTP plumbing for the hosted data store.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;

use common::{AppError, AppResult, RemoteStoreConfig};

/// Header carrying the project API key on every request.
const API_KEY_HEADER: &str = "apikey";

/// Connection to the hosted store: one pooled HTTP client, base URL and key.
#[derive(Clone)]
pub struct RemoteHttp {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RemoteHttp {
    /// Build a client with the configured request timeout.
    pub fn new(config: &RemoteStoreConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()?;
        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: reqwest::Client, config: &RemoteStoreConfig) -> Self {
        Self {
            http,
            base_url: config.base_url().to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Absolute URL of a path on the store.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request authorized with the project key.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.user_request(method, path, &self.api_key)
    }

    /// Request authorized with a user's access token.
    pub(crate) fn user_request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(API_KEY_HEADER, &self.api_key)
            .bearer_auth(token)
    }
}

/// Turn a non-success response into a rejection carrying the store's message.
pub(crate) async fn rejection(response: Response) -> AppError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    AppError::rejected(error_message(status, &body))
}

/// Pick the human readable message out of a store error body.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| format!("Remote store responded with {}", status))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_message_field() {
        let body = r#"{"code":"23503","message":"violates foreign key constraint","details":null}"#;
        assert_eq!(
            error_message(StatusCode::CONFLICT, body),
            "violates foreign key constraint"
        );
    }

    #[test]
    fn error_message_reads_identity_api_shape() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#;
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, body),
            "Invalid login credentials"
        );
    }

    #[test]
    fn error_message_falls_back_to_status() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>"),
            "Remote store responded with 502 Bad Gateway"
        );
    }
}
