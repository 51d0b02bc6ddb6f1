//! `{status, message|error}` body used by mutation routes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};

/// Mutation response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "UPPERCASE")]
pub enum StatusEnvelope {
    Success {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Error {
        error: String,
    },
}

pub fn success(message: Option<String>) -> Response {
    (StatusCode::OK, Json(StatusEnvelope::Success { message })).into_response()
}

pub fn failure(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(StatusEnvelope::Error {
            error: error.into(),
        }),
    )
        .into_response()
}
