//! Identity placed on the request by the route guard.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use common::AppError;
use domain::Identity;

/// Authenticated identity of the current request.
///
/// Extraction fails with `Unauthorized` when the guard resolved no session.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentIdentity(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentIdentity>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
