use axum::{
    extract::FromRequestParts,
    http::request::Parts
};

use crate::{
    errors::AppError,
    payload::Payload
};

/// The payload of the bearer token which admitted the request.
#[derive(Debug)]
pub struct AuthPayload(pub Payload);

impl<S> FromRequestParts<S> for AuthPayload
where
    S: Send + Sync
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S
    ) -> Result<Self, Self::Rejection>
    {
        // only present when require_auth ran first
        parts.extensions.get::<Payload>()
            .cloned()
            .map(AuthPayload)
            .ok_or(AppError::MissingAuthorization)
    }
}
