use axum::{
    extract::{Request, State},
    http::header::{AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::Response
};
use tracing::debug;

use crate::{
    errors::AppError,
    maker::{Maker, MakerArc},
    payload::Payload
};

pub const AUTHORIZATION_TYPE_BEARER: &str = "bearer";

/// Checks an `Authorization` header value and returns the payload of the
/// bearer token it carries.
pub fn authenticate<M>(
    header: Option<&HeaderValue>,
    maker: &M
) -> Result<Payload, AppError>
where
    M: Maker + ?Sized
{
    let header = match header {
        Some(h) if !h.is_empty() => h,
        _ => return Err(AppError::MissingAuthorization)
    };

    let text = String::from_utf8_lossy(header.as_bytes());
    let fields = text.split_whitespace().collect::<Vec<_>>();

    if fields.len() < 2 {
        return Err(AppError::InvalidAuthorizationFormat);
    }

    if !fields[0].eq_ignore_ascii_case(AUTHORIZATION_TYPE_BEARER) {
        return Err(AppError::UnsupportedAuthorizationType);
    }

    Ok(maker.verify_token(fields[1])?)
}

/// Admits a request only when it carries a valid bearer token, making the
/// token's payload available to the handler.
pub async fn require_auth(
    State(maker): State<MakerArc>,
    mut req: Request,
    next: Next
) -> Result<Response, AppError>
{
    let payload = authenticate(req.headers().get(AUTHORIZATION), &*maker)
        .inspect_err(|e| debug!(
            method = %req.method(),
            uri = %req.uri(),
            reason = %e,
            "rejected request"
        ))?;

    req.extensions_mut().insert(payload);
    Ok(next.run(req).await)
}
