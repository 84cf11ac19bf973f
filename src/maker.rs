use chrono::Duration;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::{
    jwt::JWTMaker,
    payload::Payload,
    sealed::SealedMaker
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is invalid")]
    InvalidToken,
    #[error("token is expired")]
    TokenExpired,
    #[error("invalid token duration")]
    InvalidDuration,
    #[error("cannot encode token")]
    Encoding
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid key size: must be at least {0} characters")]
    TooShort(usize),
    #[error("invalid key size: must be exactly {0} characters")]
    WrongLength(usize)
}

/// Issues and verifies bearer tokens.
pub trait Maker {
    /// Creates a token for `username` which is valid for `duration`.
    fn create_token(
        &self,
        username: &str,
        duration: Duration
    ) -> Result<String, TokenError>;

    /// Checks that `token` is authentic and unexpired, and returns its
    /// payload.
    fn verify_token(&self, token: &str) -> Result<Payload, TokenError>;
}

pub type MakerArc = Arc<dyn Maker + Send + Sync>;

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    #[default]
    Jwt,
    Sealed
}

pub fn new_maker(
    backend: TokenBackend,
    key: &[u8]
) -> Result<MakerArc, KeyError>
{
    let maker = match backend {
        TokenBackend::Jwt => Arc::new(JWTMaker::new(key)?) as MakerArc,
        TokenBackend::Sealed => Arc::new(SealedMaker::new(key)?) as MakerArc
    };

    info!(?backend, "token maker ready");
    Ok(maker)
}
