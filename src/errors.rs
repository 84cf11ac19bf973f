use thiserror::Error;

use crate::{
    auth_provider,
    db::DatabaseError,
    maker::TokenError
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("authorization header is required")]
    MissingAuthorization,
    #[error("invalid authorization header format")]
    InvalidAuthorizationFormat,
    #[error("unsupported authorization type")]
    UnsupportedAuthorizationType,
    #[error("{0}")]
    TokenError(#[from] TokenError),
    #[error("account [{account_id}] does not belong to the authenticated user [{username}]")]
    NotOwner {
        account_id: i64,
        username: String
    },
    #[error("account [{0}] not found")]
    AccountNotFound(i64),
    #[error("account [{account_id}] currency mismatch {account_currency} vs {currency}")]
    CurrencyMismatch {
        account_id: i64,
        account_currency: String,
        currency: String
    },
    #[error("{0}")]
    InvalidRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    DatabaseError(String),
    #[error("request to auth provider failed: {0} {1}")]
    RequestError(u16, String)
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::StaleAccount(_) => AppError::Conflict(err.to_string()),
            DatabaseError::SqlxError(e) => AppError::DatabaseError(e.to_string())
        }
    }
}

impl From<auth_provider::Failure> for AppError {
    fn from(e: auth_provider::Failure) -> Self {
        match e {
            auth_provider::Failure::Error(err) => {
                // All auth provider errors are 500 for us; put the auth
                // provider status into the message if there is one.
                AppError::RequestError(
                    err.status.unwrap_or(500),
                    err.message
                )
            },
            auth_provider::Failure::Unauthorized => {
                AppError::Unauthorized
            }
        }
    }
}
