use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const SUPPORTED_CURRENCIES: &[&str] = &["USD", "EUR", "CAD"];

fn check_currency(currency: &str) -> Result<(), AppError> {
    match SUPPORTED_CURRENCIES.contains(&currency) {
        true => Ok(()),
        false => Err(AppError::InvalidRequest(
            format!("unsupported currency {currency}")
        ))
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct LoginParams {
    pub username: String,
    pub password: String
}

#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub username: String
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub owner: String,
    pub balance: i64,
    pub currency: String,
    pub created_at: i64
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, sqlx::FromRow)]
pub struct Entry {
    pub id: i64,
    pub account_id: i64,
    // negative for debits
    pub amount: i64,
    pub created_at: i64
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, sqlx::FromRow)]
pub struct Transfer {
    pub id: i64,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub created_at: i64
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateAccountParams {
    pub currency: String
}

impl CreateAccountParams {
    pub fn validate(&self) -> Result<(), AppError> {
        check_currency(&self.currency)
    }
}

#[derive(Debug, Deserialize)]
pub struct ListAccountsParams {
    pub page_id: u32,
    pub page_size: u32
}

impl ListAccountsParams {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.page_id < 1 {
            return Err(AppError::InvalidRequest("page_id must be at least 1".into()));
        }

        if !(5..=10).contains(&self.page_size) {
            return Err(AppError::InvalidRequest("page_size must be from 5 to 10".into()));
        }

        Ok(())
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> u32 {
        self.page_id.saturating_sub(1).saturating_mul(self.page_size)
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TransferParams {
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub currency: String
}

impl TransferParams {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.from_account_id < 1 || self.to_account_id < 1 {
            return Err(AppError::InvalidRequest("account ids must be at least 1".into()));
        }

        if self.amount <= 0 {
            return Err(AppError::InvalidRequest("amount must be positive".into()));
        }

        check_currency(&self.currency)
    }
}

/// What the persistence layer needs to carry out a checked transfer.
#[derive(Debug)]
pub struct TransferTxParams {
    // expected owner of the source account
    pub owner: String,
    pub currency: String,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub amount: i64,
    pub now: i64
}

#[derive(Debug, Deserialize, PartialEq, Serialize)]
pub struct TransferTxResult {
    pub transfer: Transfer,
    pub from_account: Account,
    pub to_account: Account,
    pub from_entry: Entry,
    pub to_entry: Entry
}
