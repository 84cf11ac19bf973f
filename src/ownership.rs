use tracing::warn;

use crate::{
    db::DatabaseClient,
    errors::AppError,
    model::{Account, TransferParams}
};

pub fn ensure_owner(account: &Account, username: &str) -> Result<(), AppError> {
    if account.owner == username {
        Ok(())
    }
    else {
        warn!(account_id = account.id, %username, "account ownership mismatch");
        Err(AppError::NotOwner {
            account_id: account.id,
            username: username.into()
        })
    }
}

/// Fetches an account and checks that it holds `currency`.
pub async fn valid_account<C>(
    db: &C,
    account_id: i64,
    currency: &str
) -> Result<Account, AppError>
where
    C: DatabaseClient + Send + Sync + ?Sized
{
    let account = db.get_account(account_id)
        .await?
        .ok_or(AppError::AccountNotFound(account_id))?;

    if account.currency != currency {
        return Err(AppError::CurrencyMismatch {
            account_id,
            account_currency: account.currency,
            currency: currency.into()
        });
    }

    Ok(account)
}

/// Checks everything a transfer needs before any money moves: both
/// accounts exist and hold the transfer currency, and the source account
/// belongs to `username`. The destination may belong to anyone.
pub async fn authorize_transfer<C>(
    db: &C,
    username: &str,
    params: &TransferParams
) -> Result<(Account, Account), AppError>
where
    C: DatabaseClient + Send + Sync + ?Sized
{
    let from_account = valid_account(
        db,
        params.from_account_id,
        &params.currency
    ).await?;

    ensure_owner(&from_account, username)?;

    let to_account = valid_account(
        db,
        params.to_account_id,
        &params.currency
    ).await?;

    Ok((from_account, to_account))
}
