use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Account, TransferTxParams, TransferTxResult};

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("{0}")]
    SqlxError(#[from] sqlx::Error),
    #[error("account [{0}] changed during transfer")]
    StaleAccount(i64)
}

#[async_trait]
pub trait DatabaseClient {
    async fn create_account(
        &self,
        _owner: &str,
        _currency: &str,
        _now: i64
    ) -> Result<Account, DatabaseError>
    {
        unimplemented!();
    }

    async fn get_account(
        &self,
        _id: i64
    ) -> Result<Option<Account>, DatabaseError>
    {
        unimplemented!();
    }

    async fn list_accounts(
        &self,
        _owner: &str,
        _limit: u32,
        _offset: u32
    ) -> Result<Vec<Account>, DatabaseError>
    {
        unimplemented!();
    }

    // The debit must fail with StaleAccount unless the source account still
    // has the expected owner and currency when it is applied.
    async fn transfer_tx(
        &self,
        _params: &TransferTxParams
    ) -> Result<TransferTxResult, DatabaseError>
    {
        unimplemented!();
    }
}
