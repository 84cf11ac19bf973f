use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    errors::AppError,
    model::{Account, CreateAccountParams, ListAccountsParams, LoginParams, LoginResponse, TransferParams, TransferTxResult}
};

#[async_trait]
pub trait Core {
    async fn login(
        &self,
        _params: &LoginParams
    ) -> Result<LoginResponse, AppError>
    {
        unimplemented!();
    }

    async fn create_account(
        &self,
        _owner: &str,
        _params: &CreateAccountParams
    ) -> Result<Account, AppError>
    {
        unimplemented!();
    }

    async fn get_account(
        &self,
        _owner: &str,
        _id: i64
    ) -> Result<Account, AppError>
    {
        unimplemented!();
    }

    async fn list_accounts(
        &self,
        _owner: &str,
        _params: &ListAccountsParams
    ) -> Result<Vec<Account>, AppError>
    {
        unimplemented!();
    }

    async fn create_transfer(
        &self,
        _owner: &str,
        _params: &TransferParams
    ) -> Result<TransferTxResult, AppError>
    {
        unimplemented!();
    }
}

pub type CoreArc = Arc<dyn Core + Send + Sync>;
