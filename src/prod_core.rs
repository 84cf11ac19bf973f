use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::{
    auth_provider::AuthProvider,
    core::Core,
    db::DatabaseClient,
    errors::AppError,
    maker::MakerArc,
    model::{Account, CreateAccountParams, ListAccountsParams, LoginParams, LoginResponse, TransferParams, TransferTxParams, TransferTxResult},
    ownership::{authorize_transfer, ensure_owner}
};

pub struct ProdCore<C: DatabaseClient, A: AuthProvider> {
    pub db: C,
    pub auth: A,
    pub maker: MakerArc,
    pub access_token_duration: Duration,
    pub now: fn() -> DateTime<Utc>
}

#[async_trait]
impl<C, A> Core for ProdCore<C, A>
where
    C: DatabaseClient + Send + Sync,
    A: AuthProvider + Send + Sync
{
    async fn login(
        &self,
        params: &LoginParams
    ) -> Result<LoginResponse, AppError>
    {
        let username = self.auth.login(&params.username, &params.password)
            .await?;

        let access_token = self.maker.create_token(
            &username,
            self.access_token_duration
        )?;

        info!(%username, "issued access token");

        Ok(LoginResponse { access_token, username })
    }

    async fn create_account(
        &self,
        owner: &str,
        params: &CreateAccountParams
    ) -> Result<Account, AppError>
    {
        Ok(
            self.db.create_account(
                owner,
                &params.currency,
                (self.now)().timestamp()
            ).await?
        )
    }

    async fn get_account(
        &self,
        owner: &str,
        id: i64
    ) -> Result<Account, AppError>
    {
        let account = self.db.get_account(id)
            .await?
            .ok_or(AppError::AccountNotFound(id))?;

        ensure_owner(&account, owner)?;
        Ok(account)
    }

    async fn list_accounts(
        &self,
        owner: &str,
        params: &ListAccountsParams
    ) -> Result<Vec<Account>, AppError>
    {
        Ok(
            self.db.list_accounts(
                owner,
                params.limit(),
                params.offset()
            ).await?
        )
    }

    async fn create_transfer(
        &self,
        owner: &str,
        params: &TransferParams
    ) -> Result<TransferTxResult, AppError>
    {
        authorize_transfer(&self.db, owner, params).await?;

        let result = self.db.transfer_tx(
            &TransferTxParams {
                owner: owner.into(),
                currency: params.currency.clone(),
                from_account_id: params.from_account_id,
                to_account_id: params.to_account_id,
                amount: params.amount,
                now: (self.now)().timestamp()
            }
        ).await?;

        info!(
            transfer_id = result.transfer.id,
            from = params.from_account_id,
            to = params.to_account_id,
            amount = params.amount,
            "transfer complete"
        );

        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::sync::Arc;

    use crate::{
        auth_provider::{self, Failure},
        jwt::JWTMaker,
        maker::TokenError,
        memory::MemoryDatabaseClient
    };

    const KEY: &[u8] = b"12345678901234567890123456789012";

    struct FixedAuth(Result<&'static str, u16>);

    #[async_trait]
    impl AuthProvider for FixedAuth {
        async fn login(
            &self,
            _username: &str,
            _password: &str
        ) -> Result<String, Failure>
        {
            match self.0 {
                Ok(u) => Ok(u.into()),
                Err(401) => Err(Failure::Unauthorized),
                Err(s) => Err(Failure::Error(auth_provider::Error {
                    status: Some(s),
                    message: "nope".into()
                }))
            }
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn core(
        db: MemoryDatabaseClient,
        auth: FixedAuth
    ) -> ProdCore<MemoryDatabaseClient, FixedAuth>
    {
        ProdCore {
            db,
            auth,
            maker: Arc::new(JWTMaker::new(KEY).unwrap()),
            access_token_duration: Duration::minutes(15),
            now: fixed_now
        }
    }

    fn accounts() -> MemoryDatabaseClient {
        MemoryDatabaseClient::with_accounts(&[
            ("alice", 100, "USD"),
            ("bob", 100, "USD"),
            ("alice", 100, "EUR")
        ])
    }

    fn transfer(from: i64, to: i64, amount: i64, currency: &str) -> TransferParams {
        TransferParams {
            from_account_id: from,
            to_account_id: to,
            amount,
            currency: currency.into()
        }
    }

    fn login_params() -> LoginParams {
        LoginParams {
            username: "alice".into(),
            password: "hunter2".into()
        }
    }

    #[tokio::test]
    async fn login_issues_verifiable_token() {
        let c = core(accounts(), FixedAuth(Ok("alice")));
        let resp = c.login(&login_params()).await.unwrap();
        assert_eq!(resp.username, "alice");

        let payload = c.maker.verify_token(&resp.access_token).unwrap();
        assert_eq!(payload.username, "alice");
        assert_eq!(
            payload.expires_at - payload.issued_at,
            Duration::minutes(15)
        );
    }

    #[tokio::test]
    async fn login_unauthorized() {
        let c = core(accounts(), FixedAuth(Err(401)));
        assert!(matches!(
            c.login(&login_params()).await.unwrap_err(),
            AppError::Unauthorized
        ));
    }

    #[tokio::test]
    async fn login_provider_error() {
        let c = core(accounts(), FixedAuth(Err(502)));
        assert!(matches!(
            c.login(&login_params()).await.unwrap_err(),
            AppError::RequestError(502, _)
        ));
    }

    #[tokio::test]
    async fn login_bad_duration() {
        let mut c = core(accounts(), FixedAuth(Ok("alice")));
        c.maker = Arc::new(
            JWTMaker::new(KEY).unwrap().with_clock(|| DateTime::<Utc>::MAX_UTC)
        );
        assert!(matches!(
            c.login(&login_params()).await.unwrap_err(),
            AppError::TokenError(TokenError::InvalidDuration)
        ));
    }

    #[tokio::test]
    async fn create_account_ok() {
        let c = core(accounts(), FixedAuth(Ok("alice")));
        let a = c.create_account(
            "carol",
            &CreateAccountParams { currency: "CAD".into() }
        ).await.unwrap();

        assert_eq!(a.owner, "carol");
        assert_eq!(a.balance, 0);
        assert_eq!(a.currency, "CAD");
        assert_eq!(a.created_at, 1_700_000_000);
    }

    #[tokio::test]
    async fn get_account_owner() {
        let c = core(accounts(), FixedAuth(Ok("alice")));
        assert_eq!(c.get_account("alice", 1).await.unwrap().id, 1);
        assert!(matches!(
            c.get_account("bob", 1).await.unwrap_err(),
            AppError::NotOwner { account_id: 1, .. }
        ));
        assert!(matches!(
            c.get_account("alice", 99).await.unwrap_err(),
            AppError::AccountNotFound(99)
        ));
    }

    #[tokio::test]
    async fn list_accounts_only_own() {
        let c = core(accounts(), FixedAuth(Ok("alice")));
        let list = c.list_accounts(
            "alice",
            &ListAccountsParams { page_id: 1, page_size: 5 }
        ).await.unwrap();

        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|a| a.owner == "alice"));
    }

    #[tokio::test]
    async fn transfer_ok() {
        let c = core(accounts(), FixedAuth(Ok("alice")));
        let r = c.create_transfer("alice", &transfer(1, 2, 30, "USD"))
            .await
            .unwrap();

        assert_eq!(r.from_account.balance, 70);
        assert_eq!(r.to_account.balance, 130);
        assert_eq!(r.from_entry.amount, -30);
        assert_eq!(r.to_entry.amount, 30);
        assert_eq!(r.transfer.amount, 30);
        assert_eq!(c.db.balance(1), 70);
        assert_eq!(c.db.balance(2), 130);
    }

    #[tokio::test]
    async fn transfer_not_owner_moves_nothing() {
        let c = core(accounts(), FixedAuth(Ok("bob")));
        let err = c.create_transfer("bob", &transfer(1, 2, 30, "USD"))
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "account [1] does not belong to the authenticated user [bob]"
        );
        assert_eq!(c.db.balance(1), 100);
        assert_eq!(c.db.balance(2), 100);
        assert_eq!(c.db.transfer_count(), 0);
    }

    #[tokio::test]
    async fn transfer_currency_mismatch_moves_nothing() {
        let c = core(accounts(), FixedAuth(Ok("alice")));
        assert!(matches!(
            c.create_transfer("alice", &transfer(3, 2, 30, "USD")).await.unwrap_err(),
            AppError::CurrencyMismatch { account_id: 3, .. }
        ));
        assert_eq!(c.db.balance(3), 100);
        assert_eq!(c.db.balance(2), 100);
        assert_eq!(c.db.transfer_count(), 0);
    }

    #[tokio::test]
    async fn transfer_to_foreign_account_allowed() {
        let c = core(accounts(), FixedAuth(Ok("bob")));
        let r = c.create_transfer("bob", &transfer(2, 1, 5, "USD"))
            .await
            .unwrap();
        assert_eq!(r.to_account.owner, "alice");
        assert_eq!(c.db.balance(1), 105);
    }
}
