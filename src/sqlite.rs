use async_trait::async_trait;
use sqlx::{
    Database, Executor,
    sqlite::{Sqlite, SqliteConnection}
};

use crate::{
    db::{DatabaseClient, DatabaseError},
    model::{Account, Entry, Transfer, TransferTxParams, TransferTxResult}
};

#[derive(Clone)]
pub struct SqlxDatabaseClient<DB: Database>(pub sqlx::Pool<DB>);

#[async_trait]
impl DatabaseClient for SqlxDatabaseClient<Sqlite> {
    async fn create_account(
        &self,
        owner: &str,
        currency: &str,
        now: i64
    ) -> Result<Account, DatabaseError>
    {
        create_account(&self.0, owner, currency, now).await
    }

    async fn get_account(
        &self,
        id: i64
    ) -> Result<Option<Account>, DatabaseError>
    {
        get_account(&self.0, id).await
    }

    async fn list_accounts(
        &self,
        owner: &str,
        limit: u32,
        offset: u32
    ) -> Result<Vec<Account>, DatabaseError>
    {
        list_accounts(&self.0, owner, limit, offset).await
    }

    async fn transfer_tx(
        &self,
        params: &TransferTxParams
    ) -> Result<TransferTxResult, DatabaseError>
    {
        let mut tx = self.0.begin().await?;
        // dropping tx without commit rolls it back
        let result = transfer_tx(&mut *tx, params).await?;
        tx.commit().await?;
        Ok(result)
    }
}

async fn create_account<'e, E>(
    ex: E,
    owner: &str,
    currency: &str,
    now: i64
) -> Result<Account, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>
{
    Ok(
        sqlx::query_as::<_, Account>(
            "
INSERT INTO accounts (
    owner,
    balance,
    currency,
    created_at
)
VALUES (?, 0, ?, ?)
RETURNING id, owner, balance, currency, created_at
            "
        )
        .bind(owner)
        .bind(currency)
        .bind(now)
        .fetch_one(ex)
        .await?
    )
}

async fn get_account<'e, E>(
    ex: E,
    id: i64
) -> Result<Option<Account>, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>
{
    Ok(
        sqlx::query_as::<_, Account>(
            "
SELECT id, owner, balance, currency, created_at
FROM accounts
WHERE id = ?
            "
        )
        .bind(id)
        .fetch_optional(ex)
        .await?
    )
}

async fn list_accounts<'e, E>(
    ex: E,
    owner: &str,
    limit: u32,
    offset: u32
) -> Result<Vec<Account>, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>
{
    Ok(
        sqlx::query_as::<_, Account>(
            "
SELECT id, owner, balance, currency, created_at
FROM accounts
WHERE owner = ?
ORDER BY id
LIMIT ? OFFSET ?
            "
        )
        .bind(owner)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(ex)
        .await?
    )
}

async fn create_transfer<'e, E>(
    ex: E,
    params: &TransferTxParams
) -> Result<Transfer, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>
{
    Ok(
        sqlx::query_as::<_, Transfer>(
            "
INSERT INTO transfers (
    from_account_id,
    to_account_id,
    amount,
    created_at
)
VALUES (?, ?, ?, ?)
RETURNING id, from_account_id, to_account_id, amount, created_at
            "
        )
        .bind(params.from_account_id)
        .bind(params.to_account_id)
        .bind(params.amount)
        .bind(params.now)
        .fetch_one(ex)
        .await?
    )
}

async fn create_entry<'e, E>(
    ex: E,
    account_id: i64,
    amount: i64,
    now: i64
) -> Result<Entry, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>
{
    Ok(
        sqlx::query_as::<_, Entry>(
            "
INSERT INTO entries (
    account_id,
    amount,
    created_at
)
VALUES (?, ?, ?)
RETURNING id, account_id, amount, created_at
            "
        )
        .bind(account_id)
        .bind(amount)
        .bind(now)
        .fetch_one(ex)
        .await?
    )
}

// The owner and currency predicates repeat the checks made before the
// transaction started, so a concurrent change to either makes this
// update no row.
async fn debit_account<'e, E>(
    ex: E,
    params: &TransferTxParams
) -> Result<Account, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>
{
    sqlx::query_as::<_, Account>(
        "
UPDATE accounts
SET balance = balance - ?
WHERE id = ? AND owner = ? AND currency = ?
RETURNING id, owner, balance, currency, created_at
        "
    )
    .bind(params.amount)
    .bind(params.from_account_id)
    .bind(&params.owner)
    .bind(&params.currency)
    .fetch_optional(ex)
    .await?
    .ok_or(DatabaseError::StaleAccount(params.from_account_id))
}

async fn credit_account<'e, E>(
    ex: E,
    params: &TransferTxParams
) -> Result<Account, DatabaseError>
where
    E: Executor<'e, Database = Sqlite>
{
    sqlx::query_as::<_, Account>(
        "
UPDATE accounts
SET balance = balance + ?
WHERE id = ? AND currency = ?
RETURNING id, owner, balance, currency, created_at
        "
    )
    .bind(params.amount)
    .bind(params.to_account_id)
    .bind(&params.currency)
    .fetch_optional(ex)
    .await?
    .ok_or(DatabaseError::StaleAccount(params.to_account_id))
}

async fn transfer_tx(
    conn: &mut SqliteConnection,
    params: &TransferTxParams
) -> Result<TransferTxResult, DatabaseError>
{
    let transfer = create_transfer(&mut *conn, params).await?;

    let from_entry = create_entry(
        &mut *conn,
        params.from_account_id,
        -params.amount,
        params.now
    ).await?;

    let to_entry = create_entry(
        &mut *conn,
        params.to_account_id,
        params.amount,
        params.now
    ).await?;

    let from_account = debit_account(&mut *conn, params).await?;
    let to_account = credit_account(&mut *conn, params).await?;

    Ok(TransferTxResult {
        transfer,
        from_account,
        to_account,
        from_entry,
        to_entry
    })
}
