use async_trait::async_trait;
use std::{
    collections::BTreeMap,
    sync::Mutex
};

use crate::{
    db::{DatabaseClient, DatabaseError},
    model::{Account, Entry, Transfer, TransferTxParams, TransferTxResult}
};

#[derive(Default)]
struct Tables {
    accounts: BTreeMap<i64, Account>,
    entries: Vec<Entry>,
    transfers: Vec<Transfer>
}

/// In-memory stand-in for the SQLite client.
#[derive(Default)]
pub struct MemoryDatabaseClient(Mutex<Tables>);

impl MemoryDatabaseClient {
    pub fn with_accounts(accounts: &[(&str, i64, &str)]) -> Self {
        let db = MemoryDatabaseClient::default();
        {
            let mut t = db.0.lock().unwrap();
            for (i, (owner, balance, currency)) in accounts.iter().enumerate() {
                let id = i as i64 + 1;
                t.accounts.insert(id, Account {
                    id,
                    owner: owner.to_string(),
                    balance: *balance,
                    currency: currency.to_string(),
                    created_at: 0
                });
            }
        }
        db
    }

    pub fn balance(&self, id: i64) -> i64 {
        self.0.lock().unwrap().accounts[&id].balance
    }

    pub fn transfer_count(&self) -> usize {
        self.0.lock().unwrap().transfers.len()
    }
}

#[async_trait]
impl DatabaseClient for MemoryDatabaseClient {
    async fn create_account(
        &self,
        owner: &str,
        currency: &str,
        now: i64
    ) -> Result<Account, DatabaseError>
    {
        let mut t = self.0.lock().unwrap();
        let id = t.accounts.keys().last().copied().unwrap_or(0) + 1;
        let account = Account {
            id,
            owner: owner.into(),
            balance: 0,
            currency: currency.into(),
            created_at: now
        };
        t.accounts.insert(id, account.clone());
        Ok(account)
    }

    async fn get_account(
        &self,
        id: i64
    ) -> Result<Option<Account>, DatabaseError>
    {
        Ok(self.0.lock().unwrap().accounts.get(&id).cloned())
    }

    async fn list_accounts(
        &self,
        owner: &str,
        limit: u32,
        offset: u32
    ) -> Result<Vec<Account>, DatabaseError>
    {
        Ok(
            self.0.lock().unwrap().accounts.values()
                .filter(|a| a.owner == owner)
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect()
        )
    }

    async fn transfer_tx(
        &self,
        params: &TransferTxParams
    ) -> Result<TransferTxResult, DatabaseError>
    {
        let mut t = self.0.lock().unwrap();

        match t.accounts.get(&params.from_account_id) {
            Some(a) if a.owner == params.owner && a.currency == params.currency => {},
            _ => return Err(DatabaseError::StaleAccount(params.from_account_id))
        }

        match t.accounts.get(&params.to_account_id) {
            Some(a) if a.currency == params.currency => {},
            _ => return Err(DatabaseError::StaleAccount(params.to_account_id))
        }

        let transfer = Transfer {
            id: t.transfers.len() as i64 + 1,
            from_account_id: params.from_account_id,
            to_account_id: params.to_account_id,
            amount: params.amount,
            created_at: params.now
        };
        t.transfers.push(transfer.clone());

        let mut entry = |account_id, amount| {
            let e = Entry {
                id: t.entries.len() as i64 + 1,
                account_id,
                amount,
                created_at: params.now
            };
            t.entries.push(e.clone());
            e
        };

        let from_entry = entry(params.from_account_id, -params.amount);
        let to_entry = entry(params.to_account_id, params.amount);

        if let Some(a) = t.accounts.get_mut(&params.from_account_id) {
            a.balance -= params.amount;
        }

        if let Some(a) = t.accounts.get_mut(&params.to_account_id) {
            a.balance += params.amount;
        }

        Ok(TransferTxResult {
            transfer,
            from_account: t.accounts[&params.from_account_id].clone(),
            to_account: t.accounts[&params.to_account_id].clone(),
            from_entry,
            to_entry
        })
    }
}
