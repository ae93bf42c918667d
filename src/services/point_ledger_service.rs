use crate::entities::{
    PointTransactionKind, point_account_entity as accounts, point_transaction_entity as txs,
};
use crate::error::{AppError, AppResult};
use crate::models::{PaginatedResponse, PaginationParams, PointTransactionResponse};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-account exclusive locks. Every ledger mutation holds its
/// account's lock for the whole read-compute-write cycle; concurrent credits
/// and debits on one account serialize here instead of racing on the balance
/// row. Acquisition is bounded: a held-too-long lock surfaces as the
/// retryable `LockTimeout` instead of blocking the caller forever.
#[derive(Clone)]
pub struct AccountLocks {
    acquire_timeout: Duration,
    locks: Arc<StdMutex<HashMap<i64, Arc<Mutex<()>>>>>,
}

impl AccountLocks {
    pub fn new(acquire_timeout: Duration) -> Self {
        Self {
            acquire_timeout,
            locks: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    fn entry(&self, member_id: i64) -> Arc<Mutex<()>> {
        let mut map = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        map.entry(member_id).or_default().clone()
    }

    pub async fn acquire(&self, member_id: i64) -> AppResult<OwnedMutexGuard<()>> {
        let lock = self.entry(member_id);
        tokio::time::timeout(self.acquire_timeout, lock.lock_owned())
            .await
            .map_err(|_| {
                AppError::LockTimeout(format!("account lock for member {member_id} is busy"))
            })
    }

    /// Acquire several account locks in ascending member-id order. All
    /// multi-account operations must go through here so that two of them can
    /// never hold-and-wait in opposite orders.
    pub async fn acquire_many(&self, member_ids: &[i64]) -> AppResult<Vec<OwnedMutexGuard<()>>> {
        let mut ids: Vec<i64> = member_ids.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut guards = Vec::with_capacity(ids.len());
        for id in ids {
            guards.push(self.acquire(id).await?);
        }
        Ok(guards)
    }
}

#[derive(Clone)]
pub struct PointLedgerService {
    pool: DatabaseConnection,
    locks: AccountLocks,
}

impl PointLedgerService {
    pub fn new(pool: DatabaseConnection, locks: AccountLocks) -> Self {
        Self { pool, locks }
    }

    pub fn locks(&self) -> &AccountLocks {
        &self.locks
    }

    /// Credit `amount` points to the member's account.
    pub async fn credit(
        &self,
        member_id: i64,
        amount: i64,
        reason: &str,
        period: &str,
    ) -> AppResult<txs::Model> {
        let _guard = self.locks.acquire(member_id).await?;
        let txn = self.pool.begin().await?;
        let (_, entry) = self
            .credit_locked(&txn, member_id, amount, reason, period)
            .await?;
        txn.commit().await?;
        Ok(entry)
    }

    /// Debit `amount` points from the member's account.
    pub async fn debit(
        &self,
        member_id: i64,
        amount: i64,
        reason: &str,
        period: &str,
    ) -> AppResult<txs::Model> {
        let _guard = self.locks.acquire(member_id).await?;
        let txn = self.pool.begin().await?;
        let (_, entry) = self
            .debit_locked(&txn, member_id, amount, reason, period)
            .await?;
        txn.commit().await?;
        Ok(entry)
    }

    /// Credit inside a caller-owned transaction. The caller must hold the
    /// member's account lock for the life of the transaction.
    pub async fn credit_locked(
        &self,
        txn: &DatabaseTransaction,
        member_id: i64,
        amount: i64,
        reason: &str,
        period: &str,
    ) -> AppResult<(accounts::Model, txs::Model)> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount(format!(
                "credit amount must be positive, got {amount}"
            )));
        }

        let account = self.ensure_account(txn, member_id).await?;
        let mut am = account.clone().into_active_model();
        am.balance = Set(account.balance + amount);
        am.total_earned = Set(account.total_earned + amount);
        am.updated_at = Set(Some(Utc::now()));
        let account = am.update(txn).await?;

        let entry = txs::ActiveModel {
            account_id: Set(account.id),
            kind: Set(PointTransactionKind::Earn),
            amount: Set(amount),
            reason: Set(reason.to_string()),
            period: Set(period.to_string()),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        log::info!("Credited {amount} points to member {member_id}: {reason}");
        Ok((account, entry))
    }

    /// Debit inside a caller-owned transaction. The caller must hold the
    /// member's account lock for the life of the transaction. The balance
    /// check happens before any mutation; a short account never goes
    /// negative and never gets a dangling ledger entry.
    pub async fn debit_locked(
        &self,
        txn: &DatabaseTransaction,
        member_id: i64,
        amount: i64,
        reason: &str,
        period: &str,
    ) -> AppResult<(accounts::Model, txs::Model)> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount(format!(
                "debit amount must be positive, got {amount}"
            )));
        }

        let account = self.ensure_account(txn, member_id).await?;
        if account.balance < amount {
            return Err(AppError::InsufficientBalance(format!(
                "member {member_id} has {} points, needs {amount}",
                account.balance
            )));
        }

        let mut am = account.clone().into_active_model();
        am.balance = Set(account.balance - amount);
        am.updated_at = Set(Some(Utc::now()));
        let account = am.update(txn).await?;

        let entry = txs::ActiveModel {
            account_id: Set(account.id),
            kind: Set(PointTransactionKind::Spend),
            amount: Set(amount),
            reason: Set(reason.to_string()),
            period: Set(period.to_string()),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(txn)
        .await?;

        log::info!("Debited {amount} points from member {member_id}: {reason}");
        Ok((account, entry))
    }

    pub async fn balance(&self, member_id: i64) -> AppResult<i64> {
        let account = accounts::Entity::find()
            .filter(accounts::Column::MemberId.eq(member_id))
            .one(&self.pool)
            .await?;
        Ok(account.map(|a| a.balance).unwrap_or(0))
    }

    pub async fn account(&self, member_id: i64) -> AppResult<Option<accounts::Model>> {
        accounts::Entity::find()
            .filter(accounts::Column::MemberId.eq(member_id))
            .one(&self.pool)
            .await
            .map_err(Into::into)
    }

    /// Ledger listing, newest first.
    pub async fn history(
        &self,
        member_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<PointTransactionResponse>> {
        let Some(account) = self.account(member_id).await? else {
            return Ok(PaginatedResponse::new(Vec::new(), params, 0));
        };

        let base_query = txs::Entity::find().filter(txs::Column::AccountId.eq(account.id));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items = base_query
            .order_by(txs::Column::Id, Order::Desc)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(PointTransactionResponse::from)
            .collect();

        Ok(PaginatedResponse::new(items, params, total))
    }

    async fn ensure_account(
        &self,
        txn: &DatabaseTransaction,
        member_id: i64,
    ) -> AppResult<accounts::Model> {
        if let Some(account) = accounts::Entity::find()
            .filter(accounts::Column::MemberId.eq(member_id))
            .one(txn)
            .await?
        {
            return Ok(account);
        }
        accounts::ActiveModel {
            member_id: Set(member_id),
            balance: Set(0),
            total_earned: Set(0),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(txn)
        .await
        .map_err(Into::into)
    }
}
