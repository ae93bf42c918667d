use crate::entities::{
    PointTransactionKind, point_account_entity as accounts, point_transaction_entity as txs,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PointHistoryQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PointAccountResponse {
    pub member_id: i64,
    pub balance: i64,
    pub total_earned: i64,
}

impl From<accounts::Model> for PointAccountResponse {
    fn from(m: accounts::Model) -> Self {
        Self {
            member_id: m.member_id,
            balance: m.balance,
            total_earned: m.total_earned,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PointTransactionResponse {
    pub id: i64,
    pub kind: PointTransactionKind,
    pub amount: i64,
    pub reason: String,
    pub period: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<txs::Model> for PointTransactionResponse {
    fn from(m: txs::Model) -> Self {
        Self {
            id: m.id,
            kind: m.kind,
            amount: m.amount,
            reason: m.reason,
            period: m.period,
            created_at: m.created_at,
        }
    }
}

/// Admin manual-grant surface. `request_id` is a stable client-supplied
/// token; retried submissions with the same id never double-grant.
#[derive(Debug, Deserialize)]
pub struct ManualGrantRequest {
    pub request_id: String,
    pub member_ids: Vec<i64>,
    pub amount: i64,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct ManualGrantResponse {
    pub granted: u32,
    pub skipped: u32,
}

#[derive(Debug, Deserialize)]
pub struct ActivityRewardRequest {
    pub activity_id: i64,
    pub title: String,
    pub member_ids: Vec<i64>,
}
