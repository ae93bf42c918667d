use crate::entities::{DepositKind, deposit_entity as deposits};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Structured form of one bank notification. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDeposit {
    pub kind: DepositKind,
    pub amount: i64,
    pub depositor_name: String,
    pub balance_after: i64,
    /// Wall-clock year is assumed; the source format carries none.
    pub deposited_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositSnapshot {
    pub id: i64,
    pub kind: DepositKind,
    pub amount: i64,
    pub depositor_name: String,
    pub balance_after: i64,
    pub deposited_at: chrono::DateTime<chrono::Utc>,
}

impl From<&deposits::Model> for DepositSnapshot {
    fn from(m: &deposits::Model) -> Self {
        Self {
            id: m.id,
            kind: m.kind,
            amount: m.amount,
            depositor_name: m.depositor_name.clone(),
            balance_after: m.balance_after,
            deposited_at: m.deposited_at,
        }
    }
}
