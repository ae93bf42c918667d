use crate::entities::{ShopPrize, payment_entity as payments, point_shop_draw_entity as draws};
use crate::models::DepositSnapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of a payment at completion time, carried by
/// `Fact::PaymentCompleted`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentSnapshot {
    pub id: i64,
    pub member_id: i64,
    pub period: String,
    pub original_price: i64,
    pub final_price: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<&payments::Model> for PaymentSnapshot {
    fn from(m: &payments::Model) -> Self {
        Self {
            id: m.id,
            member_id: m.member_id,
            period: m.period.clone(),
            original_price: m.original_price,
            final_price: m.final_price,
            created_at: m.created_at,
            completed_at: m.completed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawSnapshot {
    pub id: i64,
    pub member_id: i64,
    pub prize: ShopPrize,
    pub point_transaction_id: i64,
}

impl From<&draws::Model> for DrawSnapshot {
    fn from(m: &draws::Model) -> Self {
        Self {
            id: m.id,
            member_id: m.member_id,
            prize: m.prize,
            point_transaction_id: m.point_transaction_id,
        }
    }
}

/// Facts published through the durable outbox after the originating
/// transaction commits. Consumers are idempotent; delivery is
/// at-least-once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fact {
    PaymentCompleted {
        payment: PaymentSnapshot,
    },
    /// Deposit matched no pending payment; terminal, needs an operator.
    DepositMismatch {
        deposit: DepositSnapshot,
    },
    /// Several members share the depositor name; never auto-resolved.
    DepositNameConflict {
        deposit: DepositSnapshot,
        member_ids: Vec<i64>,
    },
    StudyAttendanceMarked {
        session_id: i64,
        participant_id: i64,
    },
    PointShopDrawn {
        draw: DrawSnapshot,
    },
}

impl Fact {
    pub fn kind(&self) -> &'static str {
        match self {
            Fact::PaymentCompleted { .. } => "payment_completed",
            Fact::DepositMismatch { .. } => "deposit_mismatch",
            Fact::DepositNameConflict { .. } => "deposit_name_conflict",
            Fact::StudyAttendanceMarked { .. } => "study_attendance_marked",
            Fact::PointShopDrawn { .. } => "point_shop_drawn",
        }
    }
}
