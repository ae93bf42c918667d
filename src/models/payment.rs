use crate::entities::{PaymentStatus, payment_entity as payments};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterPaymentRequest {
    pub member_id: i64,
    /// Defaults to the current period from the flag snapshot.
    pub period: Option<String>,
    pub original_price: i64,
}

#[derive(Debug, Deserialize)]
pub struct ApplyCouponsRequest {
    pub issued_coupon_ids: Vec<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: i64,
    pub member_id: i64,
    pub period: String,
    pub status: PaymentStatus,
    pub original_price: i64,
    pub final_price: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<payments::Model> for PaymentResponse {
    fn from(m: payments::Model) -> Self {
        Self {
            id: m.id,
            member_id: m.member_id,
            period: m.period,
            status: m.status,
            original_price: m.original_price,
            final_price: m.final_price,
            created_at: m.created_at,
            completed_at: m.completed_at,
        }
    }
}
