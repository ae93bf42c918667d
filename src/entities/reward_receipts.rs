use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Existence of a row proves the credit for one logical fact was already
/// granted. The unique index on `idempotency_key` is what makes concurrent
/// duplicate deliveries collapse to a single grant.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "reward_receipts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub idempotency_key: String,
    pub member_id: i64,
    pub point_transaction_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
