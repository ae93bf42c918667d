use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Per-member point balance. `balance` never goes negative; `total_earned`
/// only grows. Mutated exclusively through the point ledger's locked API.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "point_accounts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub member_id: i64,
    pub balance: i64,
    pub total_earned: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
