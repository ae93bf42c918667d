use crate::entities::enums::DepositKind;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Audit record of a parsed bank notification. Never mutated after insert.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "deposits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub kind: DepositKind,
    pub amount: i64,
    pub depositor_name: String,
    pub balance_after: i64,
    pub deposited_at: DateTime<Utc>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
