use crate::entities::enums::PointTransactionKind;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Append-only ledger entry. Sum of earn minus sum of spend for an account
/// equals its current balance.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "point_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub account_id: i64,
    pub kind: PointTransactionKind,
    pub amount: i64,
    pub reason: String,
    pub period: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
