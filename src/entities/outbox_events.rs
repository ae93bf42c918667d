use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// Durable outbox row. Appended in the same transaction as the state change
/// it describes; `dispatched_at` is stamped only after a handler succeeded,
/// so delivery is at-least-once and receivers must be idempotent.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "outbox_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub kind: String,
    pub payload: Json,
    pub created_at: Option<DateTime<Utc>>,
    pub dispatched_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
