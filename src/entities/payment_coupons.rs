use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// The payment-owned set of tentatively attached coupons, replaced wholesale
/// by `apply_coupons`. Unique on `issued_coupon_id`: a coupon is attached to
/// at most one payment at a time.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "payment_coupons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub payment_id: i64,
    pub issued_coupon_id: i64,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
