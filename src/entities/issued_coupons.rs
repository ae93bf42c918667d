use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// One issuance of a coupon to a member. Tentative payment attachment lives
/// in `payment_coupons` (owned by the payment); this row only records the
/// irreversible consumption (`is_valid`, `used_at`, `used_payment_id`).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "issued_coupons")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub coupon_id: i64,
    pub member_id: i64,
    pub is_valid: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub used_payment_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
