use crate::entities::{coupon_entity as coupons, issued_coupon_entity as issued};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateCouponRequest {
    pub name: String,
    pub discount_amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct IssueCouponRequest {
    pub coupon_id: i64,
    pub member_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CouponResponse {
    pub id: i64,
    pub name: String,
    pub discount_amount: i64,
}

impl From<coupons::Model> for CouponResponse {
    fn from(m: coupons::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            discount_amount: m.discount_amount,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IssuedCouponResponse {
    pub id: i64,
    pub coupon_id: i64,
    pub member_id: i64,
    pub is_valid: bool,
    pub used_at: Option<DateTime<Utc>>,
    pub used_payment_id: Option<i64>,
}

impl From<issued::Model> for IssuedCouponResponse {
    fn from(m: issued::Model) -> Self {
        Self {
            id: m.id,
            coupon_id: m.coupon_id,
            member_id: m.member_id,
            is_valid: m.is_valid,
            used_at: m.used_at,
            used_payment_id: m.used_payment_id,
        }
    }
}
