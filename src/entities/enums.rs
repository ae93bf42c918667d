use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};

/// Member roles. Promotion happens only through payment completion and only
/// upward (guest -> user); staff/admin are assigned out of band.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum MemberRole {
    #[sea_orm(string_value = "guest")]
    Guest,
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "staff")]
    Staff,
    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "completed")]
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum DepositKind {
    #[sea_orm(string_value = "deposit")]
    Deposit,
    #[sea_orm(string_value = "withdrawal")]
    Withdrawal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum PointTransactionKind {
    #[sea_orm(string_value = "earn")]
    Earn,
    #[sea_orm(string_value = "spend")]
    Spend,
}

/// Point-shop catalog entries. Declaration order is the tie-break order of
/// the weighted draw, so keep it in sync with the catalog in
/// `services::point_shop_service`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
pub enum ShopPrize {
    #[sea_orm(string_value = "blank")]
    Blank,
    #[sea_orm(string_value = "snack_coupon")]
    SnackCoupon,
    #[sea_orm(string_value = "coffee_coupon")]
    CoffeeCoupon,
    #[sea_orm(string_value = "chicken_coupon")]
    ChickenCoupon,
    #[sea_orm(string_value = "meal_voucher")]
    MealVoucher,
}

impl std::fmt::Display for ShopPrize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShopPrize::Blank => write!(f, "blank"),
            ShopPrize::SnackCoupon => write!(f, "snack_coupon"),
            ShopPrize::CoffeeCoupon => write!(f, "coffee_coupon"),
            ShopPrize::ChickenCoupon => write!(f, "chicken_coupon"),
            ShopPrize::MealVoucher => write!(f, "meal_voucher"),
        }
    }
}
