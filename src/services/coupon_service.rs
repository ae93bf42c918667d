use crate::entities::{
    coupon_entity as coupons, issued_coupon_entity as issued, payment_coupon_entity as attachments,
};
use crate::error::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, QueryFilter, Set,
};

/// Coupon issuance and lifecycle. Tentative payment attachment lives on the
/// payment side (`payment_coupons`); only consumption mutates the issued
/// coupon row itself, and only once.
#[derive(Clone)]
pub struct CouponService {
    pool: DatabaseConnection,
}

impl CouponService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn create_coupon(&self, name: &str, discount_amount: i64) -> AppResult<coupons::Model> {
        if discount_amount <= 0 {
            return Err(AppError::InvalidAmount(format!(
                "coupon discount must be positive, got {discount_amount}"
            )));
        }
        coupons::ActiveModel {
            name: Set(name.to_string()),
            discount_amount: Set(discount_amount),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Issue a coupon to a member. Always valid and unassigned at creation.
    pub async fn issue(&self, coupon_id: i64, member_id: i64) -> AppResult<issued::Model> {
        coupons::Entity::find_by_id(coupon_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("coupon {coupon_id} not found")))?;

        issued::ActiveModel {
            coupon_id: Set(coupon_id),
            member_id: Set(member_id),
            is_valid: Set(true),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_issued(&self, issued_coupon_id: i64) -> AppResult<issued::Model> {
        issued::Entity::find_by_id(issued_coupon_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("issued coupon {issued_coupon_id} not found")))
    }

    pub async fn find_issued_in(
        &self,
        txn: &DatabaseTransaction,
        issued_coupon_id: i64,
    ) -> AppResult<issued::Model> {
        issued::Entity::find_by_id(issued_coupon_id)
            .one(txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("issued coupon {issued_coupon_id} not found")))
    }

    /// Tentatively attach a coupon to a payment. A no-op when already
    /// attached to the same payment; otherwise any prior attachment is
    /// dropped first so the coupon is linked to at most one payment.
    /// Validity is untouched either way. Returns the payment the coupon was
    /// detached from, if any, so the caller can recompute that payment's
    /// price.
    pub async fn assign(
        &self,
        txn: &DatabaseTransaction,
        issued_coupon_id: i64,
        payment_id: i64,
    ) -> AppResult<Option<i64>> {
        let existing = attachments::Entity::find()
            .filter(attachments::Column::IssuedCouponId.eq(issued_coupon_id))
            .one(txn)
            .await?;

        let displaced = match existing {
            Some(row) if row.payment_id == payment_id => return Ok(None),
            Some(row) => {
                attachments::Entity::delete_by_id(row.id).exec(txn).await?;
                Some(row.payment_id)
            }
            None => None,
        };

        attachments::ActiveModel {
            payment_id: Set(payment_id),
            issued_coupon_id: Set(issued_coupon_id),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        Ok(displaced)
    }

    /// Drop a coupon's tentative attachment, if any. Validity is untouched.
    pub async fn detach(&self, txn: &DatabaseTransaction, issued_coupon_id: i64) -> AppResult<()> {
        attachments::Entity::delete_many()
            .filter(attachments::Column::IssuedCouponId.eq(issued_coupon_id))
            .exec(txn)
            .await?;
        Ok(())
    }

    /// Consume a coupon for a payment. Irreversible: flips `is_valid`,
    /// stamps `used_at` and the consuming payment. An already-invalid coupon
    /// is rejected no matter which payment asks.
    pub async fn use_coupon(
        &self,
        txn: &DatabaseTransaction,
        issued_coupon_id: i64,
        payment_id: i64,
    ) -> AppResult<issued::Model> {
        let coupon = issued::Entity::find_by_id(issued_coupon_id)
            .one(txn)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("issued coupon {issued_coupon_id} not found"))
            })?;

        if !coupon.is_valid {
            return Err(AppError::CouponAlreadyUsed(format!(
                "issued coupon {issued_coupon_id} was already used"
            )));
        }

        let mut am = coupon.into_active_model();
        am.is_valid = Set(false);
        am.used_at = Set(Some(Utc::now()));
        am.used_payment_id = Set(Some(payment_id));
        am.update(txn).await.map_err(Into::into)
    }

    /// The payment's attached-coupon set (issued coupon rows), in
    /// attachment order.
    pub async fn attached_to_payment(
        &self,
        txn: &DatabaseTransaction,
        payment_id: i64,
    ) -> AppResult<Vec<issued::Model>> {
        let rows = attachments::Entity::find()
            .filter(attachments::Column::PaymentId.eq(payment_id))
            .all(txn)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let coupon = issued::Entity::find_by_id(row.issued_coupon_id)
                .one(txn)
                .await?
                .ok_or_else(|| {
                    AppError::InternalError(format!(
                        "attachment {} points at missing issued coupon {}",
                        row.id, row.issued_coupon_id
                    ))
                })?;
            out.push(coupon);
        }
        Ok(out)
    }

    /// Derived reverse index: the payment a coupon is tentatively attached
    /// to, if any.
    pub async fn assigned_payment(&self, issued_coupon_id: i64) -> AppResult<Option<i64>> {
        Ok(attachments::Entity::find()
            .filter(attachments::Column::IssuedCouponId.eq(issued_coupon_id))
            .one(&self.pool)
            .await?
            .map(|row| row.payment_id))
    }

    pub async fn discount_amount(
        &self,
        txn: &DatabaseTransaction,
        coupon_id: i64,
    ) -> AppResult<i64> {
        coupons::Entity::find_by_id(coupon_id)
            .one(txn)
            .await?
            .map(|c| c.discount_amount)
            .ok_or_else(|| AppError::NotFound(format!("coupon {coupon_id} not found")))
    }
}
