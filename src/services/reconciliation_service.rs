use crate::config::FlagStore;
use crate::entities::{
    DepositKind, PaymentStatus, deposit_entity as deposits, member_entity as members,
    payment_coupon_entity as attachments, payment_entity as payments,
};
use crate::error::{AppError, AppResult};
use crate::external::AlertingClient;
use crate::models::{DepositSnapshot, Fact, PaymentSnapshot};
use crate::services::{CouponService, OutboxService, transaction_parser};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, QueryFilter, QuerySelect, Set, SqlErr, TransactionTrait,
};

/// Matches incoming bank deposits to pending membership payments and drives
/// the payment state machine: `pending --(complete)--> completed`, terminal.
///
/// Matching never guesses. No candidate or more than one candidate is a
/// terminal "operator attention" outcome recorded as a fact; the engine only
/// completes a payment when exactly one pending payment matches on both
/// depositor name and final price.
#[derive(Clone)]
pub struct ReconciliationService {
    pool: DatabaseConnection,
    coupon_service: CouponService,
    outbox: OutboxService,
    flags: FlagStore,
    alerting: AlertingClient,
}

impl ReconciliationService {
    pub fn new(
        pool: DatabaseConnection,
        coupon_service: CouponService,
        outbox: OutboxService,
        flags: FlagStore,
        alerting: AlertingClient,
    ) -> Self {
        Self {
            pool,
            coupon_service,
            outbox,
            flags,
            alerting,
        }
    }

    /// Open a pending payment for (member, period).
    pub async fn register_payment(
        &self,
        member_id: i64,
        period: Option<String>,
        original_price: i64,
    ) -> AppResult<payments::Model> {
        if original_price <= 0 {
            return Err(AppError::InvalidAmount(format!(
                "payment price must be positive, got {original_price}"
            )));
        }
        members::Entity::find_by_id(member_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("member {member_id} not found")))?;

        let period = period.unwrap_or_else(|| self.flags.snapshot().current_period);

        payments::ActiveModel {
            member_id: Set(member_id),
            period: Set(period.clone()),
            status: Set(PaymentStatus::Pending),
            original_price: Set(original_price),
            final_price: Set(original_price),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::ValidationError(format!(
                "member {member_id} already has a payment for {period}"
            )),
            _ => e.into(),
        })
    }

    pub async fn find_payment(&self, payment_id: i64) -> AppResult<payments::Model> {
        payments::Entity::find_by_id(payment_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("payment {payment_id} not found")))
    }

    /// Replace a pending payment's attached-coupon set wholesale and
    /// recompute its final price. Re-applying the same set is a no-op on the
    /// resulting price: the old set is cleared before the new one is
    /// attached, so nothing accumulates.
    pub async fn apply_coupons(
        &self,
        payment_id: i64,
        issued_coupon_ids: &[i64],
    ) -> AppResult<payments::Model> {
        let txn = self.pool.begin().await?;

        let payment = payments::Entity::find_by_id(payment_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("payment {payment_id} not found")))?;

        if payment.status != PaymentStatus::Pending {
            return Err(AppError::ValidationError(format!(
                "payment {payment_id} is already completed"
            )));
        }

        // ordered set semantics: preserve request order, drop duplicates
        let mut ids: Vec<i64> = Vec::with_capacity(issued_coupon_ids.len());
        for id in issued_coupon_ids {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }

        let mut total_discount = 0i64;
        for issued_coupon_id in &ids {
            let issued = self
                .coupon_service
                .find_issued_in(&txn, *issued_coupon_id)
                .await?;
            if issued.member_id != payment.member_id {
                return Err(AppError::ValidationError(format!(
                    "issued coupon {issued_coupon_id} does not belong to member {}",
                    payment.member_id
                )));
            }
            if !issued.is_valid {
                return Err(AppError::CouponAlreadyUsed(format!(
                    "issued coupon {issued_coupon_id} was already used"
                )));
            }
            total_discount += self
                .coupon_service
                .discount_amount(&txn, issued.coupon_id)
                .await?;
        }

        // clear and re-attach as a unit
        attachments::Entity::delete_many()
            .filter(attachments::Column::PaymentId.eq(payment_id))
            .exec(&txn)
            .await?;
        let mut displaced: Vec<i64> = Vec::new();
        for issued_coupon_id in &ids {
            if let Some(previous) = self
                .coupon_service
                .assign(&txn, *issued_coupon_id, payment_id)
                .await?
                && previous != payment_id
                && !displaced.contains(&previous)
            {
                displaced.push(previous);
            }
        }

        let final_price = (payment.original_price - total_discount).max(0);
        let mut am = payment.into_active_model();
        am.final_price = Set(final_price);
        let payment = am.update(&txn).await?;

        // payments that lost a coupon to this one get their price restored
        for previous in displaced {
            self.recompute_final_price(&txn, previous).await?;
        }

        txn.commit().await?;
        Ok(payment)
    }

    async fn recompute_final_price(
        &self,
        txn: &DatabaseTransaction,
        payment_id: i64,
    ) -> AppResult<()> {
        let Some(payment) = payments::Entity::find_by_id(payment_id).one(txn).await? else {
            return Ok(());
        };
        if payment.status != PaymentStatus::Pending {
            return Ok(());
        }

        let mut total_discount = 0i64;
        for issued in self.coupon_service.attached_to_payment(txn, payment_id).await? {
            total_discount += self
                .coupon_service
                .discount_amount(txn, issued.coupon_id)
                .await?;
        }

        let final_price = (payment.original_price - total_discount).max(0);
        if final_price != payment.final_price {
            let mut am = payment.into_active_model();
            am.final_price = Set(final_price);
            am.update(txn).await?;
        }
        Ok(())
    }

    /// Process one raw bank notification. The deposit is recorded for audit
    /// no matter what; only deposits (not withdrawals) enter matching.
    pub async fn handle_deposit(&self, raw: &str) -> AppResult<deposits::Model> {
        let parsed = match transaction_parser::parse(raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                log::warn!("Rejected malformed bank notification: {e}");
                self.alerting.malformed_notification(raw, &e).await;
                return Err(e);
            }
        };

        let flags = self.flags.snapshot();
        let txn = self.pool.begin().await?;

        let deposit = deposits::ActiveModel {
            kind: Set(parsed.kind),
            amount: Set(parsed.amount),
            depositor_name: Set(parsed.depositor_name.clone()),
            balance_after: Set(parsed.balance_after),
            deposited_at: Set(parsed.deposited_at.and_utc()),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        if parsed.kind == DepositKind::Deposit {
            self.match_deposit(&txn, &deposit, &flags.current_period, flags.deposit_matching_enabled)
                .await?;
        }

        txn.commit().await?;
        Ok(deposit)
    }

    async fn match_deposit(
        &self,
        txn: &DatabaseTransaction,
        deposit: &deposits::Model,
        period: &str,
        matching_enabled: bool,
    ) -> AppResult<()> {
        let snapshot = DepositSnapshot::from(deposit);

        if !matching_enabled {
            log::warn!(
                "Deposit matching is disabled; deposit {} queued for operator review",
                deposit.id
            );
            self.outbox
                .append(txn, &Fact::DepositMismatch { deposit: snapshot })
                .await?;
            return Ok(());
        }

        let member_ids: Vec<i64> = members::Entity::find()
            .filter(members::Column::DepositorName.eq(deposit.depositor_name.as_str()))
            .select_only()
            .column(members::Column::Id)
            .into_tuple()
            .all(txn)
            .await?;

        let candidates = if member_ids.is_empty() {
            Vec::new()
        } else {
            payments::Entity::find()
                .filter(payments::Column::MemberId.is_in(member_ids))
                .filter(payments::Column::Status.eq(PaymentStatus::Pending))
                .filter(payments::Column::Period.eq(period))
                .filter(payments::Column::FinalPrice.eq(deposit.amount))
                .all(txn)
                .await?
        };

        match candidates.as_slice() {
            [] => {
                log::info!(
                    "Deposit {} ({} / {}) matched no pending payment",
                    deposit.id,
                    deposit.depositor_name,
                    deposit.amount
                );
                self.outbox
                    .append(txn, &Fact::DepositMismatch { deposit: snapshot })
                    .await?;
            }
            [payment] => {
                self.complete_payment(txn, payment.clone()).await?;
            }
            many => {
                // same real-world name on several members: completing the
                // wrong one is the failure mode this engine must never risk
                let conflicting: Vec<i64> = many.iter().map(|p| p.member_id).collect();
                log::warn!(
                    "Deposit {} is ambiguous between members {conflicting:?}",
                    deposit.id
                );
                self.outbox
                    .append(
                        txn,
                        &Fact::DepositNameConflict {
                            deposit: snapshot,
                            member_ids: conflicting,
                        },
                    )
                    .await?;
            }
        }

        Ok(())
    }

    /// Finalize a matched payment: consume its attached coupons, flip the
    /// status, publish the completion fact. The status flip is a conditional
    /// update on `status = pending`, so a concurrent or repeated completion
    /// attempt becomes a no-op instead of double-processing.
    async fn complete_payment(
        &self,
        txn: &DatabaseTransaction,
        payment: payments::Model,
    ) -> AppResult<()> {
        let completed_at = Utc::now();
        let updated = payments::Entity::update_many()
            .set(payments::ActiveModel {
                status: Set(PaymentStatus::Completed),
                completed_at: Set(Some(completed_at)),
                ..Default::default()
            })
            .filter(payments::Column::Id.eq(payment.id))
            .filter(payments::Column::Status.eq(PaymentStatus::Pending))
            .exec(txn)
            .await?;

        if updated.rows_affected == 0 {
            log::warn!("Payment {} was already completed; skipping", payment.id);
            return Ok(());
        }

        for issued in self.coupon_service.attached_to_payment(txn, payment.id).await? {
            self.coupon_service
                .use_coupon(txn, issued.id, payment.id)
                .await?;
        }

        let mut snapshot = PaymentSnapshot::from(&payment);
        snapshot.completed_at = Some(completed_at);

        self.outbox
            .append(txn, &Fact::PaymentCompleted { payment: snapshot })
            .await?;

        log::info!(
            "Payment {} completed for member {} ({} {})",
            payment.id,
            payment.member_id,
            payment.final_price,
            payment.period
        );
        Ok(())
    }
}
