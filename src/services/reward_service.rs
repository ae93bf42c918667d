use crate::config::{FlagStore, PointsConfig};
use crate::entities::{
    MemberRole, member_entity as members, reward_receipt_entity as receipts,
    study_session_entity as sessions,
};
use crate::error::{AppError, AppResult};
use crate::external::AuthGatewayClient;
use crate::models::PaymentSnapshot;
use crate::services::PointLedgerService;
use crate::utils::{RewardSource, manual_grant_key, point_earn_key};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set, SqlErr, TransactionTrait,
};

/// Turns committed facts into ledger credits and membership side effects,
/// exactly once per logical fact. Upstream delivery is at-least-once; the
/// receipt row's unique key is what collapses duplicates, including two
/// concurrent deliveries racing each other.
#[derive(Clone)]
pub struct RewardService {
    pool: DatabaseConnection,
    ledger: PointLedgerService,
    gateway: AuthGatewayClient,
    flags: FlagStore,
    points: PointsConfig,
}

impl RewardService {
    pub fn new(
        pool: DatabaseConnection,
        ledger: PointLedgerService,
        gateway: AuthGatewayClient,
        flags: FlagStore,
        points: PointsConfig,
    ) -> Self {
        Self {
            pool,
            ledger,
            gateway,
            flags,
            points,
        }
    }

    /// Attendance fact: credit the participant, then the session's
    /// instructor. The instructor credit is keyed per (session, instructor),
    /// so whichever attendee's fact lands first grants it and every later
    /// one skips.
    pub async fn on_attendance(&self, session_id: i64, participant_id: i64) -> AppResult<()> {
        let Some(session) = sessions::Entity::find_by_id(session_id).one(&self.pool).await? else {
            // nothing to grant against; retrying won't make the session appear
            log::error!("Attendance fact for unknown study session {session_id}; dropping");
            return Ok(());
        };

        let participant_key = point_earn_key(RewardSource::StudySession, session_id, participant_id)?;
        self.grant_once(
            &participant_key,
            participant_id,
            self.points.attendance_reward,
            &session.title,
            &session.period,
        )
        .await?;

        let instructor_key = point_earn_key(
            RewardSource::StudySessionInstructor,
            session_id,
            session.instructor_id,
        )?;
        let reason = format!("{} (instructor)", session.title);
        self.grant_once(
            &instructor_key,
            session.instructor_id,
            self.points.instructor_reward,
            &reason,
            &session.period,
        )
        .await?;

        Ok(())
    }

    /// Payment-completion fact: promote guest -> user (one-way, no-op for
    /// anyone already promoted) and invalidate the member's other sessions.
    /// No ledger credit. An auth-gateway failure propagates so the outbox
    /// redelivers; the promotion is a conditional update and redelivery
    /// cannot double-apply it.
    pub async fn on_payment_completed(&self, payment: &PaymentSnapshot) -> AppResult<()> {
        let promoted = members::Entity::update_many()
            .set(members::ActiveModel {
                role: Set(MemberRole::User),
                updated_at: Set(Some(Utc::now())),
                ..Default::default()
            })
            .filter(members::Column::Id.eq(payment.member_id))
            .filter(members::Column::Role.eq(MemberRole::Guest))
            .exec(&self.pool)
            .await?;

        if promoted.rows_affected > 0 {
            log::info!(
                "Member {} promoted to user after payment {}",
                payment.member_id,
                payment.id
            );
        }

        self.gateway.invalidate_sessions(payment.member_id).await?;
        Ok(())
    }

    /// Activity-participation rewards for a batch of members. Each grant is
    /// keyed per (activity, member) and independent: one failure does not
    /// undo the others.
    pub async fn grant_activity_rewards(
        &self,
        activity_id: i64,
        title: &str,
        member_ids: &[i64],
    ) -> AppResult<u32> {
        let period = self.flags.snapshot().current_period;
        let mut granted = 0;
        for member_id in member_ids {
            let key = point_earn_key(RewardSource::Activity, activity_id, *member_id)?;
            if self
                .grant_once(&key, *member_id, self.points.activity_reward, title, &period)
                .await?
            {
                granted += 1;
            }
        }
        Ok(granted)
    }

    /// Manual admin grant. The client request-id doubles as the idempotency
    /// key, so a retried submission never double-grants. Locks for all
    /// beneficiaries are taken up front in ascending id order.
    pub async fn manual_grant(
        &self,
        request_id: &str,
        member_ids: &[i64],
        amount: i64,
        reason: &str,
    ) -> AppResult<(u32, u32)> {
        if amount <= 0 {
            return Err(AppError::InvalidAmount(format!(
                "grant amount must be positive, got {amount}"
            )));
        }
        if member_ids.is_empty() {
            return Err(AppError::InvalidArgument(
                "at least one beneficiary is required".to_string(),
            ));
        }

        let period = self.flags.snapshot().current_period;
        let _guards = self.ledger.locks().acquire_many(member_ids).await?;

        let mut granted = 0;
        let mut skipped = 0;
        for member_id in member_ids {
            let key = manual_grant_key(request_id, *member_id)?;
            if self
                .grant_with_receipt(&key, *member_id, amount, reason, &period)
                .await?
            {
                granted += 1;
            } else {
                skipped += 1;
            }
        }
        Ok((granted, skipped))
    }

    /// Receipt-guarded credit under the account lock. Returns false when the
    /// receipt already existed.
    async fn grant_once(
        &self,
        key: &str,
        member_id: i64,
        amount: i64,
        reason: &str,
        period: &str,
    ) -> AppResult<bool> {
        let _guard = self.ledger.locks().acquire(member_id).await?;
        self.grant_with_receipt(key, member_id, amount, reason, period)
            .await
    }

    /// One transaction: insert the receipt, credit the ledger, link the two.
    /// A unique-key violation on the receipt means another delivery of the
    /// same fact already granted it; that is success, not an error. The
    /// caller must hold the member's account lock.
    async fn grant_with_receipt(
        &self,
        key: &str,
        member_id: i64,
        amount: i64,
        reason: &str,
        period: &str,
    ) -> AppResult<bool> {
        let txn = self.pool.begin().await?;

        let receipt = receipts::ActiveModel {
            idempotency_key: Set(key.to_string()),
            member_id: Set(member_id),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        };
        let receipt = match receipt.insert(&txn).await {
            Ok(receipt) => receipt,
            Err(e) => {
                return match e.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => {
                        log::debug!("Reward {key} was already granted; skipping");
                        txn.rollback().await?;
                        Ok(false)
                    }
                    _ => Err(e.into()),
                };
            }
        };

        let (_, entry) = self
            .ledger
            .credit_locked(&txn, member_id, amount, reason, period)
            .await?;

        let mut am = receipt.into_active_model();
        am.point_transaction_id = Set(Some(entry.id));
        am.update(&txn).await?;

        txn.commit().await?;
        Ok(true)
    }
}
