use crate::entities::outbox_event_entity as outbox;
use crate::error::AppResult;
use crate::external::AlertingClient;
use crate::models::Fact;
use crate::services::RewardService;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    IntoActiveModel, Order, QueryFilter, QueryOrder, QuerySelect, Set,
};

/// Durable outbox. `append` runs inside the transaction that produced the
/// fact, so a fact exists if and only if its originating change committed;
/// nothing downstream ever reacts to a rolled-back change.
#[derive(Clone)]
pub struct OutboxService {
    pool: DatabaseConnection,
}

impl OutboxService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn append(&self, txn: &DatabaseTransaction, fact: &Fact) -> AppResult<outbox::Model> {
        outbox::ActiveModel {
            kind: Set(fact.kind().to_string()),
            payload: Set(serde_json::to_value(fact)?),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(txn)
        .await
        .map_err(Into::into)
    }

    pub async fn undispatched(&self, limit: u64) -> AppResult<Vec<outbox::Model>> {
        outbox::Entity::find()
            .filter(outbox::Column::DispatchedAt.is_null())
            .order_by(outbox::Column::Id, Order::Asc)
            .limit(limit)
            .all(&self.pool)
            .await
            .map_err(Into::into)
    }

    pub async fn mark_dispatched(&self, event_id: i64) -> AppResult<()> {
        if let Some(event) = outbox::Entity::find_by_id(event_id).one(&self.pool).await? {
            let mut am = event.into_active_model();
            am.dispatched_at = Set(Some(Utc::now()));
            am.update(&self.pool).await?;
        }
        Ok(())
    }
}

/// Delivers committed facts to their consumers. Runs from the background
/// loop in `tasks`; `run_once` is also called directly by tests.
///
/// A failed handler leaves the row undispatched for the next pass
/// (at-least-once); every consumer is idempotent, so redelivery is safe.
#[derive(Clone)]
pub struct OutboxDispatcher {
    outbox: OutboxService,
    rewards: RewardService,
    alerting: AlertingClient,
}

impl OutboxDispatcher {
    pub fn new(outbox: OutboxService, rewards: RewardService, alerting: AlertingClient) -> Self {
        Self {
            outbox,
            rewards,
            alerting,
        }
    }

    /// Drain one batch of undispatched facts. Returns how many were
    /// delivered.
    pub async fn run_once(&self) -> AppResult<usize> {
        let batch = self.outbox.undispatched(50).await?;
        let mut delivered = 0;

        for event in batch {
            let fact: Fact = match serde_json::from_value(event.payload.clone()) {
                Ok(fact) => fact,
                Err(e) => {
                    // undecodable rows would retry forever; park them
                    log::error!("Outbox event {} has an undecodable payload: {e}", event.id);
                    self.outbox.mark_dispatched(event.id).await?;
                    continue;
                }
            };

            match self.dispatch(&fact).await {
                Ok(()) => {
                    self.outbox.mark_dispatched(event.id).await?;
                    delivered += 1;
                }
                Err(e) => {
                    log::error!(
                        "Failed to dispatch outbox event {} ({}), will retry: {e}",
                        event.id,
                        event.kind
                    );
                }
            }
        }

        Ok(delivered)
    }

    async fn dispatch(&self, fact: &Fact) -> AppResult<()> {
        match fact {
            Fact::PaymentCompleted { payment } => self.rewards.on_payment_completed(payment).await,
            Fact::StudyAttendanceMarked {
                session_id,
                participant_id,
            } => self.rewards.on_attendance(*session_id, *participant_id).await,
            Fact::DepositMismatch { .. } | Fact::DepositNameConflict { .. } => {
                self.alerting.notify_fact(fact).await;
                Ok(())
            }
            Fact::PointShopDrawn { draw } => {
                log::debug!(
                    "Point shop draw {} delivered for member {}",
                    draw.id,
                    draw.member_id
                );
                Ok(())
            }
        }
    }
}
