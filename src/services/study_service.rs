use crate::config::FlagStore;
use crate::entities::{member_entity as members, study_session_entity as sessions};
use crate::error::{AppError, AppResult};
use crate::models::Fact;
use crate::services::OutboxService;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};

#[derive(Clone)]
pub struct StudyService {
    pool: DatabaseConnection,
    outbox: OutboxService,
    flags: FlagStore,
}

impl StudyService {
    pub fn new(pool: DatabaseConnection, outbox: OutboxService, flags: FlagStore) -> Self {
        Self {
            pool,
            outbox,
            flags,
        }
    }

    pub async fn create_session(
        &self,
        title: &str,
        instructor_id: i64,
        period: Option<String>,
    ) -> AppResult<sessions::Model> {
        members::Entity::find_by_id(instructor_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("member {instructor_id} not found")))?;

        let period = period.unwrap_or_else(|| self.flags.snapshot().current_period);

        sessions::ActiveModel {
            title: Set(title.to_string()),
            instructor_id: Set(instructor_id),
            period: Set(period),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(Into::into)
    }

    /// Record a member's attendance at a study session. The reward fan-out
    /// happens downstream of the outbox, never inline; marking the same
    /// attendance twice publishes two facts that collapse into one credit at
    /// the reward dispatcher.
    pub async fn mark_attendance(&self, session_id: i64, participant_id: i64) -> AppResult<()> {
        let session = sessions::Entity::find_by_id(session_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("study session {session_id} not found")))?;

        members::Entity::find_by_id(participant_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("member {participant_id} not found")))?;

        if session.instructor_id == participant_id {
            return Err(AppError::ValidationError(
                "the instructor cannot attend their own session".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;
        self.outbox
            .append(
                &txn,
                &Fact::StudyAttendanceMarked {
                    session_id,
                    participant_id,
                },
            )
            .await?;
        txn.commit().await?;

        log::info!("Attendance marked: member {participant_id} at session {session_id}");
        Ok(())
    }
}
