use crate::entities::{MemberRole, member_entity as members};
use crate::error::{AppError, AppResult};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

/// Minimal member registry. Identity proper (credentials, profiles) lives in
/// an external subsystem; this service only keeps what reconciliation and
/// promotion need: the registered depositor name and the role.
#[derive(Clone)]
pub struct MemberService {
    pool: DatabaseConnection,
}

impl MemberService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str, depositor_name: &str) -> AppResult<members::Model> {
        if name.trim().is_empty() || depositor_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "name and depositor name are required".to_string(),
            ));
        }

        members::ActiveModel {
            name: Set(name.trim().to_string()),
            depositor_name: Set(depositor_name.trim().to_string()),
            role: Set(MemberRole::Guest),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&self.pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find(&self, member_id: i64) -> AppResult<members::Model> {
        members::Entity::find_by_id(member_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("member {member_id} not found")))
    }
}
