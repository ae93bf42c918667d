use crate::entities::{MemberRole, member_entity as members};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateMemberRequest {
    pub name: String,
    pub depositor_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MemberResponse {
    pub id: i64,
    pub name: String,
    pub depositor_name: String,
    pub role: MemberRole,
}

impl From<members::Model> for MemberResponse {
    fn from(m: members::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            depositor_name: m.depositor_name,
            role: m.role,
        }
    }
}
