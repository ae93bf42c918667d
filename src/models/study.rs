use crate::entities::study_session_entity as sessions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateStudySessionRequest {
    pub title: String,
    pub instructor_id: i64,
    /// Defaults to the current period from the flag snapshot.
    pub period: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MarkAttendanceRequest {
    pub participant_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StudySessionResponse {
    pub id: i64,
    pub title: String,
    pub instructor_id: i64,
    pub period: String,
}

impl From<sessions::Model> for StudySessionResponse {
    fn from(m: sessions::Model) -> Self {
        Self {
            id: m.id,
            title: m.title,
            instructor_id: m.instructor_id,
            period: m.period,
        }
    }
}
