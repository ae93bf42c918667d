use crate::error::{AppError, AppResult};

/// Reward-granting scopes. The scope string is part of the derived key, so
/// two different kinds of grant for the same (resource, member) pair can
/// never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardSource {
    StudySession,
    StudySessionInstructor,
    Activity,
}

impl RewardSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardSource::StudySession => "study-session",
            RewardSource::StudySessionInstructor => "study-session-instructor",
            RewardSource::Activity => "activity",
        }
    }
}

/// Deterministic key for a point-earning fact:
/// `ipk:v1:point:earn:<resource-type>:<resource-id>:member:<member-id>`.
pub fn point_earn_key(source: RewardSource, resource_id: i64, member_id: i64) -> AppResult<String> {
    if resource_id <= 0 {
        return Err(AppError::InvalidArgument(format!(
            "resource id must be positive, got {resource_id}"
        )));
    }
    if member_id <= 0 {
        return Err(AppError::InvalidArgument(format!(
            "member id must be positive, got {member_id}"
        )));
    }

    Ok(format!(
        "ipk:v1:point:earn:{}:{}:member:{}",
        source.as_str(),
        resource_id,
        member_id
    ))
}

/// Key for one beneficiary of a manual admin grant. The client-supplied
/// request id carries the idempotency; the `manual:` namespace keeps client
/// tokens collision-free against `ipk:` keys by construction.
pub fn manual_grant_key(request_id: &str, member_id: i64) -> AppResult<String> {
    let request_id = request_id.trim();
    if request_id.is_empty() {
        return Err(AppError::InvalidArgument(
            "request id must not be empty".to_string(),
        ));
    }
    if member_id <= 0 {
        return Err(AppError::InvalidArgument(format!(
            "member id must be positive, got {member_id}"
        )));
    }

    Ok(format!(
        "manual:v1:{}:member:{}",
        request_id.to_lowercase(),
        member_id
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_earn_key_format() {
        let key = point_earn_key(RewardSource::StudySession, 5, 42).unwrap();
        assert_eq!(key, "ipk:v1:point:earn:study-session:5:member:42");
    }

    #[test]
    fn test_point_earn_key_is_deterministic() {
        let a = point_earn_key(RewardSource::Activity, 7, 3).unwrap();
        let b = point_earn_key(RewardSource::Activity, 7, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_scopes_never_collide() {
        let attendee = point_earn_key(RewardSource::StudySession, 5, 42).unwrap();
        let instructor = point_earn_key(RewardSource::StudySessionInstructor, 5, 42).unwrap();
        assert_ne!(attendee, instructor);
    }

    #[test]
    fn test_non_positive_ids_rejected() {
        assert!(matches!(
            point_earn_key(RewardSource::StudySession, 0, 42),
            Err(crate::error::AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            point_earn_key(RewardSource::StudySession, 5, -1),
            Err(crate::error::AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_manual_grant_key() {
        let key = manual_grant_key("Req-2026-001", 9).unwrap();
        assert_eq!(key, "manual:v1:req-2026-001:member:9");
        assert!(manual_grant_key("  ", 9).is_err());
    }
}
