use crate::config::FlagStore;
use crate::models::{
    ActivityRewardRequest, CouponResponse, CreateCouponRequest, CreateMemberRequest,
    CreateStudySessionRequest, IssueCouponRequest, IssuedCouponResponse, ManualGrantRequest,
    ManualGrantResponse, MarkAttendanceRequest, MemberResponse, StudySessionResponse,
};
use crate::services::{CouponService, MemberService, RewardService, StudyService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

pub async fn create_member(
    member_service: web::Data<MemberService>,
    request: web::Json<CreateMemberRequest>,
) -> Result<HttpResponse> {
    match member_service
        .create(&request.name, &request.depositor_name)
        .await
    {
        Ok(member) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": MemberResponse::from(member)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn create_coupon(
    coupon_service: web::Data<CouponService>,
    request: web::Json<CreateCouponRequest>,
) -> Result<HttpResponse> {
    match coupon_service
        .create_coupon(&request.name, request.discount_amount)
        .await
    {
        Ok(coupon) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": CouponResponse::from(coupon)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn issue_coupon(
    coupon_service: web::Data<CouponService>,
    request: web::Json<IssueCouponRequest>,
) -> Result<HttpResponse> {
    match coupon_service
        .issue(request.coupon_id, request.member_id)
        .await
    {
        Ok(issued) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": IssuedCouponResponse::from(issued)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn manual_grant(
    reward_service: web::Data<RewardService>,
    request: web::Json<ManualGrantRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();

    match reward_service
        .manual_grant(
            &request.request_id,
            &request.member_ids,
            request.amount,
            &request.reason,
        )
        .await
    {
        Ok((granted, skipped)) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": ManualGrantResponse { granted, skipped }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn create_study_session(
    study_service: web::Data<StudyService>,
    request: web::Json<CreateStudySessionRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();

    match study_service
        .create_session(&request.title, request.instructor_id, request.period)
        .await
    {
        Ok(session) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": StudySessionResponse::from(session)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn mark_attendance(
    study_service: web::Data<StudyService>,
    path: web::Path<i64>,
    request: web::Json<MarkAttendanceRequest>,
) -> Result<HttpResponse> {
    let session_id = path.into_inner();

    match study_service
        .mark_attendance(session_id, request.participant_id)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Attendance marked"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn grant_activity_rewards(
    reward_service: web::Data<RewardService>,
    request: web::Json<ActivityRewardRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();

    match reward_service
        .grant_activity_rewards(request.activity_id, &request.title, &request.member_ids)
        .await
    {
        Ok(granted) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": { "granted": granted }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// Explicit invalidation of the runtime flag snapshot.
pub async fn refresh_flags(flags: web::Data<FlagStore>) -> Result<HttpResponse> {
    match flags.refresh_from_file() {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": flags.snapshot()
        }))),
        Err(e) => {
            log::error!("Flag refresh failed: {e}");
            Ok(HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": { "code": "CONFIG_ERROR", "message": e.to_string() }
            })))
        }
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/members", web::post().to(create_member))
            .route("/coupons", web::post().to(create_coupon))
            .route("/coupons/issue", web::post().to(issue_coupon))
            .route("/grants", web::post().to(manual_grant))
            .route("/studies", web::post().to(create_study_session))
            .route(
                "/studies/{session_id}/attendance",
                web::post().to(mark_attendance),
            )
            .route("/activities/rewards", web::post().to(grant_activity_rewards))
            .route("/flags/refresh", web::post().to(refresh_flags)),
    );
}
