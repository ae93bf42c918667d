use crate::models::{ApplyCouponsRequest, PaymentResponse, RegisterPaymentRequest};
use crate::services::ReconciliationService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

pub async fn register_payment(
    reconciliation_service: web::Data<ReconciliationService>,
    request: web::Json<RegisterPaymentRequest>,
) -> Result<HttpResponse> {
    let request = request.into_inner();

    match reconciliation_service
        .register_payment(request.member_id, request.period, request.original_price)
        .await
    {
        Ok(payment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": PaymentResponse::from(payment)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn apply_coupons(
    reconciliation_service: web::Data<ReconciliationService>,
    path: web::Path<i64>,
    request: web::Json<ApplyCouponsRequest>,
) -> Result<HttpResponse> {
    let payment_id = path.into_inner();

    match reconciliation_service
        .apply_coupons(payment_id, &request.issued_coupon_ids)
        .await
    {
        Ok(payment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": PaymentResponse::from(payment)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn get_payment(
    reconciliation_service: web::Data<ReconciliationService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match reconciliation_service.find_payment(path.into_inner()).await {
        Ok(payment) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": PaymentResponse::from(payment)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payments_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("", web::post().to(register_payment))
            .route("/{payment_id}", web::get().to(get_payment))
            .route("/{payment_id}/coupons", web::post().to(apply_coupons)),
    );
}
