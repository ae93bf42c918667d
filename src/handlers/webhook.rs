use crate::models::DepositSnapshot;
use crate::services::ReconciliationService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use log::{error, info};
use serde_json::json;

/// Bank-transfer notification webhook.
///
/// The feed delivers one raw text payload per notification. Matching
/// outcomes (completed / mismatch / name conflict) are not reflected in the
/// response; they are recorded and surface through the operator channel.
pub async fn bank_transfer_webhook(
    body: web::Bytes,
    reconciliation_service: web::Data<ReconciliationService>,
) -> Result<HttpResponse> {
    let payload = match std::str::from_utf8(&body) {
        Ok(payload) => payload,
        Err(_) => {
            error!("Invalid UTF-8 in bank notification payload");
            return Ok(HttpResponse::BadRequest().json(json!({
                "success": false,
                "error": { "code": "MALFORMED_INPUT", "message": "Invalid payload encoding" }
            })));
        }
    };

    info!("Received bank-transfer notification ({} bytes)", body.len());

    match reconciliation_service.handle_deposit(payload).await {
        Ok(deposit) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": DepositSnapshot::from(&deposit)
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn webhook_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/webhook").route("/bank-transfer", web::post().to(bank_transfer_webhook)),
    );
}
