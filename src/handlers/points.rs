use crate::models::{PaginationParams, PointAccountResponse, PointHistoryQuery};
use crate::services::{PointLedgerService, PointShopService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

pub async fn point_history(
    ledger: web::Data<PointLedgerService>,
    path: web::Path<i64>,
    query: web::Query<PointHistoryQuery>,
) -> Result<HttpResponse> {
    let member_id = path.into_inner();
    let params = PaginationParams::new(query.page, query.per_page);

    match ledger.history(member_id, &params).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn point_account(
    ledger: web::Data<PointLedgerService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let member_id = path.into_inner();

    match ledger.account(member_id).await {
        Ok(account) => {
            let data = account.map(PointAccountResponse::from).unwrap_or(
                PointAccountResponse {
                    member_id,
                    balance: 0,
                    total_earned: 0,
                },
            );
            Ok(HttpResponse::Ok().json(json!({
                "success": true,
                "data": data
            })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn point_shop_draw(
    point_shop: web::Data<PointShopService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let member_id = path.into_inner();

    match point_shop.draw(member_id).await {
        Ok(outcome) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": outcome
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn points_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/points")
            .route("/{member_id}", web::get().to(point_account))
            .route("/{member_id}/history", web::get().to(point_history))
            .route("/{member_id}/draw", web::post().to(point_shop_draw)),
    );
}
