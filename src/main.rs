use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::time::Duration;

use clubhouse_backend::{
    config::{Config, FlagStore},
    database::{create_pool, run_migrations},
    external::{AlertingClient, AuthGatewayClient},
    handlers,
    middlewares::create_cors,
    services::*,
    tasks,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;

    let pool = create_pool(&config.database).await?;
    run_migrations(&pool).await?;

    let flags = FlagStore::new(config.flags.clone());

    let alerting = AlertingClient::new(config.alerting.clone());
    let auth_gateway = AuthGatewayClient::new(config.auth_gateway.clone());

    let locks = AccountLocks::new(Duration::from_millis(config.locks.acquire_timeout_ms));
    let ledger_service = PointLedgerService::new(pool.clone(), locks);
    let outbox_service = OutboxService::new(pool.clone());
    let member_service = MemberService::new(pool.clone());
    let coupon_service = CouponService::new(pool.clone());
    let reconciliation_service = ReconciliationService::new(
        pool.clone(),
        coupon_service.clone(),
        outbox_service.clone(),
        flags.clone(),
        alerting.clone(),
    );
    let reward_service = RewardService::new(
        pool.clone(),
        ledger_service.clone(),
        auth_gateway,
        flags.clone(),
        config.points.clone(),
    );
    let point_shop_service = PointShopService::new(
        pool.clone(),
        ledger_service.clone(),
        outbox_service.clone(),
        flags.clone(),
        config.points.clone(),
    );
    let study_service = StudyService::new(pool.clone(), outbox_service.clone(), flags.clone());

    let dispatcher = OutboxDispatcher::new(
        outbox_service.clone(),
        reward_service.clone(),
        alerting.clone(),
    );
    tasks::spawn_all(dispatcher, flags.clone(), config.flags.refresh_secs);

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let server_config = config.server.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(member_service.clone()))
            .app_data(web::Data::new(coupon_service.clone()))
            .app_data(web::Data::new(ledger_service.clone()))
            .app_data(web::Data::new(reconciliation_service.clone()))
            .app_data(web::Data::new(reward_service.clone()))
            .app_data(web::Data::new(point_shop_service.clone()))
            .app_data(web::Data::new(study_service.clone()))
            .app_data(web::Data::new(flags.clone()))
            .configure(handlers::webhook_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::points_config)
                    .configure(handlers::payments_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((server_config.host.as_str(), server_config.port))?
    .run()
    .await?;

    Ok(())
}
