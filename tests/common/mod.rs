#![allow(dead_code)]

use std::time::Duration;

use clubhouse_backend::config::{
    AlertingConfig, AuthGatewayConfig, FlagStore, FlagsConfig, PointsConfig,
};
use clubhouse_backend::entities::member_entity as members;
use clubhouse_backend::external::{AlertingClient, AuthGatewayClient};
use clubhouse_backend::services::{
    AccountLocks, CouponService, MemberService, OutboxDispatcher, OutboxService,
    PointLedgerService, PointShopService, ReconciliationService, RewardService, StudyService,
};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

pub const TEST_PERIOD: &str = "2026-2";

pub struct TestApp {
    pub db: DatabaseConnection,
    pub flags: FlagStore,
    pub members: MemberService,
    pub ledger: PointLedgerService,
    pub coupons: CouponService,
    pub outbox: OutboxService,
    pub reconciliation: ReconciliationService,
    pub rewards: RewardService,
    pub point_shop: PointShopService,
    pub studies: StudyService,
    pub dispatcher: OutboxDispatcher,
}

pub async fn test_app() -> TestApp {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options).await.unwrap();
    Migrator::up(&db, None).await.unwrap();

    let flags = FlagStore::new(FlagsConfig {
        current_period: TEST_PERIOD.to_string(),
        deposit_matching_enabled: true,
        point_shop_enabled: true,
        refresh_secs: 300,
    });
    let points = PointsConfig::default();
    let alerting = AlertingClient::new(AlertingConfig::default());
    let auth_gateway = AuthGatewayClient::new(AuthGatewayConfig::default());

    let locks = AccountLocks::new(Duration::from_secs(3));
    let ledger = PointLedgerService::new(db.clone(), locks);
    let members = MemberService::new(db.clone());
    let coupons = CouponService::new(db.clone());
    let outbox = OutboxService::new(db.clone());
    let reconciliation = ReconciliationService::new(
        db.clone(),
        coupons.clone(),
        outbox.clone(),
        flags.clone(),
        alerting.clone(),
    );
    let rewards = RewardService::new(
        db.clone(),
        ledger.clone(),
        auth_gateway,
        flags.clone(),
        points.clone(),
    );
    let point_shop = PointShopService::new(
        db.clone(),
        ledger.clone(),
        outbox.clone(),
        flags.clone(),
        points,
    );
    let studies = StudyService::new(db.clone(), outbox.clone(), flags.clone());
    let dispatcher = OutboxDispatcher::new(outbox.clone(), rewards.clone(), alerting);

    TestApp {
        db,
        flags,
        members,
        ledger,
        coupons,
        outbox,
        reconciliation,
        rewards,
        point_shop,
        studies,
        dispatcher,
    }
}

pub async fn seed_member(app: &TestApp, name: &str, depositor_name: &str) -> members::Model {
    app.members.create(name, depositor_name).await.unwrap()
}

pub fn deposit_notification(amount: i64, name: &str) -> String {
    format!("[입금] {amount}원 {name}\n982-***\n12/17 14:30 /잔액 150000원")
}
