mod common;

use clubhouse_backend::entities::{
    DepositKind, MemberRole, PaymentStatus, deposit_entity as deposits,
    issued_coupon_entity as issued, member_entity as members,
    outbox_event_entity as outbox_events, payment_coupon_entity as attachments,
    payment_entity as payments,
};
use clubhouse_backend::error::AppError;
use clubhouse_backend::models::Fact;
use common::{deposit_notification, seed_member, test_app};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

async fn outbox_facts(db: &sea_orm::DatabaseConnection) -> Vec<Fact> {
    outbox_events::Entity::find()
        .all(db)
        .await
        .unwrap()
        .into_iter()
        .map(|e| serde_json::from_value(e.payload).unwrap())
        .collect()
}

#[tokio::test]
async fn matching_deposit_completes_the_payment() {
    let app = test_app().await;
    let member = seed_member(&app, "member-a", "김철수").await;
    let payment = app
        .reconciliation
        .register_payment(member.id, None, 15000)
        .await
        .unwrap();

    app.reconciliation
        .handle_deposit(&deposit_notification(15000, "김철수"))
        .await
        .unwrap();

    let payment = payments::Entity::find_by_id(payment.id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert!(payment.completed_at.is_some());

    let facts = outbox_facts(&app.db).await;
    let completed: Vec<_> = facts
        .iter()
        .filter(|f| matches!(f, Fact::PaymentCompleted { .. }))
        .collect();
    assert_eq!(completed.len(), 1);
    if let Fact::PaymentCompleted { payment: snapshot } = completed[0] {
        assert_eq!(snapshot.member_id, member.id);
        assert_eq!(snapshot.final_price, 15000);
    }
}

#[tokio::test]
async fn completion_fact_promotes_the_member() {
    let app = test_app().await;
    let member = seed_member(&app, "member-a", "김철수").await;
    assert_eq!(member.role, MemberRole::Guest);
    app.reconciliation
        .register_payment(member.id, None, 15000)
        .await
        .unwrap();

    app.reconciliation
        .handle_deposit(&deposit_notification(15000, "김철수"))
        .await
        .unwrap();
    app.dispatcher.run_once().await.unwrap();

    let member = members::Entity::find_by_id(member.id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member.role, MemberRole::User);

    // redelivery is harmless
    app.dispatcher.run_once().await.unwrap();
    let member = members::Entity::find_by_id(member.id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member.role, MemberRole::User);
}

#[tokio::test]
async fn attached_coupons_are_consumed_on_completion() {
    let app = test_app().await;
    let member = seed_member(&app, "member-a", "김철수").await;
    let payment = app
        .reconciliation
        .register_payment(member.id, None, 20000)
        .await
        .unwrap();

    let coupon = app.coupons.create_coupon("welcome", 5000).await.unwrap();
    let issued_coupon = app.coupons.issue(coupon.id, member.id).await.unwrap();

    let payment = app
        .reconciliation
        .apply_coupons(payment.id, &[issued_coupon.id])
        .await
        .unwrap();
    assert_eq!(payment.final_price, 15000);

    app.reconciliation
        .handle_deposit(&deposit_notification(15000, "김철수"))
        .await
        .unwrap();

    let issued_coupon = issued::Entity::find_by_id(issued_coupon.id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert!(!issued_coupon.is_valid);
    assert!(issued_coupon.used_at.is_some());
    assert_eq!(issued_coupon.used_payment_id, Some(payment.id));
}

#[tokio::test]
async fn apply_coupons_is_idempotent() {
    let app = test_app().await;
    let member = seed_member(&app, "member-a", "김철수").await;
    let payment = app
        .reconciliation
        .register_payment(member.id, None, 20000)
        .await
        .unwrap();

    let coupon = app.coupons.create_coupon("welcome", 3000).await.unwrap();
    let issued_coupon = app.coupons.issue(coupon.id, member.id).await.unwrap();

    let first = app
        .reconciliation
        .apply_coupons(payment.id, &[issued_coupon.id])
        .await
        .unwrap();
    let second = app
        .reconciliation
        .apply_coupons(payment.id, &[issued_coupon.id])
        .await
        .unwrap();

    assert_eq!(first.final_price, 17000);
    assert_eq!(second.final_price, 17000);

    // the attachment set was replaced, not accumulated
    let attached = attachments::Entity::find()
        .filter(attachments::Column::PaymentId.eq(payment.id))
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(attached, 1);
}

#[tokio::test]
async fn discounts_never_push_final_price_below_zero() {
    let app = test_app().await;
    let member = seed_member(&app, "member-a", "김철수").await;
    let payment = app
        .reconciliation
        .register_payment(member.id, None, 4000)
        .await
        .unwrap();

    let coupon = app.coupons.create_coupon("big", 5000).await.unwrap();
    let issued_coupon = app.coupons.issue(coupon.id, member.id).await.unwrap();

    let payment = app
        .reconciliation
        .apply_coupons(payment.id, &[issued_coupon.id])
        .await
        .unwrap();
    assert_eq!(payment.final_price, 0);
}

#[tokio::test]
async fn used_coupon_is_rejected_for_any_payment() {
    let app = test_app().await;
    let member = seed_member(&app, "member-a", "김철수").await;
    let payment = app
        .reconciliation
        .register_payment(member.id, Some("2026-1".to_string()), 20000)
        .await
        .unwrap();

    let coupon = app.coupons.create_coupon("welcome", 5000).await.unwrap();
    let issued_coupon = app.coupons.issue(coupon.id, member.id).await.unwrap();
    app.reconciliation
        .apply_coupons(payment.id, &[issued_coupon.id])
        .await
        .unwrap();

    // complete the 2026-2 payment carrying the coupon
    let current = app
        .reconciliation
        .register_payment(member.id, None, 20000)
        .await
        .unwrap();
    let current = app
        .reconciliation
        .apply_coupons(current.id, &[issued_coupon.id])
        .await
        .unwrap();
    assert_eq!(current.final_price, 15000);
    app.reconciliation
        .handle_deposit(&deposit_notification(15000, "김철수"))
        .await
        .unwrap();

    // the earlier pending payment can no longer pick up the spent coupon
    assert!(matches!(
        app.reconciliation
            .apply_coupons(payment.id, &[issued_coupon.id])
            .await,
        Err(AppError::CouponAlreadyUsed(_))
    ));
}

#[tokio::test]
async fn moving_a_coupon_restores_the_donor_payment_price() {
    let app = test_app().await;
    let member = seed_member(&app, "member-a", "김철수").await;
    let donor = app
        .reconciliation
        .register_payment(member.id, Some("2026-1".to_string()), 20000)
        .await
        .unwrap();
    let taker = app
        .reconciliation
        .register_payment(member.id, None, 20000)
        .await
        .unwrap();

    let coupon = app.coupons.create_coupon("welcome", 5000).await.unwrap();
    let issued_coupon = app.coupons.issue(coupon.id, member.id).await.unwrap();

    let donor = app
        .reconciliation
        .apply_coupons(donor.id, &[issued_coupon.id])
        .await
        .unwrap();
    assert_eq!(donor.final_price, 15000);

    let taker = app
        .reconciliation
        .apply_coupons(taker.id, &[issued_coupon.id])
        .await
        .unwrap();
    assert_eq!(taker.final_price, 15000);

    // the donor lost its coupon and its price reverted
    let donor = payments::Entity::find_by_id(donor.id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(donor.final_price, 20000);
}

#[tokio::test]
async fn coupons_only_apply_to_their_owner() {
    let app = test_app().await;
    let owner = seed_member(&app, "owner", "김철수").await;
    let other = seed_member(&app, "other", "박영수").await;

    let payment = app
        .reconciliation
        .register_payment(other.id, None, 20000)
        .await
        .unwrap();
    let coupon = app.coupons.create_coupon("welcome", 5000).await.unwrap();
    let issued_coupon = app.coupons.issue(coupon.id, owner.id).await.unwrap();

    assert!(matches!(
        app.reconciliation
            .apply_coupons(payment.id, &[issued_coupon.id])
            .await,
        Err(AppError::ValidationError(_))
    ));
}

#[tokio::test]
async fn unmatched_deposit_emits_mismatch() {
    let app = test_app().await;
    seed_member(&app, "member-a", "김철수").await;

    let deposit = app
        .reconciliation
        .handle_deposit(&deposit_notification(15000, "홍길동"))
        .await
        .unwrap();

    // the deposit is retained for audit
    assert_eq!(
        deposits::Entity::find().count(&app.db).await.unwrap(),
        1
    );
    assert_eq!(deposit.kind, DepositKind::Deposit);

    let facts = outbox_facts(&app.db).await;
    assert!(matches!(facts.as_slice(), [Fact::DepositMismatch { .. }]));
}

#[tokio::test]
async fn amount_mismatch_is_not_matched() {
    let app = test_app().await;
    let member = seed_member(&app, "member-a", "김철수").await;
    let payment = app
        .reconciliation
        .register_payment(member.id, None, 15000)
        .await
        .unwrap();

    app.reconciliation
        .handle_deposit(&deposit_notification(14000, "김철수"))
        .await
        .unwrap();

    let payment = payments::Entity::find_by_id(payment.id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Pending);

    let facts = outbox_facts(&app.db).await;
    assert!(matches!(facts.as_slice(), [Fact::DepositMismatch { .. }]));
}

#[tokio::test]
async fn shared_depositor_name_is_never_auto_resolved() {
    let app = test_app().await;
    let first = seed_member(&app, "member-a", "이영희").await;
    let second = seed_member(&app, "member-b", "이영희").await;
    app.reconciliation
        .register_payment(first.id, None, 15000)
        .await
        .unwrap();
    app.reconciliation
        .register_payment(second.id, None, 15000)
        .await
        .unwrap();

    app.reconciliation
        .handle_deposit(&deposit_notification(15000, "이영희"))
        .await
        .unwrap();

    // neither payment moved
    let pending = payments::Entity::find()
        .filter(payments::Column::Status.eq(PaymentStatus::Pending))
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(pending, 2);

    let facts = outbox_facts(&app.db).await;
    match facts.as_slice() {
        [Fact::DepositNameConflict { member_ids, .. }] => {
            let mut ids = member_ids.clone();
            ids.sort_unstable();
            assert_eq!(ids, vec![first.id, second.id]);
        }
        other => panic!("expected a name-conflict fact, got {other:?}"),
    }
}

#[tokio::test]
async fn completed_payment_is_not_completed_twice() {
    let app = test_app().await;
    let member = seed_member(&app, "member-a", "김철수").await;
    app.reconciliation
        .register_payment(member.id, None, 15000)
        .await
        .unwrap();

    app.reconciliation
        .handle_deposit(&deposit_notification(15000, "김철수"))
        .await
        .unwrap();
    // the same notification arrives again
    app.reconciliation
        .handle_deposit(&deposit_notification(15000, "김철수"))
        .await
        .unwrap();

    let facts = outbox_facts(&app.db).await;
    let completions = facts
        .iter()
        .filter(|f| matches!(f, Fact::PaymentCompleted { .. }))
        .count();
    let mismatches = facts
        .iter()
        .filter(|f| matches!(f, Fact::DepositMismatch { .. }))
        .count();
    assert_eq!(completions, 1);
    // the replay no longer matches a pending payment
    assert_eq!(mismatches, 1);
}

#[tokio::test]
async fn withdrawals_are_recorded_but_never_matched() {
    let app = test_app().await;
    let member = seed_member(&app, "member-a", "김철수").await;
    app.reconciliation
        .register_payment(member.id, None, 15000)
        .await
        .unwrap();

    let deposit = app
        .reconciliation
        .handle_deposit("[출금] 15000원 김철수\n982-***\n12/17 14:30 /잔액 150000원")
        .await
        .unwrap();
    assert_eq!(deposit.kind, DepositKind::Withdrawal);

    assert!(outbox_facts(&app.db).await.is_empty());
    let pending = payments::Entity::find()
        .filter(payments::Column::Status.eq(PaymentStatus::Pending))
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(pending, 1);
}

#[tokio::test]
async fn malformed_notification_is_a_permanent_rejection() {
    let app = test_app().await;

    let result = app.reconciliation.handle_deposit("garbage").await;
    assert!(matches!(result, Err(AppError::MalformedInput(_))));

    // nothing was recorded
    assert_eq!(deposits::Entity::find().count(&app.db).await.unwrap(), 0);
    assert!(outbox_facts(&app.db).await.is_empty());
}

#[tokio::test]
async fn disabled_matching_window_parks_deposits_for_operators() {
    let app = test_app().await;
    let member = seed_member(&app, "member-a", "김철수").await;
    app.reconciliation
        .register_payment(member.id, None, 15000)
        .await
        .unwrap();

    let mut flags = app.flags.snapshot();
    flags.deposit_matching_enabled = false;
    app.flags.replace(flags);

    app.reconciliation
        .handle_deposit(&deposit_notification(15000, "김철수"))
        .await
        .unwrap();

    let facts = outbox_facts(&app.db).await;
    assert!(matches!(facts.as_slice(), [Fact::DepositMismatch { .. }]));
    let pending = payments::Entity::find()
        .filter(payments::Column::Status.eq(PaymentStatus::Pending))
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(pending, 1);
}
