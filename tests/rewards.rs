mod common;

use clubhouse_backend::entities::{
    MemberRole, member_entity as members, reward_receipt_entity as receipts,
};
use clubhouse_backend::error::AppError;
use clubhouse_backend::models::PaymentSnapshot;
use common::{seed_member, test_app};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

#[tokio::test]
async fn duplicate_attendance_fact_grants_exactly_once() {
    let app = test_app().await;
    let instructor = seed_member(&app, "instructor", "강사").await;
    let participant = seed_member(&app, "participant", "참가자").await;
    let session = app
        .studies
        .create_session("Rust Study", instructor.id, None)
        .await
        .unwrap();

    // at-least-once delivery: the same fact lands twice
    app.rewards
        .on_attendance(session.id, participant.id)
        .await
        .unwrap();
    app.rewards
        .on_attendance(session.id, participant.id)
        .await
        .unwrap();

    assert_eq!(app.ledger.balance(participant.id).await.unwrap(), 10);

    let key = format!(
        "ipk:v1:point:earn:study-session:{}:member:{}",
        session.id, participant.id
    );
    let receipt_count = receipts::Entity::find()
        .filter(receipts::Column::IdempotencyKey.eq(key))
        .count(&app.db)
        .await
        .unwrap();
    assert_eq!(receipt_count, 1);
}

#[tokio::test]
async fn attendance_credit_reason_is_the_study_title() {
    let app = test_app().await;
    let instructor = seed_member(&app, "instructor", "강사").await;
    let participant = seed_member(&app, "participant", "참가자").await;
    let session = app
        .studies
        .create_session("알고리즘 스터디", instructor.id, None)
        .await
        .unwrap();

    app.rewards
        .on_attendance(session.id, participant.id)
        .await
        .unwrap();

    let page = app
        .ledger
        .history(
            participant.id,
            &clubhouse_backend::models::PaginationParams::new(None, None),
        )
        .await
        .unwrap();
    assert_eq!(page.items[0].reason, "알고리즘 스터디");
    assert_eq!(page.items[0].amount, 10);
}

#[tokio::test]
async fn instructor_reward_is_granted_once_per_session() {
    let app = test_app().await;
    let instructor = seed_member(&app, "instructor", "강사").await;
    let first = seed_member(&app, "first", "참가자일").await;
    let second = seed_member(&app, "second", "참가자이").await;
    let session = app
        .studies
        .create_session("Rust Study", instructor.id, None)
        .await
        .unwrap();

    app.rewards.on_attendance(session.id, first.id).await.unwrap();
    app.rewards.on_attendance(session.id, second.id).await.unwrap();

    // every attendee triggered the listener; the first grant won
    assert_eq!(app.ledger.balance(instructor.id).await.unwrap(), 30);
    assert_eq!(app.ledger.balance(first.id).await.unwrap(), 10);
    assert_eq!(app.ledger.balance(second.id).await.unwrap(), 10);
}

#[tokio::test]
async fn attendance_flows_through_the_outbox() {
    let app = test_app().await;
    let instructor = seed_member(&app, "instructor", "강사").await;
    let participant = seed_member(&app, "participant", "참가자").await;
    let session = app
        .studies
        .create_session("Rust Study", instructor.id, None)
        .await
        .unwrap();

    app.studies
        .mark_attendance(session.id, participant.id)
        .await
        .unwrap();

    // nothing is credited before the dispatcher runs
    assert_eq!(app.ledger.balance(participant.id).await.unwrap(), 0);

    app.dispatcher.run_once().await.unwrap();
    assert_eq!(app.ledger.balance(participant.id).await.unwrap(), 10);
    assert_eq!(app.ledger.balance(instructor.id).await.unwrap(), 30);

    // a second pass has nothing left to deliver
    let delivered = app.dispatcher.run_once().await.unwrap();
    assert_eq!(delivered, 0);
    assert_eq!(app.ledger.balance(participant.id).await.unwrap(), 10);
}

#[tokio::test]
async fn instructor_cannot_attend_own_session() {
    let app = test_app().await;
    let instructor = seed_member(&app, "instructor", "강사").await;
    let session = app
        .studies
        .create_session("Rust Study", instructor.id, None)
        .await
        .unwrap();

    assert!(matches!(
        app.studies.mark_attendance(session.id, instructor.id).await,
        Err(AppError::ValidationError(_))
    ));
}

#[tokio::test]
async fn attendance_for_unknown_session_is_dropped() {
    let app = test_app().await;
    seed_member(&app, "participant", "참가자").await;

    // the fact is consumed without crediting anyone
    app.rewards.on_attendance(999, 1).await.unwrap();
    assert_eq!(app.ledger.balance(1).await.unwrap(), 0);
}

#[tokio::test]
async fn manual_grant_retries_never_double_grant() {
    let app = test_app().await;
    let first = seed_member(&app, "first", "일번").await;
    let second = seed_member(&app, "second", "이번").await;
    let ids = [first.id, second.id];

    let (granted, skipped) = app
        .rewards
        .manual_grant("req-2026-001", &ids, 50, "event bonus")
        .await
        .unwrap();
    assert_eq!((granted, skipped), (2, 0));

    // the admin tool times out and resubmits the same request id
    let (granted, skipped) = app
        .rewards
        .manual_grant("req-2026-001", &ids, 50, "event bonus")
        .await
        .unwrap();
    assert_eq!((granted, skipped), (0, 2));

    assert_eq!(app.ledger.balance(first.id).await.unwrap(), 50);
    assert_eq!(app.ledger.balance(second.id).await.unwrap(), 50);
}

#[tokio::test]
async fn manual_grant_validates_input() {
    let app = test_app().await;
    let member = seed_member(&app, "member", "회원").await;

    assert!(matches!(
        app.rewards.manual_grant("req-1", &[member.id], 0, "zero").await,
        Err(AppError::InvalidAmount(_))
    ));
    assert!(matches!(
        app.rewards.manual_grant("req-1", &[], 10, "nobody").await,
        Err(AppError::InvalidArgument(_))
    ));
    assert!(matches!(
        app.rewards.manual_grant("  ", &[member.id], 10, "blank id").await,
        Err(AppError::InvalidArgument(_))
    ));
}

#[tokio::test]
async fn activity_rewards_are_idempotent_per_member() {
    let app = test_app().await;
    let first = seed_member(&app, "first", "일번").await;
    let second = seed_member(&app, "second", "이번").await;
    let ids = [first.id, second.id];

    let granted = app
        .rewards
        .grant_activity_rewards(7, "Membership Trip", &ids)
        .await
        .unwrap();
    assert_eq!(granted, 2);

    let granted = app
        .rewards
        .grant_activity_rewards(7, "Membership Trip", &ids)
        .await
        .unwrap();
    assert_eq!(granted, 0);

    assert_eq!(app.ledger.balance(first.id).await.unwrap(), 20);
    assert_eq!(app.ledger.balance(second.id).await.unwrap(), 20);
}

#[tokio::test]
async fn payment_completion_promotes_guests_only() {
    let app = test_app().await;
    let member = seed_member(&app, "member", "회원").await;

    let snapshot = PaymentSnapshot {
        id: 1,
        member_id: member.id,
        period: "2026-2".to_string(),
        original_price: 15000,
        final_price: 15000,
        created_at: None,
        completed_at: None,
    };

    app.rewards.on_payment_completed(&snapshot).await.unwrap();
    let promoted = members::Entity::find_by_id(member.id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(promoted.role, MemberRole::User);

    // promotion is one-way and redelivery-safe
    app.rewards.on_payment_completed(&snapshot).await.unwrap();
    let still_user = members::Entity::find_by_id(member.id)
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(still_user.role, MemberRole::User);

    // payment completion never credits the ledger
    assert_eq!(app.ledger.balance(member.id).await.unwrap(), 0);
}
