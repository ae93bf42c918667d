mod common;

use clubhouse_backend::entities::{PointTransactionKind, point_transaction_entity as txs};
use clubhouse_backend::error::AppError;
use clubhouse_backend::models::PaginationParams;
use common::{TEST_PERIOD, test_app};
use sea_orm::{EntityTrait, PaginatorTrait};

#[tokio::test]
async fn debit_then_credit_restores_balance() {
    let app = test_app().await;

    app.ledger.credit(1, 500, "seed", TEST_PERIOD).await.unwrap();
    assert_eq!(app.ledger.balance(1).await.unwrap(), 500);

    app.ledger.debit(1, 200, "spend", TEST_PERIOD).await.unwrap();
    app.ledger.credit(1, 200, "refund", TEST_PERIOD).await.unwrap();

    let account = app.ledger.account(1).await.unwrap().unwrap();
    assert_eq!(account.balance, 500);
    // total_earned only ever grows: seed + refund
    assert_eq!(account.total_earned, 700);

    // seed + exactly two entries for the round trip
    let entries = txs::Entity::find().count(&app.db).await.unwrap();
    assert_eq!(entries, 3);
}

#[tokio::test]
async fn ledger_entries_reconcile_to_balance() {
    let app = test_app().await;

    app.ledger.credit(1, 120, "a", TEST_PERIOD).await.unwrap();
    app.ledger.credit(1, 30, "b", TEST_PERIOD).await.unwrap();
    app.ledger.debit(1, 50, "c", TEST_PERIOD).await.unwrap();

    let entries = txs::Entity::find().all(&app.db).await.unwrap();
    let derived: i64 = entries
        .iter()
        .map(|e| match e.kind {
            PointTransactionKind::Earn => e.amount,
            PointTransactionKind::Spend => -e.amount,
        })
        .sum();

    assert_eq!(derived, app.ledger.balance(1).await.unwrap());
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let app = test_app().await;
    app.ledger.credit(1, 100, "seed", TEST_PERIOD).await.unwrap();

    assert!(matches!(
        app.ledger.credit(1, 0, "zero", TEST_PERIOD).await,
        Err(AppError::InvalidAmount(_))
    ));
    assert!(matches!(
        app.ledger.credit(1, -10, "negative", TEST_PERIOD).await,
        Err(AppError::InvalidAmount(_))
    ));
    assert!(matches!(
        app.ledger.debit(1, 0, "zero", TEST_PERIOD).await,
        Err(AppError::InvalidAmount(_))
    ));
    assert!(matches!(
        app.ledger.debit(1, -10, "negative", TEST_PERIOD).await,
        Err(AppError::InvalidAmount(_))
    ));

    // nothing was mutated
    let account = app.ledger.account(1).await.unwrap().unwrap();
    assert_eq!(account.balance, 100);
    assert_eq!(account.total_earned, 100);
    assert_eq!(txs::Entity::find().count(&app.db).await.unwrap(), 1);
}

#[tokio::test]
async fn debit_never_overdraws() {
    let app = test_app().await;
    app.ledger.credit(1, 40, "seed", TEST_PERIOD).await.unwrap();

    assert!(matches!(
        app.ledger.debit(1, 41, "too much", TEST_PERIOD).await,
        Err(AppError::InsufficientBalance(_))
    ));

    assert_eq!(app.ledger.balance(1).await.unwrap(), 40);
    assert_eq!(txs::Entity::find().count(&app.db).await.unwrap(), 1);
}

#[tokio::test]
async fn concurrent_credits_do_not_lose_updates() {
    let app = test_app().await;

    let mut handles = Vec::new();
    for i in 0..10 {
        let ledger = app.ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger
                .credit(1, 10, &format!("grant {i}"), TEST_PERIOD)
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let account = app.ledger.account(1).await.unwrap().unwrap();
    assert_eq!(account.balance, 100);
    assert_eq!(account.total_earned, 100);
    assert_eq!(txs::Entity::find().count(&app.db).await.unwrap(), 10);
}

#[tokio::test]
async fn history_lists_newest_first() {
    let app = test_app().await;
    app.ledger.credit(1, 10, "first", TEST_PERIOD).await.unwrap();
    app.ledger.credit(1, 20, "second", TEST_PERIOD).await.unwrap();
    app.ledger.debit(1, 5, "third", TEST_PERIOD).await.unwrap();

    let page = app
        .ledger
        .history(1, &PaginationParams::new(None, None))
        .await
        .unwrap();

    assert_eq!(page.pagination.total, 3);
    let reasons: Vec<&str> = page.items.iter().map(|t| t.reason.as_str()).collect();
    assert_eq!(reasons, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn history_for_unknown_member_is_empty() {
    let app = test_app().await;
    let page = app
        .ledger
        .history(999, &PaginationParams::new(None, None))
        .await
        .unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.pagination.total, 0);
}
