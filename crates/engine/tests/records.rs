use chrono::Utc;
use sea_orm::Database;
use serde_json::json;

use engine::{
    CategoryCmd, CategoryKind, ContentKind, Engine, EngineError, IncomeCmd, PaymentCmd,
    PaymentKind, PersonCmd, PersonKind, WalletCmd, WalletKind,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder().database(db).build().await.unwrap()
}

#[tokio::test]
async fn wallet_names_are_unique_ignoring_case() {
    let engine = engine_with_db().await;
    engine
        .create_wallet(WalletCmd::new("Meezan Bank", WalletKind::Bank))
        .await
        .unwrap();

    let clash = engine
        .create_wallet(WalletCmd::new("  meezan   bank ", WalletKind::Bank))
        .await;
    assert!(matches!(clash, Err(EngineError::ExistingKey(_))));
}

#[tokio::test]
async fn only_one_default_wallet() {
    let engine = engine_with_db().await;
    let first = engine
        .create_wallet(WalletCmd::new("Cash", WalletKind::Cash).default_wallet())
        .await
        .unwrap();
    let second = engine
        .create_wallet(
            WalletCmd::new("JazzCash", WalletKind::MobileWallet)
                .currency("pkr")
                .default_wallet(),
        )
        .await
        .unwrap();

    let wallets = engine.wallets().await.unwrap();
    assert_eq!(wallets[0].id, second.id);
    assert_eq!(wallets[0].currency, "PKR");
    assert!(!engine.wallet(first.id).await.unwrap().is_default);
}

#[tokio::test]
async fn editing_wallet_keeps_balance() {
    let engine = engine_with_db().await;
    let wallet = engine
        .create_wallet(WalletCmd::new("Cash", WalletKind::Cash))
        .await
        .unwrap();
    engine
        .create_income(IncomeCmd::new("Salary", 7_500, wallet.id, Utc::now()))
        .await
        .unwrap();

    let renamed = engine
        .update_wallet(wallet.id, WalletCmd::new("Purse", WalletKind::Cash))
        .await
        .unwrap();
    assert_eq!(renamed.name, "Purse");
    assert_eq!(renamed.balance_minor, 7_500);
}

#[tokio::test]
async fn used_wallet_cannot_be_deleted() {
    let engine = engine_with_db().await;
    let used = engine
        .create_wallet(WalletCmd::new("Cash", WalletKind::Cash))
        .await
        .unwrap();
    let unused = engine
        .create_wallet(WalletCmd::new("Spare", WalletKind::Other))
        .await
        .unwrap();
    engine
        .create_income(IncomeCmd::new("Salary", 1_000, used.id, Utc::now()))
        .await
        .unwrap();

    let blocked = engine.delete_wallet(used.id).await;
    assert!(matches!(blocked, Err(EngineError::Conflict(_))));

    engine.delete_wallet(unused.id).await.unwrap();
    assert_eq!(engine.wallets().await.unwrap().len(), 1);
}

#[tokio::test]
async fn person_with_payments_cannot_be_deleted() {
    let engine = engine_with_db().await;
    let person = engine
        .create_person(PersonCmd::new("Bilal", PersonKind::Business).email(" Bilal@Example.COM "))
        .await
        .unwrap();
    assert_eq!(person.email.as_deref(), Some("bilal@example.com"));

    let payment = engine
        .create_payment(PaymentCmd::new(
            person.id,
            PaymentKind::Send,
            5_000,
            Utc::now(),
        ))
        .await
        .unwrap();

    let blocked = engine.delete_person(person.id).await;
    assert!(matches!(blocked, Err(EngineError::Conflict(_))));

    engine.delete_payment(payment.id).await.unwrap();
    engine.delete_person(person.id).await.unwrap();
    assert!(engine.people().await.unwrap().is_empty());
}

#[tokio::test]
async fn payment_for_unknown_person_fails() {
    let engine = engine_with_db().await;
    let result = engine
        .create_payment(PaymentCmd::new(
            uuid::Uuid::new_v4(),
            PaymentKind::Receive,
            1_000,
            Utc::now(),
        ))
        .await;
    assert!(matches!(result, Err(EngineError::KeyNotFound(_))));
}

#[tokio::test]
async fn person_summary_derives_balance() {
    let engine = engine_with_db().await;
    let wallet = engine
        .create_wallet(WalletCmd::new("Cash", WalletKind::Cash))
        .await
        .unwrap();
    let person = engine
        .create_person(PersonCmd::new("Hina", PersonKind::Friend))
        .await
        .unwrap();

    engine
        .create_payment(
            PaymentCmd::new(person.id, PaymentKind::Send, 10_000, Utc::now())
                .paid(10_000)
                .wallet_id(wallet.id),
        )
        .await
        .unwrap();
    engine
        .create_payment(
            PaymentCmd::new(person.id, PaymentKind::Receive, 4_000, Utc::now())
                .paid(1_000)
                .wallet_id(wallet.id),
        )
        .await
        .unwrap();

    let summary = engine.person_summary(person.id).await.unwrap();
    assert_eq!(summary.totals.total_given, 10_000);
    assert_eq!(summary.totals.total_received, 4_000);
    assert_eq!(summary.totals.pending_received, 3_000);
    assert_eq!(summary.totals.balance, -6_000);
    assert_eq!(summary.payments.len(), 2);

    assert_eq!(
        engine.wallet(wallet.id).await.unwrap().balance_minor,
        -10_000 + 1_000
    );
}

#[tokio::test]
async fn category_names_unique_per_kind() {
    let engine = engine_with_db().await;
    engine
        .create_category(CategoryCmd::new("Salary", CategoryKind::Income))
        .await
        .unwrap();

    let clash = engine
        .create_category(CategoryCmd::new("SALARY", CategoryKind::Income))
        .await;
    assert!(matches!(clash, Err(EngineError::ExistingKey(_))));

    engine
        .create_category(CategoryCmd::new("Salary", CategoryKind::Expense))
        .await
        .unwrap();
    assert_eq!(
        engine
            .categories(Some(CategoryKind::Income))
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn ledger_mutations_write_notifications() {
    let engine = engine_with_db().await;
    let wallet = engine
        .create_wallet(WalletCmd::new("Cash", WalletKind::Cash))
        .await
        .unwrap();
    engine
        .create_income(IncomeCmd::new("Freelance", 25_000, wallet.id, Utc::now()))
        .await
        .unwrap();

    let notifications = engine.notifications(10).await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Income received");
    assert!(!notifications[0].read);

    assert_eq!(engine.mark_notifications_read(None).await.unwrap(), 1);
    assert!(engine.notifications(10).await.unwrap()[0].read);
}

#[tokio::test]
async fn list_content_keeps_insertion_order() {
    let engine = engine_with_db().await;
    let rust = engine
        .add_content(ContentKind::Skills, json!({"name": "Rust", "level": 80}))
        .await
        .unwrap();
    let sql = engine
        .add_content(ContentKind::Skills, json!({"name": "SQL", "level": "65"}))
        .await
        .unwrap();
    assert_eq!(rust.position, 0);
    assert_eq!(sql.position, 1);

    let bad = engine
        .add_content(ContentKind::Skills, json!({"name": "Go", "level": 140}))
        .await;
    assert!(matches!(bad, Err(EngineError::Validation(_))));

    engine
        .update_content(
            ContentKind::Skills,
            rust.id,
            json!({"name": "Rust", "level": 90}),
        )
        .await
        .unwrap();
    engine.delete_content(ContentKind::Skills, sql.id).await.unwrap();

    let skills = engine.content(ContentKind::Skills).await.unwrap();
    assert_eq!(skills.len(), 1);
    assert_eq!(skills[0].data["level"], 90);
    assert_eq!(skills[0].position, 0);
}

#[tokio::test]
async fn singleton_content_is_replaced() {
    let engine = engine_with_db().await;
    let first = engine
        .add_content(ContentKind::Hero, json!({"headline": "Hello"}))
        .await
        .unwrap();
    let second = engine
        .save_content(ContentKind::Hero, json!({"headline": "Hi there"}))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    let hero = engine.content(ContentKind::Hero).await.unwrap();
    assert_eq!(hero.len(), 1);
    assert_eq!(hero[0].data["headline"], "Hi there");

    let portfolio = engine.portfolio().await.unwrap();
    assert_eq!(portfolio["hero"].len(), 1);
    assert!(portfolio["projects"].is_empty());

    let wrong_kind = engine
        .delete_content(ContentKind::Projects, first.id)
        .await;
    assert!(matches!(wrong_kind, Err(EngineError::KeyNotFound(_))));
}
