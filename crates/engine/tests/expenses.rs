use chrono::{Duration, TimeZone, Utc};
use sea_orm::Database;
use uuid::Uuid;

use engine::{
    Cache, CategoryCmd, CategoryKind, Engine, EngineError, ExpenseCmd, ExpensePaymentCmd,
    ExpenseStatus, Frequency, PaymentMethod, WalletCmd, WalletKind, cache::DEFAULT_TTL, keys,
};
use migration::MigratorTrait;

async fn engine_with_db() -> Engine {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    Engine::builder()
        .database(db)
        .cache(Cache::in_memory(DEFAULT_TTL))
        .build()
        .await
        .unwrap()
}

async fn wallet(engine: &Engine, name: &str) -> Uuid {
    engine
        .create_wallet(WalletCmd::new(name, WalletKind::Bank))
        .await
        .unwrap()
        .id
}

fn march(d: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, d, 9, 30, 0).unwrap()
}

#[tokio::test]
async fn paid_on_creation_seeds_initial_payment() {
    let engine = engine_with_db().await;
    let bank = wallet(&engine, "Bank").await;

    let expense = engine
        .create_expense(
            ExpenseCmd::new("Laptop", "Electronics", 150_000, march(1))
                .wallet_id(bank)
                .paid(50_000)
                .payment_method(PaymentMethod::Bank),
        )
        .await
        .unwrap();

    assert_eq!(expense.status, ExpenseStatus::Partial);
    assert_eq!(expense.payment_history.len(), 1);
    assert_eq!(expense.payment_history[0].amount_minor, 50_000);
    assert_eq!(
        expense.payment_history[0].notes.as_deref(),
        Some("Initial payment")
    );

    let unpaid = engine
        .create_expense(ExpenseCmd::new("Phone", "Electronics", 9_000, march(1)).paid(0))
        .await
        .unwrap();
    assert!(unpaid.payment_history.is_empty());
}

#[tokio::test]
async fn installments_settle_expense() {
    let engine = engine_with_db().await;
    let bank = wallet(&engine, "Bank").await;

    let expense = engine
        .create_expense(
            ExpenseCmd::new("Laptop", "Electronics", 150_000, march(1))
                .wallet_id(bank)
                .paid(50_000),
        )
        .await
        .unwrap();

    let after_first = engine
        .pay_expense(expense.id, ExpensePaymentCmd::new(60_000, march(10)))
        .await
        .unwrap();
    assert_eq!(after_first.paid_minor, 110_000);
    assert_eq!(after_first.status, ExpenseStatus::Partial);
    assert_eq!(engine.wallet(bank).await.unwrap().balance_minor, -110_000);

    let settled = engine
        .pay_expense(expense.id, ExpensePaymentCmd::new(40_000, march(20)))
        .await
        .unwrap();
    assert_eq!(settled.status, ExpenseStatus::Paid);
    assert_eq!(settled.amount_due(), 0);
    assert_eq!(engine.wallet(bank).await.unwrap().balance_minor, -150_000);

    let reloaded = engine.expense(expense.id).await.unwrap();
    let amounts: Vec<i64> = reloaded
        .payment_history
        .iter()
        .map(|p| p.amount_minor)
        .collect();
    assert_eq!(amounts, vec![50_000, 60_000, 40_000]);
}

#[tokio::test]
async fn payment_must_fit_amount_due() {
    let engine = engine_with_db().await;
    let bank = wallet(&engine, "Bank").await;
    let expense = engine
        .create_expense(
            ExpenseCmd::new("Course", "Education", 20_000, march(2))
                .wallet_id(bank)
                .paid(15_000),
        )
        .await
        .unwrap();

    let too_much = engine
        .pay_expense(expense.id, ExpensePaymentCmd::new(5_001, march(3)))
        .await;
    assert!(matches!(too_much, Err(EngineError::InvalidAmount(_))));

    let zero = engine
        .pay_expense(expense.id, ExpensePaymentCmd::new(0, march(3)))
        .await;
    assert!(matches!(zero, Err(EngineError::InvalidAmount(_))));

    let missing = engine
        .pay_expense(Uuid::new_v4(), ExpensePaymentCmd::new(100, march(3)))
        .await;
    assert!(matches!(missing, Err(EngineError::KeyNotFound(_))));

    assert_eq!(engine.wallet(bank).await.unwrap().balance_minor, -15_000);
}

#[tokio::test]
async fn paying_walletless_expense_assigns_wallet() {
    let engine = engine_with_db().await;
    let cash = wallet(&engine, "Cash").await;
    let expense = engine
        .create_expense(ExpenseCmd::new("Gift", "Family", 6_000, march(4)).paid(0))
        .await
        .unwrap();
    assert_eq!(expense.wallet_id, None);

    let paid = engine
        .pay_expense(
            expense.id,
            ExpensePaymentCmd::new(6_000, march(5)).wallet_id(cash),
        )
        .await
        .unwrap();

    assert_eq!(paid.wallet_id, Some(cash));
    assert_eq!(paid.status, ExpenseStatus::Paid);
    assert_eq!(engine.wallet(cash).await.unwrap().balance_minor, -6_000);
}

#[tokio::test]
async fn paid_above_amount_is_rejected() {
    let engine = engine_with_db().await;
    let result = engine
        .create_expense(ExpenseCmd::new("Tea", "Food", 100, march(1)).paid(101))
        .await;
    assert!(matches!(result, Err(EngineError::InvalidAmount(_))));

    let negative = engine
        .create_expense(ExpenseCmd::new("Tea", "Food", -1, march(1)))
        .await;
    assert!(matches!(negative, Err(EngineError::InvalidAmount(_))));
    assert!(engine.expenses().await.unwrap().is_empty());
}

#[tokio::test]
async fn blank_title_is_rejected() {
    let engine = engine_with_db().await;
    let result = engine
        .create_expense(ExpenseCmd::new("   ", "Food", 100, march(1)))
        .await;
    assert!(matches!(result, Err(EngineError::InvalidName(_))));
}

#[tokio::test]
async fn overdue_is_reported_without_touching_stored_status() {
    let engine = engine_with_db().await;
    let now = march(15);

    let late = engine
        .create_expense(
            ExpenseCmd::new("Internet", "Bills", 3_000, march(1))
                .paid(0)
                .recurring(Frequency::Monthly, Some(now - Duration::days(3))),
        )
        .await
        .unwrap();
    engine
        .create_expense(
            ExpenseCmd::new("Water", "Bills", 1_000, march(1))
                .paid(0)
                .due(now + Duration::days(3)),
        )
        .await
        .unwrap();

    let classified = engine.classified_expenses(now).await.unwrap();
    let late_view = classified.iter().find(|e| e.id == late.id).unwrap();
    assert_eq!(late_view.status, ExpenseStatus::Overdue);
    assert_eq!(
        classified
            .iter()
            .filter(|e| e.status == ExpenseStatus::Overdue)
            .count(),
        1
    );

    assert_eq!(
        engine.expense(late.id).await.unwrap().status,
        ExpenseStatus::Pending
    );
    assert_eq!(engine.financial_summary(now).await.unwrap().overdue_expenses, 1);
}

#[tokio::test]
async fn expense_write_drops_cached_lists() {
    let engine = engine_with_db().await;
    let cache = engine.cache().clone();

    cache.put_json(keys::EXPENSES, &Vec::<String>::new()).await;
    cache.put_json(keys::WALLETS, &Vec::<String>::new()).await;
    cache.put_json(keys::PEOPLE, &Vec::<String>::new()).await;

    engine
        .create_expense(ExpenseCmd::new("Snacks", "Food", 500, march(1)))
        .await
        .unwrap();

    assert!(!cache.contains(keys::EXPENSES).await);
    assert!(!cache.contains(keys::WALLETS).await);
    assert!(cache.contains(keys::PEOPLE).await);
}

#[tokio::test]
async fn deleting_category_keeps_expense_text() {
    let engine = engine_with_db().await;
    let food = engine
        .create_category(CategoryCmd::new("Food", CategoryKind::Expense))
        .await
        .unwrap();
    let mut cmd = ExpenseCmd::new("Lunch", "Food", 1_200, march(8));
    cmd.category_id = Some(food.id);
    let expense = engine.create_expense(cmd).await.unwrap();

    engine.delete_category(food.id).await.unwrap();

    let reloaded = engine.expense(expense.id).await.unwrap();
    assert_eq!(reloaded.category_id, None);
    assert_eq!(reloaded.category, "Food");
}
