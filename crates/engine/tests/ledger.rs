use std::sync::Arc;

use chrono::{TimeZone, Utc};
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use engine::{
    Engine, EngineError, ExpenseCmd, IncomeCmd, NoopNotifier, PaymentCmd, PaymentKind,
    PersonCmd, PersonKind, SourceKind, SourceRef, TransferCmd, WalletCmd, WalletKind,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .notifier(Arc::new(NoopNotifier))
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn wallet(engine: &Engine, name: &str) -> Uuid {
    engine
        .create_wallet(WalletCmd::new(name, WalletKind::Cash))
        .await
        .unwrap()
        .id
}

async fn balance(engine: &Engine, wallet_id: Uuid) -> i64 {
    engine.wallet(wallet_id).await.unwrap().balance_minor
}

fn day(d: u32) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, d, 12, 0, 0).unwrap()
}

#[tokio::test]
async fn income_and_expense_move_wallet_balance() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, "Cash").await;

    engine
        .create_income(IncomeCmd::new("Salary", 100_000, cash, day(1)))
        .await
        .unwrap();
    engine
        .create_expense(ExpenseCmd::new("Groceries", "Food", 12_500, day(2)).wallet_id(cash))
        .await
        .unwrap();

    assert_eq!(balance(&engine, cash).await, 87_500);
    assert!(engine.verify_balances().await.unwrap().is_empty());
}

#[tokio::test]
async fn pending_expense_leaves_wallet_untouched() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, "Cash").await;

    let expense = engine
        .create_expense(
            ExpenseCmd::new("Electricity", "Bills", 8_000, day(3))
                .wallet_id(cash)
                .paid(0),
        )
        .await
        .unwrap();

    assert_eq!(expense.status.as_str(), "Pending");
    assert_eq!(balance(&engine, cash).await, 0);
    assert!(
        engine
            .legs_for(SourceRef::new(SourceKind::Expense, expense.id))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn lowering_paid_amount_refunds_difference() {
    let (engine, _db) = engine_with_db().await;
    let a = wallet(&engine, "A").await;

    let expense = engine
        .create_expense(ExpenseCmd::new("Rent", "Housing", 10_000, day(1)).wallet_id(a))
        .await
        .unwrap();
    assert_eq!(balance(&engine, a).await, -10_000);

    let updated = engine
        .update_expense(
            expense.id,
            ExpenseCmd::new("Rent", "Housing", 10_000, day(1))
                .wallet_id(a)
                .paid(5_000),
        )
        .await
        .unwrap();

    assert_eq!(updated.status.as_str(), "Partial");
    assert_eq!(balance(&engine, a).await, -5_000);
}

#[tokio::test]
async fn moving_expense_to_other_wallet_moves_applied_amount() {
    let (engine, _db) = engine_with_db().await;
    let a = wallet(&engine, "A").await;
    let b = wallet(&engine, "B").await;

    let expense = engine
        .create_expense(ExpenseCmd::new("Rent", "Housing", 10_000, day(1)).wallet_id(a))
        .await
        .unwrap();
    engine
        .update_expense(
            expense.id,
            ExpenseCmd::new("Rent", "Housing", 10_000, day(1)).wallet_id(b),
        )
        .await
        .unwrap();

    assert_eq!(balance(&engine, a).await, 0);
    assert_eq!(balance(&engine, b).await, -10_000);
}

#[tokio::test]
async fn deleting_received_payment_removes_it_from_wallet() {
    let (engine, _db) = engine_with_db().await;
    let w = wallet(&engine, "W").await;
    let person = engine
        .create_person(PersonCmd::new("Ali", PersonKind::Friend))
        .await
        .unwrap();

    let payment = engine
        .create_payment(
            PaymentCmd::new(person.id, PaymentKind::Receive, 20_000, day(4))
                .paid(20_000)
                .wallet_id(w),
        )
        .await
        .unwrap();
    assert_eq!(payment.status.as_str(), "Completed");
    assert_eq!(balance(&engine, w).await, 20_000);

    engine.delete_payment(payment.id).await.unwrap();
    assert_eq!(balance(&engine, w).await, 0);
}

#[tokio::test]
async fn transfer_moves_amount_between_wallets() {
    let (engine, _db) = engine_with_db().await;
    let w1 = wallet(&engine, "W1").await;
    let w2 = wallet(&engine, "W2").await;

    engine
        .create_transfer(TransferCmd::new(w1, w2, 30_000, day(5)))
        .await
        .unwrap();

    assert_eq!(balance(&engine, w1).await, -30_000);
    assert_eq!(balance(&engine, w2).await, 30_000);
}

#[tokio::test]
async fn transfer_rejects_same_wallet_and_non_positive_amount() {
    let (engine, _db) = engine_with_db().await;
    let w1 = wallet(&engine, "W1").await;
    let w2 = wallet(&engine, "W2").await;

    let same = engine
        .create_transfer(TransferCmd::new(w1, w1, 100, day(5)))
        .await;
    assert!(matches!(same, Err(EngineError::InvalidTransfer(_))));

    let zero = engine
        .create_transfer(TransferCmd::new(w1, w2, 0, day(5)))
        .await;
    assert!(matches!(zero, Err(EngineError::InvalidTransfer(_))));

    assert!(engine.transfers().await.unwrap().is_empty());
    assert_eq!(balance(&engine, w1).await, 0);
}

#[tokio::test]
async fn editing_and_deleting_transfer_reverts_both_wallets() {
    let (engine, _db) = engine_with_db().await;
    let w1 = wallet(&engine, "W1").await;
    let w2 = wallet(&engine, "W2").await;
    let w3 = wallet(&engine, "W3").await;

    let transfer = engine
        .create_transfer(TransferCmd::new(w1, w2, 30_000, day(5)))
        .await
        .unwrap();
    engine
        .update_transfer(transfer.id, TransferCmd::new(w1, w3, 10_000, day(5)))
        .await
        .unwrap();

    assert_eq!(balance(&engine, w1).await, -10_000);
    assert_eq!(balance(&engine, w2).await, 0);
    assert_eq!(balance(&engine, w3).await, 10_000);

    engine.delete_transfer(transfer.id).await.unwrap();
    for w in [w1, w2, w3] {
        assert_eq!(balance(&engine, w).await, 0);
    }
}

#[tokio::test]
async fn second_delete_is_not_found_and_reverts_nothing() {
    let (engine, _db) = engine_with_db().await;
    let w = wallet(&engine, "W").await;

    engine
        .create_income(IncomeCmd::new("Bonus", 5_000, w, day(6)))
        .await
        .unwrap();
    let income = engine
        .create_income(IncomeCmd::new("Salary", 50_000, w, day(6)))
        .await
        .unwrap();

    engine.delete_income(income.id).await.unwrap();
    assert_eq!(balance(&engine, w).await, 5_000);
    assert!(
        engine
            .legs_for(SourceRef::new(SourceKind::Income, income.id))
            .await
            .unwrap()
            .is_empty()
    );

    let again = engine.delete_income(income.id).await;
    assert!(matches!(again, Err(EngineError::KeyNotFound(_))));
    assert_eq!(balance(&engine, w).await, 5_000);
}

#[tokio::test]
async fn rejected_update_keeps_previous_legs() {
    let (engine, _db) = engine_with_db().await;
    let w = wallet(&engine, "W").await;

    let expense = engine
        .create_expense(ExpenseCmd::new("Fuel", "Transport", 4_000, day(7)).wallet_id(w))
        .await
        .unwrap();

    // paid above amount is rejected before anything is written
    let invalid = engine
        .update_expense(
            expense.id,
            ExpenseCmd::new("Fuel", "Transport", 4_000, day(7))
                .wallet_id(w)
                .paid(9_000),
        )
        .await;
    assert!(matches!(invalid, Err(EngineError::InvalidAmount(_))));

    // unknown wallet
    let missing = engine
        .update_expense(
            expense.id,
            ExpenseCmd::new("Fuel", "Transport", 4_000, day(7)).wallet_id(Uuid::new_v4()),
        )
        .await;
    assert!(matches!(missing, Err(EngineError::KeyNotFound(_))));

    assert_eq!(balance(&engine, w).await, -4_000);
    assert_eq!(
        engine
            .legs_for(SourceRef::new(SourceKind::Expense, expense.id))
            .await
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn balance_equals_sum_of_qualifying_records_after_mixed_edits() {
    let (engine, _db) = engine_with_db().await;
    let a = wallet(&engine, "A").await;
    let b = wallet(&engine, "B").await;
    let person = engine
        .create_person(PersonCmd::new("Sara", PersonKind::Family))
        .await
        .unwrap();

    let salary = engine
        .create_income(IncomeCmd::new("Salary", 200_000, a, day(1)))
        .await
        .unwrap();
    let rent = engine
        .create_expense(ExpenseCmd::new("Rent", "Housing", 80_000, day(2)).wallet_id(a))
        .await
        .unwrap();
    let loan = engine
        .create_payment(
            PaymentCmd::new(person.id, PaymentKind::Send, 30_000, day(3))
                .paid(10_000)
                .wallet_id(a),
        )
        .await
        .unwrap();
    engine
        .create_transfer(TransferCmd::new(a, b, 50_000, day(4)))
        .await
        .unwrap();

    engine
        .update_income(salary.id, IncomeCmd::new("Salary", 210_000, b, day(1)))
        .await
        .unwrap();
    engine
        .update_payment(
            loan.id,
            PaymentCmd::new(person.id, PaymentKind::Send, 30_000, day(3))
                .paid(30_000)
                .wallet_id(b),
        )
        .await
        .unwrap();
    engine.delete_expense(rent.id).await.unwrap();

    // A: -50_000 transfer; B: +210_000 income +50_000 transfer -30_000 loan
    assert_eq!(balance(&engine, a).await, -50_000);
    assert_eq!(balance(&engine, b).await, 230_000);
    assert!(engine.verify_balances().await.unwrap().is_empty());
}

#[tokio::test]
async fn recompute_repairs_drifted_balance() {
    use sea_orm::{ConnectionTrait, Statement};

    let (engine, db) = engine_with_db().await;
    let w = wallet(&engine, "W").await;
    engine
        .create_income(IncomeCmd::new("Salary", 10_000, w, day(1)))
        .await
        .unwrap();

    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE wallets SET balance = ? WHERE id = ?",
        vec![999.into(), w.to_string().into()],
    ))
    .await
    .unwrap();

    let drift = engine.verify_balances().await.unwrap();
    assert_eq!(drift.len(), 1);
    assert_eq!(drift[0].difference(), 999 - 10_000);

    engine.recompute_balances().await.unwrap();
    assert_eq!(balance(&engine, w).await, 10_000);
    assert!(engine.verify_balances().await.unwrap().is_empty());
}

#[tokio::test]
async fn amounts_above_the_limit_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, "Cash").await;
    let bank = wallet(&engine, "Bank").await;
    let huge = i64::MAX / 2 + 10;

    let income = engine
        .create_income(IncomeCmd::new("Windfall", huge, cash, day(1)))
        .await;
    assert!(matches!(income, Err(EngineError::InvalidAmount(_))));

    let expense = engine
        .create_expense(ExpenseCmd::new("Yacht", "Leisure", huge, day(1)).wallet_id(cash))
        .await;
    assert!(matches!(expense, Err(EngineError::InvalidAmount(_))));

    let transfer = engine
        .create_transfer(TransferCmd::new(cash, bank, huge, day(1)))
        .await;
    assert!(matches!(transfer, Err(EngineError::InvalidAmount(_))));

    assert_eq!(balance(&engine, cash).await, 0);
    assert_eq!(balance(&engine, bank).await, 0);
    assert!(engine.incomes().await.unwrap().is_empty());
}

#[tokio::test]
async fn balance_overflow_is_refused_and_rolled_back() {
    use sea_orm::{ConnectionTrait, Statement};

    let (engine, db) = engine_with_db().await;
    let w = wallet(&engine, "W").await;
    let near_max = i64::MAX - 10;
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE wallets SET balance = ? WHERE id = ?",
        vec![near_max.into(), w.to_string().into()],
    ))
    .await
    .unwrap();

    let income = engine
        .create_income(IncomeCmd::new("Salary", 100, w, day(1)))
        .await;
    assert!(matches!(income, Err(EngineError::InvalidAmount(_))));

    assert_eq!(balance(&engine, w).await, near_max);
    assert!(engine.incomes().await.unwrap().is_empty());
    assert!(engine.financial_summary(day(2)).await.is_ok());
}

#[tokio::test]
async fn client_chosen_id_is_kept_and_cannot_be_reused() {
    let (engine, _db) = engine_with_db().await;
    let cash = wallet(&engine, "Cash").await;
    let id = Uuid::new_v4();

    let income = engine
        .create_income(IncomeCmd::new("Salary", 5_000, cash, day(1)).with_id(id))
        .await
        .unwrap();
    assert_eq!(income.id, id);

    let again = engine
        .create_income(IncomeCmd::new("Bonus", 1_000, cash, day(2)).with_id(id))
        .await;
    assert!(matches!(again, Err(EngineError::ExistingKey(_))));
    assert_eq!(balance(&engine, cash).await, 5_000);
    assert_eq!(engine.income(id).await.unwrap().source, "Salary");
}
