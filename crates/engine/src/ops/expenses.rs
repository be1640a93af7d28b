use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, Expense, ExpenseCmd, ExpensePaymentCmd, FinanceEntity, Money, Notification,
    PaymentRecord, ResultEngine, WalletEffects, derive_settlement, expense_payments, expenses,
    util::{normalize_display, validate_amount, validate_paid},
};

use super::{
    Engine,
    ledger::{post_effects, revert_effects},
    new_record_id, normalize_optional_text, with_tx,
};

const INITIAL_PAYMENT_NOTE: &str = "Initial payment";
const EXPENSES_LINK: &str = "/admin/finance/expenses";

impl Engine {
    /// All expenses, newest first, with their payment history.
    pub async fn expenses(&self) -> ResultEngine<Vec<Expense>> {
        let models = expenses::Entity::find()
            .order_by_desc(expenses::Column::Date)
            .order_by_desc(expenses::Column::CreatedAt)
            .all(&self.database)
            .await?;
        let mut histories = payment_histories(&self.database, None).await?;
        models
            .into_iter()
            .map(|model| {
                let history = histories.remove(&model.id).unwrap_or_default();
                Expense::try_from((model, history))
            })
            .collect()
    }

    pub async fn expense(&self, expense_id: Uuid) -> ResultEngine<Expense> {
        load_expense(&self.database, expense_id).await
    }

    /// Records a new expense.
    ///
    /// When something is already paid the payment history starts with an
    /// "Initial payment" record for that amount.
    pub async fn create_expense(&self, cmd: ExpenseCmd) -> ResultEngine<Expense> {
        let created: ResultEngine<Expense> = with_tx!(self, |db_tx| {
            let id = new_record_id::<expenses::Entity, _>(&db_tx, cmd.id, "expense").await?;
            let mut expense = self.build_expense(&db_tx, id, Utc::now(), cmd).await?;
            expenses::ActiveModel::from(&expense).insert(&db_tx).await?;

            if expense.paid_minor > 0 {
                let record = PaymentRecord {
                    amount_minor: expense.paid_minor,
                    date: expense.date,
                    method: expense.payment_method,
                    wallet_id: expense.wallet_id,
                    notes: Some(INITIAL_PAYMENT_NOTE.to_string()),
                };
                expense_payments::active_model(expense.id, 1, &record)
                    .insert(&db_tx)
                    .await?;
                expense.payment_history.push(record);
            }

            post_effects(&db_tx, &expense).await?;
            Ok(expense)
        });
        let expense = created?;

        tracing::info!(id = %expense.id, status = %expense.status, "expense created");
        self.after_commit(
            FinanceEntity::Expenses.invalidation_keys(),
            Some(
                Notification::new(
                    "Expense added",
                    format!("{}: {}", expense.title, Money::new(expense.amount_minor)),
                )
                .link(EXPENSES_LINK),
            ),
        )
        .await;
        Ok(expense)
    }

    /// Replaces every field of an expense. The payment history is kept.
    pub async fn update_expense(&self, expense_id: Uuid, cmd: ExpenseCmd) -> ResultEngine<Expense> {
        let updated: ResultEngine<Expense> = with_tx!(self, |db_tx| {
            let existing = load_expense(&db_tx, expense_id).await?;
            let mut expense = self
                .build_expense(&db_tx, expense_id, existing.created_at, cmd)
                .await?;

            revert_effects(&db_tx, existing.source()).await?;
            expense.payment_history = existing.payment_history;
            expenses::ActiveModel::from(&expense).update(&db_tx).await?;
            post_effects(&db_tx, &expense).await?;
            Ok(expense)
        });
        let expense = updated?;

        tracing::info!(id = %expense.id, status = %expense.status, "expense updated");
        self.after_commit(FinanceEntity::Expenses.invalidation_keys(), None)
            .await;
        Ok(expense)
    }

    pub async fn delete_expense(&self, expense_id: Uuid) -> ResultEngine<Expense> {
        let deleted: ResultEngine<Expense> = with_tx!(self, |db_tx| {
            let existing = load_expense(&db_tx, expense_id).await?;
            revert_effects(&db_tx, existing.source()).await?;
            expense_payments::Entity::delete_many()
                .filter(expense_payments::Column::ExpenseId.eq(expense_id.to_string()))
                .exec(&db_tx)
                .await?;
            expenses::Entity::delete_by_id(expense_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(existing)
        });
        let expense = deleted?;

        tracing::info!(id = %expense.id, "expense deleted");
        self.after_commit(FinanceEntity::Expenses.invalidation_keys(), None)
            .await;
        Ok(expense)
    }

    /// Pays part of what is still due on an expense.
    ///
    /// The amount must be positive and at most the amount due. If the expense
    /// has no wallet yet, it takes the wallet of this payment.
    pub async fn pay_expense(
        &self,
        expense_id: Uuid,
        cmd: ExpensePaymentCmd,
    ) -> ResultEngine<Expense> {
        let paid: ResultEngine<Expense> = with_tx!(self, |db_tx| {
            let mut expense = load_expense(&db_tx, expense_id).await?;
            if cmd.amount_minor <= 0 {
                return Err(EngineError::InvalidAmount(
                    "payment amount must be > 0".to_string(),
                ));
            }
            if cmd.amount_minor > expense.amount_due() {
                return Err(EngineError::InvalidAmount(format!(
                    "payment {} exceeds amount due {}",
                    Money::new(cmd.amount_minor),
                    Money::new(expense.amount_due())
                )));
            }
            if let Some(wallet_id) = cmd.wallet_id {
                self.require_wallet(&db_tx, wallet_id).await?;
            }

            revert_effects(&db_tx, expense.source()).await?;

            if expense.wallet_id.is_none() {
                expense.wallet_id = cmd.wallet_id;
            }
            expense.paid_minor += cmd.amount_minor;
            expense.status = derive_settlement(expense.amount_minor, expense.paid_minor).into();

            let record = PaymentRecord {
                amount_minor: cmd.amount_minor,
                date: cmd.date,
                method: cmd.method.unwrap_or(expense.payment_method),
                wallet_id: cmd.wallet_id.or(expense.wallet_id),
                notes: normalize_optional_text(cmd.notes.as_deref()),
            };
            let seq = i32::try_from(expense.payment_history.len() + 1).map_err(|_| {
                EngineError::Conflict("too many payments on one expense".to_string())
            })?;

            expenses::ActiveModel::from(&expense).update(&db_tx).await?;
            expense_payments::active_model(expense.id, seq, &record)
                .insert(&db_tx)
                .await?;
            expense.payment_history.push(record);

            post_effects(&db_tx, &expense).await?;
            Ok(expense)
        });
        let expense = paid?;

        tracing::info!(
            id = %expense.id,
            amount = cmd.amount_minor,
            status = %expense.status,
            "expense payment recorded"
        );
        self.after_commit(
            FinanceEntity::Expenses.invalidation_keys(),
            Some(
                Notification::new(
                    "Payment recorded",
                    format!(
                        "{} paid towards {}",
                        Money::new(cmd.amount_minor),
                        expense.title
                    ),
                )
                .link(EXPENSES_LINK),
            ),
        )
        .await;
        Ok(expense)
    }

    /// Validates `cmd` and builds the expense it describes, status included.
    async fn build_expense<C: ConnectionTrait>(
        &self,
        db: &C,
        id: Uuid,
        created_at: DateTime<Utc>,
        cmd: ExpenseCmd,
    ) -> ResultEngine<Expense> {
        let title = normalize_display(&cmd.title, "expense")?;
        let category = normalize_display(&cmd.category, "category")?;
        validate_amount(cmd.amount_minor, "amount")?;
        let paid_minor = cmd.paid_minor.unwrap_or(cmd.amount_minor);
        validate_paid(cmd.amount_minor, paid_minor)?;

        if let Some(wallet_id) = cmd.wallet_id {
            self.require_wallet(db, wallet_id).await?;
        }
        if let Some(category_id) = cmd.category_id {
            self.require_category(db, category_id).await?;
        }

        Ok(Expense {
            id,
            title,
            category,
            category_id: cmd.category_id,
            amount_minor: cmd.amount_minor,
            paid_minor,
            status: derive_settlement(cmd.amount_minor, paid_minor).into(),
            wallet_id: cmd.wallet_id,
            payment_method: cmd.payment_method,
            date: cmd.date,
            is_recurring: cmd.is_recurring,
            recurring_frequency: cmd.recurring_frequency.filter(|_| cmd.is_recurring),
            next_due_date: cmd.next_due_date,
            notes: normalize_optional_text(cmd.notes.as_deref()),
            payment_history: Vec::new(),
            created_at,
        })
    }
}

async fn load_expense<C: ConnectionTrait>(db: &C, expense_id: Uuid) -> ResultEngine<Expense> {
    let model = expenses::Entity::find_by_id(expense_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("expense not exists".to_string()))?;
    let history = payment_histories(db, Some(expense_id))
        .await?
        .remove(&model.id)
        .unwrap_or_default();
    Expense::try_from((model, history))
}

/// Payment records grouped by expense id, each group ordered by `seq`.
async fn payment_histories<C: ConnectionTrait>(
    db: &C,
    expense_id: Option<Uuid>,
) -> ResultEngine<HashMap<String, Vec<PaymentRecord>>> {
    let mut query = expense_payments::Entity::find()
        .order_by_asc(expense_payments::Column::ExpenseId)
        .order_by_asc(expense_payments::Column::Seq);
    if let Some(expense_id) = expense_id {
        query = query.filter(expense_payments::Column::ExpenseId.eq(expense_id.to_string()));
    }

    let mut grouped: HashMap<String, Vec<PaymentRecord>> = HashMap::new();
    for model in query.all(db).await? {
        let key = model.expense_id.clone();
        grouped
            .entry(key)
            .or_default()
            .push(PaymentRecord::try_from(model)?);
    }
    Ok(grouped)
}
