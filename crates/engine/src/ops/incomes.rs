use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, FinanceEntity, Income, IncomeCmd, Money, Notification, NotificationKind,
    ResultEngine, WalletEffects, incomes,
    util::{normalize_display, validate_amount},
};

use super::{
    Engine,
    ledger::{post_effects, revert_effects},
    new_record_id, normalize_optional_text, with_tx,
};

impl Engine {
    pub async fn incomes(&self) -> ResultEngine<Vec<Income>> {
        incomes::Entity::find()
            .order_by_desc(incomes::Column::Date)
            .order_by_desc(incomes::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Income::try_from)
            .collect()
    }

    pub async fn income(&self, income_id: Uuid) -> ResultEngine<Income> {
        load_income(&self.database, income_id).await
    }

    /// Records income. The full amount lands in the wallet right away.
    pub async fn create_income(&self, cmd: IncomeCmd) -> ResultEngine<Income> {
        let created: ResultEngine<Income> = with_tx!(self, |db_tx| {
            let id = new_record_id::<incomes::Entity, _>(&db_tx, cmd.id, "income").await?;
            let income = self.build_income(&db_tx, id, Utc::now(), cmd).await?;
            incomes::ActiveModel::from(&income).insert(&db_tx).await?;
            post_effects(&db_tx, &income).await?;
            Ok(income)
        });
        let income = created?;

        tracing::info!(id = %income.id, amount = income.amount_minor, "income created");
        self.after_commit(
            FinanceEntity::Income.invalidation_keys(),
            Some(
                Notification::new(
                    "Income received",
                    format!("{}: {}", income.source, Money::new(income.amount_minor)),
                )
                .kind(NotificationKind::Success)
                .link("/admin/finance/income"),
            ),
        )
        .await;
        Ok(income)
    }

    pub async fn update_income(&self, income_id: Uuid, cmd: IncomeCmd) -> ResultEngine<Income> {
        let updated: ResultEngine<Income> = with_tx!(self, |db_tx| {
            let existing = load_income(&db_tx, income_id).await?;
            let income = self
                .build_income(&db_tx, income_id, existing.created_at, cmd)
                .await?;
            revert_effects(&db_tx, existing.source()).await?;
            incomes::ActiveModel::from(&income).update(&db_tx).await?;
            post_effects(&db_tx, &income).await?;
            Ok(income)
        });
        let income = updated?;

        tracing::info!(id = %income.id, "income updated");
        self.after_commit(FinanceEntity::Income.invalidation_keys(), None)
            .await;
        Ok(income)
    }

    pub async fn delete_income(&self, income_id: Uuid) -> ResultEngine<Income> {
        let deleted: ResultEngine<Income> = with_tx!(self, |db_tx| {
            let existing = load_income(&db_tx, income_id).await?;
            revert_effects(&db_tx, existing.source()).await?;
            incomes::Entity::delete_by_id(income_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(existing)
        });
        let income = deleted?;

        tracing::info!(id = %income.id, "income deleted");
        self.after_commit(FinanceEntity::Income.invalidation_keys(), None)
            .await;
        Ok(income)
    }

    async fn build_income<C: ConnectionTrait>(
        &self,
        db: &C,
        id: Uuid,
        created_at: DateTime<Utc>,
        cmd: IncomeCmd,
    ) -> ResultEngine<Income> {
        let source = normalize_display(&cmd.source, "income source")?;
        validate_amount(cmd.amount_minor, "amount")?;
        self.require_wallet(db, cmd.wallet_id).await?;
        if let Some(category_id) = cmd.category_id {
            self.require_category(db, category_id).await?;
        }

        Ok(Income {
            id,
            source,
            amount_minor: cmd.amount_minor,
            wallet_id: cmd.wallet_id,
            category_id: cmd.category_id,
            date: cmd.date,
            is_recurring: cmd.is_recurring,
            recurring_frequency: cmd.recurring_frequency.filter(|_| cmd.is_recurring),
            notes: normalize_optional_text(cmd.notes.as_deref()),
            created_at,
        })
    }
}

async fn load_income<C: ConnectionTrait>(db: &C, income_id: Uuid) -> ResultEngine<Income> {
    let model = incomes::Entity::find_by_id(income_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("income not exists".to_string()))?;
    Income::try_from(model)
}
