use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, FinanceEntity, Money, Notification, Payment, PaymentCmd, PaymentKind,
    ResultEngine, WalletEffects, derive_settlement, payments,
    util::{validate_amount, validate_paid},
};

use super::{
    Engine,
    ledger::{post_effects, revert_effects},
    new_record_id, normalize_optional_text, with_tx,
};

impl Engine {
    pub async fn payments(&self) -> ResultEngine<Vec<Payment>> {
        payments::Entity::find()
            .order_by_desc(payments::Column::Date)
            .order_by_desc(payments::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Payment::try_from)
            .collect()
    }

    /// Payments exchanged with one person, newest first.
    pub async fn person_payments(&self, person_id: Uuid) -> ResultEngine<Vec<Payment>> {
        payments::Entity::find()
            .filter(payments::Column::PersonId.eq(person_id.to_string()))
            .order_by_desc(payments::Column::Date)
            .order_by_desc(payments::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Payment::try_from)
            .collect()
    }

    pub async fn payment(&self, payment_id: Uuid) -> ResultEngine<Payment> {
        load_payment(&self.database, payment_id).await
    }

    /// Records money sent to or received from a person.
    ///
    /// Nothing is paid unless the command says so, and funds only move once
    /// something is paid.
    pub async fn create_payment(&self, cmd: PaymentCmd) -> ResultEngine<Payment> {
        let created: ResultEngine<(Payment, String)> = with_tx!(self, |db_tx| {
            let person = self.require_person(&db_tx, cmd.person_id).await?;
            let id = new_record_id::<payments::Entity, _>(&db_tx, cmd.id, "payment").await?;
            let payment = self.build_payment(&db_tx, id, Utc::now(), cmd).await?;
            payments::ActiveModel::from(&payment).insert(&db_tx).await?;
            post_effects(&db_tx, &payment).await?;
            Ok((payment, person.name))
        });
        let (payment, person_name) = created?;

        tracing::info!(id = %payment.id, status = %payment.status, "payment created");
        let title = match payment.kind {
            PaymentKind::Send => "Payment sent",
            PaymentKind::Receive => "Payment received",
        };
        self.after_commit(
            FinanceEntity::Payments.invalidation_keys(),
            Some(
                Notification::new(
                    title,
                    format!("{}: {}", person_name, Money::new(payment.amount_minor)),
                )
                .link(format!("/admin/finance/people/{}", payment.person_id)),
            ),
        )
        .await;
        Ok(payment)
    }

    pub async fn update_payment(
        &self,
        payment_id: Uuid,
        cmd: PaymentCmd,
    ) -> ResultEngine<Payment> {
        let updated: ResultEngine<Payment> = with_tx!(self, |db_tx| {
            let existing = load_payment(&db_tx, payment_id).await?;
            self.require_person(&db_tx, cmd.person_id).await?;
            let payment = self
                .build_payment(&db_tx, payment_id, existing.created_at, cmd)
                .await?;
            revert_effects(&db_tx, existing.source()).await?;
            payments::ActiveModel::from(&payment).update(&db_tx).await?;
            post_effects(&db_tx, &payment).await?;
            Ok(payment)
        });
        let payment = updated?;

        tracing::info!(id = %payment.id, status = %payment.status, "payment updated");
        self.after_commit(FinanceEntity::Payments.invalidation_keys(), None)
            .await;
        Ok(payment)
    }

    pub async fn delete_payment(&self, payment_id: Uuid) -> ResultEngine<Payment> {
        let deleted: ResultEngine<Payment> = with_tx!(self, |db_tx| {
            let existing = load_payment(&db_tx, payment_id).await?;
            revert_effects(&db_tx, existing.source()).await?;
            payments::Entity::delete_by_id(payment_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(existing)
        });
        let payment = deleted?;

        tracing::info!(id = %payment.id, "payment deleted");
        self.after_commit(FinanceEntity::Payments.invalidation_keys(), None)
            .await;
        Ok(payment)
    }

    async fn build_payment<C: ConnectionTrait>(
        &self,
        db: &C,
        id: Uuid,
        created_at: DateTime<Utc>,
        cmd: PaymentCmd,
    ) -> ResultEngine<Payment> {
        validate_amount(cmd.amount_minor, "amount")?;
        let paid_minor = cmd.paid_minor.unwrap_or(0);
        validate_paid(cmd.amount_minor, paid_minor)?;
        if let Some(wallet_id) = cmd.wallet_id {
            self.require_wallet(db, wallet_id).await?;
        }

        Ok(Payment {
            id,
            person_id: cmd.person_id,
            kind: cmd.kind,
            amount_minor: cmd.amount_minor,
            paid_minor,
            status: derive_settlement(cmd.amount_minor, paid_minor).into(),
            wallet_id: cmd.wallet_id,
            method: cmd.method,
            date: cmd.date,
            due_date: cmd.due_date,
            notes: normalize_optional_text(cmd.notes.as_deref()),
            created_at,
        })
    }
}

async fn load_payment<C: ConnectionTrait>(db: &C, payment_id: Uuid) -> ResultEngine<Payment> {
    let model = payments::Entity::find_by_id(payment_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("payment not exists".to_string()))?;
    Payment::try_from(model)
}
