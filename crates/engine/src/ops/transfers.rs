use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryOrder, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, FinanceEntity, Money, Notification, ResultEngine, Transfer, TransferCmd,
    WalletEffects, transfers, util::validate_amount,
};

use super::{
    Engine,
    ledger::{post_effects, revert_effects},
    new_record_id, normalize_optional_text, with_tx,
};

impl Engine {
    pub async fn transfers(&self) -> ResultEngine<Vec<Transfer>> {
        transfers::Entity::find()
            .order_by_desc(transfers::Column::Date)
            .order_by_desc(transfers::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transfer::try_from)
            .collect()
    }

    pub async fn transfer(&self, transfer_id: Uuid) -> ResultEngine<Transfer> {
        load_transfer(&self.database, transfer_id).await
    }

    /// Moves `amount` from one wallet to another. Both legs are posted in
    /// the same transaction.
    pub async fn create_transfer(&self, cmd: TransferCmd) -> ResultEngine<Transfer> {
        let created: ResultEngine<(Transfer, String, String)> = with_tx!(self, |db_tx| {
            let id = new_record_id::<transfers::Entity, _>(&db_tx, cmd.id, "transfer").await?;
            let (transfer, from_name, to_name) =
                self.build_transfer(&db_tx, id, Utc::now(), cmd).await?;
            transfers::ActiveModel::from(&transfer).insert(&db_tx).await?;
            post_effects(&db_tx, &transfer).await?;
            Ok((transfer, from_name, to_name))
        });
        let (transfer, from_name, to_name) = created?;

        tracing::info!(
            id = %transfer.id,
            amount = transfer.amount_minor,
            "transfer created"
        );
        self.after_commit(
            FinanceEntity::Transfers.invalidation_keys(),
            Some(
                Notification::new(
                    "Transfer completed",
                    format!(
                        "{} moved from {from_name} to {to_name}",
                        Money::new(transfer.amount_minor)
                    ),
                )
                .link("/admin/finance/wallets"),
            ),
        )
        .await;
        Ok(transfer)
    }

    pub async fn update_transfer(
        &self,
        transfer_id: Uuid,
        cmd: TransferCmd,
    ) -> ResultEngine<Transfer> {
        let updated: ResultEngine<Transfer> = with_tx!(self, |db_tx| {
            let existing = load_transfer(&db_tx, transfer_id).await?;
            let (transfer, _, _) = self
                .build_transfer(&db_tx, transfer_id, existing.created_at, cmd)
                .await?;
            revert_effects(&db_tx, existing.source()).await?;
            transfers::ActiveModel::from(&transfer).update(&db_tx).await?;
            post_effects(&db_tx, &transfer).await?;
            Ok(transfer)
        });
        let transfer = updated?;

        tracing::info!(id = %transfer.id, "transfer updated");
        self.after_commit(FinanceEntity::Transfers.invalidation_keys(), None)
            .await;
        Ok(transfer)
    }

    pub async fn delete_transfer(&self, transfer_id: Uuid) -> ResultEngine<Transfer> {
        let deleted: ResultEngine<Transfer> = with_tx!(self, |db_tx| {
            let existing = load_transfer(&db_tx, transfer_id).await?;
            revert_effects(&db_tx, existing.source()).await?;
            transfers::Entity::delete_by_id(transfer_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(existing)
        });
        let transfer = deleted?;

        tracing::info!(id = %transfer.id, "transfer deleted");
        self.after_commit(FinanceEntity::Transfers.invalidation_keys(), None)
            .await;
        Ok(transfer)
    }

    /// Returns the transfer with the names of both wallets.
    async fn build_transfer<C: ConnectionTrait>(
        &self,
        db: &C,
        id: Uuid,
        created_at: DateTime<Utc>,
        cmd: TransferCmd,
    ) -> ResultEngine<(Transfer, String, String)> {
        if cmd.from_wallet_id == cmd.to_wallet_id {
            return Err(EngineError::InvalidTransfer(
                "source and destination wallets must differ".to_string(),
            ));
        }
        if cmd.amount_minor <= 0 {
            return Err(EngineError::InvalidTransfer(
                "amount must be > 0".to_string(),
            ));
        }
        validate_amount(cmd.amount_minor, "amount")?;
        let from = self.require_wallet(db, cmd.from_wallet_id).await?;
        let to = self.require_wallet(db, cmd.to_wallet_id).await?;

        let transfer = Transfer {
            id,
            from_wallet_id: cmd.from_wallet_id,
            to_wallet_id: cmd.to_wallet_id,
            amount_minor: cmd.amount_minor,
            date: cmd.date,
            notes: normalize_optional_text(cmd.notes.as_deref()),
            created_at,
        };
        Ok((transfer, from.name, to.name))
    }
}

async fn load_transfer<C: ConnectionTrait>(db: &C, transfer_id: Uuid) -> ResultEngine<Transfer> {
    let model = transfers::Entity::find_by_id(transfer_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("transfer not exists".to_string()))?;
    Transfer::try_from(model)
}
