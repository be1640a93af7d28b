use sea_orm::{
    ActiveValue, ConnectionTrait, PaginatorTrait, QueryFilter, QueryOrder, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, FinanceEntity, ResultEngine, Wallet, WalletCmd, expenses, incomes, legs,
    payments, transfers,
    util::normalize_display,
    wallets::{self, DEFAULT_CURRENCY},
};

use super::{Engine, new_record_id, normalize_optional_text, with_tx};

impl Engine {
    /// All wallets, the default one first.
    pub async fn wallets(&self) -> ResultEngine<Vec<Wallet>> {
        wallets::Entity::find()
            .order_by_desc(wallets::Column::IsDefault)
            .order_by_asc(wallets::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Wallet::try_from)
            .collect()
    }

    /// Return a wallet snapshot from DB.
    pub async fn wallet(&self, wallet_id: Uuid) -> ResultEngine<Wallet> {
        let model = self.require_wallet(&self.database, wallet_id).await?;
        Wallet::try_from(model)
    }

    /// Add a new wallet. Its balance starts at 0 and only moves through
    /// money movements that reference it.
    pub async fn create_wallet(&self, cmd: WalletCmd) -> ResultEngine<Wallet> {
        let name = normalize_display(&cmd.name, "wallet")?;
        let created: ResultEngine<Wallet> = with_tx!(self, |db_tx| {
            ensure_unique_name(&db_tx, &name, None).await?;
            if cmd.is_default {
                clear_default(&db_tx).await?;
            }

            let currency = normalize_currency(cmd.currency.as_deref());
            let mut wallet = Wallet::new(name, cmd.kind, currency);
            wallet.id = new_record_id::<wallets::Entity, _>(&db_tx, cmd.id, "wallet").await?;
            wallet.color = normalize_optional_text(cmd.color.as_deref());
            wallet.is_default = cmd.is_default;
            wallets::ActiveModel::from(&wallet).insert(&db_tx).await?;
            Ok(wallet)
        });
        let wallet = created?;

        tracing::info!(id = %wallet.id, name = %wallet.name, "wallet created");
        self.after_commit(FinanceEntity::Wallets.invalidation_keys(), None)
            .await;
        Ok(wallet)
    }

    /// Edits the descriptive fields of a wallet. The balance is left alone.
    pub async fn update_wallet(&self, wallet_id: Uuid, cmd: WalletCmd) -> ResultEngine<Wallet> {
        let name = normalize_display(&cmd.name, "wallet")?;
        let updated: ResultEngine<Wallet> = with_tx!(self, |db_tx| {
            self.require_wallet(&db_tx, wallet_id).await?;
            ensure_unique_name(&db_tx, &name, Some(wallet_id)).await?;
            if cmd.is_default {
                clear_default(&db_tx).await?;
            }

            let model = wallets::ActiveModel {
                id: ActiveValue::Set(wallet_id.to_string()),
                name: ActiveValue::Set(name),
                kind: ActiveValue::Set(cmd.kind.as_str().to_string()),
                currency: ActiveValue::Set(normalize_currency(cmd.currency.as_deref())),
                color: ActiveValue::Set(normalize_optional_text(cmd.color.as_deref())),
                is_default: ActiveValue::Set(cmd.is_default),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Wallet::try_from(model)
        });
        let wallet = updated?;

        tracing::info!(id = %wallet.id, "wallet updated");
        self.after_commit(FinanceEntity::Wallets.invalidation_keys(), None)
            .await;
        Ok(wallet)
    }

    /// Deletes a wallet nothing refers to.
    ///
    /// A wallet with posted legs or referenced by any money movement is kept
    /// and the call fails with [`EngineError::Conflict`].
    pub async fn delete_wallet(&self, wallet_id: Uuid) -> ResultEngine<Wallet> {
        let deleted: ResultEngine<Wallet> = with_tx!(self, |db_tx| {
            let wallet = Wallet::try_from(self.require_wallet(&db_tx, wallet_id).await?)?;
            let id = wallet_id.to_string();

            let references = legs::Entity::find()
                .filter(legs::Column::WalletId.eq(id.as_str()))
                .count(&db_tx)
                .await?
                + expenses::Entity::find()
                    .filter(expenses::Column::WalletId.eq(id.as_str()))
                    .count(&db_tx)
                    .await?
                + incomes::Entity::find()
                    .filter(incomes::Column::WalletId.eq(id.as_str()))
                    .count(&db_tx)
                    .await?
                + payments::Entity::find()
                    .filter(payments::Column::WalletId.eq(id.as_str()))
                    .count(&db_tx)
                    .await?
                + transfers::Entity::find()
                    .filter(
                        transfers::Column::FromWalletId
                            .eq(id.as_str())
                            .or(transfers::Column::ToWalletId.eq(id.as_str())),
                    )
                    .count(&db_tx)
                    .await?;
            if references > 0 {
                return Err(EngineError::Conflict(format!(
                    "wallet '{}' is used by {references} record(s)",
                    wallet.name
                )));
            }

            wallets::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(wallet)
        });
        let wallet = deleted?;

        tracing::info!(id = %wallet.id, "wallet deleted");
        self.after_commit(FinanceEntity::Wallets.invalidation_keys(), None)
            .await;
        Ok(wallet)
    }
}

async fn ensure_unique_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
    except: Option<Uuid>,
) -> ResultEngine<()> {
    let mut query =
        wallets::Entity::find().filter(Expr::cust("LOWER(name)").eq(name.to_lowercase()));
    if let Some(except) = except {
        query = query.filter(wallets::Column::Id.ne(except.to_string()));
    }
    if query.one(db).await?.is_some() {
        return Err(EngineError::ExistingKey(name.to_string()));
    }
    Ok(())
}

async fn clear_default<C: ConnectionTrait>(db: &C) -> ResultEngine<()> {
    wallets::Entity::update_many()
        .col_expr(wallets::Column::IsDefault, Expr::value(false))
        .filter(wallets::Column::IsDefault.eq(true))
        .exec(db)
        .await?;
    Ok(())
}

fn normalize_currency(value: Option<&str>) -> String {
    normalize_optional_text(value)
        .map(|c| c.to_uppercase())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}
