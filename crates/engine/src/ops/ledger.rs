//! Posting and reverting ledger legs.
//!
//! Both functions take the open transaction of the calling mutation helper,
//! so a leg and the balance change it carries are written together or not at
//! all.

use sea_orm::{ConnectionTrait, QueryFilter, QueryOrder, prelude::*, sea_query::Expr};

use crate::{
    EngineError, Leg, ResultEngine,
    effects::{SourceRef, WalletEffects},
    legs, wallets,
};

use super::Engine;

/// Writes one leg per effect of `record` and moves the wallet balances.
pub(crate) async fn post_effects<C, R>(db: &C, record: &R) -> ResultEngine<Vec<Leg>>
where
    C: ConnectionTrait,
    R: WalletEffects,
{
    let source = record.source();
    let occurred_at = record.occurred_at();
    let mut posted = Vec::new();
    for effect in record.effects() {
        let leg = Leg::new(source, effect.wallet_id, effect.amount_minor, occurred_at);
        adjust_balance(db, effect.wallet_id, effect.amount_minor).await?;
        legs::ActiveModel::from(&leg).insert(db).await?;
        posted.push(leg);
    }
    tracing::debug!(
        source = %source.kind,
        id = %source.id,
        legs = posted.len(),
        "posted legs"
    );
    Ok(posted)
}

/// Removes the legs of `source` and subtracts them from the wallet balances.
///
/// The stored legs are the pre-mutation state, so the reversal never depends
/// on the record's new values. A source without legs reverts to nothing.
pub(crate) async fn revert_effects<C: ConnectionTrait>(
    db: &C,
    source: SourceRef,
) -> ResultEngine<Vec<Leg>> {
    let models = source_legs(db, source).await?;
    let mut reverted = Vec::with_capacity(models.len());
    for model in models {
        let leg = Leg::try_from(model)?;
        adjust_balance(db, leg.wallet_id, -leg.amount_minor).await?;
        reverted.push(leg);
    }
    if !reverted.is_empty() {
        legs::Entity::delete_many()
            .filter(legs::Column::SourceKind.eq(source.kind.as_str()))
            .filter(legs::Column::SourceId.eq(source.id.to_string()))
            .exec(db)
            .await?;
    }
    tracing::debug!(
        source = %source.kind,
        id = %source.id,
        legs = reverted.len(),
        "reverted legs"
    );
    Ok(reverted)
}

/// `balance = balance + delta`, refused when the result leaves the `i64` range.
async fn adjust_balance<C: ConnectionTrait>(
    db: &C,
    wallet_id: Uuid,
    delta: i64,
) -> ResultEngine<()> {
    let Some(wallet) = wallets::Entity::find_by_id(wallet_id.to_string())
        .one(db)
        .await?
    else {
        return Err(EngineError::KeyNotFound("wallet not exists".to_string()));
    };
    let balance = wallet.balance.checked_add(delta).ok_or_else(|| {
        EngineError::InvalidAmount(format!(
            "balance of wallet {} would leave the supported range",
            wallet.name
        ))
    })?;
    wallets::Entity::update_many()
        .col_expr(wallets::Column::Balance, Expr::value(balance))
        .filter(wallets::Column::Id.eq(wallet_id.to_string()))
        .exec(db)
        .await?;
    Ok(())
}

async fn source_legs<C: ConnectionTrait>(
    db: &C,
    source: SourceRef,
) -> ResultEngine<Vec<legs::Model>> {
    Ok(legs::Entity::find()
        .filter(legs::Column::SourceKind.eq(source.kind.as_str()))
        .filter(legs::Column::SourceId.eq(source.id.to_string()))
        .order_by_asc(legs::Column::CreatedAt)
        .all(db)
        .await?)
}

impl Engine {
    /// Legs currently posted for `source`.
    pub async fn legs_for(&self, source: SourceRef) -> ResultEngine<Vec<Leg>> {
        source_legs(&self.database, source)
            .await?
            .into_iter()
            .map(Leg::try_from)
            .collect()
    }

    /// Legs posted against a wallet, oldest first.
    pub async fn wallet_legs(&self, wallet_id: Uuid) -> ResultEngine<Vec<Leg>> {
        legs::Entity::find()
            .filter(legs::Column::WalletId.eq(wallet_id.to_string()))
            .order_by_asc(legs::Column::OccurredAt)
            .order_by_asc(legs::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Leg::try_from)
            .collect()
    }
}
