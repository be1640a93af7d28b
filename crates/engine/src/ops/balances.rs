use std::collections::HashMap;

use sea_orm::{ActiveValue, ConnectionTrait, QueryOrder, prelude::*};
use serde::Serialize;
use uuid::Uuid;

use crate::{Leg, ResultEngine, Wallet, legs, wallets};

use super::{Engine, with_tx};

/// A wallet whose stored balance differs from the sum of its legs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BalanceDrift {
    pub wallet_id: Uuid,
    pub name: String,
    pub stored_minor: i64,
    pub ledger_minor: i64,
}

impl BalanceDrift {
    pub fn difference(&self) -> i64 {
        self.stored_minor - self.ledger_minor
    }
}

impl Engine {
    /// Compares every stored wallet balance with the sum of its legs.
    /// An empty result means the ledger is consistent.
    pub async fn verify_balances(&self) -> ResultEngine<Vec<BalanceDrift>> {
        let wallet_list = self.wallets().await?;
        let sums = leg_sums(&self.database).await?;
        Ok(drifts(wallet_list, &sums))
    }

    /// Recomputes denormalized wallet balances from the legs and returns the
    /// drift that was corrected.
    pub async fn recompute_balances(&self) -> ResultEngine<Vec<BalanceDrift>> {
        let corrected: ResultEngine<Vec<BalanceDrift>> = with_tx!(self, |db_tx| {
            let wallet_list = wallets::Entity::find()
                .order_by_asc(wallets::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Wallet::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;
            let sums = leg_sums(&db_tx).await?;
            let found = drifts(wallet_list, &sums);

            for drift in &found {
                wallets::ActiveModel {
                    id: ActiveValue::Set(drift.wallet_id.to_string()),
                    balance: ActiveValue::Set(drift.ledger_minor),
                    ..Default::default()
                }
                .update(&db_tx)
                .await?;
            }
            Ok(found)
        });
        let corrected = corrected?;

        if !corrected.is_empty() {
            tracing::warn!(wallets = corrected.len(), "wallet balances recomputed from legs");
            self.after_commit(crate::FinanceEntity::Wallets.invalidation_keys(), None)
                .await;
        }
        Ok(corrected)
    }
}

async fn leg_sums<C: ConnectionTrait>(db: &C) -> ResultEngine<HashMap<Uuid, i64>> {
    let mut sums: HashMap<Uuid, i64> = HashMap::new();
    for model in legs::Entity::find().all(db).await? {
        let leg = Leg::try_from(model)?;
        *sums.entry(leg.wallet_id).or_default() += leg.amount_minor;
    }
    Ok(sums)
}

fn drifts(wallet_list: Vec<Wallet>, sums: &HashMap<Uuid, i64>) -> Vec<BalanceDrift> {
    wallet_list
        .into_iter()
        .filter_map(|wallet| {
            let ledger_minor = sums.get(&wallet.id).copied().unwrap_or(0);
            (wallet.balance_minor != ledger_minor).then(|| BalanceDrift {
                wallet_id: wallet.id,
                name: wallet.name,
                stored_minor: wallet.balance_minor,
                ledger_minor,
            })
        })
        .collect()
}
