//! Ledger legs.
//!
//! A [`Leg`] is one signed change applied to a wallet balance on behalf of a
//! money movement (its *source*). Amounts are signed minor units:
//! - positive values increase the wallet balance
//! - negative values decrease the wallet balance
//!
//! Legs are immutable. Editing or deleting a source removes its legs and
//! subtracts exactly what they added, so a wallet balance always equals the
//! sum of the legs that point at it.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError,
    effects::{SourceKind, SourceRef},
    util::parse_uuid,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    pub id: Uuid,
    pub source: SourceRef,
    pub wallet_id: Uuid,
    pub amount_minor: i64,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Leg {
    pub fn new(
        source: SourceRef,
        wallet_id: Uuid,
        amount_minor: i64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            wallet_id,
            amount_minor,
            occurred_at,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "ledger_legs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub source_kind: String,
    pub source_id: String,
    pub wallet_id: String,
    pub amount_minor: i64,
    pub occurred_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Wallets,
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Leg> for ActiveModel {
    fn from(leg: &Leg) -> Self {
        Self {
            id: ActiveValue::Set(leg.id.to_string()),
            source_kind: ActiveValue::Set(leg.source.kind.as_str().to_string()),
            source_id: ActiveValue::Set(leg.source.id.to_string()),
            wallet_id: ActiveValue::Set(leg.wallet_id.to_string()),
            amount_minor: ActiveValue::Set(leg.amount_minor),
            occurred_at: ActiveValue::Set(leg.occurred_at),
            created_at: ActiveValue::Set(leg.created_at),
        }
    }
}

impl TryFrom<Model> for Leg {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "leg")?,
            source: SourceRef {
                kind: SourceKind::try_from(model.source_kind.as_str())?,
                id: parse_uuid(&model.source_id, "leg source")?,
            },
            wallet_id: parse_uuid(&model.wallet_id, "wallet")?,
            amount_minor: model.amount_minor,
            occurred_at: model.occurred_at,
            created_at: model.created_at,
        })
    }
}
