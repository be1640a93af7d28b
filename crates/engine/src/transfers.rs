//! Wallet to wallet transfers.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: Uuid,
    pub from_wallet_id: Uuid,
    pub to_wallet_id: Uuid,
    pub amount_minor: i64,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transfers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub from_wallet_id: String,
    pub to_wallet_id: String,
    pub amount_minor: i64,
    pub date: DateTimeUtc,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transfer> for ActiveModel {
    fn from(value: &Transfer) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            from_wallet_id: ActiveValue::Set(value.from_wallet_id.to_string()),
            to_wallet_id: ActiveValue::Set(value.to_wallet_id.to_string()),
            amount_minor: ActiveValue::Set(value.amount_minor),
            date: ActiveValue::Set(value.date),
            notes: ActiveValue::Set(value.notes.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Transfer {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transfer")?,
            from_wallet_id: parse_uuid(&model.from_wallet_id, "wallet")?,
            to_wallet_id: parse_uuid(&model.to_wallet_id, "wallet")?,
            amount_minor: model.amount_minor,
            date: model.date,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}
