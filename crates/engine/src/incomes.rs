//! Income received into a wallet. Income is settled on creation.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, Frequency,
    util::{parse_optional_uuid, parse_uuid},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: Uuid,
    pub source: String,
    pub amount_minor: i64,
    pub wallet_id: Uuid,
    pub category_id: Option<Uuid>,
    pub date: DateTime<Utc>,
    pub is_recurring: bool,
    pub recurring_frequency: Option<Frequency>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "incomes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub source: String,
    pub amount_minor: i64,
    pub wallet_id: String,
    pub category_id: Option<String>,
    pub date: DateTimeUtc,
    pub is_recurring: bool,
    pub recurring_frequency: Option<String>,
    pub notes: Option<String>,
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

impl From<&Income> for ActiveModel {
    fn from(value: &Income) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            source: ActiveValue::Set(value.source.clone()),
            amount_minor: ActiveValue::Set(value.amount_minor),
            wallet_id: ActiveValue::Set(value.wallet_id.to_string()),
            category_id: ActiveValue::Set(value.category_id.map(|id| id.to_string())),
            date: ActiveValue::Set(value.date),
            is_recurring: ActiveValue::Set(value.is_recurring),
            recurring_frequency: ActiveValue::Set(
                value.recurring_frequency.map(|f| f.as_str().to_string()),
            ),
            notes: ActiveValue::Set(value.notes.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Income {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "income")?,
            source: model.source,
            amount_minor: model.amount_minor,
            wallet_id: parse_uuid(&model.wallet_id, "wallet")?,
            category_id: parse_optional_uuid(model.category_id.as_deref(), "category")?,
            date: model.date,
            is_recurring: model.is_recurring,
            recurring_frequency: model
                .recurring_frequency
                .as_deref()
                .map(Frequency::try_from)
                .transpose()?,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}
