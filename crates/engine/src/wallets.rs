//! The module contains `Wallet` struct and its storage model.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

labeled_enum! {
    pub enum WalletKind {
        Cash => "Cash",
        Bank => "Bank",
        MobileWallet => "Mobile Wallet",
        CreditCard => "Credit Card",
        Investment => "Investment",
        Other => "Other",
    }
}

pub const DEFAULT_CURRENCY: &str = "PKR";

/// A wallet.
///
/// Anything that holds money: a purse, a bank account, a mobile wallet.
/// `balance_minor` is written only by the ledger; it starts at 0 and moves
/// with the legs posted against the wallet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: Uuid,
    pub name: String,
    pub kind: WalletKind,
    pub balance_minor: i64,
    pub currency: String,
    pub color: Option<String>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

impl Wallet {
    pub fn new(name: String, kind: WalletKind, currency: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            kind,
            balance_minor: 0,
            currency,
            color: None,
            is_default: false,
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub kind: String,
    pub balance: i64,
    pub currency: String,
    pub color: Option<String>,
    pub is_default: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::legs::Entity")]
    Legs,
}

impl Related<super::legs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Legs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Builds an insert model. The balance is never copied from the domain value:
/// new wallets start at 0 and later balance writes go through the ledger.
impl From<&Wallet> for ActiveModel {
    fn from(value: &Wallet) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            balance: ActiveValue::Set(0),
            currency: ActiveValue::Set(value.currency.clone()),
            color: ActiveValue::Set(value.color.clone()),
            is_default: ActiveValue::Set(value.is_default),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Wallet {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "wallet")?,
            name: model.name,
            kind: WalletKind::try_from(model.kind.as_str())?,
            balance_minor: model.balance,
            currency: model.currency,
            color: model.color,
            is_default: model.is_default,
            created_at: model.created_at,
        })
    }
}
