//! Money sent to or received from a person.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, PaymentMethod, PaymentStatus,
    util::{parse_optional_uuid, parse_uuid},
};

labeled_enum! {
    /// Direction of a payment, seen from the wallet owner.
    pub enum PaymentKind {
        Send => "send",
        Receive => "receive",
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub person_id: Uuid,
    pub kind: PaymentKind,
    pub amount_minor: i64,
    pub paid_minor: i64,
    pub status: PaymentStatus,
    pub wallet_id: Option<Uuid>,
    pub method: PaymentMethod,
    pub date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Payment {
    pub fn amount_due(&self) -> i64 {
        self.amount_minor - self.paid_minor
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub person_id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub paid_minor: i64,
    pub status: String,
    pub wallet_id: Option<String>,
    pub method: String,
    pub date: DateTimeUtc,
    pub due_date: Option<DateTimeUtc>,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::people::Entity",
        from = "Column::PersonId",
        to = "super::people::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    People,
}

impl Related<super::people::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::People.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Payment> for ActiveModel {
    fn from(value: &Payment) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            person_id: ActiveValue::Set(value.person_id.to_string()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(value.amount_minor),
            paid_minor: ActiveValue::Set(value.paid_minor),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            wallet_id: ActiveValue::Set(value.wallet_id.map(|id| id.to_string())),
            method: ActiveValue::Set(value.method.as_str().to_string()),
            date: ActiveValue::Set(value.date),
            due_date: ActiveValue::Set(value.due_date),
            notes: ActiveValue::Set(value.notes.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Payment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "payment")?,
            person_id: parse_uuid(&model.person_id, "person")?,
            kind: PaymentKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            paid_minor: model.paid_minor,
            status: PaymentStatus::try_from(model.status.as_str())?,
            wallet_id: parse_optional_uuid(model.wallet_id.as_deref(), "wallet")?,
            method: PaymentMethod::try_from(model.method.as_str())?,
            date: model.date,
            due_date: model.due_date,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}
