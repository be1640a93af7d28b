//! Storage for [`PaymentRecord`](crate::PaymentRecord) rows, ordered by `seq`.

use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, PaymentMethod, PaymentRecord,
    util::parse_optional_uuid,
};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub expense_id: String,
    pub seq: i32,
    pub amount_minor: i64,
    pub date: DateTimeUtc,
    pub method: String,
    pub wallet_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::ExpenseId",
        to = "super::expenses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Expenses,
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub(crate) fn active_model(expense_id: Uuid, seq: i32, record: &PaymentRecord) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        expense_id: ActiveValue::Set(expense_id.to_string()),
        seq: ActiveValue::Set(seq),
        amount_minor: ActiveValue::Set(record.amount_minor),
        date: ActiveValue::Set(record.date),
        method: ActiveValue::Set(record.method.as_str().to_string()),
        wallet_id: ActiveValue::Set(record.wallet_id.map(|id| id.to_string())),
        notes: ActiveValue::Set(record.notes.clone()),
    }
}

impl TryFrom<Model> for PaymentRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            amount_minor: model.amount_minor,
            date: model.date,
            method: PaymentMethod::try_from(model.method.as_str())?,
            wallet_id: parse_optional_uuid(model.wallet_id.as_deref(), "wallet")?,
            notes: model.notes,
        })
    }
}
