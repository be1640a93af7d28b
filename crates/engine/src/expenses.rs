//! Expenses and their payment history.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ExpenseStatus,
    util::{parse_optional_uuid, parse_uuid},
};

labeled_enum! {
    pub enum PaymentMethod {
        Cash => "Cash",
        Bank => "Bank",
        JazzCash => "JazzCash",
        EasyPaisa => "EasyPaisa",
        CreditCard => "Credit Card",
        Other => "Other",
    }
}

labeled_enum! {
    pub enum Frequency {
        Weekly => "Weekly",
        Monthly => "Monthly",
        Yearly => "Yearly",
    }
}

/// One recorded payment towards an expense.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub amount_minor: i64,
    pub date: DateTime<Utc>,
    pub method: PaymentMethod,
    pub wallet_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// A bill, possibly paid in installments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub category_id: Option<Uuid>,
    pub amount_minor: i64,
    pub paid_minor: i64,
    pub status: ExpenseStatus,
    pub wallet_id: Option<Uuid>,
    pub payment_method: PaymentMethod,
    pub date: DateTime<Utc>,
    pub is_recurring: bool,
    pub recurring_frequency: Option<Frequency>,
    pub next_due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub payment_history: Vec<PaymentRecord>,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn amount_due(&self) -> i64 {
        self.amount_minor - self.paid_minor
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub category: String,
    pub category_id: Option<String>,
    pub amount_minor: i64,
    pub paid_minor: i64,
    pub status: String,
    pub wallet_id: Option<String>,
    pub payment_method: String,
    pub date: DateTimeUtc,
    pub is_recurring: bool,
    pub recurring_frequency: Option<String>,
    pub next_due_date: Option<DateTimeUtc>,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::expense_payments::Entity")]
    Payments,
}

impl Related<super::expense_payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Expense> for ActiveModel {
    fn from(value: &Expense) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            title: ActiveValue::Set(value.title.clone()),
            category: ActiveValue::Set(value.category.clone()),
            category_id: ActiveValue::Set(value.category_id.map(|id| id.to_string())),
            amount_minor: ActiveValue::Set(value.amount_minor),
            paid_minor: ActiveValue::Set(value.paid_minor),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            wallet_id: ActiveValue::Set(value.wallet_id.map(|id| id.to_string())),
            payment_method: ActiveValue::Set(value.payment_method.as_str().to_string()),
            date: ActiveValue::Set(value.date),
            is_recurring: ActiveValue::Set(value.is_recurring),
            recurring_frequency: ActiveValue::Set(
                value.recurring_frequency.map(|f| f.as_str().to_string()),
            ),
            next_due_date: ActiveValue::Set(value.next_due_date),
            notes: ActiveValue::Set(value.notes.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<(Model, Vec<PaymentRecord>)> for Expense {
    type Error = EngineError;

    fn try_from(
        (model, payment_history): (Model, Vec<PaymentRecord>),
    ) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "expense")?,
            title: model.title,
            category: model.category,
            category_id: parse_optional_uuid(model.category_id.as_deref(), "category")?,
            amount_minor: model.amount_minor,
            paid_minor: model.paid_minor,
            status: ExpenseStatus::try_from(model.status.as_str())?,
            wallet_id: parse_optional_uuid(model.wallet_id.as_deref(), "wallet")?,
            payment_method: PaymentMethod::try_from(model.payment_method.as_str())?,
            date: model.date,
            is_recurring: model.is_recurring,
            recurring_frequency: model
                .recurring_frequency
                .as_deref()
                .map(Frequency::try_from)
                .transpose()?,
            next_due_date: model.next_due_date,
            notes: model.notes,
            payment_history,
            created_at: model.created_at,
        })
    }
}
