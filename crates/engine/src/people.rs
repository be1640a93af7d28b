//! People money is exchanged with.
//!
//! A person owns no balance. [`PersonSummary`] is derived on read from the
//! person's payments.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, Payment, PaymentKind, PaymentStatus, util::parse_uuid};

labeled_enum! {
    pub enum PersonKind {
        Friend => "Friend",
        Family => "Family",
        Business => "Business",
        Shop => "Shop",
        Other => "Other",
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub kind: PersonKind,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Totals of a person's payments.
///
/// `balance = total_received - total_given`, over every payment regardless of
/// its status.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonTotals {
    pub total_given: i64,
    pub total_received: i64,
    pub pending_given: i64,
    pub pending_received: i64,
    pub balance: i64,
}

impl PersonTotals {
    pub fn from_payments<'a>(payments: impl IntoIterator<Item = &'a Payment>) -> Self {
        let mut totals = Self::default();
        for payment in payments {
            let pending = payment.status != PaymentStatus::Completed;
            match payment.kind {
                PaymentKind::Send => {
                    totals.total_given += payment.amount_minor;
                    if pending {
                        totals.pending_given += payment.amount_due();
                    }
                }
                PaymentKind::Receive => {
                    totals.total_received += payment.amount_minor;
                    if pending {
                        totals.pending_received += payment.amount_due();
                    }
                }
            }
        }
        totals.balance = totals.total_received - totals.total_given;
        totals
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PersonSummary {
    pub person: Person,
    pub totals: PersonTotals,
    pub payments: Vec<Payment>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "people")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub kind: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Person> for ActiveModel {
    fn from(value: &Person) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            name: ActiveValue::Set(value.name.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            phone: ActiveValue::Set(value.phone.clone()),
            email: ActiveValue::Set(value.email.clone()),
            address: ActiveValue::Set(value.address.clone()),
            notes: ActiveValue::Set(value.notes.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Person {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "person")?,
            name: model.name,
            kind: PersonKind::try_from(model.kind.as_str())?,
            phone: model.phone,
            email: model.email,
            address: model.address,
            notes: model.notes,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PaymentMethod;

    fn payment(kind: PaymentKind, amount_minor: i64, paid_minor: i64) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            person_id: Uuid::new_v4(),
            kind,
            amount_minor,
            paid_minor,
            status: crate::derive_settlement(amount_minor, paid_minor).into(),
            wallet_id: None,
            method: PaymentMethod::Cash,
            date: Utc::now(),
            due_date: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn balance_is_received_minus_given() {
        let payments = [
            payment(PaymentKind::Receive, 500, 500),
            payment(PaymentKind::Send, 200, 50),
            payment(PaymentKind::Send, 100, 0),
        ];
        let totals = PersonTotals::from_payments(&payments);

        assert_eq!(totals.total_received, 500);
        assert_eq!(totals.total_given, 300);
        assert_eq!(totals.balance, 200);
        assert_eq!(totals.pending_given, 250);
        assert_eq!(totals.pending_received, 0);
    }
}
