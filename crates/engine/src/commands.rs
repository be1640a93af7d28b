//! Command structs for engine operations.
//!
//! These types group the parameters of create/update operations. An update
//! takes the same command as a create and replaces every field.
//!
//! The `id` field of a create command lets the caller choose the id of the
//! new record. Updates ignore it.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{CategoryKind, Frequency, PaymentKind, PaymentMethod, PersonKind, WalletKind};

/// Create or replace an expense.
///
/// `paid_minor` defaults to the full amount.
#[derive(Clone, Debug)]
pub struct ExpenseCmd {
    pub id: Option<Uuid>,
    pub title: String,
    pub category: String,
    pub category_id: Option<Uuid>,
    pub amount_minor: i64,
    pub paid_minor: Option<i64>,
    pub wallet_id: Option<Uuid>,
    pub payment_method: PaymentMethod,
    pub date: DateTime<Utc>,
    pub is_recurring: bool,
    pub recurring_frequency: Option<Frequency>,
    pub next_due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl ExpenseCmd {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        category: impl Into<String>,
        amount_minor: i64,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            title: title.into(),
            category: category.into(),
            category_id: None,
            amount_minor,
            paid_minor: None,
            wallet_id: None,
            payment_method: PaymentMethod::Cash,
            date,
            is_recurring: false,
            recurring_frequency: None,
            next_due_date: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn paid(mut self, paid_minor: i64) -> Self {
        self.paid_minor = Some(paid_minor);
        self
    }

    #[must_use]
    pub fn wallet_id(mut self, wallet_id: Uuid) -> Self {
        self.wallet_id = Some(wallet_id);
        self
    }

    #[must_use]
    pub fn payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }

    #[must_use]
    pub fn recurring(mut self, frequency: Frequency, next_due_date: Option<DateTime<Utc>>) -> Self {
        self.is_recurring = true;
        self.recurring_frequency = Some(frequency);
        self.next_due_date = next_due_date;
        self
    }

    #[must_use]
    pub fn due(mut self, next_due_date: DateTime<Utc>) -> Self {
        self.next_due_date = Some(next_due_date);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Record a payment towards an existing expense.
#[derive(Clone, Debug)]
pub struct ExpensePaymentCmd {
    pub amount_minor: i64,
    pub wallet_id: Option<Uuid>,
    pub method: Option<PaymentMethod>,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl ExpensePaymentCmd {
    #[must_use]
    pub fn new(amount_minor: i64, date: DateTime<Utc>) -> Self {
        Self {
            amount_minor,
            wallet_id: None,
            method: None,
            date,
            notes: None,
        }
    }

    #[must_use]
    pub fn wallet_id(mut self, wallet_id: Uuid) -> Self {
        self.wallet_id = Some(wallet_id);
        self
    }

    #[must_use]
    pub fn method(mut self, method: PaymentMethod) -> Self {
        self.method = Some(method);
        self
    }
}

/// Create or replace an income record.
#[derive(Clone, Debug)]
pub struct IncomeCmd {
    pub id: Option<Uuid>,
    pub source: String,
    pub amount_minor: i64,
    pub wallet_id: Uuid,
    pub category_id: Option<Uuid>,
    pub date: DateTime<Utc>,
    pub is_recurring: bool,
    pub recurring_frequency: Option<Frequency>,
    pub notes: Option<String>,
}

impl IncomeCmd {
    #[must_use]
    pub fn new(
        source: impl Into<String>,
        amount_minor: i64,
        wallet_id: Uuid,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            source: source.into(),
            amount_minor,
            wallet_id,
            category_id: None,
            date,
            is_recurring: false,
            recurring_frequency: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Create or replace a payment. `paid_minor` defaults to 0.
#[derive(Clone, Debug)]
pub struct PaymentCmd {
    pub id: Option<Uuid>,
    pub person_id: Uuid,
    pub kind: PaymentKind,
    pub amount_minor: i64,
    pub paid_minor: Option<i64>,
    pub wallet_id: Option<Uuid>,
    pub method: PaymentMethod,
    pub date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl PaymentCmd {
    #[must_use]
    pub fn new(person_id: Uuid, kind: PaymentKind, amount_minor: i64, date: DateTime<Utc>) -> Self {
        Self {
            id: None,
            person_id,
            kind,
            amount_minor,
            paid_minor: None,
            wallet_id: None,
            method: PaymentMethod::Cash,
            date,
            due_date: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn paid(mut self, paid_minor: i64) -> Self {
        self.paid_minor = Some(paid_minor);
        self
    }

    #[must_use]
    pub fn wallet_id(mut self, wallet_id: Uuid) -> Self {
        self.wallet_id = Some(wallet_id);
        self
    }

    #[must_use]
    pub fn due(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Move money between two wallets.
#[derive(Clone, Debug)]
pub struct TransferCmd {
    pub id: Option<Uuid>,
    pub from_wallet_id: Uuid,
    pub to_wallet_id: Uuid,
    pub amount_minor: i64,
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
}

impl TransferCmd {
    #[must_use]
    pub fn new(
        from_wallet_id: Uuid,
        to_wallet_id: Uuid,
        amount_minor: i64,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            from_wallet_id,
            to_wallet_id,
            amount_minor,
            date,
            notes: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Create or edit a wallet. Balances are never part of the command.
#[derive(Clone, Debug)]
pub struct WalletCmd {
    pub id: Option<Uuid>,
    pub name: String,
    pub kind: WalletKind,
    pub currency: Option<String>,
    pub color: Option<String>,
    pub is_default: bool,
}

impl WalletCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: WalletKind) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind,
            currency: None,
            color: None,
            is_default: false,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }

    #[must_use]
    pub fn default_wallet(mut self) -> Self {
        self.is_default = true;
        self
    }
}

#[derive(Clone, Debug)]
pub struct PersonCmd {
    pub id: Option<Uuid>,
    pub name: String,
    pub kind: PersonKind,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

impl PersonCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: PersonKind) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind,
            phone: None,
            email: None,
            address: None,
            notes: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[derive(Clone, Debug)]
pub struct CategoryCmd {
    pub id: Option<Uuid>,
    pub name: String,
    pub kind: CategoryKind,
    pub color: Option<String>,
    pub icon: Option<String>,
}

impl CategoryCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind,
            color: None,
            icon: None,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }
}
