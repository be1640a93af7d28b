//! Wallet effect rule.
//!
//! Each money movement maps to the signed amounts it applies to wallets:
//!
//! | source   | wallet effect                                           |
//! |----------|---------------------------------------------------------|
//! | expense  | `-paid` on its wallet, when its status moves funds      |
//! | income   | `+amount` on its wallet                                 |
//! | payment  | `-paid` (send) or `+paid` (receive), when status moves funds |
//! | transfer | `-amount` on the source, `+amount` on the destination   |
//!
//! The rule is pure. The ledger turns effects into legs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Expense, Income, Payment, PaymentKind, Transfer};

labeled_enum! {
    /// Kind of record a leg was posted for.
    pub enum SourceKind {
        Expense => "expense",
        Income => "income",
        Payment => "payment",
        Transfer => "transfer",
    }
}

/// The record that owns a set of legs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    pub kind: SourceKind,
    pub id: Uuid,
}

impl SourceRef {
    pub fn new(kind: SourceKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

/// One signed change to one wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Effect {
    pub wallet_id: Uuid,
    pub amount_minor: i64,
}

/// A record that moves money between wallets.
pub trait WalletEffects {
    fn source(&self) -> SourceRef;

    /// When the movement happened, used to order wallet history.
    fn occurred_at(&self) -> DateTime<Utc>;

    /// Effects of the record in its current state. Zero amounts are omitted.
    fn effects(&self) -> Vec<Effect>;
}

fn effect(wallet_id: Uuid, amount_minor: i64) -> Option<Effect> {
    (amount_minor != 0).then_some(Effect {
        wallet_id,
        amount_minor,
    })
}

impl WalletEffects for Expense {
    fn source(&self) -> SourceRef {
        SourceRef::new(SourceKind::Expense, self.id)
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.date
    }

    fn effects(&self) -> Vec<Effect> {
        match self.wallet_id {
            Some(wallet_id) if self.status.moves_funds() => {
                effect(wallet_id, -self.paid_minor).into_iter().collect()
            }
            _ => Vec::new(),
        }
    }
}

impl WalletEffects for Income {
    fn source(&self) -> SourceRef {
        SourceRef::new(SourceKind::Income, self.id)
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.date
    }

    fn effects(&self) -> Vec<Effect> {
        effect(self.wallet_id, self.amount_minor)
            .into_iter()
            .collect()
    }
}

impl WalletEffects for Payment {
    fn source(&self) -> SourceRef {
        SourceRef::new(SourceKind::Payment, self.id)
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.date
    }

    fn effects(&self) -> Vec<Effect> {
        let Some(wallet_id) = self.wallet_id else {
            return Vec::new();
        };
        if !self.status.moves_funds() {
            return Vec::new();
        }
        let signed = match self.kind {
            PaymentKind::Send => -self.paid_minor,
            PaymentKind::Receive => self.paid_minor,
        };
        effect(wallet_id, signed).into_iter().collect()
    }
}

impl WalletEffects for Transfer {
    fn source(&self) -> SourceRef {
        SourceRef::new(SourceKind::Transfer, self.id)
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.date
    }

    fn effects(&self) -> Vec<Effect> {
        [
            effect(self.from_wallet_id, -self.amount_minor),
            effect(self.to_wallet_id, self.amount_minor),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExpenseStatus, PaymentMethod, PaymentStatus, derive_settlement};

    fn expense(amount_minor: i64, paid_minor: i64, wallet_id: Option<Uuid>) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            title: "Rent".to_string(),
            category: "Housing".to_string(),
            category_id: None,
            amount_minor,
            paid_minor,
            status: derive_settlement(amount_minor, paid_minor).into(),
            wallet_id,
            payment_method: PaymentMethod::Cash,
            date: Utc::now(),
            is_recurring: false,
            recurring_frequency: None,
            next_due_date: None,
            notes: None,
            payment_history: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn payment(kind: PaymentKind, paid_minor: i64, status: PaymentStatus) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            person_id: Uuid::new_v4(),
            kind,
            amount_minor: 20_000,
            paid_minor,
            status,
            wallet_id: Some(Uuid::new_v4()),
            method: PaymentMethod::Bank,
            date: Utc::now(),
            due_date: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn expense_deducts_paid_amount() {
        let wallet = Uuid::new_v4();
        let effects = expense(10_000, 4_000, Some(wallet)).effects();
        assert_eq!(
            effects,
            vec![Effect {
                wallet_id: wallet,
                amount_minor: -4_000
            }]
        );
    }

    #[test]
    fn pending_or_walletless_expense_has_no_effect() {
        assert!(expense(10_000, 0, Some(Uuid::new_v4())).effects().is_empty());
        assert!(expense(10_000, 10_000, None).effects().is_empty());
    }

    #[test]
    fn overdue_expense_moves_nothing() {
        let mut overdue = expense(10_000, 5_000, Some(Uuid::new_v4()));
        overdue.status = ExpenseStatus::Overdue;
        assert!(overdue.effects().is_empty());
    }

    #[test]
    fn payment_sign_follows_direction() {
        let send = payment(PaymentKind::Send, 20_000, PaymentStatus::Completed);
        let receive = payment(PaymentKind::Receive, 5_000, PaymentStatus::Partial);
        let pending = payment(PaymentKind::Receive, 0, PaymentStatus::Pending);

        assert_eq!(send.effects()[0].amount_minor, -20_000);
        assert_eq!(receive.effects()[0].amount_minor, 5_000);
        assert!(pending.effects().is_empty());
    }

    #[test]
    fn transfer_moves_amount_between_wallets() {
        let from = Uuid::new_v4();
        let to = Uuid::new_v4();
        let transfer = Transfer {
            id: Uuid::new_v4(),
            from_wallet_id: from,
            to_wallet_id: to,
            amount_minor: 30_000,
            date: Utc::now(),
            notes: None,
            created_at: Utc::now(),
        };

        let effects = transfer.effects();
        assert_eq!(effects.len(), 2);
        assert_eq!(effects.iter().map(|e| e.amount_minor).sum::<i64>(), 0);
        assert!(effects.contains(&Effect {
            wallet_id: from,
            amount_minor: -30_000
        }));
        assert!(effects.contains(&Effect {
            wallet_id: to,
            amount_minor: 30_000
        }));
    }
}
