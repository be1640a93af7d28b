//! Settlement status of expenses and payments.
//!
//! [`derive_settlement`] is the only producer of stored statuses. `Overdue`
//! exists for reporting and is never written by the mutation helpers.

use chrono::{DateTime, Utc};

/// How much of an amount has been paid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settlement {
    Pending,
    Partial,
    Settled,
}

/// Derive the settlement of `amount_minor` given `paid_minor`.
///
/// The boundary is inclusive: paying exactly the amount settles it.
pub fn derive_settlement(amount_minor: i64, paid_minor: i64) -> Settlement {
    if paid_minor >= amount_minor {
        Settlement::Settled
    } else if paid_minor > 0 {
        Settlement::Partial
    } else {
        Settlement::Pending
    }
}

labeled_enum! {
    /// Lifecycle of an expense.
    pub enum ExpenseStatus {
        Pending => "Pending",
        Partial => "Partial",
        Paid => "Paid",
        Overdue => "Overdue",
    }
}

labeled_enum! {
    /// Lifecycle of a payment to or from a person.
    pub enum PaymentStatus {
        Pending => "Pending",
        Partial => "Partial",
        Completed => "Completed",
        Overdue => "Overdue",
    }
}

impl From<Settlement> for ExpenseStatus {
    fn from(value: Settlement) -> Self {
        match value {
            Settlement::Pending => Self::Pending,
            Settlement::Partial => Self::Partial,
            Settlement::Settled => Self::Paid,
        }
    }
}

impl From<Settlement> for PaymentStatus {
    fn from(value: Settlement) -> Self {
        match value {
            Settlement::Pending => Self::Pending,
            Settlement::Partial => Self::Partial,
            Settlement::Settled => Self::Completed,
        }
    }
}

impl ExpenseStatus {
    /// Funds have moved for this status.
    pub fn moves_funds(self) -> bool {
        matches!(self, Self::Paid | Self::Partial)
    }

    /// Reporting view: unsettled and past its due date.
    pub fn classify(self, due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match (self, due) {
            (Self::Pending | Self::Partial, Some(due)) if due < now => Self::Overdue,
            _ => self,
        }
    }
}

impl PaymentStatus {
    /// Funds have moved for this status.
    pub fn moves_funds(self) -> bool {
        matches!(self, Self::Completed | Self::Partial)
    }

    pub fn classify(self, due: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match (self, due) {
            (Self::Pending | Self::Partial, Some(due)) if due < now => Self::Overdue,
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn settlement_boundaries() {
        assert_eq!(derive_settlement(10_000, 10_000), Settlement::Settled);
        assert_eq!(derive_settlement(10_000, 9_999), Settlement::Partial);
        assert_eq!(derive_settlement(10_000, 0), Settlement::Pending);
        assert_eq!(derive_settlement(10_000, 1), Settlement::Partial);
        assert_eq!(derive_settlement(0, 0), Settlement::Settled);
    }

    #[test]
    fn statuses_map_from_settlement() {
        assert_eq!(ExpenseStatus::from(Settlement::Settled), ExpenseStatus::Paid);
        assert_eq!(
            PaymentStatus::from(Settlement::Settled),
            PaymentStatus::Completed
        );
        assert!(!PaymentStatus::Pending.moves_funds());
        assert!(ExpenseStatus::Partial.moves_funds());
    }

    #[test]
    fn overdue_only_for_unsettled_past_due() {
        let now = Utc::now();
        let yesterday = now - Duration::days(1);
        assert_eq!(
            ExpenseStatus::Pending.classify(Some(yesterday), now),
            ExpenseStatus::Overdue
        );
        assert_eq!(
            ExpenseStatus::Paid.classify(Some(yesterday), now),
            ExpenseStatus::Paid
        );
        assert_eq!(
            PaymentStatus::Partial.classify(None, now),
            PaymentStatus::Partial
        );
    }

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!(
            ExpenseStatus::try_from("paid").unwrap(),
            ExpenseStatus::Paid
        );
        assert!(PaymentStatus::try_from("done").is_err());
    }
}
