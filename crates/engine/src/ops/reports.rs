//! Read-side aggregates for the finance dashboard.
//!
//! Nothing here writes. Overdue is a classification computed at read time
//! from due dates; stored statuses are never changed by reporting.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    EngineError, Expense, ExpenseStatus, Leg, Money, Payment, PaymentKind, PaymentStatus,
    ResultEngine, Wallet,
    util::add_minor,
};

use super::Engine;

/// Net worth above which the health score gets its second bonus.
const WEALTH_THRESHOLD_MINOR: i64 = 5_000_000;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FinancialSummary {
    pub total_expenses: i64,
    pub total_income: i64,
    /// Completed payments sent.
    pub total_sent: i64,
    /// Completed payments received.
    pub total_received: i64,
    pub pending_to_send: i64,
    pub pending_to_receive: i64,
    /// Sum of all wallet balances, the net worth.
    pub total_wallet_balance: i64,
    pub overdue_expenses: usize,
    pub overdue_payments: usize,
}

/// Heuristic score in `0..=100`.
///
/// Starts at 50, then:
/// - savings rate above 50% +30, above 20% +20, above 0 +10, otherwise -10
///   (only with some income)
/// - positive net worth +10, net worth above 50 000.00 another +10
/// - nothing pending to send +10, otherwise -5
pub fn health_score(summary: &FinancialSummary) -> u8 {
    let mut score: i32 = 50;

    if summary.total_income > 0 {
        let income = i128::from(summary.total_income);
        let savings = income - i128::from(summary.total_expenses);
        score += if savings * 2 > income {
            30
        } else if savings * 5 > income {
            20
        } else if savings > 0 {
            10
        } else {
            -10
        };
    }

    if summary.total_wallet_balance > 0 {
        score += 10;
    }
    if summary.total_wallet_balance > WEALTH_THRESHOLD_MINOR {
        score += 10;
    }

    if summary.pending_to_send == 0 {
        score += 10;
    } else {
        score -= 5;
    }

    u8::try_from(score.clamp(0, 100)).unwrap_or(100)
}

/// Spending of one category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExpenseBreakdown {
    pub category: String,
    pub total_minor: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WalletHistoryEntry {
    pub leg: Leg,
    /// Wallet balance right after this leg.
    pub balance_after: i64,
}

/// A wallet and its legs, newest first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WalletHistory {
    pub wallet: Wallet,
    pub entries: Vec<WalletHistoryEntry>,
}

fn sum_minor(mut amounts: impl Iterator<Item = i64>) -> ResultEngine<i64> {
    amounts.try_fold(0, add_minor)
}

const EXPORT_HEADER: [&str; 5] = ["Type", "Date", "Amount", "Category/Source", "Description"];

#[derive(Serialize)]
struct ExportRow<'a> {
    kind: &'static str,
    date: String,
    amount: String,
    label: &'a str,
    description: &'a str,
}

impl Engine {
    pub async fn financial_summary(&self, now: DateTime<Utc>) -> ResultEngine<FinancialSummary> {
        let expenses = self.expenses().await?;
        let incomes = self.incomes().await?;
        let payments = self.payments().await?;
        let wallets = self.wallets().await?;

        let mut summary = FinancialSummary {
            total_expenses: sum_minor(expenses.iter().map(|e| e.amount_minor))?,
            total_income: sum_minor(incomes.iter().map(|i| i.amount_minor))?,
            total_wallet_balance: sum_minor(wallets.iter().map(|w| w.balance_minor))?,
            overdue_expenses: expenses
                .iter()
                .filter(|e| classify_expense(e, now) == ExpenseStatus::Overdue)
                .count(),
            overdue_payments: payments
                .iter()
                .filter(|p| classify_payment(p, now) == PaymentStatus::Overdue)
                .count(),
            ..FinancialSummary::default()
        };

        for payment in &payments {
            let completed = payment.status == PaymentStatus::Completed;
            let total = match (payment.kind, completed) {
                (PaymentKind::Send, true) => &mut summary.total_sent,
                (PaymentKind::Send, false) => &mut summary.pending_to_send,
                (PaymentKind::Receive, true) => &mut summary.total_received,
                (PaymentKind::Receive, false) => &mut summary.pending_to_receive,
            };
            *total = add_minor(*total, payment.amount_minor)?;
        }
        Ok(summary)
    }

    /// Expenses with their status as of `now`, overdue ones included.
    pub async fn classified_expenses(&self, now: DateTime<Utc>) -> ResultEngine<Vec<Expense>> {
        let mut expenses = self.expenses().await?;
        for expense in &mut expenses {
            expense.status = classify_expense(expense, now);
        }
        Ok(expenses)
    }

    /// Payments with their status as of `now`, overdue ones included.
    pub async fn classified_payments(&self, now: DateTime<Utc>) -> ResultEngine<Vec<Payment>> {
        let mut payments = self.payments().await?;
        for payment in &mut payments {
            payment.status = classify_payment(payment, now);
        }
        Ok(payments)
    }

    /// Top `limit` categories by total expense amount.
    pub async fn expense_breakdown(&self, limit: usize) -> ResultEngine<Vec<ExpenseBreakdown>> {
        let mut totals: HashMap<String, i64> = HashMap::new();
        for expense in self.expenses().await? {
            let total = totals.entry(expense.category).or_default();
            *total = add_minor(*total, expense.amount_minor)?;
        }
        let mut breakdown: Vec<ExpenseBreakdown> = totals
            .into_iter()
            .map(|(category, total_minor)| ExpenseBreakdown {
                category,
                total_minor,
            })
            .collect();
        breakdown.sort_by(|a, b| {
            b.total_minor
                .cmp(&a.total_minor)
                .then_with(|| a.category.cmp(&b.category))
        });
        breakdown.truncate(limit);
        Ok(breakdown)
    }

    /// Legs of a wallet, newest first, each with the balance it left behind.
    pub async fn wallet_history(&self, wallet_id: Uuid) -> ResultEngine<WalletHistory> {
        let wallet = self.wallet(wallet_id).await?;
        let mut running = 0;
        let mut entries: Vec<WalletHistoryEntry> = self
            .wallet_legs(wallet_id)
            .await?
            .into_iter()
            .map(|leg| {
                running += leg.amount_minor;
                WalletHistoryEntry {
                    leg,
                    balance_after: running,
                }
            })
            .collect();
        entries.reverse();
        Ok(WalletHistory { wallet, entries })
    }

    /// Expenses and income as CSV with the header
    /// `Type,Date,Amount,Category/Source,Description`.
    pub async fn export_csv(&self) -> ResultEngine<String> {
        let expenses = self.expenses().await?;
        let incomes = self.incomes().await?;

        // Header written by hand so an empty export still has one.
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        wtr.write_record(EXPORT_HEADER).map_err(export_error)?;
        for expense in &expenses {
            wtr.serialize(ExportRow {
                kind: "Expense",
                date: expense.date.format("%Y-%m-%d").to_string(),
                amount: Money::new(expense.amount_minor).to_string(),
                label: &expense.category,
                description: &expense.title,
            })
            .map_err(export_error)?;
        }
        for income in &incomes {
            wtr.serialize(ExportRow {
                kind: "Income",
                date: income.date.format("%Y-%m-%d").to_string(),
                amount: Money::new(income.amount_minor).to_string(),
                label: &income.source,
                description: income.notes.as_deref().unwrap_or_default(),
            })
            .map_err(export_error)?;
        }

        let bytes = wtr
            .into_inner()
            .map_err(|err| EngineError::Export(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| EngineError::Export(err.to_string()))
    }
}

fn classify_expense(expense: &Expense, now: DateTime<Utc>) -> ExpenseStatus {
    expense.status.classify(expense.next_due_date, now)
}

fn classify_payment(payment: &Payment, now: DateTime<Utc>) -> PaymentStatus {
    payment.status.classify(payment.due_date, now)
}

fn export_error(err: csv::Error) -> EngineError {
    EngineError::Export(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(income: i64, expenses: i64, balance: i64, pending_to_send: i64) -> FinancialSummary {
        FinancialSummary {
            total_income: income,
            total_expenses: expenses,
            total_wallet_balance: balance,
            pending_to_send,
            ..FinancialSummary::default()
        }
    }

    #[test]
    fn empty_books_score_sixty() {
        // base 50, no income, zero net worth, no debts
        assert_eq!(health_score(&FinancialSummary::default()), 60);
    }

    #[test]
    fn savings_rate_brackets() {
        assert_eq!(health_score(&summary(100_000, 40_000, 0, 0)), 90);
        assert_eq!(health_score(&summary(100_000, 70_000, 0, 0)), 80);
        assert_eq!(health_score(&summary(100_000, 90_000, 0, 0)), 70);
        assert_eq!(health_score(&summary(100_000, 120_000, 0, 0)), 50);
    }

    #[test]
    fn exactly_half_saved_is_not_above_half() {
        assert_eq!(health_score(&summary(100_000, 50_000, 0, 0)), 80);
    }

    #[test]
    fn wealth_and_debts_adjust_score() {
        assert_eq!(health_score(&summary(0, 0, 6_000_000, 0)), 80);
        assert_eq!(health_score(&summary(0, 0, 5_000_000, 1)), 55);
    }

    #[test]
    fn score_is_clamped() {
        assert_eq!(health_score(&summary(1_000_000, 0, 9_000_000, 0)), 100);
    }

    #[test]
    fn overspending_with_debts_is_the_floor() {
        assert_eq!(health_score(&summary(100, 1_000, -5, 10)), 35);
    }
}
