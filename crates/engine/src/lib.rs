//! Finance ledger engine.
//!
//! Every money movement (expense, income, payment, transfer) goes through a
//! mutation helper on [`Engine`]. A helper runs in one database transaction:
//! it reverts the legs the record posted before, derives the new status,
//! persists the record and posts the new legs. Cached list views are
//! invalidated after the commit and a notification is written best-effort.

#[macro_use]
mod macros;

pub use cache::{Cache, CacheError, CacheStore, FinanceEntity, MemoryCache, RedisCache, keys};
pub use categories::{Category, CategoryKind};
pub use commands::{
    CategoryCmd, ExpenseCmd, ExpensePaymentCmd, IncomeCmd, PaymentCmd, PersonCmd, TransferCmd,
    WalletCmd,
};
pub use content::{ContentItem, ContentKind};
pub use effects::{Effect, SourceKind, SourceRef, WalletEffects};
pub use error::EngineError;
pub use expenses::{Expense, Frequency, PaymentMethod, PaymentRecord};
pub use incomes::Income;
pub use legs::Leg;
pub use money::Money;
pub use notifications::{DbNotifier, NoopNotifier, Notification, NotificationKind, Notifier};
pub use ops::{
    BalanceDrift, Engine, EngineBuilder, ExpenseBreakdown, FinancialSummary, WalletHistory,
    WalletHistoryEntry, health_score,
};
pub use payments::{Payment, PaymentKind};
pub use people::{Person, PersonKind, PersonSummary, PersonTotals};
pub use status::{ExpenseStatus, PaymentStatus, Settlement, derive_settlement};
pub use transfers::Transfer;
pub use wallets::{Wallet, WalletKind};

pub mod cache;
mod categories;
mod commands;
mod content;
mod effects;
mod error;
mod expense_payments;
mod expenses;
mod incomes;
mod legs;
mod money;
mod notifications;
mod ops;
mod payments;
mod people;
mod status;
mod transfers;
mod util;
mod wallets;

type ResultEngine<T> = Result<T, EngineError>;
