//! Finance schema.
//!
//! - `wallets`: places where money is kept, with a denormalized `balance`
//! - `categories`: descriptive tags for expenses and income
//! - `people`: counterparts of payments
//! - `expenses` / `expense_payments`: bills and their partial payment history
//! - `incomes`: money received into a wallet
//! - `payments`: money sent to or received from a person
//! - `transfers`: wallet to wallet moves
//! - `ledger_legs`: immutable signed wallet effects, one row per effect
//! - `notifications`: admin feed written after ledger mutations

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Wallets {
    Table,
    Id,
    Name,
    Kind,
    Balance,
    Currency,
    Color,
    IsDefault,
    CreatedAt,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    Name,
    NameNorm,
    Kind,
    Color,
    Icon,
    CreatedAt,
}

#[derive(Iden)]
enum People {
    Table,
    Id,
    Name,
    Kind,
    Phone,
    Email,
    Address,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum Expenses {
    Table,
    Id,
    Title,
    Category,
    CategoryId,
    AmountMinor,
    PaidMinor,
    Status,
    WalletId,
    PaymentMethod,
    Date,
    IsRecurring,
    RecurringFrequency,
    NextDueDate,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum ExpensePayments {
    Table,
    Id,
    ExpenseId,
    Seq,
    AmountMinor,
    Date,
    Method,
    WalletId,
    Notes,
}

#[derive(Iden)]
enum Incomes {
    Table,
    Id,
    Source,
    AmountMinor,
    WalletId,
    CategoryId,
    Date,
    IsRecurring,
    RecurringFrequency,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum Payments {
    Table,
    Id,
    PersonId,
    Kind,
    AmountMinor,
    PaidMinor,
    Status,
    WalletId,
    Method,
    Date,
    DueDate,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum Transfers {
    Table,
    Id,
    FromWalletId,
    ToWalletId,
    AmountMinor,
    Date,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum LedgerLegs {
    Table,
    Id,
    SourceKind,
    SourceId,
    WalletId,
    AmountMinor,
    OccurredAt,
    CreatedAt,
}

#[derive(Iden)]
enum Notifications {
    Table,
    Id,
    Title,
    Message,
    Kind,
    Read,
    Link,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Wallets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Wallets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Wallets::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Wallets::Name).string().not_null())
                    .col(
                        ColumnDef::new(Wallets::Kind)
                            .string()
                            .not_null()
                            .default("Cash"),
                    )
                    .col(
                        ColumnDef::new(Wallets::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Wallets::Currency)
                            .string()
                            .not_null()
                            .default("PKR"),
                    )
                    .col(ColumnDef::new(Wallets::Color).string())
                    .col(
                        ColumnDef::new(Wallets::IsDefault)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Wallets::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-wallets-name-unique")
                    .table(Wallets::Table)
                    .col(Wallets::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::NameNorm).string().not_null())
                    .col(ColumnDef::new(Categories::Kind).string().not_null())
                    .col(ColumnDef::new(Categories::Color).string())
                    .col(ColumnDef::new(Categories::Icon).string())
                    .col(
                        ColumnDef::new(Categories::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-kind-name-unique")
                    .table(Categories::Table)
                    .col(Categories::Kind)
                    .col(Categories::NameNorm)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. People
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(People::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(People::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(People::Name).string().not_null())
                    .col(
                        ColumnDef::new(People::Kind)
                            .string()
                            .not_null()
                            .default("Friend"),
                    )
                    .col(ColumnDef::new(People::Phone).string())
                    .col(ColumnDef::new(People::Email).string())
                    .col(ColumnDef::new(People::Address).string())
                    .col(ColumnDef::new(People::Notes).string())
                    .col(ColumnDef::new(People::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Expenses
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::Title).string().not_null())
                    .col(ColumnDef::new(Expenses::Category).string().not_null())
                    .col(ColumnDef::new(Expenses::CategoryId).string())
                    .col(
                        ColumnDef::new(Expenses::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::PaidMinor).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::Status).string().not_null())
                    .col(ColumnDef::new(Expenses::WalletId).string())
                    .col(ColumnDef::new(Expenses::PaymentMethod).string().not_null())
                    .col(ColumnDef::new(Expenses::Date).timestamp().not_null())
                    .col(
                        ColumnDef::new(Expenses::IsRecurring)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Expenses::RecurringFrequency).string())
                    .col(ColumnDef::new(Expenses::NextDueDate).timestamp())
                    .col(ColumnDef::new(Expenses::Notes).string())
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-wallet_id")
                            .from(Expenses::Table, Expenses::WalletId)
                            .to(Wallets::Table, Wallets::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-date")
                    .table(Expenses::Table)
                    .col(Expenses::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ExpensePayments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpensePayments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ExpensePayments::ExpenseId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpensePayments::Seq).integer().not_null())
                    .col(
                        ColumnDef::new(ExpensePayments::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ExpensePayments::Date).timestamp().not_null())
                    .col(ColumnDef::new(ExpensePayments::Method).string().not_null())
                    .col(ColumnDef::new(ExpensePayments::WalletId).string())
                    .col(ColumnDef::new(ExpensePayments::Notes).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_payments-expense_id")
                            .from(ExpensePayments::Table, ExpensePayments::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_payments-expense_id-seq")
                    .table(ExpensePayments::Table)
                    .col(ExpensePayments::ExpenseId)
                    .col(ExpensePayments::Seq)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Incomes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Incomes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Incomes::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Incomes::Source).string().not_null())
                    .col(ColumnDef::new(Incomes::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Incomes::WalletId).string().not_null())
                    .col(ColumnDef::new(Incomes::CategoryId).string())
                    .col(ColumnDef::new(Incomes::Date).timestamp().not_null())
                    .col(
                        ColumnDef::new(Incomes::IsRecurring)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Incomes::RecurringFrequency).string())
                    .col(ColumnDef::new(Incomes::Notes).string())
                    .col(ColumnDef::new(Incomes::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-incomes-wallet_id")
                            .from(Incomes::Table, Incomes::WalletId)
                            .to(Wallets::Table, Wallets::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Payments
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::PersonId).string().not_null())
                    .col(ColumnDef::new(Payments::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Payments::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payments::PaidMinor).big_integer().not_null())
                    .col(ColumnDef::new(Payments::Status).string().not_null())
                    .col(ColumnDef::new(Payments::WalletId).string())
                    .col(ColumnDef::new(Payments::Method).string().not_null())
                    .col(ColumnDef::new(Payments::Date).timestamp().not_null())
                    .col(ColumnDef::new(Payments::DueDate).timestamp())
                    .col(ColumnDef::new(Payments::Notes).string())
                    .col(ColumnDef::new(Payments::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-person_id")
                            .from(Payments::Table, Payments::PersonId)
                            .to(People::Table, People::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payments-wallet_id")
                            .from(Payments::Table, Payments::WalletId)
                            .to(Wallets::Table, Wallets::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payments-person_id")
                    .table(Payments::Table)
                    .col(Payments::PersonId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Transfers
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transfers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transfers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transfers::FromWalletId).string().not_null())
                    .col(ColumnDef::new(Transfers::ToWalletId).string().not_null())
                    .col(
                        ColumnDef::new(Transfers::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transfers::Date).timestamp().not_null())
                    .col(ColumnDef::new(Transfers::Notes).string())
                    .col(ColumnDef::new(Transfers::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfers-from_wallet_id")
                            .from(Transfers::Table, Transfers::FromWalletId)
                            .to(Wallets::Table, Wallets::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transfers-to_wallet_id")
                            .from(Transfers::Table, Transfers::ToWalletId)
                            .to(Wallets::Table, Wallets::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Ledger legs
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LedgerLegs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LedgerLegs::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LedgerLegs::SourceKind).string().not_null())
                    .col(ColumnDef::new(LedgerLegs::SourceId).string().not_null())
                    .col(ColumnDef::new(LedgerLegs::WalletId).string().not_null())
                    .col(
                        ColumnDef::new(LedgerLegs::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerLegs::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerLegs::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-ledger_legs-wallet_id")
                            .from(LedgerLegs::Table, LedgerLegs::WalletId)
                            .to(Wallets::Table, Wallets::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_legs-source")
                    .table(LedgerLegs::Table)
                    .col(LedgerLegs::SourceKind)
                    .col(LedgerLegs::SourceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-ledger_legs-wallet_id-occurred_at")
                    .table(LedgerLegs::Table)
                    .col(LedgerLegs::WalletId)
                    .col(LedgerLegs::OccurredAt)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 9. Notifications
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Notifications::Title).string().not_null())
                    .col(ColumnDef::new(Notifications::Message).string().not_null())
                    .col(
                        ColumnDef::new(Notifications::Kind)
                            .string()
                            .not_null()
                            .default("info"),
                    )
                    .col(
                        ColumnDef::new(Notifications::Read)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Notifications::Link).string())
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerLegs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transfers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Incomes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpensePayments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(People::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Wallets::Table).to_owned())
            .await
    }
}
