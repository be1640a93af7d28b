//! Cache key namespace.
//!
//! Finance list views live under `finance:*`, portfolio content under
//! `content:*`, the public landing page under `public:home`.

use crate::ContentKind;

pub const EXPENSES: &str = "finance:expenses";
pub const INCOME: &str = "finance:income";
pub const WALLETS: &str = "finance:wallets";
pub const PEOPLE: &str = "finance:people";
pub const CATEGORIES: &str = "finance:categories";
pub const PAYMENTS: &str = "finance:payments";

pub const FINANCE: [&str; 6] = [EXPENSES, INCOME, WALLETS, PEOPLE, CATEGORIES, PAYMENTS];

pub const CONTENT_DASHBOARD: &str = "content:dashboard";
pub const PUBLIC_HOME: &str = "public:home";

labeled_enum! {
    /// Finance entity types, named by their URL segment.
    pub enum FinanceEntity {
        Expenses => "expenses",
        Income => "income",
        Payments => "payments",
        Wallets => "wallets",
        People => "people",
        Categories => "categories",
        Transfers => "transfers",
    }
}

impl FinanceEntity {
    /// Cached views that a write to this entity makes stale.
    pub fn invalidation_keys(self) -> &'static [&'static str] {
        match self {
            Self::Expenses => &[EXPENSES, WALLETS, CATEGORIES],
            Self::Income => &[INCOME, WALLETS],
            Self::Payments => &[PAYMENTS, WALLETS, PEOPLE],
            Self::Wallets | Self::Transfers => &[WALLETS],
            Self::People => &[PEOPLE],
            Self::Categories => &[CATEGORIES],
        }
    }

    /// Key of the cached list view, when the entity has one.
    pub fn list_key(self) -> Option<&'static str> {
        match self {
            Self::Expenses => Some(EXPENSES),
            Self::Income => Some(INCOME),
            Self::Payments => Some(PAYMENTS),
            Self::Wallets => Some(WALLETS),
            Self::People => Some(PEOPLE),
            Self::Categories => Some(CATEGORIES),
            Self::Transfers => None,
        }
    }
}

pub fn content(kind: ContentKind) -> String {
    format!("content:{kind}")
}

/// Every key a content write makes stale.
pub fn content_invalidation(kind: ContentKind) -> Vec<String> {
    vec![
        content(kind),
        CONTENT_DASHBOARD.to_string(),
        PUBLIC_HOME.to_string(),
    ]
}

/// Every content key, for bulk invalidation after a sync batch.
pub fn all_content() -> Vec<String> {
    ContentKind::ALL
        .iter()
        .map(|kind| content(*kind))
        .chain([CONTENT_DASHBOARD.to_string(), PUBLIC_HOME.to_string()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_write_invalidates_its_own_list() {
        for entity in FinanceEntity::ALL {
            if let Some(list) = entity.list_key() {
                assert!(entity.invalidation_keys().contains(&list), "{entity}");
            }
        }
    }

    #[test]
    fn ledger_writes_invalidate_wallets() {
        for entity in [
            FinanceEntity::Expenses,
            FinanceEntity::Income,
            FinanceEntity::Payments,
            FinanceEntity::Transfers,
        ] {
            assert!(entity.invalidation_keys().contains(&WALLETS));
        }
    }

    #[test]
    fn content_keys_are_namespaced() {
        assert_eq!(content(ContentKind::Skills), "content:skills");
        assert_eq!(all_content().len(), ContentKind::ALL.len() + 2);
    }
}
