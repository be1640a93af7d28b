//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation and mapping logic so every mutation enforces the same rules.

use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::InvalidId(format!("invalid {label} id")))
}

pub(crate) fn parse_optional_uuid(value: Option<&str>, label: &str) -> ResultEngine<Option<Uuid>> {
    value.map(|v| parse_uuid(v, label)).transpose()
}

/// Largest amount a single record may carry: one trillion in major units.
pub(crate) const MAX_AMOUNT_MINOR: i64 = 100_000_000_000_000;

/// Amounts are within `0..=MAX_AMOUNT_MINOR`; the sign comes from the wallet
/// effect rule.
pub(crate) fn validate_amount(amount_minor: i64, label: &str) -> ResultEngine<()> {
    if amount_minor < 0 {
        return Err(EngineError::InvalidAmount(format!(
            "{label} must be >= 0"
        )));
    }
    if amount_minor > MAX_AMOUNT_MINOR {
        return Err(EngineError::InvalidAmount(format!(
            "{label} exceeds the largest supported amount"
        )));
    }
    Ok(())
}

/// `a + b` on minor units, failing instead of wrapping.
pub(crate) fn add_minor(a: i64, b: i64) -> ResultEngine<i64> {
    a.checked_add(b).ok_or_else(|| {
        EngineError::InvalidAmount("total exceeds the supported range".to_string())
    })
}

/// Paid amounts are within `0..=amount_minor`.
pub(crate) fn validate_paid(amount_minor: i64, paid_minor: i64) -> ResultEngine<()> {
    if paid_minor < 0 {
        return Err(EngineError::InvalidAmount(
            "paid amount must be >= 0".to_string(),
        ));
    }
    if paid_minor > amount_minor {
        return Err(EngineError::InvalidAmount(format!(
            "paid amount {paid_minor} exceeds amount {amount_minor}"
        )));
    }
    Ok(())
}

/// Canonical display form of a name: NFKC, trimmed, inner whitespace collapsed.
pub(crate) fn normalize_display(value: &str, label: &str) -> ResultEngine<String> {
    let normalized: String = value.nfkc().collect();
    let collapsed = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(EngineError::InvalidName(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(collapsed)
}

/// Case-insensitive comparison key for a display name.
pub(crate) fn normalize_key(display: &str) -> String {
    display.nfkc().collect::<String>().to_lowercase()
}
