use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A money amount as it arrives from a form or an offline queue body.
///
/// HTML forms always send text while queued JSON bodies may carry numbers.
/// The server parses both with the engine's `Money` rules.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(serde_json::Number),
    Text(String),
}

impl Amount {
    /// Decimal text of the amount. Numbers keep every digit they were sent
    /// with, so `99.999` stays three decimals and is rejected by the parser
    /// instead of rounding up to a settled amount.
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Number(number) => number.to_string(),
        }
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// A checkbox value: `true`, `"on"`, `"true"` and `"1"` are checked.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    pub fn is_set(&self) -> bool {
        match self {
            Self::Bool(value) => *value,
            Self::Text(text) => matches!(
                text.trim().to_ascii_lowercase().as_str(),
                "on" | "true" | "1" | "yes"
            ),
        }
    }
}

/// `Some(trimmed)` unless the field is missing or blank.
///
/// Forms send empty strings for untouched inputs.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parses a form date: `YYYY-MM-DD` (midnight UTC) or RFC3339.
pub fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date);
    }
    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(day.and_hms_opt(0, 0, 0)?.and_utc().fixed_offset())
}

pub mod expense {
    use super::*;

    /// Fields of the add/edit expense form.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseForm {
        pub title: String,
        #[serde(default)]
        pub category: String,
        /// Category id (UUID) picked from the category list.
        pub category_id: Option<String>,
        pub amount: Option<Amount>,
        /// Defaults to the full amount when absent.
        pub paid_amount: Option<Amount>,
        /// Wallet id (UUID).
        pub wallet: Option<String>,
        pub payment_method: Option<String>,
        pub date: Option<String>,
        pub is_recurring: Option<Flag>,
        pub recurring_frequency: Option<String>,
        pub next_due_date: Option<String>,
        pub notes: Option<String>,
    }

    /// Fields of the partial payment form.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpensePayForm {
        pub amount: Option<Amount>,
        pub wallet: Option<String>,
        pub method: Option<String>,
        pub date: Option<String>,
        pub notes: Option<String>,
    }
}

pub mod income {
    use super::*;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct IncomeForm {
        pub source: String,
        pub amount: Option<Amount>,
        pub wallet: Option<String>,
        /// Category id (UUID).
        pub category: Option<String>,
        pub date: Option<String>,
        pub is_recurring: Option<Flag>,
        pub recurring_frequency: Option<String>,
        pub notes: Option<String>,
    }
}

pub mod payment {
    use super::*;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PaymentForm {
        /// Person id (UUID).
        pub person: Option<String>,
        /// `send` or `receive`.
        #[serde(rename = "type")]
        pub kind: Option<String>,
        pub amount: Option<Amount>,
        /// Defaults to 0 when absent.
        pub paid_amount: Option<Amount>,
        pub wallet: Option<String>,
        pub method: Option<String>,
        pub date: Option<String>,
        /// Due date.
        pub end_date: Option<String>,
        pub notes: Option<String>,
    }
}

pub mod transfer {
    use super::*;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct TransferForm {
        pub from_wallet: Option<String>,
        pub to_wallet: Option<String>,
        pub amount: Option<Amount>,
        pub date: Option<String>,
        pub notes: Option<String>,
    }
}

pub mod wallet {
    use super::*;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct WalletForm {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: Option<String>,
        pub currency: Option<String>,
        pub color: Option<String>,
        pub is_default: Option<Flag>,
    }
}

pub mod person {
    use super::*;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct PersonForm {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: Option<String>,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub address: Option<String>,
        pub notes: Option<String>,
    }
}

pub mod category {
    use super::*;

    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryForm {
        pub name: String,
        /// `expense` or `income`.
        #[serde(rename = "type")]
        pub kind: Option<String>,
        pub color: Option<String>,
        pub icon: Option<String>,
    }
}

pub mod sync {
    use super::*;

    /// One queued offline write.
    ///
    /// `entity`, `action` and `target_id` are the structured form of the
    /// change. Older clients only send `url` and `method`; the server then
    /// classifies the change from the URL path segments.
    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    pub struct Change {
        /// Local queue id, echoed back so the client can drop exactly the
        /// items that succeeded.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub queue_id: Option<u64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub entity: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub action: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub target_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub method: Option<String>,
        #[serde(default)]
        pub body: Value,
    }

    /// Body of both sync endpoints.
    ///
    /// `changes` is optional here so a missing array can be answered with a
    /// structured 400 instead of a rejection from the extractor.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct SyncRequest {
        pub changes: Option<Vec<Change>>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct ChangeResult {
        pub success: bool,
        pub change: Change,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub error: Option<String>,
    }

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct SyncResponse {
        pub success: bool,
        #[serde(default)]
        pub results: Vec<ChangeResult>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub message: Option<String>,
    }

    impl SyncResponse {
        /// A whole-batch failure with no per-item results.
        pub fn rejected(message: impl Into<String>) -> Self {
            Self {
                success: false,
                results: Vec::new(),
                message: Some(message.into()),
            }
        }
    }
}

pub mod health {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Health {
        pub database: bool,
    }
}

pub mod finance {
    use super::*;

    /// Dashboard totals, all in minor units.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct DashboardView {
        pub total_expenses_minor: i64,
        pub total_income_minor: i64,
        pub total_sent_minor: i64,
        pub total_received_minor: i64,
        pub pending_to_send_minor: i64,
        pub pending_to_receive_minor: i64,
        pub net_worth_minor: i64,
        pub overdue_expenses: usize,
        pub overdue_payments: usize,
        /// 0 to 100.
        pub health_score: u8,
    }

    /// Error body of JSON routes.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ErrorBody {
        pub error: String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn amount_accepts_text_and_numbers() {
        let text: Amount = serde_json::from_value(json!("12,50")).unwrap();
        let number: Amount = serde_json::from_value(json!(12.5)).unwrap();
        let whole: Amount = serde_json::from_value(json!(300)).unwrap();

        assert_eq!(text.to_text(), "12,50");
        assert_eq!(number.to_text(), "12.5");
        assert_eq!(whole.to_text(), "300");
    }

    #[test]
    fn numeric_amounts_are_not_rounded() {
        let amount: Amount = serde_json::from_value(json!(99.999)).unwrap();
        assert_eq!(amount.to_text(), "99.999");

        let cents: Amount = serde_json::from_value(json!(0.01)).unwrap();
        assert_eq!(cents.to_text(), "0.01");
    }

    #[test]
    fn checkbox_values() {
        assert!(Flag::Text("on".to_string()).is_set());
        assert!(Flag::Bool(true).is_set());
        assert!(!Flag::Text("off".to_string()).is_set());
        assert!(!Flag::Bool(false).is_set());
    }

    #[test]
    fn blank_fields_are_absent() {
        assert_eq!(non_empty(&Some("  ".to_string())), None);
        assert_eq!(non_empty(&Some(" x ".to_string())), Some("x"));
        assert_eq!(non_empty(&None), None);
    }

    #[test]
    fn form_dates() {
        let day = parse_date("2026-03-01").unwrap();
        assert_eq!(day.to_rfc3339(), "2026-03-01T00:00:00+00:00");
        assert!(parse_date("2026-03-01T10:00:00+05:00").is_some());
        assert!(parse_date("01/03/2026").is_none());
    }

    #[test]
    fn legacy_change_has_only_url() {
        let change: sync::Change = serde_json::from_value(json!({
            "url": "/admin/finance/expenses/add",
            "method": "POST",
            "body": {"title": "Tea", "amount": "1.5"}
        }))
        .unwrap();

        assert_eq!(change.entity, None);
        assert_eq!(change.url.as_deref(), Some("/admin/finance/expenses/add"));

        let form: expense::ExpenseForm = serde_json::from_value(change.body).unwrap();
        assert_eq!(form.title, "Tea");
        assert_eq!(form.amount, Some(Amount::from("1.5")));
    }

    #[test]
    fn missing_changes_deserializes_to_none() {
        let req: sync::SyncRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.changes.is_none());
    }
}
