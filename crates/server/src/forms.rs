//! Form payloads to engine commands.
//!
//! Shared by the form routes and the sync replay so a queued change is
//! parsed exactly like the form it was captured from.

use api_types::{
    Amount, Flag,
    category::CategoryForm,
    expense::{ExpenseForm, ExpensePayForm},
    income::IncomeForm,
    non_empty, parse_date,
    payment::PaymentForm,
    person::PersonForm,
    transfer::TransferForm,
    wallet::WalletForm,
};
use chrono::{DateTime, Utc};
use engine::{
    CategoryCmd, CategoryKind, EngineError, ExpenseCmd, ExpensePaymentCmd, Frequency, IncomeCmd,
    Money, PaymentCmd, PaymentKind, PaymentMethod, PersonCmd, PersonKind, TransferCmd, WalletCmd,
    WalletKind,
};
use uuid::Uuid;

type FormResult<T> = Result<T, EngineError>;

pub fn expense_cmd(form: ExpenseForm, now: DateTime<Utc>) -> FormResult<ExpenseCmd> {
    let is_recurring = checked(&form.is_recurring);
    Ok(ExpenseCmd {
        id: None,
        category_id: optional_id(&form.category_id, "category")?,
        amount_minor: required_amount(&form.amount, "amount")?,
        paid_minor: optional_amount(&form.paid_amount)?,
        wallet_id: optional_id(&form.wallet, "wallet")?,
        payment_method: labeled(&form.payment_method)?.unwrap_or(PaymentMethod::Cash),
        date: date_or(&form.date, now)?,
        is_recurring,
        recurring_frequency: if is_recurring {
            labeled::<Frequency>(&form.recurring_frequency)?
        } else {
            None
        },
        next_due_date: optional_date(&form.next_due_date)?,
        notes: text(&form.notes),
        title: form.title,
        category: form.category,
    })
}

pub fn expense_payment_cmd(
    form: ExpensePayForm,
    now: DateTime<Utc>,
) -> FormResult<ExpensePaymentCmd> {
    Ok(ExpensePaymentCmd {
        amount_minor: required_amount(&form.amount, "amount")?,
        wallet_id: optional_id(&form.wallet, "wallet")?,
        method: labeled(&form.method)?,
        date: date_or(&form.date, now)?,
        notes: text(&form.notes),
    })
}

pub fn income_cmd(form: IncomeForm, now: DateTime<Utc>) -> FormResult<IncomeCmd> {
    let is_recurring = checked(&form.is_recurring);
    Ok(IncomeCmd {
        id: None,
        amount_minor: required_amount(&form.amount, "amount")?,
        wallet_id: required_id(&form.wallet, "wallet")?,
        category_id: optional_id(&form.category, "category")?,
        date: date_or(&form.date, now)?,
        is_recurring,
        recurring_frequency: if is_recurring {
            labeled::<Frequency>(&form.recurring_frequency)?
        } else {
            None
        },
        notes: text(&form.notes),
        source: form.source,
    })
}

pub fn payment_cmd(form: PaymentForm, now: DateTime<Utc>) -> FormResult<PaymentCmd> {
    Ok(PaymentCmd {
        id: None,
        person_id: required_id(&form.person, "person")?,
        kind: labeled::<PaymentKind>(&form.kind)?
            .ok_or_else(|| EngineError::Validation("payment type is required".to_string()))?,
        amount_minor: required_amount(&form.amount, "amount")?,
        paid_minor: optional_amount(&form.paid_amount)?,
        wallet_id: optional_id(&form.wallet, "wallet")?,
        method: labeled(&form.method)?.unwrap_or(PaymentMethod::Cash),
        date: date_or(&form.date, now)?,
        due_date: optional_date(&form.end_date)?,
        notes: text(&form.notes),
    })
}

pub fn transfer_cmd(form: TransferForm, now: DateTime<Utc>) -> FormResult<TransferCmd> {
    Ok(TransferCmd {
        id: None,
        from_wallet_id: required_id(&form.from_wallet, "source wallet")?,
        to_wallet_id: required_id(&form.to_wallet, "destination wallet")?,
        amount_minor: required_amount(&form.amount, "amount")?,
        date: date_or(&form.date, now)?,
        notes: text(&form.notes),
    })
}

pub fn wallet_cmd(form: WalletForm) -> FormResult<WalletCmd> {
    Ok(WalletCmd {
        id: None,
        kind: labeled(&form.kind)?.unwrap_or(WalletKind::Cash),
        currency: text(&form.currency),
        color: text(&form.color),
        is_default: checked(&form.is_default),
        name: form.name,
    })
}

pub fn person_cmd(form: PersonForm) -> FormResult<PersonCmd> {
    Ok(PersonCmd {
        id: None,
        kind: labeled(&form.kind)?.unwrap_or(PersonKind::Other),
        phone: text(&form.phone),
        email: text(&form.email),
        address: text(&form.address),
        notes: text(&form.notes),
        name: form.name,
    })
}

pub fn category_cmd(form: CategoryForm) -> FormResult<CategoryCmd> {
    Ok(CategoryCmd {
        id: None,
        kind: labeled(&form.kind)?.unwrap_or(CategoryKind::Expense),
        color: text(&form.color),
        icon: text(&form.icon),
        name: form.name,
    })
}

pub fn parse_id(value: &str, what: &str) -> FormResult<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|_| EngineError::InvalidId(format!("{what}: {value}")))
}

fn required_id(value: &Option<String>, what: &str) -> FormResult<Uuid> {
    let value = non_empty(value)
        .ok_or_else(|| EngineError::Validation(format!("{what} is required")))?;
    parse_id(value, what)
}

fn optional_id(value: &Option<String>, what: &str) -> FormResult<Option<Uuid>> {
    non_empty(value).map(|v| parse_id(v, what)).transpose()
}

fn required_amount(value: &Option<Amount>, what: &str) -> FormResult<i64> {
    optional_amount(value)?.ok_or_else(|| EngineError::InvalidAmount(format!("{what} is required")))
}

fn optional_amount(value: &Option<Amount>) -> FormResult<Option<i64>> {
    let Some(amount) = value else {
        return Ok(None);
    };
    let text = amount.to_text();
    if text.is_empty() {
        return Ok(None);
    }
    Ok(Some(text.parse::<Money>()?.minor()))
}

fn date_or(value: &Option<String>, now: DateTime<Utc>) -> FormResult<DateTime<Utc>> {
    Ok(optional_date(value)?.unwrap_or(now))
}

fn optional_date(value: &Option<String>) -> FormResult<Option<DateTime<Utc>>> {
    non_empty(value)
        .map(|v| {
            parse_date(v)
                .map(|d| d.with_timezone(&Utc))
                .ok_or_else(|| EngineError::Validation(format!("invalid date: {v}")))
        })
        .transpose()
}

fn labeled<T>(value: &Option<String>) -> FormResult<Option<T>>
where
    T: for<'a> TryFrom<&'a str, Error = EngineError>,
{
    non_empty(value).map(T::try_from).transpose()
}

fn checked(flag: &Option<Flag>) -> bool {
    flag.as_ref().is_some_and(Flag::is_set)
}

fn text(value: &Option<String>) -> Option<String> {
    non_empty(value).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn expense_form_defaults() {
        let cmd = expense_cmd(
            ExpenseForm {
                title: "Tea".to_string(),
                category: "Food".to_string(),
                amount: Some(Amount::from("12,5")),
                wallet: Some(String::new()),
                ..ExpenseForm::default()
            },
            now(),
        )
        .unwrap();

        assert_eq!(cmd.amount_minor, 1250);
        assert_eq!(cmd.paid_minor, None);
        assert_eq!(cmd.wallet_id, None);
        assert_eq!(cmd.payment_method, PaymentMethod::Cash);
        assert_eq!(cmd.date, now());
        assert!(cmd.recurring_frequency.is_none());
    }

    #[test]
    fn frequency_only_kept_when_recurring() {
        let form = ExpenseForm {
            title: "Rent".to_string(),
            amount: Some(Amount::Number(100.into())),
            recurring_frequency: Some("Monthly".to_string()),
            ..ExpenseForm::default()
        };
        assert!(expense_cmd(form.clone(), now()).unwrap().recurring_frequency.is_none());

        let recurring = ExpenseForm {
            is_recurring: Some(Flag::Text("on".to_string())),
            ..form
        };
        assert_eq!(
            expense_cmd(recurring, now()).unwrap().recurring_frequency,
            Some(Frequency::Monthly)
        );
    }

    #[test]
    fn missing_amount_is_invalid() {
        let result = expense_cmd(
            ExpenseForm {
                title: "Tea".to_string(),
                ..ExpenseForm::default()
            },
            now(),
        );
        assert!(matches!(result, Err(EngineError::InvalidAmount(_))));
    }

    #[test]
    fn payment_needs_person_and_type() {
        let person = Uuid::new_v4();
        let ok = payment_cmd(
            PaymentForm {
                person: Some(person.to_string()),
                kind: Some("Receive".to_string()),
                amount: Some(Amount::from("200")),
                end_date: Some("2026-04-01".to_string()),
                ..PaymentForm::default()
            },
            now(),
        )
        .unwrap();
        assert_eq!(ok.person_id, person);
        assert_eq!(ok.kind, PaymentKind::Receive);
        assert!(ok.due_date.is_some());

        let no_type = payment_cmd(
            PaymentForm {
                person: Some(person.to_string()),
                amount: Some(Amount::from("200")),
                ..PaymentForm::default()
            },
            now(),
        );
        assert!(matches!(no_type, Err(EngineError::Validation(_))));

        let bad_person = payment_cmd(
            PaymentForm {
                person: Some("nobody".to_string()),
                kind: Some("send".to_string()),
                amount: Some(Amount::from("1")),
                ..PaymentForm::default()
            },
            now(),
        );
        assert!(matches!(bad_person, Err(EngineError::InvalidId(_))));
    }

    #[test]
    fn unknown_wallet_type_is_rejected() {
        let result = wallet_cmd(WalletForm {
            name: "Cash".to_string(),
            kind: Some("Piggy bank".to_string()),
            ..WalletForm::default()
        });
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }
}
