//! Replay of offline write batches.
//!
//! Changes are applied one by one in the order received. A failing change
//! is reported in its own result entry and does not stop the batch.
//!
//! A change is routed by its structured `entity`/`action`/`target_id` when
//! present, otherwise by the path segments of its `url`.

use api_types::{
    category::CategoryForm,
    expense::{ExpenseForm, ExpensePayForm},
    income::IncomeForm,
    payment::PaymentForm,
    person::PersonForm,
    sync::{Change, ChangeResult, SyncRequest, SyncResponse},
    transfer::TransferForm,
    wallet::WalletForm,
};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use engine::{ContentKind, Engine, EngineError, FinanceEntity, keys};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{forms, message_for_engine_error, server::ServerState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Action {
    Add,
    Edit,
    Delete,
    Pay,
    Transfer,
    Save,
}

impl Action {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "add" | "create" => Some(Self::Add),
            "edit" | "update" => Some(Self::Edit),
            "delete" => Some(Self::Delete),
            "pay" => Some(Self::Pay),
            "transfer" => Some(Self::Transfer),
            "save" => Some(Self::Save),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    Finance(FinanceEntity),
    Content(ContentKind),
}

/// Where a change goes.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Route {
    target: Target,
    action: Action,
    id: Option<String>,
}

impl Route {
    fn new(target: Target, action: Action, id: Option<&str>) -> Self {
        Self {
            target,
            action,
            id: id.map(str::to_string),
        }
    }

    fn id(&self) -> Result<Uuid, EngineError> {
        let id = self
            .id
            .as_deref()
            .ok_or_else(|| EngineError::Validation("change has no target id".to_string()))?;
        forms::parse_id(id, "target")
    }
}

fn parse_target(entity: &str) -> Option<Target> {
    FinanceEntity::try_from(entity)
        .map(Target::Finance)
        .or_else(|_| ContentKind::try_from(entity).map(Target::Content))
        .ok()
}

fn classify(change: &Change) -> Result<Route, String> {
    if change.entity.is_some() || change.action.is_some() {
        let entity = change.entity.as_deref().unwrap_or_default();
        let target = parse_target(entity).ok_or_else(|| format!("unknown entity: {entity}"))?;
        let action = change.action.as_deref().unwrap_or_default();
        let action = Action::parse(action).ok_or_else(|| format!("unknown action: {action}"))?;
        return Ok(Route::new(target, action, change.target_id.as_deref()));
    }

    let url = change
        .url
        .as_deref()
        .ok_or_else(|| "change has neither entity nor url".to_string())?;
    route_from_url(url).ok_or_else(|| format!("unrecognized change url: {url}"))
}

/// Matches whole path segments of `url` against the form routes.
fn route_from_url(url: &str) -> Option<Route> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let rest = match segments.as_slice() {
        ["admin", rest @ ..] => rest,
        rest => rest,
    };

    match rest {
        ["finance", rest @ ..] => finance_route(rest),
        ["content", rest @ ..] => content_route(rest),
        rest => content_route(rest),
    }
}

fn finance_route(segments: &[&str]) -> Option<Route> {
    use Action::*;

    let entity = FinanceEntity::try_from(*segments.first()?).ok()?;
    let finance = Target::Finance(entity);
    let route = match (entity, &segments[1..]) {
        (FinanceEntity::Wallets, ["transfer"]) => Route::new(finance, Transfer, None),
        (FinanceEntity::Expenses, [id, "pay"]) => Route::new(finance, Pay, Some(*id)),
        (_, ["add"]) => Route::new(finance, Add, None),
        (_, ["edit", id]) => Route::new(finance, Edit, Some(*id)),
        (_, ["delete", id]) => Route::new(finance, Delete, Some(*id)),
        _ => return None,
    };
    Some(route)
}

fn content_route(segments: &[&str]) -> Option<Route> {
    use Action::*;

    let kind = ContentKind::try_from(*segments.first()?).ok()?;
    let content = Target::Content(kind);
    let route = match &segments[1..] {
        [] | ["add"] if kind.is_singleton() => Route::new(content, Save, None),
        [] | ["add"] => Route::new(content, Add, None),
        ["save"] => Route::new(content, Save, None),
        [id, "edit"] | ["edit", id] => Route::new(content, Edit, Some(*id)),
        [id, "delete"] | ["delete", id] => Route::new(content, Delete, Some(*id)),
        _ => return None,
    };
    Some(route)
}

/// Id the client picked for a record it creates: `target_id`, else `id` in
/// the body.
fn client_id(route: &Route, body: &Value) -> Result<Option<Uuid>, EngineError> {
    route
        .id
        .as_deref()
        .or_else(|| body.get("id").and_then(Value::as_str))
        .map(|id| forms::parse_id(id, "new record"))
        .transpose()
}

fn from_body<T: DeserializeOwned>(body: Value) -> Result<T, EngineError> {
    let body = if body.is_null() {
        Value::Object(Map::new())
    } else {
        body
    };
    serde_json::from_value(body)
        .map_err(|err| EngineError::Validation(format!("invalid body: {err}")))
}

async fn apply_finance(
    engine: &Engine,
    entity: FinanceEntity,
    route: &Route,
    body: Value,
    now: DateTime<Utc>,
) -> Result<(), EngineError> {
    use Action::*;
    use FinanceEntity as E;

    let new_id = match route.action {
        Add | Transfer => client_id(route, &body)?,
        _ => None,
    };

    match (entity, route.action) {
        (E::Expenses, Add) => {
            let mut cmd = forms::expense_cmd(from_body::<ExpenseForm>(body)?, now)?;
            cmd.id = new_id;
            engine.create_expense(cmd).await.map(drop)
        }
        (E::Expenses, Edit) => {
            let cmd = forms::expense_cmd(from_body::<ExpenseForm>(body)?, now)?;
            engine.update_expense(route.id()?, cmd).await.map(drop)
        }
        (E::Expenses, Delete) => engine.delete_expense(route.id()?).await.map(drop),
        (E::Expenses, Pay) => {
            let cmd = forms::expense_payment_cmd(from_body::<ExpensePayForm>(body)?, now)?;
            engine.pay_expense(route.id()?, cmd).await.map(drop)
        }

        (E::Income, Add) => {
            let mut cmd = forms::income_cmd(from_body::<IncomeForm>(body)?, now)?;
            cmd.id = new_id;
            engine.create_income(cmd).await.map(drop)
        }
        (E::Income, Edit) => {
            let cmd = forms::income_cmd(from_body::<IncomeForm>(body)?, now)?;
            engine.update_income(route.id()?, cmd).await.map(drop)
        }
        (E::Income, Delete) => engine.delete_income(route.id()?).await.map(drop),

        (E::Payments, Add) => {
            let mut cmd = forms::payment_cmd(from_body::<PaymentForm>(body)?, now)?;
            cmd.id = new_id;
            engine.create_payment(cmd).await.map(drop)
        }
        (E::Payments, Edit) => {
            let cmd = forms::payment_cmd(from_body::<PaymentForm>(body)?, now)?;
            engine.update_payment(route.id()?, cmd).await.map(drop)
        }
        (E::Payments, Delete) => engine.delete_payment(route.id()?).await.map(drop),

        (E::Wallets, Add) => {
            let mut cmd = forms::wallet_cmd(from_body::<WalletForm>(body)?)?;
            cmd.id = new_id;
            engine.create_wallet(cmd).await.map(drop)
        }
        (E::Wallets, Edit) => {
            let cmd = forms::wallet_cmd(from_body::<WalletForm>(body)?)?;
            engine.update_wallet(route.id()?, cmd).await.map(drop)
        }
        (E::Wallets, Delete) => engine.delete_wallet(route.id()?).await.map(drop),
        (E::Wallets, Transfer) | (E::Transfers, Add) => {
            let mut cmd = forms::transfer_cmd(from_body::<TransferForm>(body)?, now)?;
            cmd.id = new_id;
            engine.create_transfer(cmd).await.map(drop)
        }
        (E::Transfers, Edit) => {
            let cmd = forms::transfer_cmd(from_body::<TransferForm>(body)?, now)?;
            engine.update_transfer(route.id()?, cmd).await.map(drop)
        }
        (E::Transfers, Delete) => engine.delete_transfer(route.id()?).await.map(drop),

        (E::People, Add) => {
            let mut cmd = forms::person_cmd(from_body::<PersonForm>(body)?)?;
            cmd.id = new_id;
            engine.create_person(cmd).await.map(drop)
        }
        (E::People, Edit) => {
            let cmd = forms::person_cmd(from_body::<PersonForm>(body)?)?;
            engine.update_person(route.id()?, cmd).await.map(drop)
        }
        (E::People, Delete) => engine.delete_person(route.id()?).await.map(drop),

        (E::Categories, Add) => {
            let mut cmd = forms::category_cmd(from_body::<CategoryForm>(body)?)?;
            cmd.id = new_id;
            engine.create_category(cmd).await.map(drop)
        }
        (E::Categories, Edit) => {
            let cmd = forms::category_cmd(from_body::<CategoryForm>(body)?)?;
            engine.update_category(route.id()?, cmd).await.map(drop)
        }
        (E::Categories, Delete) => engine.delete_category(route.id()?).await.map(drop),

        (entity, action) => Err(EngineError::Validation(format!(
            "{action:?} is not supported for {entity}"
        ))),
    }
}

async fn apply_content(
    engine: &Engine,
    kind: ContentKind,
    route: &Route,
    body: Value,
) -> Result<(), EngineError> {
    match route.action {
        Action::Add => engine.add_content(kind, body).await.map(drop),
        Action::Save => engine.save_content(kind, body).await.map(drop),
        Action::Edit => engine.update_content(kind, route.id()?, body).await.map(drop),
        Action::Delete => engine.delete_content(kind, route.id()?).await.map(drop),
        action => Err(EngineError::Validation(format!(
            "{action:?} is not supported for {kind}"
        ))),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Domain {
    Finance,
    Content,
}

async fn replay(engine: &Engine, domain: Domain, changes: Vec<Change>) -> Vec<ChangeResult> {
    let now = Utc::now();
    let mut results = Vec::with_capacity(changes.len());

    for change in changes {
        let outcome = match classify(&change) {
            Err(reason) => Err(reason),
            Ok(route) => {
                let body = change.body.clone();
                let applied = match (domain, route.target) {
                    (Domain::Finance, Target::Finance(entity)) => {
                        apply_finance(engine, entity, &route, body, now).await
                    }
                    (Domain::Content, Target::Content(kind)) => {
                        apply_content(engine, kind, &route, body).await
                    }
                    (Domain::Finance, Target::Content(kind)) => Err(EngineError::Validation(
                        format!("{kind} changes belong to the content sync"),
                    )),
                    (Domain::Content, Target::Finance(entity)) => Err(EngineError::Validation(
                        format!("{entity} changes belong to the finance sync"),
                    )),
                };
                applied.map_err(message_for_engine_error)
            }
        };

        match outcome {
            Ok(()) => results.push(ChangeResult {
                success: true,
                change,
                error: None,
            }),
            Err(error) => {
                tracing::warn!(
                    queue_id = ?change.queue_id,
                    url = ?change.url,
                    "sync change failed: {error}"
                );
                results.push(ChangeResult {
                    success: false,
                    change,
                    error: Some(error),
                });
            }
        }
    }
    results
}

async fn handle(
    state: ServerState,
    domain: Domain,
    payload: Result<Json<SyncRequest>, JsonRejection>,
) -> (StatusCode, Json<SyncResponse>) {
    let changes = match payload {
        Ok(Json(SyncRequest {
            changes: Some(changes),
        })) => changes,
        Ok(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(SyncResponse::rejected("Invalid changes format")),
            );
        }
        Err(rejection) => {
            tracing::info!("malformed sync body: {rejection}");
            return (
                StatusCode::BAD_REQUEST,
                Json(SyncResponse::rejected("Invalid changes format")),
            );
        }
    };

    let total = changes.len();
    let results = replay(&state.engine, domain, changes).await;
    let failed = results.iter().filter(|r| !r.success).count();
    tracing::info!(?domain, total, failed, "sync batch replayed");

    match domain {
        Domain::Finance => state.engine.cache().invalidate(&keys::FINANCE).await,
        Domain::Content => {
            let all = keys::all_content();
            let all: Vec<&str> = all.iter().map(String::as_str).collect();
            state.engine.cache().invalidate(&all).await;
        }
    }

    (
        StatusCode::OK,
        Json(SyncResponse {
            success: true,
            results,
            message: None,
        }),
    )
}

pub async fn finance(
    State(state): State<ServerState>,
    payload: Result<Json<SyncRequest>, JsonRejection>,
) -> (StatusCode, Json<SyncResponse>) {
    handle(state, Domain::Finance, payload).await
}

pub async fn content(
    State(state): State<ServerState>,
    payload: Result<Json<SyncRequest>, JsonRejection>,
) -> (StatusCode, Json<SyncResponse>) {
    handle(state, Domain::Content, payload).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url_change(url: &str) -> Change {
        Change {
            url: Some(url.to_string()),
            method: Some("POST".to_string()),
            ..Change::default()
        }
    }

    fn route(url: &str) -> Route {
        classify(&url_change(url)).unwrap()
    }

    #[test]
    fn finance_urls_match_whole_segments() {
        let id = "0b9d6c1e-1111-4a4a-9c9c-000000000001";

        let add = route("/admin/finance/expenses/add");
        assert_eq!(add.target, Target::Finance(FinanceEntity::Expenses));
        assert_eq!(add.action, Action::Add);

        let edit = route(&format!("/admin/finance/payments/edit/{id}?from=offline"));
        assert_eq!(edit.target, Target::Finance(FinanceEntity::Payments));
        assert_eq!(edit.action, Action::Edit);
        assert_eq!(edit.id.as_deref(), Some(id));

        let people = route(&format!("/admin/finance/people/delete/{id}"));
        assert_eq!(people.target, Target::Finance(FinanceEntity::People));

        assert_eq!(route("/admin/finance/wallets/transfer").action, Action::Transfer);
        assert_eq!(route(&format!("/admin/finance/expenses/{id}/pay")).action, Action::Pay);
    }

    #[test]
    fn near_miss_urls_are_rejected() {
        for url in [
            "/admin/finance/expensesadd",
            "/admin/finance/expenses/added",
            "/admin/finance/paymentsx/add",
            "/admin/finance/expenses/edit",
            "/admin/finance/income/transfer",
            "/somewhere/else",
        ] {
            assert!(classify(&url_change(url)).is_err(), "{url}");
        }
    }

    #[test]
    fn content_urls() {
        let id = "0b9d6c1e-1111-4a4a-9c9c-000000000002";

        assert_eq!(route("/admin/skills").action, Action::Add);
        assert_eq!(route("/admin/hero").action, Action::Save);
        assert_eq!(route("/admin/content/projects").action, Action::Add);

        let edit = route(&format!("/admin/education/{id}/edit"));
        assert_eq!(edit.target, Target::Content(ContentKind::Education));
        assert_eq!(edit.action, Action::Edit);
        assert_eq!(edit.id.as_deref(), Some(id));

        assert_eq!(
            route(&format!("/admin/content/testimonials/{id}/delete")).action,
            Action::Delete
        );
    }

    #[test]
    fn structured_metadata_wins_over_url() {
        let change = Change {
            entity: Some("income".to_string()),
            action: Some("delete".to_string()),
            target_id: Some("abc".to_string()),
            url: Some("/admin/finance/expenses/add".to_string()),
            ..Change::default()
        };
        let route = classify(&change).unwrap();
        assert_eq!(route.target, Target::Finance(FinanceEntity::Income));
        assert_eq!(route.action, Action::Delete);
        assert_eq!(route.id.as_deref(), Some("abc"));
    }

    #[test]
    fn unknown_structured_entity_fails() {
        let change = Change {
            entity: Some("invoices".to_string()),
            action: Some("add".to_string()),
            ..Change::default()
        };
        assert!(classify(&change).is_err());
        assert!(classify(&Change::default()).is_err());
    }
}
