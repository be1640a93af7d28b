//! Expense routes.

use api_types::expense::{ExpenseForm, ExpensePayForm};
use axum::{
    Form, Json,
    extract::{Path, State},
    response::Redirect,
};
use chrono::Utc;
use engine::{Expense, keys};

use crate::{
    ServerError, forms,
    respond::{read_through, redirect},
    server::ServerState,
};

const LIST: &str = "/admin/finance/expenses";

/// Expenses newest first, with overdue ones reported as such.
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Expense>>, ServerError> {
    let expenses = read_through(&state, keys::EXPENSES, || state.engine.expenses()).await?;
    let now = Utc::now();
    Ok(Json(
        expenses
            .into_iter()
            .map(|mut expense| {
                expense.status = expense.status.classify(expense.next_due_date, now);
                expense
            })
            .collect(),
    ))
}

pub async fn add(State(state): State<ServerState>, Form(form): Form<ExpenseForm>) -> Redirect {
    let result = match forms::expense_cmd(form, Utc::now()) {
        Ok(cmd) => state.engine.create_expense(cmd).await,
        Err(err) => Err(err),
    };
    redirect(LIST, "Expense added successfully", result)
}

pub async fn edit(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Form(form): Form<ExpenseForm>,
) -> Redirect {
    let result = match (forms::parse_id(&id, "expense"), forms::expense_cmd(form, Utc::now())) {
        (Ok(id), Ok(cmd)) => state.engine.update_expense(id, cmd).await,
        (Err(err), _) | (_, Err(err)) => Err(err),
    };
    redirect(LIST, "Expense updated successfully", result)
}

pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> Redirect {
    let result = match forms::parse_id(&id, "expense") {
        Ok(id) => state.engine.delete_expense(id).await,
        Err(err) => Err(err),
    };
    redirect(LIST, "Expense deleted successfully", result)
}

pub async fn pay(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Form(form): Form<ExpensePayForm>,
) -> Redirect {
    let result = match (
        forms::parse_id(&id, "expense"),
        forms::expense_payment_cmd(form, Utc::now()),
    ) {
        (Ok(id), Ok(cmd)) => state.engine.pay_expense(id, cmd).await,
        (Err(err), _) | (_, Err(err)) => Err(err),
    };
    redirect(LIST, "Payment recorded successfully", result)
}
