//! Income routes.

use api_types::income::IncomeForm;
use axum::{
    Form, Json,
    extract::{Path, State},
    response::Redirect,
};
use chrono::Utc;
use engine::{Income, keys};

use crate::{
    ServerError, forms,
    respond::{read_through, redirect},
    server::ServerState,
};

const LIST: &str = "/admin/finance/income";

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Income>>, ServerError> {
    let incomes = read_through(&state, keys::INCOME, || state.engine.incomes()).await?;
    Ok(Json(incomes))
}

pub async fn add(State(state): State<ServerState>, Form(form): Form<IncomeForm>) -> Redirect {
    let result = match forms::income_cmd(form, Utc::now()) {
        Ok(cmd) => state.engine.create_income(cmd).await,
        Err(err) => Err(err),
    };
    redirect(LIST, "Income added successfully", result)
}

pub async fn edit(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Form(form): Form<IncomeForm>,
) -> Redirect {
    let result = match (forms::parse_id(&id, "income"), forms::income_cmd(form, Utc::now())) {
        (Ok(id), Ok(cmd)) => state.engine.update_income(id, cmd).await,
        (Err(err), _) | (_, Err(err)) => Err(err),
    };
    redirect(LIST, "Income updated successfully", result)
}

pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> Redirect {
    let result = match forms::parse_id(&id, "income") {
        Ok(id) => state.engine.delete_income(id).await,
        Err(err) => Err(err),
    };
    redirect(LIST, "Income deleted successfully", result)
}
