//! Transfers between wallets.

use api_types::transfer::TransferForm;
use axum::{
    Form, Json,
    extract::{Path, State},
    response::Redirect,
};
use chrono::Utc;
use engine::Transfer;

use crate::{ServerError, forms, respond::redirect, server::ServerState};

const LIST: &str = "/admin/finance/wallets";

/// Not cached: the list has no key of its own.
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Transfer>>, ServerError> {
    Ok(Json(state.engine.transfers().await?))
}

pub async fn add(State(state): State<ServerState>, Form(form): Form<TransferForm>) -> Redirect {
    let result = match forms::transfer_cmd(form, Utc::now()) {
        Ok(cmd) => state.engine.create_transfer(cmd).await,
        Err(err) => Err(err),
    };
    redirect(LIST, "Transfer completed successfully", result)
}

pub async fn edit(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Form(form): Form<TransferForm>,
) -> Redirect {
    let result = match (forms::parse_id(&id, "transfer"), forms::transfer_cmd(form, Utc::now())) {
        (Ok(id), Ok(cmd)) => state.engine.update_transfer(id, cmd).await,
        (Err(err), _) | (_, Err(err)) => Err(err),
    };
    redirect(LIST, "Transfer updated successfully", result)
}

pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> Redirect {
    let result = match forms::parse_id(&id, "transfer") {
        Ok(id) => state.engine.delete_transfer(id).await,
        Err(err) => Err(err),
    };
    redirect(LIST, "Transfer deleted successfully", result)
}
