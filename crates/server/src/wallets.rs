//! Wallet routes.

use api_types::wallet::WalletForm;
use axum::{
    Form, Json,
    extract::{Path, State},
    response::Redirect,
};
use engine::{Wallet, WalletHistory, keys};

use crate::{
    ServerError, forms,
    respond::{read_through, redirect},
    server::ServerState,
};

const LIST: &str = "/admin/finance/wallets";

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Wallet>>, ServerError> {
    let wallets = read_through(&state, keys::WALLETS, || state.engine.wallets()).await?;
    Ok(Json(wallets))
}

/// A wallet with its legs, newest first.
pub async fn detail(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<WalletHistory>, ServerError> {
    let id = forms::parse_id(&id, "wallet")?;
    Ok(Json(state.engine.wallet_history(id).await?))
}

pub async fn add(State(state): State<ServerState>, Form(form): Form<WalletForm>) -> Redirect {
    let result = match forms::wallet_cmd(form) {
        Ok(cmd) => state.engine.create_wallet(cmd).await,
        Err(err) => Err(err),
    };
    redirect(LIST, "Wallet created successfully", result)
}

pub async fn edit(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Form(form): Form<WalletForm>,
) -> Redirect {
    let result = match (forms::parse_id(&id, "wallet"), forms::wallet_cmd(form)) {
        (Ok(id), Ok(cmd)) => state.engine.update_wallet(id, cmd).await,
        (Err(err), _) | (_, Err(err)) => Err(err),
    };
    redirect(LIST, "Wallet updated successfully", result)
}

pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> Redirect {
    let result = match forms::parse_id(&id, "wallet") {
        Ok(id) => state.engine.delete_wallet(id).await,
        Err(err) => Err(err),
    };
    redirect(LIST, "Wallet deleted successfully", result)
}
