//! Portfolio content routes and the public portfolio read.

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{ContentItem, ContentKind, EngineError, keys};
use serde_json::Value;

use crate::{ServerError, forms, respond::read_through, server::ServerState};

pub(crate) fn parse_kind(kind: &str) -> Result<ContentKind, EngineError> {
    ContentKind::try_from(kind).map_err(|_| EngineError::KeyNotFound(format!("content {kind}")))
}

/// Every content kind, served to the public site.
pub async fn portfolio(
    State(state): State<ServerState>,
) -> Result<Json<BTreeMap<String, Vec<ContentItem>>>, ServerError> {
    let portfolio = read_through(&state, keys::PUBLIC_HOME, || state.engine.portfolio()).await?;
    Ok(Json(portfolio))
}

pub async fn list(
    State(state): State<ServerState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<ContentItem>>, ServerError> {
    let kind = parse_kind(&kind)?;
    let key = keys::content(kind);
    let items = read_through(&state, &key, || state.engine.content(kind)).await?;
    Ok(Json(items))
}

/// Adds an item; for singleton kinds the existing item is replaced.
pub async fn add(
    State(state): State<ServerState>,
    Path(kind): Path<String>,
    Json(data): Json<Value>,
) -> Result<(StatusCode, Json<ContentItem>), ServerError> {
    let kind = parse_kind(&kind)?;
    let item = state.engine.add_content(kind, data).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn edit(
    State(state): State<ServerState>,
    Path((kind, id)): Path<(String, String)>,
    Json(data): Json<Value>,
) -> Result<Json<ContentItem>, ServerError> {
    let kind = parse_kind(&kind)?;
    let id = forms::parse_id(&id, "content item")?;
    Ok(Json(state.engine.update_content(kind, id, data).await?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path((kind, id)): Path<(String, String)>,
) -> Result<StatusCode, ServerError> {
    let kind = parse_kind(&kind)?;
    let id = forms::parse_id(&id, "content item")?;
    state.engine.delete_content(kind, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
