use axum::{
    Json,
    extract::{Path, Query, State},
};
use engine::Notification;
use serde::Deserialize;

use crate::{ServerError, forms, server::ServerState};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    limit: Option<u64>,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Notification>>, ServerError> {
    let limit = query.limit.unwrap_or(20).min(100);
    Ok(Json(state.engine.notifications(limit).await?))
}

pub async fn read_all(State(state): State<ServerState>) -> Result<Json<u64>, ServerError> {
    Ok(Json(state.engine.mark_notifications_read(None).await?))
}

pub async fn read_one(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<u64>, ServerError> {
    let id = forms::parse_id(&id, "notification")?;
    Ok(Json(state.engine.mark_notifications_read(Some(id)).await?))
}
