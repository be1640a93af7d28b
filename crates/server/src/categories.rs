//! Category routes.

use api_types::category::CategoryForm;
use axum::{
    Form, Json,
    extract::{Path, State},
    response::Redirect,
};
use engine::{Category, keys};

use crate::{
    ServerError, forms,
    respond::{read_through, redirect},
    server::ServerState,
};

const LIST: &str = "/admin/finance/categories";

pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Category>>, ServerError> {
    let categories =
        read_through(&state, keys::CATEGORIES, || state.engine.categories(None)).await?;
    Ok(Json(categories))
}

pub async fn add(State(state): State<ServerState>, Form(form): Form<CategoryForm>) -> Redirect {
    let result = match forms::category_cmd(form) {
        Ok(cmd) => state.engine.create_category(cmd).await,
        Err(err) => Err(err),
    };
    redirect(LIST, "Category added successfully", result)
}

pub async fn edit(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Form(form): Form<CategoryForm>,
) -> Redirect {
    let result = match (forms::parse_id(&id, "category"), forms::category_cmd(form)) {
        (Ok(id), Ok(cmd)) => state.engine.update_category(id, cmd).await,
        (Err(err), _) | (_, Err(err)) => Err(err),
    };
    redirect(LIST, "Category updated successfully", result)
}

pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> Redirect {
    let result = match forms::parse_id(&id, "category") {
        Ok(id) => state.engine.delete_category(id).await,
        Err(err) => Err(err),
    };
    redirect(LIST, "Category deleted successfully", result)
}
