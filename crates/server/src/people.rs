//! People routes. Lists carry the derived totals of every person.

use api_types::person::PersonForm;
use axum::{
    Form, Json,
    extract::{Path, State},
    response::Redirect,
};
use engine::{PersonSummary, keys};

use crate::{
    ServerError, forms,
    respond::{read_through, redirect},
    server::ServerState,
};

const LIST: &str = "/admin/finance/people";

pub async fn list(
    State(state): State<ServerState>,
) -> Result<Json<Vec<PersonSummary>>, ServerError> {
    let people = read_through(&state, keys::PEOPLE, || state.engine.person_summaries()).await?;
    Ok(Json(people))
}

pub async fn detail(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<PersonSummary>, ServerError> {
    let id = forms::parse_id(&id, "person")?;
    Ok(Json(state.engine.person_summary(id).await?))
}

pub async fn add(State(state): State<ServerState>, Form(form): Form<PersonForm>) -> Redirect {
    let result = match forms::person_cmd(form) {
        Ok(cmd) => state.engine.create_person(cmd).await,
        Err(err) => Err(err),
    };
    redirect(LIST, "Person added successfully", result)
}

pub async fn edit(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Form(form): Form<PersonForm>,
) -> Redirect {
    let result = match (forms::parse_id(&id, "person"), forms::person_cmd(form)) {
        (Ok(id), Ok(cmd)) => state.engine.update_person(id, cmd).await,
        (Err(err), _) | (_, Err(err)) => Err(err),
    };
    redirect(LIST, "Person updated successfully", result)
}

pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> Redirect {
    let result = match forms::parse_id(&id, "person") {
        Ok(id) => state.engine.delete_person(id).await,
        Err(err) => Err(err),
    };
    redirect(LIST, "Person deleted successfully", result)
}
