//! Payment routes: money sent to or received from people.

use api_types::payment::PaymentForm;
use axum::{
    Form, Json,
    extract::{Path, State},
    response::Redirect,
};
use chrono::Utc;
use engine::{Payment, keys};

use crate::{
    ServerError, forms,
    respond::{read_through, redirect},
    server::ServerState,
};

const LIST: &str = "/admin/finance/payments";

/// Payments newest first, with overdue ones reported as such.
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<Payment>>, ServerError> {
    let payments = read_through(&state, keys::PAYMENTS, || state.engine.payments()).await?;
    let now = Utc::now();
    Ok(Json(
        payments
            .into_iter()
            .map(|mut payment| {
                payment.status = payment.status.classify(payment.due_date, now);
                payment
            })
            .collect(),
    ))
}

pub async fn add(State(state): State<ServerState>, Form(form): Form<PaymentForm>) -> Redirect {
    let result = match forms::payment_cmd(form, Utc::now()) {
        Ok(cmd) => state.engine.create_payment(cmd).await,
        Err(err) => Err(err),
    };
    redirect(LIST, "Payment added successfully", result)
}

pub async fn edit(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Form(form): Form<PaymentForm>,
) -> Redirect {
    let result = match (forms::parse_id(&id, "payment"), forms::payment_cmd(form, Utc::now())) {
        (Ok(id), Ok(cmd)) => state.engine.update_payment(id, cmd).await,
        (Err(err), _) | (_, Err(err)) => Err(err),
    };
    redirect(LIST, "Payment updated successfully", result)
}

pub async fn delete(State(state): State<ServerState>, Path(id): Path<String>) -> Redirect {
    let result = match forms::parse_id(&id, "payment") {
        Ok(id) => state.engine.delete_payment(id).await,
        Err(err) => Err(err),
    };
    redirect(LIST, "Payment deleted successfully", result)
}
