//! Finance overview, reports and CSV export.

use api_types::finance::DashboardView;
use axum::{
    Json,
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use chrono::Utc;
use engine::{ExpenseBreakdown, health_score};
use serde::Deserialize;

use crate::{ServerError, server::ServerState};

pub async fn get(State(state): State<ServerState>) -> Result<Json<DashboardView>, ServerError> {
    if !state.health.database_available().await {
        return Err(ServerError::Unavailable);
    }
    let summary = state.engine.financial_summary(Utc::now()).await?;

    Ok(Json(DashboardView {
        health_score: health_score(&summary),
        total_expenses_minor: summary.total_expenses,
        total_income_minor: summary.total_income,
        total_sent_minor: summary.total_sent,
        total_received_minor: summary.total_received,
        pending_to_send_minor: summary.pending_to_send,
        pending_to_receive_minor: summary.pending_to_receive,
        net_worth_minor: summary.total_wallet_balance,
        overdue_expenses: summary.overdue_expenses,
        overdue_payments: summary.overdue_payments,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    top: Option<usize>,
}

/// Spending per category, largest first.
pub async fn reports(
    State(state): State<ServerState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<ExpenseBreakdown>>, ServerError> {
    let top = query.top.unwrap_or(5);
    Ok(Json(state.engine.expense_breakdown(top).await?))
}

pub async fn export(State(state): State<ServerState>) -> Result<impl IntoResponse, ServerError> {
    let csv = state.engine.export_csv().await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"finance_report.csv\"",
            ),
        ],
        csv,
    ))
}
