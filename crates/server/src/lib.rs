use api_types::finance::ErrorBody;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use health::{DbHealth, StoreHealth};
pub use server::{
    AdminCredentials, ServerState, router, run, run_with_listener, spawn_with_listener,
};

mod categories;
mod content;
mod dashboard;
mod expenses;
mod forms;
mod health;
mod incomes;
mod notifications;
mod payments;
mod people;
mod respond;
mod server;
mod sync;
mod transfers;
mod wallets;

pub mod types {
    pub mod forms {
        pub use api_types::{
            Amount, Flag, category::CategoryForm, expense::ExpenseForm, expense::ExpensePayForm,
            income::IncomeForm, payment::PaymentForm, person::PersonForm, transfer::TransferForm,
            wallet::WalletForm,
        };
    }

    pub mod sync {
        pub use api_types::sync::{Change, ChangeResult, SyncRequest, SyncResponse};
    }

    pub mod finance {
        pub use api_types::finance::{DashboardView, ErrorBody};
        pub use engine::{FinancialSummary, PersonSummary, WalletHistory};
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Generic(String),
    /// The store is down and nothing was cached.
    Unavailable,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) | EngineError::Conflict(_) => StatusCode::CONFLICT,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidTransfer(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidId(_)
        | EngineError::Validation(_) => StatusCode::BAD_REQUEST,
        err if err.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::Database(_) | EngineError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        err if err.is_unavailable() => {
            tracing::error!("database unavailable: {err}");
            "database unavailable".to_string()
        }
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::Export(reason) => {
            tracing::error!("export failed: {reason}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => {
                (status_for_engine_error(&err), message_for_engine_error(err))
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "database unavailable".to_string(),
            ),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::DbErr;

    use super::*;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::KeyNotFound("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_conflict_maps_to_409() {
        let res = ServerError::from(EngineError::ExistingKey("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res = ServerError::from(EngineError::Conflict("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_400() {
        for err in [
            EngineError::InvalidAmount("x".to_string()),
            EngineError::InvalidTransfer("x".to_string()),
            EngineError::Validation("x".to_string()),
        ] {
            let res = ServerError::from(err).into_response();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn unreachable_store_maps_to_503() {
        let err = EngineError::Database(DbErr::Conn(sea_orm::RuntimeErr::Internal(
            "refused".to_string(),
        )));
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ServerError::Unavailable.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn other_database_errors_map_to_500() {
        let err = EngineError::Database(DbErr::Custom("boom".to_string()));
        let res = ServerError::from(err).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
