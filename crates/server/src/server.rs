use axum::{
    Router,
    extract::{Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use std::sync::Arc;

use crate::{
    StoreHealth, categories, content, dashboard, expenses, health, incomes, notifications,
    payments, people, sync, transfers, wallets,
};
use engine::Engine;

/// Credentials of the single admin account.
#[derive(Clone, Debug)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
    pub health: Arc<dyn StoreHealth>,
    credentials: Arc<AdminCredentials>,
}

impl ServerState {
    pub fn new(
        engine: Engine,
        health: Arc<dyn StoreHealth>,
        credentials: AdminCredentials,
    ) -> Self {
        Self {
            engine: Arc::new(engine),
            health,
            credentials: Arc::new(credentials),
        }
    }
}

fn unauthorized() -> Response {
    let mut response = StatusCode::UNAUTHORIZED.into_response();
    response.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"folio\""),
    );
    response
}

async fn auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(TypedHeader(Authorization(basic))) = auth_header else {
        return unauthorized();
    };
    if basic.username().is_empty() || basic.password().is_empty() {
        return unauthorized();
    }
    if basic.username() != state.credentials.username
        || basic.password() != state.credentials.password
    {
        tracing::warn!(user = basic.username(), "rejected admin login");
        return unauthorized();
    }

    next.run(request).await
}

pub fn router(state: ServerState) -> Router {
    let admin = Router::new()
        .route("/admin/finance", get(dashboard::get))
        .route("/admin/finance/reports", get(dashboard::reports))
        .route("/admin/finance/reports/export", get(dashboard::export))
        .route("/admin/finance/expenses", get(expenses::list))
        .route("/admin/finance/expenses/add", post(expenses::add))
        .route("/admin/finance/expenses/edit/{id}", post(expenses::edit))
        .route("/admin/finance/expenses/delete/{id}", post(expenses::delete))
        .route("/admin/finance/expenses/{id}/pay", post(expenses::pay))
        .route("/admin/finance/income", get(incomes::list))
        .route("/admin/finance/income/add", post(incomes::add))
        .route("/admin/finance/income/edit/{id}", post(incomes::edit))
        .route("/admin/finance/income/delete/{id}", post(incomes::delete))
        .route("/admin/finance/payments", get(payments::list))
        .route("/admin/finance/payments/add", post(payments::add))
        .route("/admin/finance/payments/edit/{id}", post(payments::edit))
        .route("/admin/finance/payments/delete/{id}", post(payments::delete))
        .route("/admin/finance/wallets", get(wallets::list))
        .route("/admin/finance/wallets/add", post(wallets::add))
        .route("/admin/finance/wallets/edit/{id}", post(wallets::edit))
        .route("/admin/finance/wallets/delete/{id}", post(wallets::delete))
        .route("/admin/finance/wallets/transfer", post(transfers::add))
        .route("/admin/finance/wallets/{id}", get(wallets::detail))
        .route("/admin/finance/transfers", get(transfers::list))
        .route("/admin/finance/transfers/edit/{id}", post(transfers::edit))
        .route("/admin/finance/transfers/delete/{id}", post(transfers::delete))
        .route("/admin/finance/people", get(people::list))
        .route("/admin/finance/people/add", post(people::add))
        .route("/admin/finance/people/edit/{id}", post(people::edit))
        .route("/admin/finance/people/delete/{id}", post(people::delete))
        .route("/admin/finance/people/{id}", get(people::detail))
        .route("/admin/finance/categories", get(categories::list))
        .route("/admin/finance/categories/add", post(categories::add))
        .route("/admin/finance/categories/edit/{id}", post(categories::edit))
        .route("/admin/finance/categories/delete/{id}", post(categories::delete))
        .route("/admin/finance/sync", post(sync::finance))
        .route("/admin/sync", post(sync::content))
        .route("/admin/notifications", get(notifications::list))
        .route("/admin/notifications/read", post(notifications::read_all))
        .route("/admin/notifications/{id}/read", post(notifications::read_one))
        .route(
            "/admin/content/{kind}",
            get(content::list).post(content::add),
        )
        .route("/admin/content/{kind}/{id}/edit", post(content::edit))
        .route("/admin/content/{kind}/{id}/delete", post(content::delete))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    Router::new()
        .route("/health", get(health::get))
        .route("/api/portfolio", get(content::portfolio))
        .merge(admin)
        .with_state(state)
}

pub async fn run(state: ServerState, bind: &str) {
    let listener = match tokio::net::TcpListener::bind(bind).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {bind}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(state, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
