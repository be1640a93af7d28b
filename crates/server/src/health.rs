//! Store health, passed to handlers through the state.

use api_types::health::Health;
use async_trait::async_trait;
use axum::{Json, extract::State};
use sea_orm::DatabaseConnection;

use crate::server::ServerState;

/// Reports whether the backing store can be reached.
///
/// Read paths consult it before going to the database; a cached value is
/// still served while the store is down.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn database_available(&self) -> bool;
}

/// Pings the database connection.
#[derive(Clone, Debug)]
pub struct DbHealth {
    database: DatabaseConnection,
}

impl DbHealth {
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }
}

#[async_trait]
impl StoreHealth for DbHealth {
    async fn database_available(&self) -> bool {
        match self.database.ping().await {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!("database ping failed: {err}");
                false
            }
        }
    }
}

pub async fn get(State(state): State<ServerState>) -> Json<Health> {
    Json(Health {
        database: state.health.database_available().await,
    })
}
