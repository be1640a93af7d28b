use std::{sync::Arc, time::Duration};

use engine::{Cache, RedisCache};
use migration::{Migrator, MigratorTrait};
use server::{AdminCredentials, DbHealth, ServerState};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "folio={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let db = parse_database(&settings.server.database).await?;
    let cache = build_cache(&settings.cache).await;

    let engine = engine::Engine::builder()
        .database(db.clone())
        .cache(cache)
        .build()
        .await?;

    let state = ServerState::new(
        engine,
        Arc::new(DbHealth::new(db)),
        AdminCredentials {
            username: settings.server.username.clone(),
            password: settings.server.password.clone(),
        },
    );

    let bind = settings
        .server
        .bind
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", bind, settings.server.port)).await?;
    server::run_with_listener(state, listener).await?;

    Ok(())
}

/// Redis when configured and reachable, otherwise the in-process cache.
async fn build_cache(config: &settings::Cache) -> Cache {
    let ttl = Duration::from_secs(config.ttl_secs);
    let Some(url) = config.redis_url.as_deref() else {
        tracing::info!("using in-process cache");
        return Cache::in_memory(ttl);
    };

    match RedisCache::connect(url).await {
        Ok(redis) => {
            tracing::info!("using redis cache");
            Cache::new(Arc::new(redis), ttl)
        }
        Err(err) => {
            tracing::warn!("redis unavailable, falling back to in-process cache: {err}");
            Cache::in_memory(ttl)
        }
    }
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    tracing::info!("database ready");
    Ok(database)
}
