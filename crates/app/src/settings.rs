//! Settings of the `folio` binary.
//!
//! Read from `config/folio.toml` when present, then from `FOLIO_*`
//! environment variables (`FOLIO_SERVER__PORT=8080`,
//! `FOLIO_CACHE__REDIS_URL=redis://127.0.0.1/`).
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Where the database lives: `memory` or a sqlite file path.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl TryFrom<String> for Database {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let value = value.trim();
        match value {
            "" => Err("database must not be empty".to_string()),
            "memory" => Ok(Self::Memory),
            path => Ok(Self::Sqlite(
                path.strip_prefix("sqlite:").unwrap_or(path).to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub database: Database,
    pub bind: Option<String>,
    pub port: u16,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct Cache {
    /// In-process cache when absent.
    pub redis_url: Option<String>,
    pub ttl_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub cache: Cache,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_config(
            Config::builder()
                .add_source(File::with_name("config/folio").required(false))
                .add_source(
                    Environment::with_prefix("FOLIO")
                        .prefix_separator("_")
                        .separator("__"),
                ),
        )
    }

    fn from_config(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self, ConfigError> {
        let settings = builder
            .set_default("app.level", "info")?
            .set_default("server.database", "memory")?
            .set_default("server.port", 3000)?
            .set_default("server.username", "admin")?
            .set_default("server.password", "")?
            .set_default("cache.ttl_secs", 3600)?
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        if settings.server.password.is_empty() {
            return Err(ConfigError::Message(
                "server.password (FOLIO_SERVER__PASSWORD) must be set".to_string(),
            ));
        }
        Ok(settings)
    }
}
