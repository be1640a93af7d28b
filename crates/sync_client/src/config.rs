use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/folio_sync.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub base_url: String,
    pub username: String,
    /// Only read from the config file or `FOLIO_SYNC_PASSWORD`.
    pub password: String,
    pub queue_path: PathBuf,
    pub probe_interval_secs: u64,
    pub level: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            username: "admin".to_string(),
            password: String::new(),
            queue_path: PathBuf::from("folio_sync_queue.json"),
            probe_interval_secs: 15,
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "folio_sync", about = "Offline write queue for the folio admin")]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    pub config: Option<String>,
    /// Override base URL (e.g. http://127.0.0.1:3000).
    #[arg(long)]
    pub base_url: Option<String>,
    /// Override username (password is never read from CLI).
    #[arg(long)]
    pub username: Option<String>,
    /// Override queue file path.
    #[arg(long)]
    pub queue: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Queue one write.
    Enqueue {
        /// Admin URL the write targets, e.g. /admin/finance/expenses/add.
        #[arg(long)]
        url: String,
        #[arg(long, default_value = "POST")]
        method: String,
        /// JSON body of the write.
        #[arg(long, default_value = "{}")]
        body: String,
        #[arg(long)]
        entity: Option<String>,
        #[arg(long)]
        action: Option<String>,
        #[arg(long)]
        target_id: Option<String>,
    },
    /// Print the queued writes.
    List,
    /// Drop one queued write.
    Remove { id: u64 },
    /// Drop every queued write.
    Clear,
    /// Replay the queue once.
    Replay,
    /// Probe the server and replay whenever it comes back.
    Watch {
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

pub fn load(args: &Args) -> Result<SyncConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("FOLIO_SYNC"));
    let mut settings: SyncConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(username) = &args.username {
        settings.username = username.clone();
    }
    if let Some(queue) = &args.queue {
        settings.queue_path = queue.clone();
    }

    Ok(settings)
}
