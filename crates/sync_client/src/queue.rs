//! Durable queue of writes made while offline.
//!
//! The whole queue is one JSON file. Every mutation rewrites the file
//! before returning, so a crash never loses an acknowledged item.

use std::{
    fs,
    path::{Path, PathBuf},
};

use api_types::sync::Change;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, Result};

/// A write waiting to be replayed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueuedChange {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub body: Value,
    pub timestamp: DateTime<Utc>,
}

impl QueuedChange {
    /// The wire form, carrying the queue id so results can be matched.
    pub fn to_change(&self) -> Change {
        Change {
            queue_id: Some(self.id),
            entity: self.entity.clone(),
            action: self.action.clone(),
            target_id: self.target_id.clone(),
            url: Some(self.url.clone()),
            method: Some(self.method.clone()),
            body: self.body.clone(),
        }
    }
}

/// A write as captured by the caller, before it gets an id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewChange {
    pub entity: Option<String>,
    pub action: Option<String>,
    pub target_id: Option<String>,
    pub url: String,
    pub method: String,
    pub body: Value,
}

impl NewChange {
    pub fn new(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            method: "POST".to_string(),
            body,
            ..Self::default()
        }
    }

    /// Adds the structured routing the server prefers over the URL.
    #[must_use]
    pub fn routed(
        mut self,
        entity: impl Into<String>,
        action: impl Into<String>,
        target_id: Option<String>,
    ) -> Self {
        self.entity = Some(entity.into());
        self.action = Some(action.into());
        self.target_id = target_id;
        self
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct QueueFile {
    next_id: u64,
    items: Vec<QueuedChange>,
}

#[derive(Debug)]
pub struct Queue {
    path: PathBuf,
    state: QueueFile,
}

impl Queue {
    /// Opens the queue at `path`, starting empty when the file is missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => QueueFile {
                next_id: 1,
                items: Vec::new(),
            },
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, state })
    }

    pub fn enqueue(&mut self, change: NewChange) -> Result<u64> {
        let id = self.state.next_id.max(1);
        self.state.next_id = id + 1;
        self.state.items.push(QueuedChange {
            id,
            entity: change.entity,
            action: change.action,
            target_id: change.target_id,
            url: change.url,
            method: change.method,
            body: change.body,
            timestamp: Utc::now(),
        });
        self.save()?;
        tracing::debug!(id, "change queued");
        Ok(id)
    }

    /// Items in insertion order.
    pub fn list_all(&self) -> &[QueuedChange] {
        &self.state.items
    }

    pub fn len(&self) -> usize {
        self.state.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    pub fn remove_by_id(&mut self, id: u64) -> Result<()> {
        let before = self.state.items.len();
        self.state.items.retain(|item| item.id != id);
        if self.state.items.len() == before {
            return Err(AppError::UnknownItem(id));
        }
        self.save()
    }

    /// Removes every listed id in one write. Unknown ids are ignored.
    pub fn remove_many(&mut self, ids: &[u64]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.state.items.retain(|item| !ids.contains(&item.id));
        self.save()
    }

    pub fn clear_all(&mut self) -> Result<()> {
        self.state.items.clear();
        self.save()
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(&self.state)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
