//! Replays the offline queue once the server is reachable again.

use std::{collections::HashSet, future::Future, time::Duration};

use api_types::sync::{Change, SyncRequest};
use engine::FinanceEntity;

use crate::{
    client::{Endpoint, SyncTransport},
    error::{ClientError, Result},
    queue::{Queue, QueuedChange},
};

/// Connectivity state of the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncState {
    /// Online with nothing left to send.
    Idle,
    /// Online, but the server refused some items; they stay queued.
    IdleWithRetained(usize),
    Offline,
    Replaying,
}

/// Outcome of one replay pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayReport {
    pub sent: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Batches that were not delivered at all.
    pub batch_errors: Vec<String>,
}

/// Finance changes go to the finance endpoint; everything else is content.
pub fn endpoint_for(change: &QueuedChange) -> Endpoint {
    if let Some(entity) = change.entity.as_deref() {
        return if FinanceEntity::try_from(entity).is_ok() {
            Endpoint::Finance
        } else {
            Endpoint::Content
        };
    }
    if change.url.trim_start_matches('/').starts_with("admin/finance") {
        Endpoint::Finance
    } else {
        Endpoint::Content
    }
}

pub struct Replayer<T> {
    transport: T,
    queue: Queue,
    state: SyncState,
}

impl<T: SyncTransport> Replayer<T> {
    /// Starts offline, so the first successful probe triggers a replay.
    pub fn new(transport: T, queue: Queue) -> Self {
        Self {
            transport,
            queue,
            state: SyncState::Offline,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut Queue {
        &mut self.queue
    }

    /// Feeds a connectivity observation. Coming back online replays the queue.
    pub async fn set_online(&mut self, online: bool) -> Result<SyncState> {
        match (self.state, online) {
            (_, false) => {
                if self.state != SyncState::Offline {
                    tracing::info!("server unreachable, queueing writes");
                }
                self.state = SyncState::Offline;
            }
            (SyncState::Offline, true) => {
                tracing::info!(queued = self.queue.len(), "server reachable again");
                self.replay().await?;
            }
            (_, true) => {}
        }
        Ok(self.state)
    }

    /// Probes the server once and updates the state.
    pub async fn tick(&mut self) -> Result<SyncState> {
        let online = self.transport.probe().await;
        self.set_online(online).await
    }

    /// Probes every `interval` until `shutdown` resolves.
    pub async fn watch(
        &mut self,
        interval: Duration,
        shutdown: impl Future<Output = ()>,
    ) -> Result<()> {
        let mut ticker = tokio::time::interval(interval);
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => return Ok(()),
                _ = ticker.tick() => {
                    self.tick().await?;
                }
            }
        }
    }

    /// Sends every queued item and drops the ones the server applied.
    pub async fn replay(&mut self) -> Result<ReplayReport> {
        let mut report = ReplayReport::default();
        if self.queue.is_empty() {
            self.state = SyncState::Idle;
            return Ok(report);
        }
        self.state = SyncState::Replaying;

        let snapshot = self.queue.list_all().to_vec();
        let (finance, content): (Vec<_>, Vec<_>) = snapshot
            .iter()
            .partition(|item| endpoint_for(item) == Endpoint::Finance);

        let mut applied = HashSet::new();
        let mut unreachable = false;
        for (endpoint, batch) in [(Endpoint::Finance, finance), (Endpoint::Content, content)] {
            if batch.is_empty() {
                continue;
            }
            report.sent += batch.len();
            let request = SyncRequest {
                changes: Some(batch.iter().map(|item| item.to_change()).collect::<Vec<Change>>()),
            };
            match self.transport.send(endpoint, &request).await {
                Ok(response) => {
                    for result in response.results {
                        match (result.success, result.change.queue_id) {
                            (true, Some(id)) => {
                                applied.insert(id);
                            }
                            (false, id) => {
                                tracing::warn!(
                                    ?id,
                                    "change refused: {}",
                                    result.error.as_deref().unwrap_or("unknown error")
                                );
                            }
                            (true, None) => {}
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(?endpoint, "sync batch not delivered: {err}");
                    unreachable |= matches!(err, ClientError::Transport(_));
                    report.batch_errors.push(err.to_string());
                }
            }
        }

        report.succeeded = applied.len();
        report.failed = report.sent.saturating_sub(report.succeeded);
        if snapshot.iter().all(|item| applied.contains(&item.id)) {
            self.queue.clear_all()?;
        } else {
            let ids: Vec<u64> = applied.into_iter().collect();
            self.queue.remove_many(&ids)?;
        }

        self.state = if unreachable {
            SyncState::Offline
        } else if self.queue.is_empty() {
            SyncState::Idle
        } else {
            SyncState::IdleWithRetained(self.queue.len())
        };
        tracing::info!(
            sent = report.sent,
            succeeded = report.succeeded,
            failed = report.failed,
            "replay finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::queue::NewChange;

    fn queued(entity: Option<&str>, url: &str) -> QueuedChange {
        QueuedChange {
            id: 1,
            entity: entity.map(str::to_string),
            action: None,
            target_id: None,
            url: url.to_string(),
            method: "POST".to_string(),
            body: json!({}),
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn structured_entity_wins_over_url() {
        assert_eq!(endpoint_for(&queued(Some("expenses"), "/admin/projects")), Endpoint::Finance);
        assert_eq!(endpoint_for(&queued(Some("projects"), "/admin/finance/x")), Endpoint::Content);
    }

    #[test]
    fn url_prefix_decides_without_entity() {
        assert_eq!(endpoint_for(&queued(None, "/admin/finance/wallets/add")), Endpoint::Finance);
        assert_eq!(endpoint_for(&queued(None, "admin/finance/people/add")), Endpoint::Finance);
        assert_eq!(endpoint_for(&queued(None, "/admin/skills/add")), Endpoint::Content);
    }

    #[test]
    fn new_change_defaults_to_post() {
        let change = NewChange::new("/admin/finance/wallets/add", json!({"name": "Cash"}));
        assert_eq!(change.method, "POST");
        assert!(change.entity.is_none());
    }
}
