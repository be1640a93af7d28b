use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use api_types::sync::{ChangeResult, SyncRequest, SyncResponse};
use async_trait::async_trait;
use serde_json::json;
use sync_client::{ClientError, Endpoint, NewChange, Queue, Replayer, SyncState, SyncTransport};
use tempfile::TempDir;

/// Applies every change except the ones whose body carries `"fail": true`.
#[derive(Clone, Default)]
struct MockTransport {
    online: Arc<AtomicBool>,
    reject_batches: Arc<AtomicBool>,
    sent: Arc<Mutex<Vec<(Endpoint, SyncRequest)>>>,
}

impl MockTransport {
    fn online() -> Self {
        let transport = Self::default();
        transport.online.store(true, Ordering::SeqCst);
        transport
    }

    fn batches(&self) -> Vec<(Endpoint, SyncRequest)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SyncTransport for MockTransport {
    async fn send(
        &self,
        endpoint: Endpoint,
        request: &SyncRequest,
    ) -> Result<SyncResponse, ClientError> {
        if self.reject_batches.load(Ordering::SeqCst) {
            return Err(ClientError::Server("maintenance".to_string()));
        }
        self.sent.lock().unwrap().push((endpoint, request.clone()));
        let results = request
            .changes
            .clone()
            .unwrap_or_default()
            .into_iter()
            .map(|change| {
                let fail = change.body.get("fail").and_then(|v| v.as_bool()) == Some(true);
                ChangeResult {
                    success: !fail,
                    error: fail.then(|| "refused".to_string()),
                    change,
                }
            })
            .collect();
        Ok(SyncResponse {
            success: true,
            results,
            message: None,
        })
    }

    async fn probe(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}

fn queue_in(dir: &TempDir) -> Queue {
    Queue::open(dir.path().join("queue.json")).unwrap()
}

#[test]
fn queue_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let mut queue = queue_in(&dir);
    let first = queue
        .enqueue(NewChange::new("/admin/finance/wallets/add", json!({"name": "Cash"})))
        .unwrap();
    let second = queue
        .enqueue(NewChange::new("/admin/projects/add", json!({"title": "Site"})))
        .unwrap();
    assert_eq!((first, second), (1, 2));

    let mut reopened = queue_in(&dir);
    let urls: Vec<_> = reopened.list_all().iter().map(|i| i.url.clone()).collect();
    assert_eq!(urls, ["/admin/finance/wallets/add", "/admin/projects/add"]);

    reopened.remove_by_id(first).unwrap();
    assert!(reopened.remove_by_id(first).is_err());
    // Ids are never reused after a removal.
    let third = reopened
        .enqueue(NewChange::new("/admin/skills/add", json!({})))
        .unwrap();
    assert_eq!(third, 3);
    assert_eq!(queue_in(&dir).len(), 2);
}

#[test]
fn clear_all_persists() {
    let dir = TempDir::new().unwrap();
    let mut queue = queue_in(&dir);
    queue.enqueue(NewChange::new("/admin/skills/add", json!({}))).unwrap();
    queue.clear_all().unwrap();
    assert!(queue_in(&dir).is_empty());
}

#[tokio::test]
async fn replay_splits_batches_and_clears_on_full_success() {
    let dir = TempDir::new().unwrap();
    let mut queue = queue_in(&dir);
    queue
        .enqueue(NewChange::new("/admin/finance/wallets/add", json!({"name": "Cash"})))
        .unwrap();
    queue
        .enqueue(NewChange::new("/admin/projects/add", json!({"title": "Site"})))
        .unwrap();
    queue
        .enqueue(
            NewChange::new("/anything", json!({"name": "Ana"})).routed("people", "add", None),
        )
        .unwrap();

    let transport = MockTransport::online();
    let mut replayer = Replayer::new(transport.clone(), queue);
    let report = replayer.replay().await.unwrap();

    assert_eq!(report.sent, 3);
    assert_eq!(report.succeeded, 3);
    assert_eq!(replayer.state(), SyncState::Idle);
    assert!(queue_in(&dir).is_empty());

    let batches = transport.batches();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0].0, Endpoint::Finance);
    let finance_ids: Vec<_> = batches[0]
        .1
        .changes
        .as_ref()
        .unwrap()
        .iter()
        .map(|c| c.queue_id)
        .collect();
    assert_eq!(finance_ids, [Some(1), Some(3)]);
    assert_eq!(batches[1].0, Endpoint::Content);
}

#[tokio::test]
async fn failed_items_stay_queued() {
    let dir = TempDir::new().unwrap();
    let mut queue = queue_in(&dir);
    queue
        .enqueue(NewChange::new("/admin/finance/wallets/add", json!({"name": "Cash"})))
        .unwrap();
    queue
        .enqueue(NewChange::new("/admin/finance/people/add", json!({"fail": true})))
        .unwrap();

    let mut replayer = Replayer::new(MockTransport::online(), queue);
    let report = replayer.replay().await.unwrap();

    assert_eq!((report.succeeded, report.failed), (1, 1));
    assert_eq!(replayer.state(), SyncState::IdleWithRetained(1));
    let left = queue_in(&dir);
    assert_eq!(left.list_all().len(), 1);
    assert_eq!(left.list_all()[0].id, 2);
}

#[tokio::test]
async fn undelivered_batch_leaves_queue_untouched() {
    let dir = TempDir::new().unwrap();
    let mut queue = queue_in(&dir);
    queue
        .enqueue(NewChange::new("/admin/finance/wallets/add", json!({"name": "Cash"})))
        .unwrap();

    let transport = MockTransport::online();
    transport.reject_batches.store(true, Ordering::SeqCst);
    let mut replayer = Replayer::new(transport, queue);
    let report = replayer.replay().await.unwrap();

    assert_eq!(report.batch_errors.len(), 1);
    assert_eq!(report.succeeded, 0);
    assert_eq!(queue_in(&dir).len(), 1);
    assert_eq!(replayer.state(), SyncState::IdleWithRetained(1));
}

#[tokio::test]
async fn coming_back_online_triggers_replay() {
    let dir = TempDir::new().unwrap();
    let mut queue = queue_in(&dir);
    queue
        .enqueue(NewChange::new("/admin/skills/add", json!({"name": "Rust"})))
        .unwrap();

    let transport = MockTransport::default();
    let mut replayer = Replayer::new(transport.clone(), queue);

    assert_eq!(replayer.tick().await.unwrap(), SyncState::Offline);
    assert!(transport.batches().is_empty());

    transport.online.store(true, Ordering::SeqCst);
    assert_eq!(replayer.tick().await.unwrap(), SyncState::Idle);
    assert_eq!(transport.batches().len(), 1);

    // Staying online does not resend.
    assert_eq!(replayer.tick().await.unwrap(), SyncState::Idle);
    assert_eq!(transport.batches().len(), 1);
}
