//! End-to-end tests for the draft/submit/deliver/sync flow, run against an
//! in-memory store and a scripted endpoint double.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;

use scorecard_cli::scorecard::codec;
use scorecard_cli::scorecard::{
    DRAFT_KEY, DeliveryResponse, EndpointClient, ScoreCardRecord, SyncCoordinator,
};
use scorecard_cli::store::{RecordStore, SqliteStore, StoreEvent};

/// Endpoint double that replays a scripted sequence of outcomes and records
/// every payload it receives. `None` scripts a transport error; once the
/// script is exhausted every call returns 200.
struct ScriptedEndpoint {
    script: Mutex<VecDeque<Option<u16>>>,
    received: Mutex<Vec<Value>>,
}

impl ScriptedEndpoint {
    fn new(script: Vec<Option<u16>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            received: Mutex::new(Vec::new()),
        })
    }

    fn always_ok() -> Arc<Self> {
        Self::new(Vec::new())
    }

    fn received(&self) -> Vec<Value> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl EndpointClient for ScriptedEndpoint {
    async fn post(&self, payload: &Value) -> Result<DeliveryResponse> {
        self.received.lock().unwrap().push(payload.clone());

        match self.script.lock().unwrap().pop_front() {
            Some(Some(status)) => Ok(DeliveryResponse { status, body: String::new() }),
            Some(None) => anyhow::bail!("connection refused"),
            None => Ok(DeliveryResponse { status: 200, body: "accepted".to_string() }),
        }
    }
}

async fn coordinator_with(
    endpoint: Arc<ScriptedEndpoint>,
) -> (SyncCoordinator, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::open_memory().await.unwrap());
    let coordinator = SyncCoordinator::new(store.clone(), Some(endpoint));
    (coordinator, store)
}

fn sample_record() -> ScoreCardRecord {
    let mut record = ScoreCardRecord::default();
    record.set_location("Sample Station");
    record.set_train_no("12309");
    record.set_date(NaiveDate::from_ymd_opt(2023, 10, 27));
    record.set_inspector_name("A. Kumar");
    let section = record.section_mut("Coach Interior").unwrap();
    section.parameters[0].score = 8;
    record
}

#[tokio::test]
async fn submit_stores_pending_record_and_clears_draft() {
    let (coordinator, store) = coordinator_with(ScriptedEndpoint::new(vec![None])).await;

    let record = sample_record();
    coordinator.save_draft(&record).await;
    assert!(store.get(DRAFT_KEY).await.unwrap().is_some());

    let submission = coordinator.submit(record).await.unwrap();
    assert!(!submission.delivery.await.unwrap());

    // New unique id, distinct from the draft key
    assert!(submission.id.starts_with("SUB-"));
    assert_ne!(submission.id, DRAFT_KEY);

    // Stored as pending, draft slot gone
    let stored = store.get(&submission.id).await.unwrap().unwrap();
    let decoded = codec::decode(&stored);
    assert!(!decoded.is_synced);
    assert_eq!(decoded.submission_id.as_deref(), Some(submission.id.as_str()));
    assert!(store.get(DRAFT_KEY).await.unwrap().is_none());
}

#[tokio::test]
async fn successful_delivery_marks_record_synced() {
    let (coordinator, store) = coordinator_with(ScriptedEndpoint::always_ok()).await;

    let submission = coordinator.submit(sample_record()).await.unwrap();
    assert!(submission.delivery.await.unwrap());

    let stored = store.get(&submission.id).await.unwrap().unwrap();
    assert!(codec::decode(&stored).is_synced);
}

#[tokio::test]
async fn failed_delivery_leaves_record_pending() {
    for script in [vec![Some(500u16)], vec![Some(404)], vec![Some(201)], vec![None]] {
        let (coordinator, store) = coordinator_with(ScriptedEndpoint::new(script)).await;

        let submission = coordinator.submit(sample_record()).await.unwrap();
        assert!(!submission.delivery.await.unwrap());

        let stored = store.get(&submission.id).await.unwrap().unwrap();
        assert!(!codec::decode(&stored).is_synced);
    }
}

#[tokio::test]
async fn end_to_end_submit_then_sync() {
    // Delivery at submit time fails, the later sync pass succeeds
    let endpoint = ScriptedEndpoint::new(vec![None]);
    let (coordinator, store) = coordinator_with(endpoint.clone()).await;

    let submission = coordinator.submit(sample_record()).await.unwrap();
    assert!(!submission.delivery.await.unwrap());

    let newly_synced = coordinator.sync_pending().await.unwrap();
    assert_eq!(newly_synced, 1);

    let stored = store.get(&submission.id).await.unwrap().unwrap();
    let decoded = codec::decode(&stored);
    assert!(decoded.is_synced);
    assert_eq!(decoded.location, "Sample Station");
    assert_eq!(decoded.train_no, "12309");
    assert_eq!(decoded.date, NaiveDate::from_ymd_opt(2023, 10, 27));

    // Both attempts carried the wire payload for the same submission
    let received = endpoint.received();
    assert_eq!(received.len(), 2);
    for payload in received {
        assert_eq!(payload["submissionId"], submission.id.as_str());
        assert_eq!(payload["location"], "Sample Station");
        assert_eq!(payload["date"], "2023-10-27");
    }
}

#[tokio::test]
async fn sync_pending_attempts_only_pending_records() {
    let endpoint = ScriptedEndpoint::new(vec![Some(200), Some(503), Some(200)]);
    let (coordinator, store) = coordinator_with(endpoint.clone()).await;

    // 3 pending + 2 synced, stored directly so no delivery runs early
    let mut pending_ids = Vec::new();
    for n in 0..5 {
        let mut record = sample_record();
        record.is_synced = n >= 3;
        let id = format!("SUB-20200101T000000000-{:04}", n + 1);
        record.submission_id = Some(id.clone());
        store.put(&id, &codec::encode(&record)).await.unwrap();
        if n < 3 {
            pending_ids.push(id);
        }
    }

    let newly_synced = coordinator.sync_pending().await.unwrap();
    assert_eq!(newly_synced, 2);

    // Exactly the three pending ids were attempted
    let attempted: Vec<String> = endpoint
        .received()
        .iter()
        .map(|p| p["submissionId"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(attempted.len(), 3);
    for id in &pending_ids {
        assert!(attempted.contains(id));
    }

    // A second pass picks up only the one that failed with 503
    endpoint.received.lock().unwrap().clear();
    let newly_synced = coordinator.sync_pending().await.unwrap();
    assert_eq!(newly_synced, 1);
    assert_eq!(endpoint.received().len(), 1);

    // Everything synced now
    assert_eq!(coordinator.sync_pending().await.unwrap(), 0);
    assert_eq!(coordinator.pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn save_draft_requires_header_data() {
    let (coordinator, store) = coordinator_with(ScriptedEndpoint::always_ok()).await;

    coordinator.save_draft(&ScoreCardRecord::default()).await;
    assert!(store.get(DRAFT_KEY).await.unwrap().is_none());

    let mut record = ScoreCardRecord::default();
    record.set_location("Sample Station");
    coordinator.save_draft(&record).await;
    assert!(store.get(DRAFT_KEY).await.unwrap().is_some());
}

#[tokio::test]
async fn draft_roundtrip_and_discard() {
    let (coordinator, store) = coordinator_with(ScriptedEndpoint::always_ok()).await;

    let record = sample_record();
    coordinator.save_draft(&record).await;

    let loaded = coordinator.load_draft().await.unwrap();
    assert_eq!(loaded, record);

    assert!(coordinator.discard_draft().await.unwrap());
    assert!(store.get(DRAFT_KEY).await.unwrap().is_none());
    assert!(coordinator.load_draft().await.is_none());
    assert!(!coordinator.discard_draft().await.unwrap());
}

#[tokio::test]
async fn deleted_submission_disappears_from_scans() {
    let (coordinator, store) = coordinator_with(ScriptedEndpoint::new(vec![None, None])).await;

    let submission = coordinator.submit(sample_record()).await.unwrap();
    assert!(!submission.delivery.await.unwrap());

    assert!(store.delete(&submission.id).await.unwrap());

    let keys = store.keys().await.unwrap();
    assert!(!keys.contains(&submission.id));
    assert_eq!(coordinator.sync_pending().await.unwrap(), 0);
}

#[tokio::test]
async fn corrupted_entries_are_skipped_not_deleted() {
    let endpoint = ScriptedEndpoint::always_ok();
    let (coordinator, store) = coordinator_with(endpoint.clone()).await;

    sqlx::query("INSERT INTO records (record_key, payload) VALUES (?, ?)")
        .bind("SUB-corrupted")
        .bind("{not json")
        .execute(store.pool())
        .await
        .unwrap();

    let submission = coordinator.submit(sample_record()).await.unwrap();
    submission.delivery.await.unwrap();

    endpoint.received.lock().unwrap().clear();
    coordinator.sync_pending().await.unwrap();

    // The corrupted entry was never posted and is still stored
    assert!(endpoint.received().is_empty());
    assert!(store.keys().await.unwrap().contains(&"SUB-corrupted".to_string()));
}

#[tokio::test]
async fn record_deleted_mid_delivery_is_a_silent_noop() {
    let (coordinator, store) = coordinator_with(ScriptedEndpoint::always_ok()).await;

    let mut record = sample_record();
    let id = "SUB-20200101T000000000-0001".to_string();
    record.submission_id = Some(id.clone());
    let payload = codec::encode(&record);

    // Deliver a payload whose stored counterpart no longer exists
    assert!(!coordinator.deliver(&id, payload).await);
    assert!(store.get(&id).await.unwrap().is_none());
}

/// Endpoint double whose first post blocks until released, for pinning a
/// delivery in its in-flight window.
struct GatedEndpoint {
    release: Mutex<Option<tokio::sync::oneshot::Receiver<()>>>,
    calls: std::sync::atomic::AtomicUsize,
}

#[async_trait]
impl EndpointClient for GatedEndpoint {
    async fn post(&self, _payload: &Value) -> Result<DeliveryResponse> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let gate = self.release.lock().unwrap().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(DeliveryResponse { status: 200, body: String::new() })
    }
}

#[tokio::test]
async fn in_flight_delivery_is_not_duplicated() {
    let (release_tx, release_rx) = tokio::sync::oneshot::channel();
    let endpoint = Arc::new(GatedEndpoint {
        release: Mutex::new(Some(release_rx)),
        calls: std::sync::atomic::AtomicUsize::new(0),
    });

    let store = Arc::new(SqliteStore::open_memory().await.unwrap());
    let coordinator = SyncCoordinator::new(store.clone(), Some(endpoint.clone()));

    let mut record = sample_record();
    let id = "SUB-20200101T000000000-0001".to_string();
    record.submission_id = Some(id.clone());
    let payload = codec::encode(&record);
    store.put(&id, &payload).await.unwrap();

    let background = coordinator.clone();
    let background_id = id.clone();
    let background_payload = payload.clone();
    let first_delivery = tokio::spawn(async move {
        background.deliver(&background_id, background_payload).await
    });

    // Wait until the first delivery has reached the endpoint and parked
    while endpoint.calls.load(std::sync::atomic::Ordering::SeqCst) == 0 {
        tokio::task::yield_now().await;
    }

    // A second deliver for the same id is a no-op while one is in flight,
    // and a sync pass skips it too
    assert!(!coordinator.deliver(&id, payload.clone()).await);
    assert_eq!(coordinator.sync_pending().await.unwrap(), 0);
    assert_eq!(endpoint.calls.load(std::sync::atomic::Ordering::SeqCst), 1);

    release_tx.send(()).unwrap();
    assert!(first_delivery.await.unwrap());

    let stored = store.get(&id).await.unwrap().unwrap();
    assert!(codec::decode(&stored).is_synced);
}

#[tokio::test]
async fn store_events_track_submit_lifecycle() {
    let (coordinator, store) = coordinator_with(ScriptedEndpoint::new(vec![None])).await;
    let mut events = store.subscribe();

    let record = sample_record();
    coordinator.save_draft(&record).await;
    let submission = coordinator.submit(record).await.unwrap();
    submission.delivery.await.unwrap();

    assert_eq!(events.recv().await.unwrap(), StoreEvent::Put(DRAFT_KEY.to_string()));
    assert_eq!(events.recv().await.unwrap(), StoreEvent::Put(submission.id.clone()));
    assert_eq!(events.recv().await.unwrap(), StoreEvent::Deleted(DRAFT_KEY.to_string()));
}
