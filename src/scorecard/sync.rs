//! Draft autosave and offline sync coordination
//!
//! The coordinator owns the three moments persistence or network are
//! involved: autosaving the draft, submitting a finished score-card, and
//! re-delivering pending submissions. Local storage is the durability
//! guarantee; delivery is best-effort and asynchronous. A submission is
//! `Pending` until one delivery attempt gets HTTP 200, after which its
//! stored mapping is rewritten with `isSynced = true` (one-way, never back).

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::client::EndpointClient;
use super::codec;
use super::model::ScoreCardRecord;
use crate::store::RecordStore;

/// Reserved store key for the autosaved draft. Submission ids carry the
/// `SUB-` prefix, so the two can never collide.
pub const DRAFT_KEY: &str = "draft";

/// Process-wide sequence appended to submission ids.
/// Two submits within the same millisecond still get distinct ids.
static SUBMISSION_SEQ: AtomicU64 = AtomicU64::new(1);

/// Mint a timestamp-derived submission id
fn next_submission_id() -> String {
    let seq = SUBMISSION_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("SUB-{}-{:04}", Utc::now().format("%Y%m%dT%H%M%S%3f"), seq)
}

/// Result of a submit: the assigned id plus the in-flight delivery task.
/// `submit` returns before delivery completes; callers may await the handle
/// when they want the outcome, or drop it and rely on a later sync pass.
pub struct Submission {
    pub id: String,
    pub delivery: JoinHandle<bool>,
}

/// Orchestrates draft persistence, submission, and pending-record delivery
///
/// Cheap to clone; clones share the store, client, and in-flight set.
#[derive(Clone)]
pub struct SyncCoordinator {
    store: Arc<dyn RecordStore>,
    client: Option<Arc<dyn EndpointClient>>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl SyncCoordinator {
    /// `client` is `None` when no endpoint is configured; submissions then
    /// stay `Pending` until a later sync pass finds one configured.
    pub fn new(store: Arc<dyn RecordStore>, client: Option<Arc<dyn EndpointClient>>) -> Self {
        Self {
            store,
            client,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Overwrite the draft slot with a snapshot of the in-progress record
    ///
    /// No-op while the record has no header data. Store failure is logged
    /// and swallowed: the in-memory record is unaffected and draft loss is
    /// non-fatal.
    pub async fn save_draft(&self, record: &ScoreCardRecord) {
        if !record.has_header_data() {
            return;
        }

        let mapping = codec::encode(record);
        if let Err(e) = self.store.put(DRAFT_KEY, &mapping).await {
            log::warn!("Failed to save draft, continuing without: {:#}", e);
        } else {
            log::debug!("Autosaved draft");
        }
    }

    /// Load the draft if one is present
    ///
    /// The caller confirms with the user before applying it; the returned
    /// record is an owned value, never aliasing the stored mapping. A
    /// corrupted draft is treated as absent.
    pub async fn load_draft(&self) -> Option<ScoreCardRecord> {
        match self.store.get(DRAFT_KEY).await {
            Ok(Some(mapping)) => Some(codec::decode(&mapping)),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Failed to load draft: {:#}", e);
                None
            }
        }
    }

    /// Remove the draft slot (load-decline or explicit clear)
    pub async fn discard_draft(&self) -> Result<bool> {
        self.store.delete(DRAFT_KEY).await.context("Failed to discard draft")
    }

    /// Persist the record as a new submission and fire a non-blocking
    /// delivery attempt
    ///
    /// The record is consumed: after a successful local save the form
    /// starts over from a fresh default. If the local save fails the error
    /// is returned and nothing else happens, so the caller keeps the
    /// in-memory record and can retry.
    pub async fn submit(&self, mut record: ScoreCardRecord) -> Result<Submission> {
        let id = next_submission_id();
        record.submission_id = Some(id.clone());
        record.is_synced = false;

        let payload = codec::encode(&record);
        self.store
            .put(&id, &payload)
            .await
            .with_context(|| format!("Failed to save submission '{}'", id))?;
        log::info!("Saved submission {}", id);

        // Local save is the durability guarantee; a failed draft cleanup
        // only means one stale confirmation prompt later
        if let Err(e) = self.store.delete(DRAFT_KEY).await {
            log::warn!("Failed to remove draft after submit: {:#}", e);
        }

        let coordinator = self.clone();
        let delivery_id = id.clone();
        let delivery = tokio::spawn(async move { coordinator.deliver(&delivery_id, payload).await });

        Ok(Submission { id, delivery })
    }

    /// One best-effort delivery attempt for the given submission
    ///
    /// Returns true only when the stored record was newly marked synced.
    /// An id already in flight is a no-op, so a submit-triggered delivery
    /// and a concurrent sync pass cannot double-send the same record.
    pub async fn deliver(&self, id: &str, payload: Value) -> bool {
        {
            let mut in_flight = self.in_flight.lock().expect("in-flight set poisoned");
            if !in_flight.insert(id.to_string()) {
                log::debug!("Delivery already in flight for {}, skipping", id);
                return false;
            }
        }

        let outcome = self.deliver_once(id, payload).await;

        self.in_flight
            .lock()
            .expect("in-flight set poisoned")
            .remove(id);

        outcome
    }

    async fn deliver_once(&self, id: &str, payload: Value) -> bool {
        let Some(client) = &self.client else {
            log::debug!("No endpoint configured, {} stays pending", id);
            return false;
        };

        let correlation_id = Uuid::new_v4();
        log::info!("Delivering {} (correlation {})", id, correlation_id);

        let response = match client.post(&payload).await {
            Ok(response) => response,
            Err(e) => {
                log::warn!("Delivery of {} failed (correlation {}): {:#}", id, correlation_id, e);
                return false;
            }
        };

        if !response.is_accepted() {
            log::warn!(
                "Endpoint rejected {} with status {} (correlation {})",
                id,
                response.status,
                correlation_id
            );
            return false;
        }

        // Re-read rather than rewrite the snapshot: the record may have
        // been deleted while the request was in flight
        let mapping = match self.store.get(id).await {
            Ok(Some(mapping)) => mapping,
            Ok(None) => {
                log::debug!("{} disappeared during delivery, nothing to mark", id);
                return false;
            }
            Err(e) => {
                log::warn!("Failed to re-read {} after delivery: {:#}", id, e);
                return false;
            }
        };

        let mut mapping = mapping;
        if let Some(obj) = mapping.as_object_mut() {
            obj.insert("isSynced".to_string(), Value::Bool(true));
        }

        match self.store.put(id, &mapping).await {
            Ok(()) => {
                log::info!("Marked {} as synced (correlation {})", id, correlation_id);
                true
            }
            Err(e) => {
                log::warn!("Failed to mark {} as synced: {:#}", id, e);
                false
            }
        }
    }

    /// Deliver every stored pending submission, strictly sequentially
    ///
    /// Corrupted entries are skipped, ids already in flight are skipped,
    /// and the draft slot is never scanned. Returns how many records were
    /// newly synced in this pass.
    pub async fn sync_pending(&self) -> Result<usize> {
        let keys = self.store.keys().await.context("Failed to scan record store")?;

        let mut newly_synced = 0;
        for key in keys {
            if key == DRAFT_KEY {
                continue;
            }
            if self
                .in_flight
                .lock()
                .expect("in-flight set poisoned")
                .contains(&key)
            {
                log::debug!("Skipping {} - delivery already in flight", key);
                continue;
            }

            let mapping = match self.store.get(&key).await {
                Ok(Some(mapping)) => mapping,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("Skipping corrupted record {}: {:#}", key, e);
                    continue;
                }
            };

            if codec::decode(&mapping).is_synced {
                continue;
            }

            if self.deliver(&key, mapping).await {
                newly_synced += 1;
            }
        }

        Ok(newly_synced)
    }

    /// Count stored submissions still pending (draft and corrupted entries
    /// excluded)
    pub async fn pending_count(&self) -> Result<usize> {
        let keys = self.store.keys().await.context("Failed to scan record store")?;

        let mut pending = 0;
        for key in keys {
            if key == DRAFT_KEY {
                continue;
            }
            if let Ok(Some(mapping)) = self.store.get(&key).await {
                if !codec::decode(&mapping).is_synced {
                    pending += 1;
                }
            }
        }

        Ok(pending)
    }
}
