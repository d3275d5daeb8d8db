//! Debounced write-behind persistence
//!
//! Board and registry snapshots are queued by key. Each new write restarts a
//! quiet-period timer; when it fires, everything pending is written in one
//! `set_many` batch. A newer value for a key replaces the queued one, so
//! rapid edits produce a single write.
//!
//! Only the quiet period is cancellable. Once a batch has been taken off the
//! queue its write runs to completion, and writes never overlap, so a newer
//! value for a key always lands after an older one.
//!
//! In-memory state stays authoritative. A failed write is logged and
//! published as [`StorageEvent::WriteFailed`]; it is not retried until the
//! key is scheduled again.

use bridge_traits::storage::KeyValueStore;
use core_runtime::events::{CoreEvent, EventBus, StorageEvent};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

pub const BOARD_KEY_PREFIX: &str = "tierlist";

pub fn board_storage_key(board_id: &str) -> String {
    format!("{}:{}", BOARD_KEY_PREFIX, board_id)
}

struct WriterShared {
    store: Arc<dyn KeyValueStore>,
    event_bus: EventBus,
    pending: Mutex<BTreeMap<String, String>>,
    writing: AsyncMutex<()>,
}

impl WriterShared {
    fn pending(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn write_pending(&self) -> usize {
        let _writing = self.writing.lock().await;
        let entries: Vec<(String, String)> = std::mem::take(&mut *self.pending()).into_iter().collect();
        if entries.is_empty() {
            return 0;
        }

        match self.store.set_many(&entries).await {
            Ok(()) => {
                debug!(count = entries.len(), "Persisted pending snapshots");
                entries.len()
            }
            Err(e) => {
                for (key, _) in &entries {
                    warn!(key = %key, error = %e, "Persisting snapshot failed");
                    let _ = self.event_bus.emit(CoreEvent::Storage(StorageEvent::WriteFailed {
                        key: key.clone(),
                        message: e.to_string(),
                    }));
                }
                0
            }
        }
    }
}

pub struct PersistenceWriter {
    shared: Arc<WriterShared>,
    debounce: Duration,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl PersistenceWriter {
    pub fn new(store: Arc<dyn KeyValueStore>, debounce: Duration, event_bus: EventBus) -> Self {
        Self {
            shared: Arc::new(WriterShared {
                store,
                event_bus,
                pending: Mutex::new(BTreeMap::new()),
                writing: AsyncMutex::new(()),
            }),
            debounce,
            timer: Mutex::new(None),
        }
    }

    fn timer(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue `value` under `key` and restart the quiet-period timer.
    ///
    /// Outside a Tokio runtime the value stays queued until [`flush`](Self::flush).
    pub fn schedule(&self, key: impl Into<String>, value: String) {
        let key = key.into();
        trace!(key = %key, "Scheduling snapshot write");
        self.shared.pending().insert(key, value);

        let Ok(handle) = Handle::try_current() else {
            debug!("No runtime available, write deferred until flush");
            return;
        };

        let shared = Arc::clone(&self.shared);
        let debounce = self.debounce;
        let writer = handle.clone();
        let task = handle.spawn(async move {
            tokio::time::sleep(debounce).await;
            // Detached: aborting this timer must not cancel a started write.
            writer.spawn(async move {
                shared.write_pending().await;
            });
        });

        if let Some(previous) = self.timer().replace(task) {
            previous.abort();
        }
    }

    /// Write everything pending now, after any write already under way.
    /// Returns how many keys this call wrote.
    pub async fn flush(&self) -> usize {
        if let Some(timer) = self.timer().take() {
            timer.abort();
        }
        self.shared.write_pending().await
    }

    pub fn pending_keys(&self) -> Vec<String> {
        self.shared.pending().keys().cloned().collect()
    }
}

impl Drop for PersistenceWriter {
    fn drop(&mut self) {
        if let Some(timer) = self.timer().take() {
            timer.abort();
        }
    }
}
