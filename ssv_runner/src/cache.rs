//! Slot-keyed attestation-data cache (spec.md §4.A): collapses N concurrent
//! duplicate fetches against the beacon node into one, and evicts entries
//! for slots that have fallen too far behind the newest slot ever seen.

use crate::error::CacheError;
use parking_lot::Mutex;
use ssv_types::{AttestationData, Slot};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use task_executor::TaskExecutor;

/// The number of most-recently-seen slots retained by default; overridable
/// via [`AttestationDataCache::new`]'s config (spec.md §9 Open Questions).
const DEFAULT_RETAINED_SLOTS: u64 = 11;

/// One slot's cache entry.
///
/// `ready` is the one-shot-style completion signal: it starts at `false` and
/// is flipped to `true` exactly once, after `data` has been written
/// (publication-before-signal, spec.md §4.A). `fetching` is the
/// single-flight guard: the first caller to CAS it `false -> true` becomes
/// responsible for performing the fetch; everyone else just awaits `ready`.
struct CacheEntry {
    data: Mutex<Option<Result<AttestationData, CacheError>>>,
    ready_tx: watch::Sender<bool>,
    ready_rx: watch::Receiver<bool>,
    fetching: Mutex<bool>,
}

impl CacheEntry {
    fn new() -> Self {
        let (ready_tx, ready_rx) = watch::channel(false);
        Self {
            data: Mutex::new(None),
            ready_tx,
            ready_rx,
            fetching: Mutex::new(false),
        }
    }

    /// Attempts to become the single fetcher for this entry. Returns `true`
    /// exactly once per entry.
    fn try_claim_fetch(&self) -> bool {
        let mut fetching = self.fetching.lock();
        if *fetching {
            false
        } else {
            *fetching = true;
            true
        }
    }

    async fn await_ready(&self) -> Result<AttestationData, CacheError> {
        let mut rx = self.ready_rx.clone();
        if !*rx.borrow() {
            // `changed()` only errors if the sender is dropped, which never
            // happens while `self` (which owns `ready_tx`) is alive.
            let _ = rx.changed().await;
        }
        self.data
            .lock()
            .clone()
            .expect("ready implies data was published")
    }

    fn publish(&self, result: Result<AttestationData, CacheError>) {
        *self.data.lock() = Some(result);
        // Publication happens before the signal fires, so every waiter that
        // observes `ready == true` is guaranteed to see the data too.
        let _ = self.ready_tx.send(true);
    }
}

/// Slot -> `CacheEntry`, single mutex-guarded map (spec.md §5: "single mutex
/// guards slot->entry map").
pub struct AttestationDataCache {
    entries: Mutex<HashMap<Slot, Arc<CacheEntry>>>,
    retained_slots: u64,
    max_slot_seen: Mutex<Option<Slot>>,
}

impl Default for AttestationDataCache {
    fn default() -> Self {
        Self::new(DEFAULT_RETAINED_SLOTS)
    }
}

impl AttestationDataCache {
    pub fn new(retained_slots: u64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            retained_slots,
            max_slot_seen: Mutex::new(None),
        }
    }

    /// Fetches the attestation data for `slot`, coalescing concurrent
    /// callers for the same slot into a single call to `fetch`.
    ///
    /// The first caller for a given slot runs `fetch` and publishes its
    /// result (success or failure) to every other caller awaiting the same
    /// slot; it never exposes a partially-populated entry.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        slot: Slot,
        fetch: F,
    ) -> Result<AttestationData, CacheError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AttestationData, CacheError>>,
    {
        self.note_slot_seen(slot);
        let entry = self.entry_for(slot);

        if entry.try_claim_fetch() {
            let result = fetch().await;
            entry.publish(result.clone());
            result
        } else {
            entry.await_ready().await
        }
    }

    fn entry_for(&self, slot: Slot) -> Arc<CacheEntry> {
        self.entries
            .lock()
            .entry(slot)
            .or_insert_with(|| Arc::new(CacheEntry::new()))
            .clone()
    }

    fn note_slot_seen(&self, slot: Slot) {
        let mut max_slot_seen = self.max_slot_seen.lock();
        if max_slot_seen.is_none_or(|max| slot > max) {
            *max_slot_seen = Some(slot);
        }
    }

    /// Drops every entry for a slot lower than `max_slot_seen - retained_slots + 1`
    /// (spec.md §4.A: "retains last 11 slots ever seen" for the default
    /// `retained_slots == 11`).
    pub fn prune(&self) {
        let Some(max_slot_seen) = *self.max_slot_seen.lock() else {
            return;
        };
        let lowest_retained = max_slot_seen.saturating_sub(self.retained_slots.saturating_sub(1));
        self.entries.lock().retain(|slot, _| *slot >= lowest_retained);
    }

    /// The number of entries currently cached, for tests and metrics.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawns the periodic eviction sweep on `executor`, pruning every
    /// `interval` until the executor's shutdown signal fires.
    ///
    /// spec.md §9 flags that the source's cleanup goroutine never stops its
    /// ticker; tying the sweep loop to `TaskExecutor::exit` is this core's
    /// fix — the sweep task exits cleanly on shutdown instead of leaking.
    pub fn spawn_periodic_sweep(self: Arc<Self>, executor: &TaskExecutor, interval: Duration) {
        let exit = executor.exit();
        executor.spawn(
            async move {
                tokio::pin!(exit);
                loop {
                    tokio::select! {
                        _ = tokio::time::sleep(interval) => self.prune(),
                        _ = &mut exit => break,
                    }
                }
            },
            "attestation-data-cache-sweep",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssv_types::{CommitteeIndex, Checkpoint, Hash256};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample(slot: u64) -> AttestationData {
        AttestationData {
            slot: Slot::new(slot),
            index: CommitteeIndex::new(0),
            beacon_block_root: Hash256::repeat_byte(1),
            source: Checkpoint { epoch: 0, root: Hash256::zero() },
            target: Checkpoint { epoch: 1, root: Hash256::zero() },
        }
    }

    #[tokio::test]
    async fn concurrent_callers_coalesce_into_one_fetch() {
        let cache = Arc::new(AttestationDataCache::default());
        let call_count = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let call_count = call_count.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(Slot::new(10), || {
                        let call_count = call_count.clone();
                        async move {
                            call_count.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                            Ok(sample(10))
                        }
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), sample(10));
        }
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_fetch_is_observed_by_every_waiter() {
        let cache = Arc::new(AttestationDataCache::default());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(Slot::new(1), || async {
                        Err(CacheError::FetchFailed("beacon node unreachable".into()))
                    })
                    .await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_err());
        }
    }

    #[tokio::test]
    async fn eviction_retains_only_the_newest_window() {
        let cache = AttestationDataCache::new(11);
        for slot in [10u64, 20, 30, 100] {
            cache
                .get_or_fetch(Slot::new(slot), || async move { Ok(sample(slot)) })
                .await
                .unwrap();
        }
        cache.prune();
        assert_eq!(cache.len(), 1);
        assert!(cache
            .get_or_fetch(Slot::new(100), || async { unreachable!("should be cached") })
            .await
            .is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_sweep_prunes_and_stops_on_shutdown() {
        let cache = Arc::new(AttestationDataCache::new(11));
        for slot in [10u64, 20, 30, 100] {
            cache
                .get_or_fetch(Slot::new(slot), || async move { Ok(sample(slot)) })
                .await
                .unwrap();
        }

        let (executor, shutdown_tx) =
            task_executor::TaskExecutor::new_with_shutdown(tokio::runtime::Handle::current());
        cache.clone().spawn_periodic_sweep(&executor, Duration::from_secs(1));

        tokio::time::advance(Duration::from_millis(1_100)).await;
        tokio::task::yield_now().await;
        assert_eq!(cache.len(), 1);

        // Shutdown stops the sweep task instead of leaking its ticker
        // (spec.md §9 Open Questions).
        shutdown_tx.send(()).await.unwrap();
        tokio::task::yield_now().await;
    }
}
