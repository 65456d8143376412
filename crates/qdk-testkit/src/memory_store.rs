use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use qdk_schemas::Quote;
use qdk_store::{ChangeEvent, ChangeFeed, QuoteStore, ScopeFilter, StoreError};
use tokio::sync::broadcast;
use uuid::Uuid;

/// In-memory quote store + change feed.
///
/// Version assignment and event publication happen under one lock, so the
/// feed sees every record's events in commit order — the per-record
/// ordering guarantee production adapters must provide.
///
/// Delivery-fault simulation:
/// - [`MemoryStore::publish`] injects arbitrary events (duplicates, bare
///   notifications) into the feed;
/// - [`MemoryStore::set_fail_reads`] makes `read` return a backend error,
///   the transient-refetch-failure case.
pub struct MemoryStore {
    inner: Mutex<BTreeMap<Uuid, Quote>>,
    events: broadcast::Sender<ChangeEvent>,
    fail_reads: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            inner: Mutex::new(BTreeMap::new()),
            events,
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Inject an event into the feed as-is.  For at-least-once and
    /// missing-snapshot scenarios.
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.events.send(event);
    }

    /// Toggle injected `read` failures.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Bulk-delete path: removes the record and publishes a `Delete` event
    /// one version past the removed record.
    pub fn purge(&self, id: Uuid) -> Result<(), StoreError> {
        let mut map = self.inner.lock().expect("store mutex poisoned");
        let removed = map.remove(&id).ok_or(StoreError::NotFound(id))?;
        let _ = self.events.send(ChangeEvent::delete(id, removed.version + 1));
        Ok(())
    }

    /// Number of records currently held (test assertions).
    pub fn len(&self) -> usize {
        self.inner.lock().expect("store mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl QuoteStore for MemoryStore {
    async fn read(&self, id: Uuid) -> Result<Option<Quote>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("injected read failure".to_string()));
        }
        Ok(self
            .inner
            .lock()
            .expect("store mutex poisoned")
            .get(&id)
            .cloned())
    }

    async fn insert(&self, mut quote: Quote) -> Result<Quote, StoreError> {
        let mut map = self.inner.lock().expect("store mutex poisoned");
        if map.contains_key(&quote.id) {
            return Err(StoreError::Backend(format!(
                "duplicate insert for quote {}",
                quote.id
            )));
        }
        quote.version = 1;
        map.insert(quote.id, quote.clone());
        let _ = self.events.send(ChangeEvent::insert(quote.clone()));
        Ok(quote)
    }

    async fn write(&self, id: Uuid, mut updated: Quote) -> Result<Quote, StoreError> {
        let mut map = self.inner.lock().expect("store mutex poisoned");
        let current = map.get(&id).ok_or(StoreError::NotFound(id))?;
        updated.id = id;
        updated.version = current.version + 1;
        map.insert(id, updated.clone());
        let _ = self.events.send(ChangeEvent::update(updated.clone()));
        Ok(updated)
    }

    async fn query_snapshot(&self, scope: &ScopeFilter) -> Result<Vec<Quote>, StoreError> {
        Ok(self
            .inner
            .lock()
            .expect("store mutex poisoned")
            .values()
            .filter(|q| scope.matches(q))
            .cloned()
            .collect())
    }
}

impl ChangeFeed for MemoryStore {
    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
