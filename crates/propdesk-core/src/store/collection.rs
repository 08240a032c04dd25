//! Generic cached collection store.
//!
//! A `CollectionStore` is the single gateway a front end uses to read and
//! change one collection. Reads are served from the durable cache slot while
//! it is younger than the TTL; otherwise the collection is fetched and the
//! slot rewritten. Mutations go to the remote store first and are applied
//! locally only once it confirms: the in-memory list and the cache slot are
//! then updated together under one lock.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiError, ResourceClient};
use crate::cache::{CacheEntry, DurableSlot, SlotStorage};
use crate::clock::Clock;
use crate::models::{RemoteOrder, Resource, ValidationError};

/// How long a cached collection is served without re-fetching.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    pub ttl: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { ttl: DEFAULT_TTL }
    }
}

/// Lifecycle of a store instance.
///
/// `Uninitialized -> Loading -> Ready` on activation, `Loading -> Empty`
/// when the fetch fails. Mutations never change the state: a store that is
/// not `Ready` holds a partial list, so it edits memory only and leaves the
/// cache slot alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Uninitialized,
    Loading,
    Ready,
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Cache,
    Network,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivateOutcome {
    pub source: DataSource,
    pub count: usize,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Another operation is still in progress")]
    Busy,

    #[error("No record with id {0}")]
    NotFound(String),
}

impl StoreError {
    /// The field a validation failure refers to
    pub fn field(&self) -> Option<&'static str> {
        match self {
            StoreError::Validation(e) => Some(e.field()),
            _ => None,
        }
    }
}

struct Collection<R> {
    state: StoreState,
    records: Vec<R>,
}

/// Raised for the duration of one store operation.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct CollectionStore<R, C> {
    config: StoreConfig,
    client: C,
    slot: DurableSlot<R>,
    clock: Arc<dyn Clock>,
    collection: Mutex<Collection<R>>,
    busy: AtomicBool,
}

impl<R: Resource, C: ResourceClient<R>> CollectionStore<R, C> {
    /// Store backed by the record type's standard slot in `storage`
    pub fn new(
        config: StoreConfig,
        client: C,
        storage: Arc<dyn SlotStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::with_slot(config, client, DurableSlot::new(storage), clock)
    }

    pub fn with_slot(
        config: StoreConfig,
        client: C,
        slot: DurableSlot<R>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            client,
            slot,
            clock,
            collection: Mutex::new(Collection {
                state: StoreState::Uninitialized,
                records: Vec::new(),
            }),
            busy: AtomicBool::new(false),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    pub fn state(&self) -> StoreState {
        self.lock().state
    }

    /// True while an operation is in flight. Front ends disable their
    /// mutation controls while this is set.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    // ===== Reads =====

    /// Snapshot of the current collection
    pub fn records(&self) -> Vec<R> {
        self.lock().records.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<R> {
        self.lock()
            .records
            .iter()
            .find(|r| r.id() == Some(id))
            .cloned()
    }

    /// Records flagged for the public pages
    pub fn included_records(&self) -> Vec<R> {
        self.filter(|r| r.included())
    }

    /// Case-insensitive match on title/name. A blank term matches everything.
    pub fn search(&self, term: &str) -> Vec<R> {
        let needle = term.trim().to_lowercase();
        self.filter(|r| r.display_name().to_lowercase().contains(&needle))
    }

    pub fn filter<F>(&self, predicate: F) -> Vec<R>
    where
        F: Fn(&R) -> bool,
    {
        self.lock()
            .records
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    /// Age of the cache slot for display, e.g. "5m ago"
    pub fn cache_age(&self) -> Option<String> {
        self.slot
            .read()
            .map(|entry| entry.age_display(self.clock.now_ms()))
    }

    // ===== Operations =====

    /// Load the collection, from the cache slot when it is still fresh.
    ///
    /// On fetch failure the collection is emptied and the error returned;
    /// an expired cache entry is not used as a fallback.
    pub async fn activate(&self) -> Result<ActivateOutcome, StoreError> {
        let _busy = self.begin()?;
        let kind = R::KIND;

        if let Some(entry) = self.slot.read() {
            if entry.is_fresh(self.clock.now_ms(), self.config.ttl) {
                let count = entry.data.len();
                debug!(kind = %kind, count, "Serving collection from cache");
                let mut collection = self.lock();
                collection.records = entry.data;
                collection.state = StoreState::Ready;
                return Ok(ActivateOutcome {
                    source: DataSource::Cache,
                    count,
                });
            }
            debug!(kind = %kind, "Cache entry expired");
        }

        self.lock().state = StoreState::Loading;

        match self.client.list().await {
            Ok(records) => {
                let count = records.len();
                let mut collection = self.lock();
                collection.records = records;
                collection.state = StoreState::Ready;
                self.commit(&collection);
                info!(kind = %kind, count, "Fetched collection");
                Ok(ActivateOutcome {
                    source: DataSource::Network,
                    count,
                })
            }
            Err(e) => {
                warn!(kind = %kind, error = %e, "Failed to fetch collection");
                let mut collection = self.lock();
                collection.records.clear();
                collection.state = StoreState::Empty;
                Err(e.into())
            }
        }
    }

    /// Create a record. It is added locally only after the remote store
    /// confirms, using the server's copy (with its assigned id).
    pub async fn create(&self, input: R) -> Result<R, StoreError> {
        input.validate()?;
        let _busy = self.begin()?;

        let created = self
            .client
            .create(&input)
            .await
            .inspect_err(|e| warn!(kind = %R::KIND, error = %e, "Create failed"))?;

        let mut collection = self.lock();
        match R::KIND.remote_order() {
            RemoteOrder::NewestFirst => collection.records.insert(0, created.clone()),
            RemoteOrder::OldestFirst => collection.records.push(created.clone()),
        }
        self.commit(&collection);
        info!(kind = %R::KIND, id = created.id().unwrap_or_default(), "Created record");
        Ok(created)
    }

    /// Replace a record by id with the remote store's updated copy.
    pub async fn update(&self, record: R) -> Result<R, StoreError> {
        record.validate()?;
        let id = record.id().ok_or(ApiError::MissingId)?.to_string();
        let _busy = self.begin()?;

        let mut updated = self
            .client
            .update(&record)
            .await
            .inspect_err(|e| warn!(kind = %R::KIND, id = %id, error = %e, "Update failed"))?;
        if updated.id().is_none() {
            updated.set_id(Some(id.clone()));
        }

        let mut collection = self.lock();
        match collection.records.iter_mut().find(|r| r.id() == Some(id.as_str())) {
            Some(existing) => *existing = updated.clone(),
            None => debug!(kind = %R::KIND, id = %id, "Updated record is not in the local collection"),
        }
        self.commit(&collection);
        info!(kind = %R::KIND, id = %id, "Updated record");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _busy = self.begin()?;

        self.client
            .delete(id)
            .await
            .inspect_err(|e| warn!(kind = %R::KIND, id = id, error = %e, "Delete failed"))?;

        let mut collection = self.lock();
        collection.records.retain(|r| r.id() != Some(id));
        self.commit(&collection);
        info!(kind = %R::KIND, id = id, "Deleted record");
        Ok(())
    }

    /// Set the public-visibility flag through a regular update.
    pub async fn set_included(&self, id: &str, included: bool) -> Result<R, StoreError> {
        let mut record = self
            .find(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.set_included(included);
        self.update(record).await
    }

    pub async fn toggle_included(&self, id: &str) -> Result<R, StoreError> {
        let included = self
            .find(id)
            .map(|r| r.included())
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        self.set_included(id, !included).await
    }

    // ===== Internals =====

    fn lock(&self) -> MutexGuard<'_, Collection<R>> {
        // The collection is replaced wholesale or edited in one step, so a
        // poisoned lock still guards a consistent list.
        self.collection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Result<BusyGuard<'_>, StoreError> {
        BusyGuard::acquire(&self.busy).ok_or(StoreError::Busy)
    }

    /// Rewrite the cache slot from a loaded collection. Called with the
    /// collection lock held, so the slot write is a blocking call on the
    /// async path; `SlotStorage` backends are expected to be quick local
    /// writes.
    ///
    /// A collection that is not `Ready` never loaded the remote list, and
    /// writing it would hand a truncated entry with a fresh timestamp to
    /// every store that activates within the TTL.
    fn commit(&self, collection: &Collection<R>) {
        if collection.state != StoreState::Ready {
            debug!(
                kind = %R::KIND,
                state = ?collection.state,
                "Collection not loaded, cache slot left untouched"
            );
            return;
        }
        let entry = CacheEntry::new(collection.records.clone(), self.clock.now_ms());
        if let Err(e) = self.slot.write(&entry) {
            warn!(
                kind = %R::KIND,
                key = self.slot.key(),
                error = %e,
                "Failed to write cache, in-memory collection stays authoritative"
            );
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStorage;
    use crate::clock::ManualClock;
    use crate::models::{Event, Testimonial};
    use crate::store::testing::{event, testimonial, FailingStorage, FakeClient};

    const TTL_MS: i64 = 300_000;

    struct Harness {
        storage: Arc<MemoryStorage>,
        clock: Arc<ManualClock>,
        client: FakeClient<Event>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                storage: Arc::new(MemoryStorage::new()),
                clock: Arc::new(ManualClock::new(0)),
                client: FakeClient::new(),
            }
        }

        fn store(&self) -> CollectionStore<Event, FakeClient<Event>> {
            CollectionStore::new(
                StoreConfig::default(),
                self.client.clone(),
                self.storage.clone(),
                self.clock.clone(),
            )
        }

        fn slot(&self) -> DurableSlot<Event> {
            DurableSlot::new(self.storage.clone())
        }
    }

    #[tokio::test]
    async fn test_activate_fetches_on_empty_cache() {
        let h = Harness::new();
        h.client.seed(vec![event("a", "X")]);
        let store = h.store();
        assert_eq!(store.state(), StoreState::Uninitialized);

        let outcome = store.activate().await.expect("activate");
        assert_eq!(outcome, ActivateOutcome { source: DataSource::Network, count: 1 });
        assert_eq!(h.client.list_calls(), 1);
        assert_eq!(store.state(), StoreState::Ready);
        assert_eq!(store.records(), vec![event("a", "X")]);

        let entry = h.slot().read().expect("cache written");
        assert_eq!(entry.ts, Some(0));
        assert_eq!(entry.data, vec![event("a", "X")]);
    }

    #[tokio::test]
    async fn test_activate_serves_fresh_cache_without_network() {
        let h = Harness::new();
        h.slot()
            .write(&CacheEntry::new(vec![event("c", "Cached")], 0))
            .expect("seed cache");
        h.client.seed(vec![event("r", "Remote")]);
        h.clock.set(TTL_MS - 1);

        let store = h.store();
        let outcome = store.activate().await.expect("activate");
        assert_eq!(outcome.source, DataSource::Cache);
        assert_eq!(h.client.list_calls(), 0);
        assert_eq!(store.records(), vec![event("c", "Cached")]);
    }

    #[tokio::test]
    async fn test_activate_refetches_at_ttl() {
        let h = Harness::new();
        h.slot()
            .write(&CacheEntry::new(vec![event("c", "Cached")], 0))
            .expect("seed cache");
        h.client.seed(vec![event("r", "Remote")]);
        h.clock.set(TTL_MS);

        let store = h.store();
        let outcome = store.activate().await.expect("activate");
        assert_eq!(outcome.source, DataSource::Network);
        assert_eq!(h.client.list_calls(), 1);
        assert_eq!(store.records(), vec![event("r", "Remote")]);
        assert_eq!(h.slot().read().expect("entry").ts, Some(TTL_MS));
    }

    #[tokio::test]
    async fn test_activate_failure_empties_and_keeps_stale_entry() {
        let h = Harness::new();
        let stale = CacheEntry::new(vec![event("c", "Cached")], 0);
        h.slot().write(&stale).expect("seed cache");
        h.client.fail_with_server_error(true);
        h.clock.set(TTL_MS * 2);

        let store = h.store();
        let err = store.activate().await.expect_err("fetch fails");
        assert!(matches!(err, StoreError::Api(ApiError::ServerError(_))));
        assert_eq!(store.state(), StoreState::Empty);
        assert!(store.records().is_empty());
        assert_eq!(h.slot().read(), Some(stale));

        // Retryable
        h.client.fail_with_server_error(false);
        h.client.seed(vec![event("a", "X")]);
        store.activate().await.expect("retry");
        assert_eq!(store.state(), StoreState::Ready);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_activate_ignores_malformed_cache() {
        let h = Harness::new();
        h.storage.set("eventsCache", "{broken").expect("set");
        h.client.seed(vec![event("a", "X")]);

        let store = h.store();
        let outcome = store.activate().await.expect("activate");
        assert_eq!(outcome.source, DataSource::Network);
        assert!(h.slot().read().is_some());
    }

    #[tokio::test]
    async fn test_activate_refetches_legacy_bare_array() {
        let h = Harness::new();
        let legacy = serde_json::to_string(&vec![event("old", "Old")]).expect("json");
        h.storage.set("eventsCache", &legacy).expect("set");
        h.client.seed(vec![event("a", "X")]);

        let store = h.store();
        let outcome = store.activate().await.expect("activate");
        assert_eq!(outcome.source, DataSource::Network);
        assert_eq!(store.records(), vec![event("a", "X")]);
        assert_eq!(h.slot().read().expect("entry").ts, Some(0));
    }

    #[tokio::test]
    async fn test_create_prepends_and_rewrites_cache() {
        let h = Harness::new();
        h.client.seed(vec![event("a", "Older")]);
        let store = h.store();
        store.activate().await.expect("activate");
        h.clock.set(1_000);

        let mut input = event("ignored", "Newer");
        input.id = None;
        let created = store.create(input).await.expect("create");
        assert!(created.id.is_some());
        assert_eq!(h.client.create_calls(), 1);

        let records = store.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], created);
        assert_eq!(records[1].title, "Older");

        let entry = h.slot().read().expect("entry");
        assert_eq!(entry.data, records);
        assert_eq!(entry.ts, Some(1_000));
    }

    #[tokio::test]
    async fn test_create_appends_for_oldest_first_collections() {
        let storage = Arc::new(MemoryStorage::new());
        let clock = Arc::new(ManualClock::new(0));
        let client: FakeClient<Testimonial> = FakeClient::new();
        client.seed(vec![testimonial("t1", "First")]);
        let store = CollectionStore::new(StoreConfig::default(), client.clone(), storage, clock);
        store.activate().await.expect("activate");

        let mut input = testimonial("", "Second");
        input.id = None;
        store.create(input).await.expect("create");

        let names: Vec<_> = store.records().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["First", "Second"]);
        // Local order matches what a re-fetch returns
        let remote: Vec<_> = client.remote().into_iter().map(|t| t.name).collect();
        assert_eq!(names, remote);
    }

    #[tokio::test]
    async fn test_validation_short_circuits_network() {
        let h = Harness::new();
        let store = h.store();

        let mut input = event("x", "Title");
        input.description = "   ".to_string();
        let err = store.create(input.clone()).await.expect_err("blank description");
        assert_eq!(err.field(), Some("description"));

        let err = store.update(input).await.expect_err("blank description");
        assert!(matches!(err, StoreError::Validation(ValidationError::Blank("description"))));

        assert_eq!(h.client.create_calls(), 0);
        assert_eq!(h.client.update_calls(), 0);
        assert!(h.slot().read().is_none());
    }

    #[tokio::test]
    async fn test_create_after_failed_activate_keeps_cache_out_of_it() {
        let h = Harness::new();
        h.client.seed(vec![event("a", "A"), event("b", "B"), event("c", "C")]);
        h.client.fail_with_server_error(true);
        let store = h.store();
        assert!(store.activate().await.is_err());
        assert_eq!(store.state(), StoreState::Empty);

        h.client.fail_with_server_error(false);
        let mut input = event("", "New");
        input.id = None;
        store.create(input).await.expect("create");
        assert_eq!(store.len(), 1);
        assert_eq!(store.state(), StoreState::Empty);
        assert!(h.slot().read().is_none());

        h.clock.set(1_000);
        let other = h.store();
        let outcome = other.activate().await.expect("activate");
        assert_eq!(outcome.source, DataSource::Network);
        assert_eq!(other.len(), 4);
        assert_eq!(h.slot().read().expect("entry").data.len(), 4);
    }

    #[tokio::test]
    async fn test_mutations_before_activation_leave_fresh_cache_alone() {
        let h = Harness::new();
        let cached = CacheEntry::new(vec![event("a", "A"), event("b", "B")], 0);
        h.slot().write(&cached).expect("seed cache");
        h.client.seed(vec![event("a", "A"), event("b", "B")]);
        let store = h.store();

        store.delete("a").await.expect("delete");
        assert_eq!(store.state(), StoreState::Uninitialized);
        assert_eq!(h.slot().read(), Some(cached));
        assert_eq!(h.client.remote().len(), 1);
    }

    #[tokio::test]
    async fn test_update_replaces_by_id() {
        let h = Harness::new();
        h.client.seed(vec![event("a", "A"), event("b", "B")]);
        let store = h.store();
        store.activate().await.expect("activate");

        let mut edited = store.find("b").expect("b");
        edited.title = "B2".to_string();
        store.update(edited).await.expect("update");

        let titles: Vec<_> = store.records().into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["A", "B2"]);
        assert_eq!(h.slot().read().expect("entry").data, store.records());
    }

    #[tokio::test]
    async fn test_update_without_id_is_rejected_locally() {
        let h = Harness::new();
        let store = h.store();
        let mut record = event("a", "A");
        record.id = None;

        let err = store.update(record).await.expect_err("no id");
        assert!(matches!(err, StoreError::Api(ApiError::MissingId)));
        assert_eq!(h.client.update_calls(), 0);
    }

    #[tokio::test]
    async fn test_failed_mutations_leave_state_unchanged() {
        let h = Harness::new();
        h.client.seed(vec![event("a", "A"), event("b", "B")]);
        let store = h.store();
        store.activate().await.expect("activate");
        let before = store.records();
        let cache_before = h.slot().read();
        h.clock.set(5_000);
        h.client.fail_with_server_error(true);

        let mut input = event("n", "New");
        input.id = None;
        assert!(store.create(input).await.is_err());

        let mut edited = event("a", "A2");
        edited.link = "https://changed".to_string();
        assert!(store.update(edited).await.is_err());

        assert!(store.delete("b").await.is_err());

        assert_eq!(store.records(), before);
        assert_eq!(h.slot().read(), cache_before);
        assert_eq!(store.state(), StoreState::Ready);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_surfaces_not_found() {
        let h = Harness::new();
        h.client.seed(vec![event("a", "A")]);
        let store = h.store();
        store.activate().await.expect("activate");

        let err = store.delete("missing").await.expect_err("not found");
        assert!(matches!(err, StoreError::Api(ApiError::NotFound(_))));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_toggle_included_goes_through_update() {
        let h = Harness::new();
        h.client.seed(vec![event("a", "A")]);
        let store = h.store();
        store.activate().await.expect("activate");

        let toggled = store.toggle_included("a").await.expect("toggle");
        assert!(!toggled.included);
        assert_eq!(h.client.update_calls(), 1);
        assert!(!h.client.remote()[0].included);
        assert!(!h.slot().read().expect("entry").data[0].included);
        assert!(store.included_records().is_empty());

        store.set_included("a", true).await.expect("include");
        assert_eq!(store.included_records().len(), 1);

        let err = store.toggle_included("zzz").await.expect_err("unknown id");
        assert!(matches!(err, StoreError::NotFound(ref id) if id == "zzz"));
        assert_eq!(h.client.update_calls(), 2);
    }

    #[tokio::test]
    async fn test_toggle_failure_does_not_flip_locally() {
        let h = Harness::new();
        h.client.seed(vec![event("a", "A")]);
        let store = h.store();
        store.activate().await.expect("activate");
        h.client.fail_with_server_error(true);

        assert!(store.toggle_included("a").await.is_err());
        assert!(store.find("a").expect("a").included);
    }

    #[tokio::test]
    async fn test_cache_write_failure_is_not_fatal() {
        let client: FakeClient<Event> = FakeClient::new();
        client.seed(vec![event("a", "A")]);
        let store = CollectionStore::new(
            StoreConfig::default(),
            client.clone(),
            Arc::new(FailingStorage),
            Arc::new(ManualClock::new(0)),
        );

        store.activate().await.expect("activate despite cache failure");
        store.delete("a").await.expect("delete despite cache failure");
        assert!(store.is_empty());
        assert_eq!(store.state(), StoreState::Ready);
    }

    #[tokio::test]
    async fn test_search_and_filter() {
        let h = Harness::new();
        h.client.seed(vec![
            event("a", "Investor Night"),
            event("b", "First Home Buyers Expo"),
            event("c", "Auction Masterclass"),
        ]);
        let store = h.store();
        store.activate().await.expect("activate");

        let found: Vec<_> = store.search("  night ").into_iter().map(|e| e.title).collect();
        assert_eq!(found, vec!["Investor Night"]);
        assert_eq!(store.search("").len(), 3);
        assert_eq!(store.filter(|e| e.id.as_deref() == Some("c")).len(), 1);
    }

    #[tokio::test]
    async fn test_second_operation_while_busy_is_rejected() {
        let h = Harness::new();
        h.client.seed(vec![event("a", "A")]);
        let gate = h.client.pause_lists();
        let store = h.store();

        let (activated, during) = tokio::join!(store.activate(), async {
            tokio::task::yield_now().await;
            let busy = store.is_busy();
            let second = store.delete("a").await;
            gate.notify_one();
            (busy, second)
        });

        activated.expect("activate");
        let (busy, second) = during;
        assert!(busy);
        assert!(matches!(second, Err(StoreError::Busy)));
        assert_eq!(h.client.delete_calls(), 0);
        assert!(!store.is_busy());
    }

    #[tokio::test]
    async fn test_cache_age() {
        let h = Harness::new();
        let store = h.store();
        assert_eq!(store.cache_age(), None);

        store.activate().await.expect("activate");
        h.clock.set(10 * 60_000);
        assert_eq!(store.cache_age().as_deref(), Some("10m ago"));
    }

    /// t=0 fetch, t=100000 cache hit, delete, t=100001 cache hit on the
    /// emptied collection.
    #[tokio::test]
    async fn test_shared_slot_lifecycle() {
        let h = Harness::new();
        let mut record = event("a", "X");
        record.included = true;
        h.client.seed(vec![record.clone()]);

        let first = h.store();
        first.activate().await.expect("activate");
        assert_eq!(h.client.list_calls(), 1);
        assert_eq!(first.records(), vec![record.clone()]);
        assert_eq!(h.slot().read().expect("entry").ts, Some(0));

        h.clock.set(100_000);
        let second = h.store();
        let outcome = second.activate().await.expect("activate");
        assert_eq!(outcome.source, DataSource::Cache);
        assert_eq!(h.client.list_calls(), 1);
        assert_eq!(second.records(), vec![record]);

        second.delete("a").await.expect("delete");
        assert!(second.records().is_empty());
        let entry = h.slot().read().expect("entry");
        assert_eq!(entry.ts, Some(100_000));
        assert!(entry.data.is_empty());

        h.clock.set(100_001);
        let third = h.store();
        let outcome = third.activate().await.expect("activate");
        assert_eq!(outcome, ActivateOutcome { source: DataSource::Cache, count: 0 });
        assert_eq!(h.client.list_calls(), 1);
        assert!(third.records().is_empty());
    }
}
