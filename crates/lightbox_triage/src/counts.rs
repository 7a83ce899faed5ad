//! Cached per-category counts.

use lightbox_model::{CategoryCount, TagId};
use lightbox_store::CountSource;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Per-counter cache state. Absent map entries mean "not yet loaded";
/// `Faulted` means the last load failed and must be retried. The three
/// states are never conflated with a count of zero.
enum CounterState {
    Loaded(i64),
    Faulted,
}

/// Lazily-loaded per-category counters backed by the authoritative source.
///
/// Each counter is populated by querying the source exactly once on first
/// access, then adjusted only by [`increment`](CountCache::increment) /
/// [`decrement`](CountCache::decrement) until
/// [`invalidate_all`](CountCache::invalidate_all) clears the map. One
/// global mutex serializes all cache operations.
pub struct CountCache {
    source: Arc<dyn CountSource>,
    counters: Mutex<HashMap<TagId, CounterState>>,
}

impl CountCache {
    pub fn new(source: Arc<dyn CountSource>) -> Self {
        Self {
            source,
            counters: Mutex::new(HashMap::new()),
        }
    }

    /// The cached count for a category, loading it on first access.
    ///
    /// Returns [`CategoryCount::Unknown`] when the source cannot be
    /// queried; the next call retries the load.
    pub fn get(&self, category: TagId) -> CategoryCount {
        let mut counters = self.lock();
        match Self::ensure_loaded(self.source.as_ref(), &mut counters, category) {
            CounterState::Loaded(count) => CategoryCount::Known(*count),
            CounterState::Faulted => CategoryCount::Unknown,
        }
    }

    /// Bump the counter for a category by one.
    pub fn increment(&self, category: TagId) {
        self.adjust(category, 1);
    }

    /// Drop the counter for a category by one.
    pub fn decrement(&self, category: TagId) {
        self.adjust(category, -1);
    }

    /// Clear every cached counter; subsequent reads reload lazily.
    ///
    /// Callers pair this with an empty-scope change event so observers
    /// refresh (see the session facade).
    pub fn invalidate_all(&self) {
        self.lock().clear();
        debug!("Category count cache invalidated");
    }

    fn adjust(&self, category: TagId, delta: i64) {
        let mut counters = self.lock();
        match Self::ensure_loaded(self.source.as_ref(), &mut counters, category) {
            CounterState::Loaded(count) => *count += delta,
            // A reload after the fault clears will observe the
            // authoritative value, which already includes this mutation.
            CounterState::Faulted => {
                debug!(
                    "Skipping count adjustment for faulted category {} counter",
                    category
                );
            }
        }
    }

    /// Load the entry if absent, retry it if faulted.
    fn ensure_loaded<'a>(
        source: &dyn CountSource,
        counters: &'a mut HashMap<TagId, CounterState>,
        category: TagId,
    ) -> &'a mut CounterState {
        match counters.entry(category) {
            Entry::Occupied(entry) => {
                let state = entry.into_mut();
                if matches!(state, CounterState::Faulted) {
                    *state = Self::load(source, category);
                }
                state
            }
            Entry::Vacant(entry) => entry.insert(Self::load(source, category)),
        }
    }

    fn load(source: &dyn CountSource, category: TagId) -> CounterState {
        match source.count(category) {
            Ok(count) => CounterState::Loaded(count),
            Err(err) => {
                warn!("Failed to load count for category {}: {}", category, err);
                CounterState::Faulted
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TagId, CounterState>> {
        self.counters.lock().expect("Counter map lock poisoned")
    }
}
