//! Scriptable count source double.

use lightbox_model::TagId;
use lightbox_store::{CountSource, Result, StoreError};
use std::collections::HashMap;
use std::sync::Mutex;

/// Count source with fixed per-category values and a fault switch.
///
/// Unlike [`crate::MemoryTagStore`], the values here are independent of any
/// tag state, which makes "cache loads exactly once" and fault-retry
/// behavior easy to pin down.
pub struct FakeCountSource {
    inner: Mutex<Inner>,
}

struct Inner {
    counts: HashMap<TagId, i64>,
    unavailable: bool,
    queries: u64,
}

impl FakeCountSource {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                counts: HashMap::new(),
                unavailable: false,
                queries: 0,
            }),
        }
    }

    pub fn set_count(&self, category: TagId, count: i64) {
        self.lock().counts.insert(category, count);
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Number of `count` calls seen, including failed ones.
    pub fn queries(&self) -> u64 {
        self.lock().queries
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("fake count source lock poisoned")
    }
}

impl Default for FakeCountSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CountSource for FakeCountSource {
    fn count(&self, category: TagId) -> Result<i64> {
        let mut inner = self.lock();
        inner.queries += 1;
        if inner.unavailable {
            return Err(StoreError::unavailable("count source offline"));
        }
        Ok(inner.counts.get(&category).copied().unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_counts() {
        let source = FakeCountSource::new();
        source.set_count(TagId::new(1), 7);
        assert_eq!(source.count(TagId::new(1)).unwrap(), 7);
        assert_eq!(source.count(TagId::new(2)).unwrap(), 0);
        assert_eq!(source.queries(), 2);
    }

    #[test]
    fn test_fault_switch() {
        let source = FakeCountSource::new();
        source.set_unavailable(true);
        assert!(source.count(TagId::new(1)).is_err());
        source.set_unavailable(false);
        assert_eq!(source.count(TagId::new(1)).unwrap(), 0);
    }
}
