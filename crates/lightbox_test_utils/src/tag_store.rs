//! In-memory tag store double.

use lightbox_model::{AppliedTag, AppliedTagId, Category, ItemId, TagId, TagSet};
use lightbox_store::{CountSource, Result, StoreError, TagStore};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory tag store that also serves as its own authoritative count
/// source: `count(category)` counts the live tag instances bearing that
/// name, so cache reloads always agree with a direct store query.
///
/// Mutations (`apply`, `remove`) only change store state; dispatching the
/// matching notification into the enforcer is the caller's job, the same
/// way the host's event bus would.
pub struct MemoryTagStore {
    inner: Mutex<Inner>,
}

struct Inner {
    tag_sets: HashMap<String, TagSet>,
    tags: Vec<AppliedTag>,
    next_applied_id: i64,
    counts_unavailable: bool,
    tags_unavailable: bool,
    count_queries: u64,
    failing_deletes: HashSet<TagId>,
}

impl MemoryTagStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                tag_sets: HashMap::new(),
                tags: Vec::new(),
                next_applied_id: 1,
                counts_unavailable: false,
                tags_unavailable: false,
                count_queries: 0,
                failing_deletes: HashSet::new(),
            }),
        }
    }

    /// A ready-made three-category set (ids 101..=103) for tests.
    pub fn project_vic_set() -> TagSet {
        TagSet {
            name: "Project VIC".to_string(),
            categories: vec![
                Category {
                    id: TagId::new(101),
                    display_name: "CAT-1: Child Exploitation".to_string(),
                    position: 0,
                },
                Category {
                    id: TagId::new(102),
                    display_name: "CAT-2: Child Exploitive".to_string(),
                    position: 1,
                },
                Category {
                    id: TagId::new(103),
                    display_name: "CAT-3: CGI/Animation".to_string(),
                    position: 2,
                },
            ],
        }
    }

    pub fn insert_tag_set(&self, set: TagSet) {
        let mut inner = self.lock();
        inner.tag_sets.insert(set.name.clone(), set);
    }

    /// Apply a tag to an item and return the new instance.
    pub fn apply(&self, item: ItemId, name: TagId, comment: Option<&str>) -> AppliedTag {
        let mut inner = self.lock();
        let id = AppliedTagId::new(inner.next_applied_id);
        inner.next_applied_id += 1;
        let tag = AppliedTag {
            id,
            item,
            name,
            comment: comment.map(str::to_string),
        };
        inner.tags.push(tag.clone());
        tag
    }

    /// Remove a tag instance directly (host-side deletion, not a repair).
    pub fn remove(&self, id: AppliedTagId) -> Option<AppliedTag> {
        let mut inner = self.lock();
        let index = inner.tags.iter().position(|t| t.id == id)?;
        Some(inner.tags.remove(index))
    }

    /// Snapshot of every live tag instance.
    pub fn live_tags(&self) -> Vec<AppliedTag> {
        self.lock().tags.clone()
    }

    /// Make `count` fail with `StoreError::Unavailable` until reset.
    pub fn set_counts_unavailable(&self, unavailable: bool) {
        self.lock().counts_unavailable = unavailable;
    }

    /// Make `tags_on` fail with `StoreError::Unavailable` until reset.
    pub fn set_tags_unavailable(&self, unavailable: bool) {
        self.lock().tags_unavailable = unavailable;
    }

    /// Number of `count` calls seen, including failed ones.
    pub fn count_queries(&self) -> u64 {
        self.lock().count_queries
    }

    /// Make `delete_tag` fail for instances of the given tag name.
    pub fn fail_deletes_for(&self, name: TagId) {
        self.lock().failing_deletes.insert(name);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("memory tag store lock poisoned")
    }
}

impl Default for MemoryTagStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TagStore for MemoryTagStore {
    fn tag_set(&self, name: &str) -> Result<Option<TagSet>> {
        Ok(self.lock().tag_sets.get(name).cloned())
    }

    fn tags_on(&self, item: ItemId) -> Result<Vec<AppliedTag>> {
        let inner = self.lock();
        if inner.tags_unavailable {
            return Err(StoreError::unavailable("case closed while listing tags"));
        }
        Ok(inner
            .tags
            .iter()
            .filter(|t| t.item == item)
            .cloned()
            .collect())
    }

    fn delete_tag(&self, tag: &AppliedTag) -> Result<()> {
        let mut inner = self.lock();
        if inner.failing_deletes.contains(&tag.name) {
            return Err(StoreError::query(format!(
                "delete rejected for tag name {}",
                tag.name
            )));
        }
        let index = inner
            .tags
            .iter()
            .position(|t| t.id == tag.id)
            .ok_or_else(|| StoreError::query(format!("no applied tag with id {}", tag.id)))?;
        inner.tags.remove(index);
        Ok(())
    }
}

impl CountSource for MemoryTagStore {
    fn count(&self, category: TagId) -> Result<i64> {
        let mut inner = self.lock();
        inner.count_queries += 1;
        if inner.counts_unavailable {
            return Err(StoreError::unavailable("case closed while counting"));
        }
        Ok(inner.tags.iter().filter(|t| t.name == category).count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_and_delete_round_trip() {
        let store = MemoryTagStore::new();
        let tag = store.apply(ItemId::new(1), TagId::new(101), Some("note"));
        assert_eq!(store.tags_on(ItemId::new(1)).unwrap().len(), 1);
        store.delete_tag(&tag).unwrap();
        assert!(store.tags_on(ItemId::new(1)).unwrap().is_empty());
    }

    #[test]
    fn test_count_tracks_live_tags() {
        let store = MemoryTagStore::new();
        store.apply(ItemId::new(1), TagId::new(101), None);
        store.apply(ItemId::new(2), TagId::new(101), None);
        store.apply(ItemId::new(3), TagId::new(102), None);
        assert_eq!(store.count(TagId::new(101)).unwrap(), 2);
        assert_eq!(store.count(TagId::new(102)).unwrap(), 1);
        assert_eq!(store.count(TagId::new(103)).unwrap(), 0);
    }

    #[test]
    fn test_unavailable_counts_fail() {
        let store = MemoryTagStore::new();
        store.set_counts_unavailable(true);
        assert!(matches!(
            store.count(TagId::new(101)),
            Err(StoreError::Unavailable(_))
        ));
        store.set_counts_unavailable(false);
        assert_eq!(store.count(TagId::new(101)).unwrap(), 0);
        assert_eq!(store.count_queries(), 2);
    }

    #[test]
    fn test_injected_delete_failure() {
        let store = MemoryTagStore::new();
        let tag = store.apply(ItemId::new(1), TagId::new(101), None);
        store.fail_deletes_for(TagId::new(101));
        assert!(store.delete_tag(&tag).is_err());
        assert_eq!(store.live_tags().len(), 1, "failed delete must not remove");
    }
}
