//! Tag-consistency enforcement.

use crate::counts::CountCache;
use crate::distributor::EventPoster;
use crate::registry::CategoryRegistry;
use lightbox_model::{AppliedTag, ChangeEvent, ItemId, TagId, TagNotice};
use lightbox_store::TagStore;
use std::sync::{Arc, Mutex};
use tracing::{error, warn};

/// Reacts to tag-store notifications, keeping "at most one category tag
/// per item" true and the count cache in step.
///
/// Every handler runs under one operation mutex: the repair scan,
/// deletions, count updates, and event emission for one notification
/// settle before the next begins. Without that, two near-simultaneous
/// category assignments to the same item could both pass the conflict
/// scan before either deletes, leaving two category tags active.
pub struct ConsistencyEnforcer {
    registry: Arc<CategoryRegistry>,
    counts: Arc<CountCache>,
    tag_store: Arc<dyn TagStore>,
    events: EventPoster,
    op_lock: Mutex<()>,
}

impl ConsistencyEnforcer {
    pub fn new(
        registry: Arc<CategoryRegistry>,
        counts: Arc<CountCache>,
        tag_store: Arc<dyn TagStore>,
        events: EventPoster,
    ) -> Self {
        Self {
            registry,
            counts,
            tag_store,
            events,
            op_lock: Mutex::new(()),
        }
    }

    /// Dispatch one tag-store notification.
    pub fn handle_notice(&self, notice: &TagNotice) {
        match notice {
            TagNotice::Added(tag) => self.handle_tag_added(tag),
            TagNotice::Deleted { item, name } => self.handle_tag_deleted(*item, *name),
        }
    }

    /// A tag was applied to an item.
    ///
    /// Non-category tags are ignored. For a category tag, any other
    /// category tag on the item is deleted (best-effort repair), the new
    /// category's count goes up, counts for completed deletions go down,
    /// and one change event is posted.
    pub fn handle_tag_added(&self, added: &AppliedTag) {
        if !self.registry.is_category(added.name) {
            return;
        }
        let _op = self.op_lock.lock().expect("Enforcer op lock poisoned");

        let removed = self.repair_conflicts(added);

        self.counts.increment(added.name);
        for name in removed {
            self.counts.decrement(name);
        }
        self.events
            .post(ChangeEvent::for_item(added.item, Some(added.name)));
    }

    /// A tag was removed from an item.
    ///
    /// Non-category tags are ignored. If another category tag remains
    /// active on the item its count is already correct and nothing
    /// happens; otherwise the category's count goes down and a cleared
    /// event is posted.
    pub fn handle_tag_deleted(&self, item: ItemId, name: TagId) {
        if !self.registry.is_category(name) {
            return;
        }
        let _op = self.op_lock.lock().expect("Enforcer op lock poisoned");

        if self.item_has_category(item) {
            return;
        }
        self.counts.decrement(name);
        self.events.post(ChangeEvent::for_item(item, None));
    }

    /// Clear the count cache and tell observers to refresh.
    ///
    /// Case open/close path; serialized with the notification handlers.
    pub fn invalidate_caches(&self) {
        let _op = self.op_lock.lock().expect("Enforcer op lock poisoned");
        self.counts.invalidate_all();
        self.events.post(ChangeEvent::refresh_all());
    }

    /// Delete every other category tag on the item. Returns the category
    /// names whose deletion completed.
    ///
    /// A failed deletion aborts the remaining ones; already-applied
    /// deletions stay applied and no rollback is attempted. The tag
    /// store remains authoritative either way.
    fn repair_conflicts(&self, added: &AppliedTag) -> Vec<TagId> {
        let mut removed = Vec::new();
        let tags = match self.tag_store.tags_on(added.item) {
            Ok(tags) => tags,
            Err(err) => {
                error!(
                    "Failed to list tags on item {}; cannot repair conflicting categories: {}",
                    added.item, err
                );
                return removed;
            }
        };
        for tag in tags {
            if tag.id == added.id || !self.registry.is_category(tag.name) {
                continue;
            }
            match self.tag_store.delete_tag(&tag) {
                Ok(()) => removed.push(tag.name),
                Err(err) => {
                    error!(
                        "Failed to delete conflicting category tag {} on item {}; aborting repair: {}",
                        tag.id, tag.item, err
                    );
                    break;
                }
            }
        }
        removed
    }

    /// Whether the item still carries any category tag. A failed query is
    /// treated as "none remain" so the pending decrement still lands.
    fn item_has_category(&self, item: ItemId) -> bool {
        match self.tag_store.tags_on(item) {
            Ok(tags) => tags.iter().any(|tag| self.registry.is_category(tag.name)),
            Err(err) => {
                warn!(
                    "Failed to check remaining category tags on item {}; assuming none: {}",
                    item, err
                );
                false
            }
        }
    }
}
