//! Per-case session facade.

use crate::counts::CountCache;
use crate::distributor::{ChangeObserver, EventDistributor};
use crate::enforcer::ConsistencyEnforcer;
use crate::error::Result;
use crate::registry::CategoryRegistry;
use lightbox_model::{AppliedTag, Category, CategoryCount, ItemId, TagId, TagNotice};
use lightbox_store::{CountSource, TagStore};
use std::sync::Arc;
use tracing::info;

/// Tag-set name used when the host does not configure one.
pub const DEFAULT_CATEGORY_TAG_SET: &str = "Project VIC";

/// Session construction parameters, supplied by the host at case open.
/// Not user-configurable at runtime.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub category_tag_set: String,
}

impl SessionConfig {
    pub fn with_tag_set(name: impl Into<String>) -> Self {
        Self {
            category_tag_set: name.into(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::with_tag_set(DEFAULT_CATEGORY_TAG_SET)
    }
}

/// One case session's category engine: registry, count cache, enforcer,
/// and event distributor, wired together.
///
/// The host routes tag-store notifications into
/// [`handle_notice`](TriageSession::handle_notice) and UI panels read
/// counts and register observers. Construction fails fast when the
/// configured tag-set is missing or empty.
pub struct TriageSession {
    registry: Arc<CategoryRegistry>,
    counts: Arc<CountCache>,
    enforcer: ConsistencyEnforcer,
    distributor: EventDistributor,
}

impl TriageSession {
    pub fn open(
        config: &SessionConfig,
        tag_store: Arc<dyn TagStore>,
        count_source: Arc<dyn CountSource>,
    ) -> Result<Self> {
        let registry = Arc::new(CategoryRegistry::load(
            tag_store.as_ref(),
            &config.category_tag_set,
        )?);
        let counts = Arc::new(CountCache::new(count_source));
        let distributor = EventDistributor::start();
        let enforcer = ConsistencyEnforcer::new(
            Arc::clone(&registry),
            Arc::clone(&counts),
            tag_store,
            distributor.poster(),
        );
        info!(
            "Category session opened: {} categories from tag set '{}'",
            registry.categories().len(),
            registry.tag_set_name()
        );
        Ok(Self {
            registry,
            counts,
            enforcer,
            distributor,
        })
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    /// All categories, in tag-set order.
    pub fn categories(&self) -> &[Category] {
        self.registry.categories()
    }

    pub fn is_category(&self, tag: TagId) -> bool {
        self.registry.is_category(tag)
    }

    /// Cached count for a category; see [`CountCache::get`].
    pub fn count(&self, category: TagId) -> CategoryCount {
        self.counts.get(category)
    }

    /// Shared count cache handle for UI reader threads.
    pub fn count_cache(&self) -> Arc<CountCache> {
        Arc::clone(&self.counts)
    }

    pub fn register(&self, observer: Arc<dyn ChangeObserver>) {
        self.distributor.register(observer);
    }

    pub fn unregister(&self, observer: &Arc<dyn ChangeObserver>) {
        self.distributor.unregister(observer);
    }

    /// Route one tag-store notification into the enforcer.
    pub fn handle_notice(&self, notice: &TagNotice) {
        self.enforcer.handle_notice(notice);
    }

    pub fn handle_tag_added(&self, added: &AppliedTag) {
        self.enforcer.handle_tag_added(added);
    }

    pub fn handle_tag_deleted(&self, item: ItemId, name: TagId) {
        self.enforcer.handle_tag_deleted(item, name);
    }

    /// Clear cached counts and post an empty-scope refresh event.
    pub fn invalidate_caches(&self) {
        self.enforcer.invalidate_caches();
    }

    /// Invalidate, drain pending events, and stop the worker thread.
    pub fn close(self) {
        let TriageSession {
            registry,
            counts,
            enforcer,
            distributor,
        } = self;
        enforcer.invalidate_caches();
        // The enforcer holds the last extra poster; drop it so shutdown
        // can observe sender disconnect and join the worker.
        drop(enforcer);
        drop(counts);
        drop(registry);
        distributor.shutdown();
        info!("Category session closed");
    }
}
