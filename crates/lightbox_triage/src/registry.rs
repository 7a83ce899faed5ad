//! Session category registry.

use crate::error::{Result, TriageError};
use lightbox_model::{Category, TagId};
use lightbox_store::TagStore;
use std::collections::HashSet;

/// The fixed set of category tag names for one case session.
///
/// Loaded once from the named tag-set at session open and never mutated
/// afterwards, so lookups need no locking. Reloading only happens by
/// constructing a new registry on case change.
#[derive(Debug)]
pub struct CategoryRegistry {
    tag_set_name: String,
    categories: Vec<Category>,
    ids: HashSet<TagId>,
}

impl CategoryRegistry {
    /// Load the named tag-set from the store.
    ///
    /// Fails if the set is absent or empty; a session without it has no
    /// category support and no engine is constructed.
    pub fn load(store: &dyn TagStore, tag_set_name: &str) -> Result<Self> {
        let set = store
            .tag_set(tag_set_name)?
            .ok_or_else(|| TriageError::TagSetMissing(tag_set_name.to_string()))?;
        if set.categories.is_empty() {
            return Err(TriageError::TagSetEmpty(tag_set_name.to_string()));
        }
        let ids = set.categories.iter().map(|c| c.id).collect();
        Ok(Self {
            tag_set_name: set.name,
            categories: set.categories,
            ids,
        })
    }

    pub fn tag_set_name(&self) -> &str {
        &self.tag_set_name
    }

    /// Whether the tag name designates one of this session's categories.
    pub fn is_category(&self, tag: TagId) -> bool {
        self.ids.contains(&tag)
    }

    /// All categories, in tag-set order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
}
