//! Domain value types shared between the triage core and its hosts.

use crate::ids::{AppliedTagId, ItemId, TagId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One classification bucket from the session's category tag-set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: TagId,
    pub display_name: String,
    /// Presentation order within the tag-set.
    pub position: u32,
}

/// A named tag-set as stored by the host's tagging backend.
///
/// Category order in `categories` is the stable presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagSet {
    pub name: String,
    pub categories: Vec<Category>,
}

impl TagSet {
    pub fn contains(&self, tag: TagId) -> bool {
        self.categories.iter().any(|c| c.id == tag)
    }
}

/// One tag instance applied to one item, as reported by the tag store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedTag {
    pub id: AppliedTagId,
    pub item: ItemId,
    /// The tag name this instance applies. Categories are tag names.
    pub name: TagId,
    /// Freeform examiner comment attached at assignment time.
    pub comment: Option<String>,
}

/// Notification kinds the tag store emits and the enforcer consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagNotice {
    Added(AppliedTag),
    Deleted { item: ItemId, name: TagId },
}

/// Result of a cached count read.
///
/// `Unknown` means the authoritative source could not be queried; it is
/// never collapsed into zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryCount {
    Known(i64),
    Unknown,
}

impl CategoryCount {
    /// The count, if the load has succeeded.
    pub fn known(self) -> Option<i64> {
        match self {
            CategoryCount::Known(n) => Some(n),
            CategoryCount::Unknown => None,
        }
    }
}

/// Notification describing which items' category state changed and to what.
///
/// Produced once per settled mutation and delivered to every registered
/// observer. An empty item set with no category means "everything may have
/// changed, refresh" (cache invalidation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    items: BTreeSet<ItemId>,
    new_category: Option<TagId>,
}

impl ChangeEvent {
    pub fn new(items: impl IntoIterator<Item = ItemId>, new_category: Option<TagId>) -> Self {
        Self {
            items: items.into_iter().collect(),
            new_category,
        }
    }

    /// Event for a single item's category change.
    pub fn for_item(item: ItemId, new_category: Option<TagId>) -> Self {
        Self::new([item], new_category)
    }

    /// Empty-scope event posted after cache invalidation.
    pub fn refresh_all() -> Self {
        Self::new([], None)
    }

    pub fn items(&self) -> &BTreeSet<ItemId> {
        &self.items
    }

    pub fn new_category(&self) -> Option<TagId> {
        self.new_category
    }

    pub fn is_refresh_all(&self) -> bool {
        self.items.is_empty() && self.new_category.is_none()
    }
}
