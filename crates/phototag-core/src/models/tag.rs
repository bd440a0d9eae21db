//! Tags and the tag arena.

use crate::error::{PhotoTagError, Result};
use crate::filename::validate_label;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-wide so ids stay unique when one manager inherits another's tags.
static NEXT_TAG_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identifier of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagId(u64);

impl TagId {
    fn next() -> Self {
        TagId(NEXT_TAG_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag#{}", self.0)
    }
}

/// A label attachable to pictures.
///
/// Identity is the exact, trimmed label (case-sensitive). A tag is stored once
/// in a [`TagStore`]; pictures and the tag index refer to it by [`TagId`], so a
/// rename is visible to every holder at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    id: TagId,
    label: String,
}

impl Tag {
    pub fn id(&self) -> TagId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.label)
    }
}

/// Arena of tags with label lookup.
///
/// Tags are never removed from the arena: commands in the history keep their
/// ids. Whether a tag is "available" is decided by the tag index, not here.
#[derive(Debug, Default)]
pub struct TagStore {
    tags: HashMap<TagId, Tag>,
    by_label: HashMap<String, TagId>,
}

impl TagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the tag with this label, creating it if needed.
    pub fn intern(&mut self, label: &str) -> Result<TagId> {
        let label = validate_label(label)?;
        if let Some(id) = self.by_label.get(&label) {
            return Ok(*id);
        }

        let id = TagId::next();
        self.by_label.insert(label.clone(), id);
        self.tags.insert(id, Tag { id, label });
        Ok(id)
    }

    pub fn get(&self, id: TagId) -> Option<&Tag> {
        self.tags.get(&id)
    }

    pub fn label(&self, id: TagId) -> Option<&str> {
        self.tags.get(&id).map(Tag::label)
    }

    /// Tag currently owning a label.
    pub fn find(&self, label: &str) -> Option<TagId> {
        let label = label.trim();
        let label = label.strip_prefix('@').unwrap_or(label);
        self.by_label.get(label).copied()
    }

    /// Labels of a tag list, in order.
    pub fn labels(&self, ids: &[TagId]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| self.label(*id))
            .map(str::to_string)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Change a tag's label in place, returning the previous label.
    ///
    /// The new label takes over the label lookup even if another tag held it;
    /// callers must reject renames onto labels of tags still in use.
    pub(crate) fn relabel(&mut self, id: TagId, label: &str) -> Result<String> {
        let label = validate_label(label)?;
        let tag = self
            .tags
            .get_mut(&id)
            .ok_or_else(|| PhotoTagError::TagNotFound(id.to_string()))?;

        let previous = std::mem::replace(&mut tag.label, label.clone());
        if self.by_label.get(&previous) == Some(&id) {
            self.by_label.remove(&previous);
        }
        self.by_label.insert(label, id);
        Ok(previous)
    }

    /// Make `id` the owner of its own label again.
    pub(crate) fn claim_label(&mut self, id: TagId) {
        if let Some(tag) = self.tags.get(&id) {
            self.by_label.insert(tag.label.clone(), id);
        }
    }

    /// Insert a tag carried over from another store, keeping its id.
    ///
    /// The label lookup is only taken if no other tag owns it.
    pub(crate) fn adopt(&mut self, tag: Tag) {
        self.by_label.entry(tag.label.clone()).or_insert(tag.id);
        self.tags.insert(tag.id, tag);
    }

    /// Give the tag `from` the id `to`.
    pub(crate) fn rekey(&mut self, from: TagId, to: TagId) {
        if let Some(mut tag) = self.tags.remove(&from) {
            tag.id = to;
            if self.by_label.get(&tag.label) == Some(&from) {
                self.by_label.insert(tag.label.clone(), to);
            }
            self.tags.insert(to, tag);
        }
    }

    pub(crate) fn into_tags(self) -> impl Iterator<Item = Tag> {
        self.tags.into_values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_reuses_label() {
        let mut store = TagStore::new();
        let a = store.intern("beach").unwrap();
        let b = store.intern(" @beach ").unwrap();
        assert_eq!(a, b);
        assert_eq!(store.len(), 1);
        assert_eq!(store.label(a), Some("beach"));
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        let mut store = TagStore::new();
        let lower = store.intern("beach").unwrap();
        let upper = store.intern("Beach").unwrap();
        assert_ne!(lower, upper);
    }

    #[test]
    fn test_intern_rejects_invalid() {
        let mut store = TagStore::new();
        assert!(store.intern("two words").is_err());
        assert!(store.intern("").is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_relabel_moves_lookup() {
        let mut store = TagStore::new();
        let id = store.intern("beach").unwrap();
        let previous = store.relabel(id, "coast").unwrap();

        assert_eq!(previous, "beach");
        assert_eq!(store.find("coast"), Some(id));
        assert_eq!(store.find("beach"), None);
        assert_eq!(store.get(id).unwrap().to_string(), "@coast");
    }

    #[test]
    fn test_claim_label_after_displacement() {
        let mut store = TagStore::new();
        let old = store.intern("coast").unwrap();
        let other = store.intern("beach").unwrap();

        store.relabel(other, "coast").unwrap();
        assert_eq!(store.find("coast"), Some(other));

        store.relabel(other, "beach").unwrap();
        assert_eq!(store.find("coast"), None);

        store.claim_label(old);
        assert_eq!(store.find("coast"), Some(old));
    }

    #[test]
    fn test_rekey_keeps_label() {
        let mut store = TagStore::new();
        let fresh = store.intern("pet").unwrap();
        let carried = TagId::next();
        store.rekey(fresh, carried);

        assert_eq!(store.find("pet"), Some(carried));
        assert!(store.get(fresh).is_none());
        assert_eq!(store.get(carried).unwrap().id(), carried);
    }
}
