//! Picture manager: the tracked pictures of one directory and their tag index.
//!
//! Every mutation goes through a method here that
//! 1. applies the change to a copy of the picture,
//! 2. performs the matching rename/move on disk,
//! 3. only then commits the copy and re-syncs the tag index and scope.
//!
//! A filesystem failure therefore leaves memory untouched (strict rollback).

use crate::config::ManagerOptions;
use crate::error::{PhotoTagError, Result};
use crate::filename::{validate_label, validate_tagless_name};
use crate::index::BidirectionalIndex;
use crate::library::files::FileOperations;
use crate::models::{Picture, PictureId, PictureInfo, Tag, TagId, TagStore};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tracks the pictures under one root directory.
///
/// Pictures that leave the manager's scope are untracked (dropped from the
/// tag index and from listings) but kept, so commands in the history can
/// still undo or redo them. A picture that comes back into scope is tracked
/// again.
#[derive(Debug)]
pub struct PictureManager {
    /// Canonical root directory; `None` for the empty manager
    root: Option<PathBuf>,
    recursive: bool,
    options: ManagerOptions,
    /// Every picture known to this manager, tracked or not
    pictures: HashMap<PictureId, Picture>,
    /// Tracked pictures in scan order
    tracked: Vec<PictureId>,
    tags: TagStore,
    tag_index: BidirectionalIndex<TagId, PictureId>,
    file_ops: Arc<dyn FileOperations>,
}

/// Builds picture managers; cheap to clone and safe to move to a worker thread.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    options: ManagerOptions,
    file_ops: Arc<dyn FileOperations>,
}

impl DirectoryScanner {
    pub fn new(options: ManagerOptions, file_ops: Arc<dyn FileOperations>) -> Self {
        Self { options, file_ops }
    }

    /// Scan `root` and return a fully populated manager.
    pub fn scan(&self, root: &Path, recursive: bool) -> Result<PictureManager> {
        PictureManager::scan(root, recursive, self.options, self.file_ops.clone())
    }
}

impl PictureManager {
    /// Create a manager with no root and no pictures.
    pub fn empty(options: ManagerOptions, file_ops: Arc<dyn FileOperations>) -> Self {
        Self {
            root: None,
            recursive: false,
            options,
            pictures: HashMap::new(),
            tracked: Vec::new(),
            tags: TagStore::new(),
            tag_index: BidirectionalIndex::new(),
            file_ops,
        }
    }

    /// Scan a directory and track every image whose name is a valid tagged name.
    ///
    /// Files with other names are skipped. Any I/O failure during the scan
    /// fails the whole construction.
    pub fn scan(
        root: &Path,
        recursive: bool,
        options: ManagerOptions,
        file_ops: Arc<dyn FileOperations>,
    ) -> Result<Self> {
        let root = fs::canonicalize(root).map_err(|e| PhotoTagError::io_with_path(e, root))?;
        if !root.is_dir() {
            return Err(PhotoTagError::NotADirectory(root));
        }

        let files = file_ops.list_images(&root, recursive)?;
        let mut manager = Self::empty(options, file_ops);
        manager.root = Some(root);
        manager.recursive = recursive;

        let mut skipped = 0usize;
        for path in files {
            match Picture::from_path(&path, &mut manager.tags) {
                Ok(picture) => manager.insert_tracked(picture),
                Err(e) => {
                    skipped += 1;
                    debug!("Skipping {}: {}", path.display(), e);
                }
            }
        }

        if skipped > 0 {
            warn!("Skipped {} images with untaggable names", skipped);
        }
        info!(
            "Tracking {} pictures and {} tags under {}{}",
            manager.tracked.len(),
            manager.tag_index.key_count(),
            manager.root_display(),
            if recursive { " (recursive)" } else { "" }
        );
        Ok(manager)
    }

    // ========================================
    // Queries
    // ========================================

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn is_recursive(&self) -> bool {
        self.recursive
    }

    pub fn options(&self) -> ManagerOptions {
        self.options
    }

    pub fn tag_store(&self) -> &TagStore {
        &self.tags
    }

    /// Tracked pictures in scan order.
    pub fn pictures(&self) -> Vec<&Picture> {
        self.tracked
            .iter()
            .filter_map(|id| self.pictures.get(id))
            .collect()
    }

    /// Any picture known to the manager, tracked or not.
    pub fn picture(&self, id: PictureId) -> Option<&Picture> {
        self.pictures.get(&id)
    }

    pub fn is_tracked(&self, id: PictureId) -> bool {
        self.tracked.contains(&id)
    }

    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Tracked picture at a path, compared per the path case option.
    pub fn find_by_path(&self, path: &Path) -> Option<PictureId> {
        let wanted = self.path_key(path);
        self.tracked.iter().copied().find(|id| {
            self.pictures
                .get(id)
                .is_some_and(|p| self.path_key(&p.absolute_path(&self.tags)) == wanted)
        })
    }

    /// Tracked pictures carrying a tag.
    pub fn pictures_with_tag(&self, tag: TagId) -> Vec<&Picture> {
        self.tag_index
            .values_from_key(&tag)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.pictures.get(id))
            .collect()
    }

    /// Tags in the index, in the order they were first indexed.
    pub fn available_tags(&self) -> Vec<&Tag> {
        self.tag_index
            .keys()
            .filter_map(|id| self.tags.get(*id))
            .collect()
    }

    /// Available tag with this label.
    pub fn find_tag(&self, label: &str) -> Option<TagId> {
        self.tags
            .find(label)
            .filter(|id| self.tag_index.contains_key(id))
    }

    pub fn tag_label(&self, id: TagId) -> Option<&str> {
        self.tags.label(id)
    }

    pub fn file_name(&self, id: PictureId) -> Option<String> {
        self.pictures.get(&id).map(|p| p.file_name(&self.tags))
    }

    pub fn absolute_path(&self, id: PictureId) -> Option<PathBuf> {
        self.pictures.get(&id).map(|p| p.absolute_path(&self.tags))
    }

    /// Owned snapshot of a picture for display or persistence.
    pub fn picture_info(&self, id: PictureId) -> Option<PictureInfo> {
        let picture = self.pictures.get(&id)?;
        Some(PictureInfo {
            id,
            path: picture.absolute_path(&self.tags),
            file_name: picture.file_name(&self.tags),
            tagless_name: picture.tagless_name().to_string(),
            tags: picture.tag_labels(&self.tags),
            tracked: self.is_tracked(id),
        })
    }

    /// Copy of the tag -> pictures mapping.
    pub fn tag_mappings(&self) -> HashMap<TagId, Vec<PictureId>> {
        self.tag_index.copy_of_mappings()
    }

    // ========================================
    // Tracking
    // ========================================

    /// Track the image at `path`. No-op if a tracked picture has that path.
    pub fn track_path(&mut self, path: &Path) -> Result<PictureId> {
        if let Some(existing) = self.find_by_path(path) {
            return Ok(existing);
        }
        let picture = Picture::from_path(path, &mut self.tags)?;
        let id = picture.id();
        self.insert_tracked(picture);
        Ok(id)
    }

    /// Stop tracking a picture without touching the file. No-op if untracked.
    pub fn untrack(&mut self, id: PictureId) {
        let Some(position) = self.tracked.iter().position(|t| *t == id) else {
            return;
        };
        self.tracked.remove(position);

        let tags = self
            .pictures
            .get(&id)
            .map(|p| p.tags().to_vec())
            .unwrap_or_default();
        self.tag_index.delete_value(&id);
        self.prune_tags(&tags);
        debug!("Untracked {}", id);
    }

    /// Add a tag to the index without attaching it to a picture.
    ///
    /// Used to restore a saved tag vocabulary.
    pub fn register_tag(&mut self, label: &str) -> Result<TagId> {
        let id = self.tags.intern(label)?;
        self.tags.claim_label(id);
        self.tag_index.add_key(id);
        Ok(id)
    }

    /// Return the tag with this label, creating it in the arena if needed.
    pub(crate) fn resolve_tag(&mut self, label: &str) -> Result<TagId> {
        self.tags.intern(label)
    }

    /// Delete a picture's file and forget the picture.
    pub fn delete_picture(&mut self, id: PictureId) -> Result<PathBuf> {
        let path = self
            .absolute_path(id)
            .ok_or_else(|| PhotoTagError::PictureNotFound(id.to_string()))?;
        self.file_ops.delete(&path)?;
        self.untrack(id);
        self.pictures.remove(&id);
        info!("Deleted {}", path.display());
        Ok(path)
    }

    // ========================================
    // Mutations (entered through commands)
    // ========================================

    /// Append a tag to a picture. Returns false if it already had the tag.
    pub(crate) fn add_tag(&mut self, id: PictureId, tag: TagId) -> Result<bool> {
        self.ensure_tag(tag)?;
        self.mutate(id, |picture| picture.add_tag(tag))
    }

    /// Remove one tag from a picture. Returns false if it did not have it.
    pub(crate) fn remove_tag(&mut self, id: PictureId, tag: TagId) -> Result<bool> {
        self.mutate(id, |picture| picture.remove_tag(tag).is_some())
    }

    /// Remove several tags, returning each removed tag with its former position.
    ///
    /// Positions are recorded so that [`insert_tags`](Self::insert_tags) applied
    /// in reverse restores the previous order.
    pub(crate) fn remove_tags(
        &mut self,
        id: PictureId,
        tags: &[TagId],
    ) -> Result<Vec<(usize, TagId)>> {
        self.mutate(id, |picture| {
            tags.iter()
                .filter_map(|tag| picture.remove_tag(*tag).map(|pos| (pos, *tag)))
                .collect()
        })
    }

    /// Re-insert tags removed by [`remove_tags`](Self::remove_tags).
    pub(crate) fn insert_tags(&mut self, id: PictureId, removed: &[(usize, TagId)]) -> Result<()> {
        for (_, tag) in removed {
            self.ensure_tag(*tag)?;
        }
        self.mutate(id, |picture| {
            for (position, tag) in removed.iter().rev() {
                picture.insert_tag(*position, *tag);
            }
        })
    }

    /// Change a picture's tagless name, returning the previous one.
    pub(crate) fn rename_picture(&mut self, id: PictureId, name: &str) -> Result<String> {
        let name = validate_tagless_name(name)?;
        let current = self
            .picture(id)
            .ok_or_else(|| PhotoTagError::PictureNotFound(id.to_string()))?;
        if current.tagless_name() == name {
            return Err(PhotoTagError::validation(
                "picture name",
                format!("picture is already named '{}'", name),
            ));
        }
        self.mutate(id, |picture| picture.set_tagless_name(name))
    }

    /// Move a picture to another directory, returning the previous directory.
    pub(crate) fn move_picture(&mut self, id: PictureId, destination: &Path) -> Result<PathBuf> {
        if !destination.is_dir() {
            return Err(PhotoTagError::NotADirectory(destination.to_path_buf()));
        }
        let destination = fs::canonicalize(destination)
            .map_err(|e| PhotoTagError::io_with_path(e, destination))?;
        let current = self
            .picture(id)
            .ok_or_else(|| PhotoTagError::PictureNotFound(id.to_string()))?;
        if self.path_key(current.directory()) == self.path_key(&destination) {
            return Err(PhotoTagError::validation(
                "destination",
                format!("picture is already in {}", destination.display()),
            ));
        }
        self.mutate(id, |picture| picture.set_directory(destination))
    }

    /// Rename a tag everywhere, returning its previous label.
    ///
    /// Every picture carrying the tag is renamed on disk. If one rename fails,
    /// the files already renamed are renamed back and the label is restored.
    pub(crate) fn relabel_tag(&mut self, tag: TagId, label: &str) -> Result<String> {
        let label = validate_label(label)?;
        let current = self
            .tags
            .label(tag)
            .ok_or_else(|| PhotoTagError::TagNotFound(tag.to_string()))?;
        if current == label {
            return Err(PhotoTagError::validation(
                "tag label",
                format!("tag is already named @{}", label),
            ));
        }
        // An untracked picture may still hold the owner, so the index alone
        // does not decide whether the label is free.
        let displaced = self.tags.find(&label).filter(|owner| *owner != tag);
        if displaced.is_some_and(|owner| self.is_live(owner)) {
            return Err(PhotoTagError::TagExists(label));
        }

        // Holders include untracked pictures: their file names carry the tag too.
        let holders: Vec<(PictureId, PathBuf, String)> = self
            .pictures
            .values()
            .filter(|p| p.contains_tag(tag))
            .map(|p| (p.id(), p.absolute_path(&self.tags), p.stem(&self.tags)))
            .collect();

        let previous = self.tags.relabel(tag, &label)?;

        let mut renamed: Vec<(PathBuf, String)> = Vec::with_capacity(holders.len());
        for (id, old_path, old_stem) in &holders {
            let Some(picture) = self.pictures.get(id) else {
                continue;
            };
            let new_stem = picture.stem(&self.tags);
            match self.file_ops.rename(old_path, &new_stem) {
                Ok(new_path) => renamed.push((new_path, old_stem.clone())),
                Err(e) => {
                    for (new_path, old_stem) in renamed.iter().rev() {
                        if let Err(undo_err) = self.file_ops.rename(new_path, old_stem) {
                            warn!(
                                "Could not restore {} after failed tag rename: {}",
                                new_path.display(),
                                undo_err
                            );
                        }
                    }
                    self.tags.relabel(tag, &previous)?;
                    if let Some(owner) = displaced {
                        self.tags.claim_label(owner);
                    }
                    return Err(e);
                }
            }
        }

        debug!(
            "Relabeled @{} -> @{} on {} pictures",
            previous,
            label,
            renamed.len()
        );
        Ok(previous)
    }

    // ========================================
    // Inheritance
    // ========================================

    /// Take over the pictures and tags of the manager this one replaces.
    ///
    /// Ids are kept so commands recorded against `previous` still resolve:
    /// a freshly scanned picture or tag that matches an inherited one (by
    /// path or label) takes the inherited id. Inherited pictures outside this
    /// manager's scope are kept untracked.
    pub fn inherit_from(&mut self, previous: PictureManager) {
        let PictureManager {
            pictures: old_pictures,
            tags: old_tags,
            tag_index: old_index,
            ..
        } = previous;

        // A label names at most one live tag, so a scanned tag is matched to
        // the live old tag first; stale tags sharing its label keep their ids.
        let live: HashSet<TagId> = old_pictures
            .values()
            .flat_map(|p| p.tags().iter().copied())
            .chain(old_index.keys().copied())
            .collect();
        let mut old_tags: Vec<Tag> = old_tags.into_tags().collect();
        old_tags.sort_by_key(|tag| (!live.contains(&tag.id()), tag.id()));

        let mut adopted = HashSet::new();
        for tag in old_tags {
            let old_id = tag.id();
            if self.tags.get(old_id).is_some() {
                continue;
            }
            match self.tags.find(tag.label()) {
                Some(current) if !adopted.contains(&current) => self.rekey_tag(current, old_id),
                _ => self.tags.adopt(tag),
            }
            adopted.insert(old_id);
        }

        let mut inherited = HashSet::new();
        for (old_id, picture) in old_pictures {
            if self.pictures.contains_key(&old_id) {
                continue;
            }
            let path = picture.absolute_path(&self.tags);
            match self.find_by_path(&path) {
                Some(current) if !inherited.contains(&current) => {
                    self.rekey_picture(current, old_id)
                }
                _ => {
                    self.pictures.insert(old_id, picture);
                }
            }
            inherited.insert(old_id);
        }
    }

    fn rekey_tag(&mut self, from: TagId, to: TagId) {
        self.tags.rekey(from, to);
        self.tag_index.replace_key(&from, to);
        for picture in self.pictures.values_mut() {
            picture.replace_tag(from, to);
        }
    }

    fn rekey_picture(&mut self, from: PictureId, to: PictureId) {
        let Some(picture) = self.pictures.remove(&from) else {
            return;
        };
        self.pictures.insert(to, picture.with_id(to));
        if let Some(slot) = self.tracked.iter_mut().find(|id| **id == from) {
            *slot = to;
        }
        self.tag_index.replace_value(&from, to);
    }

    // ========================================
    // Internals
    // ========================================

    fn insert_tracked(&mut self, picture: Picture) {
        let id = picture.id();
        for tag in picture.tags() {
            self.tag_index.add_key_with_value(*tag, id);
        }
        self.pictures.insert(id, picture);
        self.tracked.push(id);
    }

    /// Check a tag can be attached: it exists and no other live tag has its label.
    fn ensure_tag(&self, tag: TagId) -> Result<()> {
        let label = self
            .tags
            .label(tag)
            .ok_or_else(|| PhotoTagError::TagNotFound(tag.to_string()))?;
        match self.tags.find(label) {
            Some(owner) if owner != tag && self.is_live(owner) => {
                Err(PhotoTagError::TagExists(label.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Whether any known picture, tracked or not, holds the tag, or it is indexed.
    fn is_live(&self, tag: TagId) -> bool {
        self.tag_index.contains_key(&tag) || self.pictures.values().any(|p| p.contains_tag(tag))
    }

    /// Apply `change` to a copy of a picture, write it through to disk, commit.
    fn mutate<T, F>(&mut self, id: PictureId, change: F) -> Result<T>
    where
        F: FnOnce(&mut Picture) -> T,
    {
        let before = self
            .pictures
            .get(&id)
            .cloned()
            .ok_or_else(|| PhotoTagError::PictureNotFound(id.to_string()))?;
        let mut after = before.clone();
        let output = change(&mut after);
        if after == before {
            return Ok(output);
        }

        self.write_through(&before, &after)?;
        self.pictures.insert(id, after);
        self.sync_picture(id, before.tags());
        Ok(output)
    }

    /// Perform the rename/move that turns `before`'s file into `after`'s.
    fn write_through(&self, before: &Picture, after: &Picture) -> Result<()> {
        let mut current = before.absolute_path(&self.tags);

        if before.directory() != after.directory() {
            current = self.file_ops.move_to(&current, after.directory())?;
        }

        let old_stem = before.stem(&self.tags);
        let new_stem = after.stem(&self.tags);
        if old_stem != new_stem {
            if let Err(e) = self.file_ops.rename(&current, &new_stem) {
                if before.directory() != after.directory() {
                    if let Err(undo_err) = self.file_ops.move_to(&current, before.directory()) {
                        warn!("Could not move {} back: {}", current.display(), undo_err);
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    /// Bring index and tracking in line with a committed picture change.
    fn sync_picture(&mut self, id: PictureId, previous_tags: &[TagId]) {
        let Some(picture) = self.pictures.get(&id) else {
            return;
        };
        let current_tags = picture.tags().to_vec();
        let in_scope = self.in_scope(picture.directory());

        match (self.is_tracked(id), in_scope) {
            (true, true) => {
                let dropped: Vec<TagId> = previous_tags
                    .iter()
                    .copied()
                    .filter(|t| !current_tags.contains(t))
                    .collect();
                for tag in &dropped {
                    self.tag_index.delete_value_from_key(tag, &id);
                }
                for tag in &current_tags {
                    self.tags.claim_label(*tag);
                    self.tag_index.add_value_to_key(*tag, id);
                }
                self.prune_tags(&dropped);
            }
            (true, false) => {
                info!("{} left {}; no longer tracked", id, self.root_display());
                // untrack prunes against the current tags; prune the old ones too
                self.untrack(id);
                self.prune_tags(previous_tags);
            }
            (false, true) => {
                for tag in &current_tags {
                    self.tags.claim_label(*tag);
                    self.tag_index.add_key_with_value(*tag, id);
                }
                self.tracked.push(id);
                info!("{} is back under {}; tracking again", id, self.root_display());
            }
            (false, false) => {}
        }
    }

    /// Drop tags from the index that no longer have any picture.
    fn prune_tags(&mut self, tags: &[TagId]) {
        for tag in tags {
            let orphaned = self
                .tag_index
                .values_from_key(tag)
                .is_some_and(|values| values.is_empty());
            if orphaned {
                self.tag_index.delete_key(tag);
                debug!("Dropped unused tag {}", tag);
            }
        }
    }

    fn in_scope(&self, directory: &Path) -> bool {
        let Some(root) = &self.root else {
            return false;
        };
        let directory = self.path_key(directory);
        let root = self.path_key(root);
        if self.recursive {
            directory.starts_with(&root)
        } else {
            directory == root
        }
    }

    fn path_key(&self, path: &Path) -> PathBuf {
        if self.options.case_insensitive_paths {
            PathBuf::from(path.to_string_lossy().to_lowercase())
        } else {
            path.to_path_buf()
        }
    }

    fn root_display(&self) -> String {
        self.root
            .as_ref()
            .map(|r| r.display().to_string())
            .unwrap_or_else(|| "<no directory>".to_string())
    }
}
