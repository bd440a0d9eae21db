//! Pictures: an image file whose name encodes its tags.

use crate::error::{PhotoTagError, Result};
use crate::filename;
use crate::models::tag::{TagId, TagStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_PICTURE_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identifier of a picture, independent of its current path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PictureId(u64);

impl PictureId {
    fn next() -> Self {
        PictureId(NEXT_PICTURE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PictureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "picture#{}", self.0)
    }
}

/// An image file and the tags encoded in its name.
///
/// The file name and absolute path are always derived from the current
/// fields and the tag labels; nothing is cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Picture {
    id: PictureId,
    directory: PathBuf,
    tagless_name: String,
    tags: Vec<TagId>,
    extension: String,
}

impl Picture {
    /// Build a picture from an image path, interning its tags.
    ///
    /// Fails with a validation error if the file name does not follow the
    /// tagged-image grammar, or if it is not the canonical encoding of its
    /// parts (repeated tags, or tags separated by anything but one space).
    pub(crate) fn from_path(path: &Path, tags: &mut TagStore) -> Result<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                PhotoTagError::validation("file name", format!("{} has no UTF-8 name", path.display()))
            })?;
        let decoded = filename::parse(file_name)?;
        if !filename::is_canonical(&decoded, file_name) {
            return Err(PhotoTagError::validation(
                "file name",
                format!(
                    "'{}' should be written '{}'",
                    file_name,
                    filename::encode(&decoded.tagless_name, &decoded.tags, &decoded.extension)
                ),
            ));
        }

        let mut tag_ids = Vec::with_capacity(decoded.tags.len());
        for label in &decoded.tags {
            tag_ids.push(tags.intern(label)?);
        }

        Ok(Self {
            id: PictureId::next(),
            directory: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            tagless_name: decoded.tagless_name,
            tags: tag_ids,
            extension: decoded.extension,
        })
    }

    pub fn id(&self) -> PictureId {
        self.id
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn tagless_name(&self) -> &str {
        &self.tagless_name
    }

    pub fn tags(&self) -> &[TagId] {
        &self.tags
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn contains_tag(&self, tag: TagId) -> bool {
        self.tags.contains(&tag)
    }

    /// File name without the extension.
    pub fn stem(&self, store: &TagStore) -> String {
        filename::encode_stem(&self.tagless_name, &store.labels(&self.tags))
    }

    /// Full file name: tagless name, ` @tag` tokens, extension.
    pub fn file_name(&self, store: &TagStore) -> String {
        filename::encode(&self.tagless_name, &store.labels(&self.tags), &self.extension)
    }

    pub fn absolute_path(&self, store: &TagStore) -> PathBuf {
        self.directory.join(self.file_name(store))
    }

    pub fn tag_labels(&self, store: &TagStore) -> Vec<String> {
        store.labels(&self.tags)
    }

    /// Append a tag. Returns false if the picture already has it.
    pub(crate) fn add_tag(&mut self, tag: TagId) -> bool {
        if self.tags.contains(&tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Insert a tag at a position (clamped to the end). Returns false if present.
    pub(crate) fn insert_tag(&mut self, position: usize, tag: TagId) -> bool {
        if self.tags.contains(&tag) {
            return false;
        }
        let position = position.min(self.tags.len());
        self.tags.insert(position, tag);
        true
    }

    /// Remove a tag, returning the position it was at.
    pub(crate) fn remove_tag(&mut self, tag: TagId) -> Option<usize> {
        let position = self.tags.iter().position(|t| *t == tag)?;
        self.tags.remove(position);
        Some(position)
    }

    pub(crate) fn replace_tag(&mut self, from: TagId, to: TagId) {
        for tag in self.tags.iter_mut().filter(|t| **t == from) {
            *tag = to;
        }
    }

    pub(crate) fn set_tagless_name(&mut self, name: String) -> String {
        std::mem::replace(&mut self.tagless_name, name)
    }

    pub(crate) fn set_directory(&mut self, directory: PathBuf) -> PathBuf {
        std::mem::replace(&mut self.directory, directory)
    }

    pub(crate) fn with_id(mut self, id: PictureId) -> Self {
        self.id = id;
        self
    }
}

/// Owned, display-ready view of a picture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PictureInfo {
    pub id: PictureId,
    pub path: PathBuf,
    pub file_name: String,
    pub tagless_name: String,
    pub tags: Vec<String>,
    pub tracked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path_decodes_name() {
        let mut store = TagStore::new();
        let picture = Picture::from_path(Path::new("/photos/sunset @beach @2024.jpg"), &mut store).unwrap();

        assert_eq!(picture.directory(), Path::new("/photos"));
        assert_eq!(picture.tagless_name(), "sunset");
        assert_eq!(picture.extension(), "jpg");
        assert_eq!(picture.tag_labels(&store), vec!["beach", "2024"]);
        assert_eq!(picture.file_name(&store), "sunset @beach @2024.jpg");
        assert_eq!(
            picture.absolute_path(&store),
            PathBuf::from("/photos/sunset @beach @2024.jpg")
        );
    }

    #[test]
    fn test_from_path_rejects_invalid_name() {
        let mut store = TagStore::new();
        assert!(Picture::from_path(Path::new("/photos/bad-name.jpg"), &mut store).is_err());
        assert!(Picture::from_path(Path::new("/photos/cat.gif"), &mut store).is_err());
    }

    #[test]
    fn test_non_canonical_names_rejected() {
        let mut store = TagStore::new();
        for name in ["/p/cat @pet @pet.png", "/p/cat\t@pet.png", "/p/cat @pet\n@home.png"] {
            assert!(matches!(
                Picture::from_path(Path::new(name), &mut store),
                Err(PhotoTagError::Validation { .. })
            ));
        }
        assert!(store.is_empty());

        // Whitespace inside the tagless name is kept as written
        let picture = Picture::from_path(Path::new("/p/cat\tnap @pet.png"), &mut store).unwrap();
        assert_eq!(picture.file_name(&store), "cat\tnap @pet.png");
    }

    #[test]
    fn test_file_name_follows_shared_label() {
        let mut store = TagStore::new();
        let picture = Picture::from_path(Path::new("/p/cat @pet.png"), &mut store).unwrap();
        let pet = store.find("pet").unwrap();

        store.relabel(pet, "animal").unwrap();
        assert_eq!(picture.file_name(&store), "cat @animal.png");
    }

    #[test]
    fn test_tag_edits() {
        let mut store = TagStore::new();
        let mut picture = Picture::from_path(Path::new("/p/cat @a @b.png"), &mut store).unwrap();
        let a = store.find("a").unwrap();
        let c = store.intern("c").unwrap();

        assert!(!picture.add_tag(a));
        assert!(picture.add_tag(c));
        assert_eq!(picture.file_name(&store), "cat @a @b @c.png");

        assert_eq!(picture.remove_tag(a), Some(0));
        assert_eq!(picture.remove_tag(a), None);
        assert!(picture.insert_tag(0, a));
        assert_eq!(picture.file_name(&store), "cat @a @b @c.png");
        assert!(picture.insert_tag(99, store.intern("d").unwrap()));
        assert_eq!(picture.file_name(&store), "cat @a @b @c @d.png");
    }
}
