//! Commands that change which tags a picture carries, or what a tag is called.

use crate::commands::audit::Severity;
use crate::error::{PhotoTagError, Result};
use crate::library::PictureManager;
use crate::models::{PictureId, TagId};

/// Append a tag to a picture.
#[derive(Debug, Clone)]
pub struct AddTagToPicture {
    picture: PictureId,
    label: String,
    /// Resolved on first execute and reused on redo
    tag: Option<TagId>,
    /// Whether execute actually added the tag (false if already present)
    added: bool,
    picture_name: String,
}

impl AddTagToPicture {
    pub fn new(picture: PictureId, label: impl Into<String>) -> Self {
        Self {
            picture,
            label: label.into(),
            tag: None,
            added: false,
            picture_name: String::new(),
        }
    }

    pub fn picture(&self) -> PictureId {
        self.picture
    }

    pub(crate) fn execute(&mut self, pictures: &mut PictureManager) -> Result<()> {
        let tag = match self.tag {
            Some(tag) => tag,
            None => pictures.resolve_tag(&self.label)?,
        };
        self.added = pictures.add_tag(self.picture, tag)?;
        self.tag = Some(tag);
        if let Some(label) = pictures.tag_label(tag) {
            self.label = label.to_string();
        }
        self.picture_name = picture_name(pictures, self.picture);
        Ok(())
    }

    pub(crate) fn undo(&mut self, pictures: &mut PictureManager) -> Result<()> {
        match self.tag {
            Some(tag) if self.added => pictures.remove_tag(self.picture, tag).map(|_| ()),
            _ => Ok(()),
        }
    }

    pub fn description(&self) -> String {
        format!("Added @{} to {}", self.label, self.picture_name)
    }

    pub fn severity(&self) -> Severity {
        Severity::Fine
    }
}

/// Remove one or more tags from a picture.
///
/// The removed positions are kept so undo restores the previous tag order.
#[derive(Debug, Clone)]
pub struct DeleteTagsFromPicture {
    picture: PictureId,
    tags: Vec<TagId>,
    removed: Vec<(usize, TagId)>,
    labels: Vec<String>,
    picture_name: String,
}

impl DeleteTagsFromPicture {
    pub fn new(picture: PictureId, tags: Vec<TagId>) -> Self {
        Self {
            picture,
            tags,
            removed: Vec::new(),
            labels: Vec::new(),
            picture_name: String::new(),
        }
    }

    pub fn picture(&self) -> PictureId {
        self.picture
    }

    pub(crate) fn execute(&mut self, pictures: &mut PictureManager) -> Result<()> {
        self.removed = pictures.remove_tags(self.picture, &self.tags)?;
        self.labels = self
            .removed
            .iter()
            .filter_map(|(_, tag)| pictures.tag_label(*tag))
            .map(|label| format!("@{}", label))
            .collect();
        self.picture_name = picture_name(pictures, self.picture);
        Ok(())
    }

    pub(crate) fn undo(&mut self, pictures: &mut PictureManager) -> Result<()> {
        pictures.insert_tags(self.picture, &self.removed)
    }

    pub fn description(&self) -> String {
        format!("Removed [{}] from {}", self.labels.join(", "), self.picture_name)
    }

    pub fn severity(&self) -> Severity {
        Severity::Fine
    }
}

/// Rename a tag on every picture that carries it.
#[derive(Debug, Clone)]
pub struct RenameTag {
    tag: TagId,
    new_label: String,
    old_label: Option<String>,
}

impl RenameTag {
    pub fn new(tag: TagId, new_label: impl Into<String>) -> Self {
        Self {
            tag,
            new_label: new_label.into(),
            old_label: None,
        }
    }

    pub fn tag(&self) -> TagId {
        self.tag
    }

    pub(crate) fn execute(&mut self, pictures: &mut PictureManager) -> Result<()> {
        let previous = pictures.relabel_tag(self.tag, &self.new_label)?;
        if let Some(label) = pictures.tag_label(self.tag) {
            self.new_label = label.to_string();
        }
        self.old_label = Some(previous);
        Ok(())
    }

    pub(crate) fn undo(&mut self, pictures: &mut PictureManager) -> Result<()> {
        let old_label = self
            .old_label
            .as_deref()
            .ok_or_else(|| PhotoTagError::TagNotFound(self.tag.to_string()))?;
        pictures.relabel_tag(self.tag, old_label).map(|_| ())
    }

    pub fn description(&self) -> String {
        format!(
            "Renamed tag @{} to @{}",
            self.old_label.as_deref().unwrap_or_default(),
            self.new_label
        )
    }

    pub fn severity(&self) -> Severity {
        Severity::Info
    }
}

pub(crate) fn picture_name(pictures: &PictureManager, id: PictureId) -> String {
    pictures
        .picture(id)
        .map(|p| p.tagless_name().to_string())
        .unwrap_or_else(|| id.to_string())
}
