//! Tag operations.

use crate::commands::{AddTagToPicture, DeleteTagsFromPicture, RenameTag};
use crate::error::{PhotoTagError, Result};
use crate::models::{PictureId, TagId};
use crate::{AuditRecord, PhotoTagApi};

impl PhotoTagApi {
    /// Labels of the tags in use, in the order they first appeared.
    pub fn available_tags(&self) -> Vec<String> {
        self.manager
            .available_tags()
            .iter()
            .map(|tag| tag.label().to_string())
            .collect()
    }

    /// Tag a picture. Unknown labels create a new tag.
    pub fn add_tag(&mut self, id: PictureId, label: &str) -> Result<AuditRecord> {
        self.require_tracked(id)?;
        self.history
            .execute(AddTagToPicture::new(id, label), &mut self.manager)
    }

    /// Remove tags from a picture.
    ///
    /// Every label must name an available tag; tags the picture does not
    /// carry are ignored.
    pub fn remove_tags<S: AsRef<str>>(
        &mut self,
        id: PictureId,
        labels: &[S],
    ) -> Result<AuditRecord> {
        self.require_tracked(id)?;
        let tags = labels
            .iter()
            .map(|label| self.live_tag(label.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        self.history
            .execute(DeleteTagsFromPicture::new(id, tags), &mut self.manager)
    }

    /// Rename a tag on every picture carrying it.
    pub fn rename_tag(&mut self, old_label: &str, new_label: &str) -> Result<AuditRecord> {
        let tag = self.live_tag(old_label)?;
        self.history
            .execute(RenameTag::new(tag, new_label), &mut self.manager)
    }

    fn live_tag(&self, label: &str) -> Result<TagId> {
        self.manager.find_tag(label).ok_or_else(|| {
            let label = label.trim();
            PhotoTagError::TagNotFound(label.strip_prefix('@').unwrap_or(label).to_string())
        })
    }
}
