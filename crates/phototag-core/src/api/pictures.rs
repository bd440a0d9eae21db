//! Directory, picture and settings operations.

use std::path::Path;
use tracing::{info, warn};

use crate::commands::{MovePicture, RenamePicture, Severity};
use crate::error::{PhotoTagError, Result};
use crate::library::{DirectoryScanner, PictureManager};
use crate::metadata::PictureRecord;
use crate::models::{PictureId, PictureInfo};
use crate::{AuditRecord, PhotoTagApi};

impl PhotoTagApi {
    // ========================================
    // Directories
    // ========================================

    /// Scan a directory and make it the open directory.
    ///
    /// On failure the previously open directory stays open.
    pub fn open_directory(&mut self, dir: impl AsRef<Path>, recursive: bool) -> Result<()> {
        let manager = self.scanner().scan(dir.as_ref(), recursive)?;
        self.install_manager(manager);
        Ok(())
    }

    /// Scanner configured like this session, for scanning off the caller's thread.
    pub fn scanner(&self) -> DirectoryScanner {
        DirectoryScanner::new(self.options, self.file_ops.clone())
    }

    /// Replace the open directory with a fully scanned manager.
    ///
    /// The outgoing manager is saved to settings first. Pictures and tags it
    /// knew carry over so the command history stays valid.
    pub fn install_manager(&mut self, mut manager: PictureManager) {
        if let Err(e) = self.save() {
            warn!("Could not save settings before switching directory: {}", e);
        }

        let placeholder = PictureManager::empty(self.options, self.file_ops.clone());
        let previous = std::mem::replace(&mut self.manager, placeholder);
        manager.inherit_from(previous);
        self.settings.apply_to(&mut manager);
        self.manager = manager;

        if let Some(root) = self.manager.root() {
            info!(
                "Opened {} ({} pictures)",
                root.display(),
                self.manager.tracked_count()
            );
        }
    }

    /// Fold the open directory into the settings snapshot and write it.
    pub fn save(&mut self) -> Result<()> {
        self.settings.absorb(&self.manager);
        self.settings.save(&self.settings_path)
    }

    // ========================================
    // Queries
    // ========================================

    /// Tracked pictures of the open directory.
    pub fn pictures(&self) -> Vec<PictureInfo> {
        self.manager
            .pictures()
            .iter()
            .filter_map(|p| self.manager.picture_info(p.id()))
            .collect()
    }

    /// Pictures carrying exactly this tag; an empty query matches everything.
    pub fn search(&self, label: &str) -> Vec<PictureInfo> {
        if label.trim().is_empty() {
            return self.pictures();
        }
        let Some(tag) = self.manager.find_tag(label) else {
            return Vec::new();
        };
        self.manager
            .pictures_with_tag(tag)
            .iter()
            .filter_map(|p| self.manager.picture_info(p.id()))
            .collect()
    }

    pub fn picture_info(&self, id: PictureId) -> Result<PictureInfo> {
        self.manager
            .picture_info(id)
            .ok_or_else(|| PhotoTagError::PictureNotFound(id.to_string()))
    }

    /// Every picture seen this session or a previous one.
    pub fn historical_pictures(&self) -> Vec<PictureRecord> {
        let mut snapshot = self.settings.clone();
        snapshot.absorb(&self.manager);
        snapshot.historical_pictures
    }

    // ========================================
    // Picture commands
    // ========================================

    pub fn rename_picture(&mut self, id: PictureId, name: &str) -> Result<AuditRecord> {
        self.require_tracked(id)?;
        self.history
            .execute(RenamePicture::new(id, name), &mut self.manager)
    }

    pub fn move_picture(
        &mut self,
        id: PictureId,
        destination: impl AsRef<Path>,
    ) -> Result<AuditRecord> {
        self.require_tracked(id)?;
        self.history.execute(
            MovePicture::new(id, destination.as_ref()),
            &mut self.manager,
        )
    }

    /// Delete a picture's file. Not undoable.
    pub fn delete_picture(&mut self, id: PictureId) -> Result<AuditRecord> {
        self.require_tracked(id)?;
        let path = self.manager.delete_picture(id)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        Ok(self.history.record(Severity::Info, format!("Deleted {}", name)))
    }

    pub(crate) fn require_tracked(&self, id: PictureId) -> Result<()> {
        if self.manager.is_tracked(id) {
            Ok(())
        } else {
            Err(PhotoTagError::PictureNotFound(id.to_string()))
        }
    }
}
