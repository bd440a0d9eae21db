//! Commands that rename or move a picture's file.

use crate::commands::audit::Severity;
use crate::commands::tag_commands::picture_name;
use crate::error::{PhotoTagError, Result};
use crate::library::PictureManager;
use crate::models::PictureId;
use std::path::{Path, PathBuf};

/// Change a picture's tagless name, keeping its tags and extension.
#[derive(Debug, Clone)]
pub struct RenamePicture {
    picture: PictureId,
    new_name: String,
    old_name: Option<String>,
}

impl RenamePicture {
    pub fn new(picture: PictureId, new_name: impl Into<String>) -> Self {
        Self {
            picture,
            new_name: new_name.into(),
            old_name: None,
        }
    }

    pub fn picture(&self) -> PictureId {
        self.picture
    }

    pub(crate) fn execute(&mut self, pictures: &mut PictureManager) -> Result<()> {
        let previous = pictures.rename_picture(self.picture, &self.new_name)?;
        self.new_name = picture_name(pictures, self.picture);
        self.old_name = Some(previous);
        Ok(())
    }

    pub(crate) fn undo(&mut self, pictures: &mut PictureManager) -> Result<()> {
        let old_name = self
            .old_name
            .as_deref()
            .ok_or_else(|| PhotoTagError::PictureNotFound(self.picture.to_string()))?;
        pictures.rename_picture(self.picture, old_name).map(|_| ())
    }

    pub fn description(&self) -> String {
        format!(
            "Renamed picture {} to {}",
            self.old_name.as_deref().unwrap_or_default(),
            self.new_name
        )
    }

    pub fn severity(&self) -> Severity {
        Severity::Info
    }
}

/// Move a picture's file into another directory.
#[derive(Debug, Clone)]
pub struct MovePicture {
    picture: PictureId,
    destination: PathBuf,
    origin: Option<PathBuf>,
    picture_name: String,
}

impl MovePicture {
    pub fn new(picture: PictureId, destination: impl Into<PathBuf>) -> Self {
        Self {
            picture,
            destination: destination.into(),
            origin: None,
            picture_name: String::new(),
        }
    }

    pub fn picture(&self) -> PictureId {
        self.picture
    }

    pub(crate) fn execute(&mut self, pictures: &mut PictureManager) -> Result<()> {
        let origin = pictures.move_picture(self.picture, &self.destination)?;
        if let Some(picture) = pictures.picture(self.picture) {
            self.destination = picture.directory().to_path_buf();
        }
        self.origin = Some(origin);
        self.picture_name = picture_name(pictures, self.picture);
        Ok(())
    }

    pub(crate) fn undo(&mut self, pictures: &mut PictureManager) -> Result<()> {
        let origin = self
            .origin
            .clone()
            .ok_or_else(|| PhotoTagError::PictureNotFound(self.picture.to_string()))?;
        pictures.move_picture(self.picture, &origin).map(|_| ())
    }

    pub fn description(&self) -> String {
        format!(
            "Moved {} from {} to {}",
            self.picture_name,
            self.origin.as_deref().unwrap_or(Path::new("?")).display(),
            self.destination.display()
        )
    }

    pub fn severity(&self) -> Severity {
        Severity::Info
    }
}
