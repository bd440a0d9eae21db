//! Persisted session snapshot: pictures seen so far and the tag vocabulary.

use crate::error::Result;
use crate::filename::validate_label;
use crate::library::PictureManager;
use crate::metadata::atomic::{read_json, write_json_atomic};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A picture as remembered across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PictureRecord {
    pub path: PathBuf,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Settings snapshot stored as JSON between sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    #[serde(default)]
    pub historical_pictures: Vec<PictureRecord>,
    #[serde(default)]
    pub available_tags: Vec<String>,
}

impl AppSettings {
    /// Load a snapshot. `Ok(None)` if the file does not exist.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        read_json(path)
    }

    /// Load a snapshot, falling back to an empty one on any failure.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(Some(settings)) => {
                debug!(
                    "Loaded settings from {} ({} pictures, {} tags)",
                    path.display(),
                    settings.historical_pictures.len(),
                    settings.available_tags.len()
                );
                settings
            }
            Ok(None) => {
                debug!("No settings at {}; starting fresh", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("Ignoring unreadable settings {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Write the snapshot atomically, keeping the previous file as a backup.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_json_atomic(path, self, true)?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Register the stored tag vocabulary with a manager.
    ///
    /// Labels that are no longer valid are skipped. Returns how many were
    /// registered.
    pub fn apply_to(&self, manager: &mut PictureManager) -> usize {
        let mut registered = 0;
        for label in &self.available_tags {
            if let Err(e) = validate_label(label) {
                warn!("Skipping stored tag '{}': {}", label, e);
                continue;
            }
            match manager.register_tag(label) {
                Ok(_) => registered += 1,
                Err(e) => warn!("Could not register stored tag '{}': {}", label, e),
            }
        }
        registered
    }

    /// Fold a manager's current pictures and tags into the snapshot.
    ///
    /// Pictures are merged by path (an existing record gets the current
    /// tags); the tag vocabulary is replaced by the manager's.
    pub fn absorb(&mut self, manager: &PictureManager) {
        let store = manager.tag_store();
        for picture in manager.pictures() {
            let record = PictureRecord {
                path: picture.absolute_path(store),
                tags: picture.tag_labels(store),
            };
            match self
                .historical_pictures
                .iter_mut()
                .find(|r| r.path == record.path)
            {
                Some(existing) => existing.tags = record.tags,
                None => self.historical_pictures.push(record),
            }
        }

        self.available_tags = manager
            .available_tags()
            .iter()
            .map(|tag| tag.label().to_string())
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ManagerOptions;
    use crate::library::LocalFileSystem;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn scan(dir: &Path) -> PictureManager {
        PictureManager::scan(
            dir,
            false,
            ManagerOptions {
                case_insensitive_paths: false,
            },
            Arc::new(LocalFileSystem),
        )
        .unwrap()
    }

    #[test]
    fn test_load_or_default_missing_and_corrupt() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        assert_eq!(AppSettings::load_or_default(&path), AppSettings::default());

        fs::write(&path, "garbage").unwrap();
        assert_eq!(AppSettings::load_or_default(&path), AppSettings::default());
    }

    #[test]
    fn test_missing_fields_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, r#"{"availableTags": ["beach"]}"#).unwrap();

        let settings = AppSettings::load_or_default(&path);
        assert!(settings.historical_pictures.is_empty());
        assert_eq!(settings.available_tags, vec!["beach"]);
    }

    #[test]
    fn test_absorb_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("cat @pet.jpg"), b"img").unwrap();
        fs::write(temp_dir.path().join("sea @beach.png"), b"img").unwrap();
        let manager = scan(temp_dir.path());

        let mut settings = AppSettings::default();
        settings.absorb(&manager);
        settings.absorb(&manager);
        assert_eq!(settings.historical_pictures.len(), 2);
        assert_eq!(settings.available_tags, vec!["pet", "beach"]);

        let path = temp_dir.path().join("state/settings.json");
        settings.save(&path).unwrap();
        assert_eq!(AppSettings::load_or_default(&path), settings);
    }

    #[test]
    fn test_apply_registers_vocabulary() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("cat @pet.jpg"), b"img").unwrap();
        let mut manager = scan(temp_dir.path());

        let settings = AppSettings {
            historical_pictures: Vec::new(),
            available_tags: vec!["pet".into(), "travel".into(), "not valid".into()],
        };
        assert_eq!(settings.apply_to(&mut manager), 2);

        let labels: Vec<_> = manager
            .available_tags()
            .iter()
            .map(|t| t.label().to_string())
            .collect();
        assert_eq!(labels, vec!["pet", "travel"]);
    }
}
