//! Builder for configuring PhotoTagApi initialization.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::commands::CommandManager;
use crate::config::ManagerOptions;
use crate::error::{PhotoTagError, Result};
use crate::library::{FileOperations, LocalFileSystem, PictureManager};
use crate::metadata::AppSettings;
use crate::PhotoTagApi;

/// Builder for configuring PhotoTagApi initialization.
///
/// # Example
///
/// ```rust,ignore
/// use phototag_core::PhotoTagApi;
///
/// let api = PhotoTagApi::builder("./phototag-settings.json")
///     .case_insensitive_paths(true)
///     .build()?;
/// ```
#[derive(Debug)]
pub struct PhotoTagApiBuilder {
    settings_path: PathBuf,
    options: ManagerOptions,
    file_ops: Option<Arc<dyn FileOperations>>,
}

impl PhotoTagApiBuilder {
    /// Create a new builder with the settings file location.
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
            options: ManagerOptions::default(),
            file_ops: None,
        }
    }

    /// Compare picture paths case-insensitively.
    ///
    /// Default: `true` on Windows and macOS, `false` elsewhere.
    pub fn case_insensitive_paths(mut self, enable: bool) -> Self {
        self.options.case_insensitive_paths = enable;
        self
    }

    /// Use a custom filesystem implementation.
    ///
    /// Default: [`LocalFileSystem`]
    pub fn file_operations(mut self, file_ops: Arc<dyn FileOperations>) -> Self {
        self.file_ops = Some(file_ops);
        self
    }

    /// Build the PhotoTagApi instance.
    ///
    /// Loads the settings snapshot (an unreadable file yields an empty one)
    /// and registers its tag vocabulary with an empty manager.
    pub fn build(self) -> Result<PhotoTagApi> {
        if self.settings_path.as_os_str().is_empty() || self.settings_path.is_dir() {
            return Err(PhotoTagError::Config {
                message: format!(
                    "settings path must name a file: '{}'",
                    self.settings_path.display()
                ),
            });
        }

        let file_ops = self
            .file_ops
            .unwrap_or_else(|| Arc::new(LocalFileSystem::new()));
        let settings = AppSettings::load_or_default(&self.settings_path);
        let mut manager = PictureManager::empty(self.options, file_ops.clone());
        let registered = settings.apply_to(&mut manager);
        debug!("Restored {} tags from settings", registered);

        Ok(PhotoTagApi {
            settings_path: self.settings_path,
            settings,
            options: self.options,
            file_ops,
            manager,
            history: CommandManager::new(),
        })
    }
}
