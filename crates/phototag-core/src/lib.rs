//! Phototag Core - headless library for tagging pictures through their file names.
//!
//! A picture named `sunset @beach @2024.jpg` carries the tags `beach` and
//! `2024`. This crate scans directories for such pictures, keeps an index of
//! tags to pictures, and renames files on disk whenever tags change. Every
//! change is an undoable command and is recorded in an audit log.
//!
//! # Example
//!
//! ```rust,ignore
//! use phototag_core::PhotoTagApi;
//!
//! fn main() -> phototag_core::Result<()> {
//!     let mut api = PhotoTagApi::builder("/tmp/phototag-settings.json").build()?;
//!     api.open_directory("/photos", false)?;
//!
//!     let first = api.pictures()[0].id;
//!     api.add_tag(first, "beach")?;
//!     api.undo()?;
//!
//!     print!("{}", api.render_log());
//!     api.save()
//! }
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod filename;
pub mod index;
pub mod library;
pub mod metadata;
pub mod models;

mod api;

// Re-export commonly used types
pub use commands::{AuditRecord, Command, CommandManager, Severity};
pub use config::ManagerOptions;
pub use error::{HistoryDirection, PhotoTagError, Result};
pub use index::BidirectionalIndex;
pub use library::{DirectoryScanner, FileOperations, LocalFileSystem, PictureManager};
pub use metadata::{AppSettings, PictureRecord};
pub use models::{Picture, PictureId, PictureInfo, Tag, TagId};

pub use api::PhotoTagApiBuilder;

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One tagging session.
///
/// Owns the command history, the manager of the currently open directory
/// (initially empty) and the settings snapshot. The history lives for the
/// whole session, across directory opens.
#[derive(Debug)]
pub struct PhotoTagApi {
    settings_path: PathBuf,
    settings: AppSettings,
    options: ManagerOptions,
    file_ops: Arc<dyn FileOperations>,
    manager: PictureManager,
    history: CommandManager,
}

impl PhotoTagApi {
    /// Create a builder; `settings_path` is where the session snapshot lives.
    pub fn builder(settings_path: impl Into<PathBuf>) -> PhotoTagApiBuilder {
        PhotoTagApiBuilder::new(settings_path)
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Root of the open directory, if any.
    pub fn root(&self) -> Option<&Path> {
        self.manager.root()
    }

    pub fn is_recursive(&self) -> bool {
        self.manager.is_recursive()
    }

    /// The manager of the open directory.
    pub fn manager(&self) -> &PictureManager {
        &self.manager
    }

    pub fn history(&self) -> &CommandManager {
        &self.history
    }
}
