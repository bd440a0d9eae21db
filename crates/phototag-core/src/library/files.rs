//! Filesystem operations used by the picture manager.
//!
//! The manager only talks to the filesystem through [`FileOperations`], so a
//! front-end (or a test) can substitute its own implementation.

use crate::config::is_image_extension;
use crate::error::{PhotoTagError, Result};
use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Filesystem primitives the core relies on.
pub trait FileOperations: Debug + Send + Sync {
    /// List image files under `dir`, descending into subdirectories when
    /// `recursive` is set. Results are sorted by path.
    fn list_images(&self, dir: &Path, recursive: bool) -> Result<Vec<PathBuf>>;

    /// Rename a file in place to `new_base_name` plus its current extension.
    ///
    /// Never overwrites an existing file. Returns the new path.
    fn rename(&self, path: &Path, new_base_name: &str) -> Result<PathBuf>;

    /// Move a file into `dest_dir`, keeping its name. Returns the new path.
    fn move_to(&self, path: &Path, dest_dir: &Path) -> Result<PathBuf>;

    /// Delete a file.
    fn delete(&self, path: &Path) -> Result<()>;
}

/// [`FileOperations`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileOperations for LocalFileSystem {
    fn list_images(&self, dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(PhotoTagError::NotADirectory(dir.to_path_buf()));
        }

        let max_depth = if recursive { usize::MAX } else { 1 };
        let mut images = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
        {
            let entry = entry.map_err(walk_error)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let is_image = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(is_image_extension);
            if is_image {
                images.push(entry.into_path());
            }
        }

        debug!("Found {} images under {}", images.len(), dir.display());
        Ok(images)
    }

    fn rename(&self, path: &Path, new_base_name: &str) -> Result<PathBuf> {
        ensure_file(path)?;

        let new_name = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{}.{}", new_base_name, ext),
            None => new_base_name.to_string(),
        };
        let dest = path.with_file_name(new_name);
        if dest == path {
            return Ok(dest);
        }
        ensure_vacant(&dest)?;

        fs::rename(path, &dest).map_err(|e| PhotoTagError::Io {
            message: format!("Failed to rename {} to {}", path.display(), dest.display()),
            path: Some(path.to_path_buf()),
            source: Some(e),
        })?;
        debug!("Renamed {} -> {}", path.display(), dest.display());
        Ok(dest)
    }

    fn move_to(&self, path: &Path, dest_dir: &Path) -> Result<PathBuf> {
        ensure_file(path)?;
        if !dest_dir.is_dir() {
            return Err(PhotoTagError::NotADirectory(dest_dir.to_path_buf()));
        }

        let file_name = path.file_name().ok_or_else(|| {
            PhotoTagError::validation("path", format!("{} has no file name", path.display()))
        })?;
        let dest = dest_dir.join(file_name);
        ensure_vacant(&dest)?;

        fs::rename(path, &dest).map_err(|e| PhotoTagError::Io {
            message: format!("Failed to move {} to {}", path.display(), dest_dir.display()),
            path: Some(path.to_path_buf()),
            source: Some(e),
        })?;
        debug!("Moved {} -> {}", path.display(), dest.display());
        Ok(dest)
    }

    fn delete(&self, path: &Path) -> Result<()> {
        ensure_file(path)?;
        fs::remove_file(path).map_err(|e| PhotoTagError::io_with_path(e, path))?;
        debug!("Deleted {}", path.display());
        Ok(())
    }
}

fn ensure_file(path: &Path) -> Result<()> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PhotoTagError::io_with_path(
            io::Error::new(io::ErrorKind::NotFound, "not a regular file"),
            path,
        ))
    }
}

/// Fail if a file with exactly this name exists in the target directory.
///
/// Compares directory entries by name so a case-only rename on a
/// case-insensitive filesystem is not mistaken for a collision.
fn ensure_vacant(dest: &Path) -> Result<()> {
    let (Some(parent), Some(name)) = (dest.parent(), dest.file_name()) else {
        return Ok(());
    };
    let entries = fs::read_dir(parent).map_err(|e| PhotoTagError::io_with_path(e, parent))?;
    for entry in entries {
        let entry = entry.map_err(|e| PhotoTagError::io_with_path(e, parent))?;
        if entry.file_name().as_os_str() == name {
            return Err(PhotoTagError::FileAlreadyExists(dest.to_path_buf()));
        }
    }
    Ok(())
}

fn walk_error(err: walkdir::Error) -> PhotoTagError {
    let path = err.path().map(Path::to_path_buf);
    let message = err.to_string();
    PhotoTagError::Io {
        message,
        path,
        source: err.into_io_error(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, b"img").unwrap();
        path
    }

    #[test]
    fn test_list_images_non_recursive() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "a.jpg");
        touch(temp_dir.path(), "b.PNG");
        touch(temp_dir.path(), "notes.txt");
        fs::create_dir(temp_dir.path().join("sub")).unwrap();
        touch(&temp_dir.path().join("sub"), "c.jpeg");

        let images = LocalFileSystem.list_images(temp_dir.path(), false).unwrap();
        let names: Vec<_> = images
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.PNG"]);
    }

    #[test]
    fn test_list_images_recursive() {
        let temp_dir = TempDir::new().unwrap();
        touch(temp_dir.path(), "a.jpg");
        fs::create_dir_all(temp_dir.path().join("sub/deeper")).unwrap();
        touch(&temp_dir.path().join("sub/deeper"), "c.jpeg");

        let images = LocalFileSystem.list_images(temp_dir.path(), true).unwrap();
        assert_eq!(images.len(), 2);
    }

    #[test]
    fn test_list_images_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let result = LocalFileSystem.list_images(&temp_dir.path().join("nope"), false);
        assert!(matches!(result, Err(PhotoTagError::NotADirectory(_))));
    }

    #[test]
    fn test_rename_keeps_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = touch(temp_dir.path(), "cat.jpg");

        let renamed = LocalFileSystem.rename(&path, "cat @pet").unwrap();
        assert_eq!(renamed, temp_dir.path().join("cat @pet.jpg"));
        assert!(renamed.exists());
        assert!(!path.exists());
    }

    #[test]
    fn test_rename_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = touch(temp_dir.path(), "cat.jpg");
        touch(temp_dir.path(), "dog.jpg");

        let result = LocalFileSystem.rename(&path, "dog");
        assert!(matches!(result, Err(PhotoTagError::FileAlreadyExists(_))));
        assert!(path.exists());
    }

    #[test]
    fn test_move_to() {
        let temp_dir = TempDir::new().unwrap();
        let path = touch(temp_dir.path(), "cat.jpg");
        let sub = temp_dir.path().join("sub");
        fs::create_dir(&sub).unwrap();

        let moved = LocalFileSystem.move_to(&path, &sub).unwrap();
        assert_eq!(moved, sub.join("cat.jpg"));
        assert!(moved.exists());

        let missing = temp_dir.path().join("missing");
        assert!(matches!(
            LocalFileSystem.move_to(&moved, &missing),
            Err(PhotoTagError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let path = touch(temp_dir.path(), "cat.jpg");

        LocalFileSystem.delete(&path).unwrap();
        assert!(!path.exists());
        assert!(LocalFileSystem.delete(&path).is_err());
    }
}
