//! Crash-safe JSON persistence.
//!
//! Writes go to a sibling temp file which is synced and then renamed over the
//! target, so a reader sees either the old snapshot or the new one.

use crate::error::{PhotoTagError, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Read and parse a JSON file.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(PhotoTagError::Io {
                message: format!("Failed to read {}", path.display()),
                path: Some(path.to_path_buf()),
                source: Some(e),
            })
        }
    };

    let data = serde_json::from_str(&contents).map_err(|e| PhotoTagError::Json {
        message: format!("Failed to parse {}: {}", path.display(), e),
        source: Some(e),
    })?;
    Ok(Some(data))
}

/// Serialize `data` as pretty JSON and replace `path` with it atomically.
///
/// With `keep_backup`, the previous file is first copied to `<name>.bak`;
/// a failed backup is logged and does not stop the write.
pub fn write_json_atomic<T: Serialize>(path: &Path, data: &T, keep_backup: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| PhotoTagError::io_with_path(e, parent))?;
    }

    let serialized = serde_json::to_string_pretty(data)?;
    let temp_path = temp_path_for(path);

    if let Err(e) = write_synced(&temp_path, serialized.as_bytes()) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    if keep_backup && path.exists() {
        let backup_path = sibling_with_suffix(path, "bak");
        match fs::copy(path, &backup_path) {
            Ok(_) => debug!("Created backup {}", backup_path.display()),
            Err(e) => warn!("Failed to create backup {}: {}", backup_path.display(), e),
        }
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        PhotoTagError::Io {
            message: format!("Failed to replace {}", path.display()),
            path: Some(path.to_path_buf()),
            source: Some(e),
        }
    })?;

    debug!("Wrote {}", path.display());
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .map_err(|e| PhotoTagError::io_with_path(e, path))?;
    file.write_all(bytes)
        .and_then(|_| file.flush())
        .and_then(|_| file.sync_all())
        .map_err(|e| PhotoTagError::io_with_path(e, path))
}

/// Unique temp name next to the target: `<name>.<pid>.<n>.tmp`.
fn temp_path_for(path: &Path) -> PathBuf {
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    sibling_with_suffix(path, &format!("{}.{}.tmp", process::id(), n))
}

fn sibling_with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Snapshot {
        labels: Vec<String>,
    }

    fn snapshot(labels: &[&str]) -> Snapshot {
        Snapshot {
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result: Option<Snapshot> = read_json(&temp_dir.path().join("none.json")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/settings.json");

        write_json_atomic(&path, &snapshot(&["beach"]), false).unwrap();
        let read: Snapshot = read_json(&path).unwrap().unwrap();
        assert_eq!(read, snapshot(&["beach"]));

        // No temp files left behind
        let leftovers = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter(|e| {
                e.as_ref()
                    .unwrap()
                    .file_name()
                    .to_string_lossy()
                    .ends_with(".tmp")
            })
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_backup_keeps_previous() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");

        write_json_atomic(&path, &snapshot(&["old"]), true).unwrap();
        write_json_atomic(&path, &snapshot(&["new"]), true).unwrap();

        let backup: Snapshot = read_json(&temp_dir.path().join("settings.json.bak"))
            .unwrap()
            .unwrap();
        assert_eq!(backup, snapshot(&["old"]));
    }

    #[test]
    fn test_read_corrupt_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let result: Result<Option<Snapshot>> = read_json(&path);
        assert!(matches!(result, Err(PhotoTagError::Json { .. })));
    }
}
