//! Integration tests for the PhotoTagApi public interface.
//!
//! Each test works on real files in a temp directory and checks both the
//! in-memory view and the file names on disk.

use phototag_core::{
    AppSettings, FileOperations, HistoryDirection, LocalFileSystem, PhotoTagApi, PhotoTagError,
    PictureId, Severity,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

struct TestEnv {
    temp_dir: TempDir,
}

impl TestEnv {
    fn new(files: &[&str]) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("photos")).unwrap();
        let env = Self { temp_dir };
        for name in files {
            env.touch(name);
        }
        env
    }

    fn photos(&self) -> PathBuf {
        self.temp_dir.path().join("photos")
    }

    fn settings(&self) -> PathBuf {
        self.temp_dir.path().join("state/phototag-settings.json")
    }

    fn touch(&self, relative: &str) {
        let path = self.photos().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"img").unwrap();
    }

    fn exists(&self, relative: &str) -> bool {
        self.photos().join(relative).exists()
    }

    fn api(&self) -> PhotoTagApi {
        PhotoTagApi::builder(self.settings())
            .case_insensitive_paths(false)
            .build()
            .unwrap()
    }

    fn opened(&self, recursive: bool) -> PhotoTagApi {
        let mut api = self.api();
        api.open_directory(self.photos(), recursive).unwrap();
        api
    }
}

fn id_of(api: &PhotoTagApi, file_name: &str) -> PictureId {
    api.pictures()
        .into_iter()
        .find(|p| p.file_name == file_name)
        .unwrap_or_else(|| panic!("{} not tracked", file_name))
        .id
}

fn file_names(api: &PhotoTagApi) -> Vec<String> {
    api.pictures().into_iter().map(|p| p.file_name).collect()
}

#[test]
fn test_fresh_session_is_empty() {
    let env = TestEnv::new(&[]);
    let api = env.api();
    assert!(api.root().is_none());
    assert!(api.pictures().is_empty());
    assert!(api.available_tags().is_empty());
    assert!(!api.can_undo());
}

#[test]
fn test_open_tracks_only_valid_names() {
    let env = TestEnv::new(&["cat.jpg", "sunset @beach @2024.PNG", "bad-name.jpg", "notes.txt"]);
    let api = env.opened(false);

    assert_eq!(file_names(&api), vec!["cat.jpg", "sunset @beach @2024.PNG"]);
    assert_eq!(api.available_tags(), vec!["beach", "2024"]);
}

#[test]
fn test_add_tag_renames_and_undo_restores() {
    let env = TestEnv::new(&["cat.jpg"]);
    let mut api = env.opened(false);
    let cat = id_of(&api, "cat.jpg");

    api.add_tag(cat, "pet").unwrap();
    assert!(env.exists("cat @pet.jpg"));
    assert!(!env.exists("cat.jpg"));
    assert_eq!(api.picture_info(cat).unwrap().tags, vec!["pet"]);

    api.undo().unwrap();
    assert!(env.exists("cat.jpg"));
    assert!(!env.exists("cat @pet.jpg"));
    assert!(api.available_tags().is_empty());
}

#[test]
fn test_move_out_of_non_recursive_scope_untracks() {
    let env = TestEnv::new(&["cat @pet.jpg", "dog.jpg"]);
    fs::create_dir(env.photos().join("sub")).unwrap();
    let mut api = env.opened(false);
    let cat = id_of(&api, "cat @pet.jpg");

    api.move_picture(cat, env.photos().join("sub")).unwrap();
    assert!(env.exists("sub/cat @pet.jpg"));
    assert_eq!(file_names(&api), vec!["dog.jpg"]);
    assert!(api.available_tags().is_empty());
    assert!(api.search("pet").is_empty());

    // Undo brings it back into scope
    api.undo().unwrap();
    assert!(env.exists("cat @pet.jpg"));
    assert_eq!(api.search("pet").len(), 1);
}

#[test]
fn test_rename_tag_across_three_pictures() {
    let env = TestEnv::new(&["a @beach.jpg", "b @beach @sun.jpg", "c @beach.png", "d.jpg"]);
    let mut api = env.opened(false);

    let record = api.rename_tag("beach", "coast").unwrap();
    assert_eq!(record.message, "Renamed tag @beach to @coast");
    assert!(env.exists("a @coast.jpg"));
    assert!(env.exists("b @coast @sun.jpg"));
    assert!(env.exists("c @coast.png"));
    assert!(!api.available_tags().contains(&"beach".to_string()));
    assert_eq!(api.search("coast").len(), 3);

    assert!(matches!(
        api.rename_tag("beach", "shore"),
        Err(PhotoTagError::TagNotFound(_))
    ));
    assert!(matches!(
        api.rename_tag("coast", "sun"),
        Err(PhotoTagError::TagExists(_))
    ));
}

#[test]
fn test_rename_tag_onto_label_of_moved_out_picture_fails() {
    let env = TestEnv::new(&["x @coast.jpg", "y @beach.jpg"]);
    fs::create_dir(env.photos().join("sub")).unwrap();
    let mut api = env.opened(false);
    let x = id_of(&api, "x @coast.jpg");

    api.move_picture(x, env.photos().join("sub")).unwrap();
    assert_eq!(api.available_tags(), vec!["beach"]);

    assert!(matches!(
        api.rename_tag("beach", "coast"),
        Err(PhotoTagError::TagExists(_))
    ));
    assert!(env.exists("y @beach.jpg"));
    assert!(env.exists("sub/x @coast.jpg"));

    // Both tags stay distinct after reopening over the subdirectory
    api.open_directory(env.photos(), true).unwrap();
    assert_eq!(api.search("coast").len(), 1);
    assert_eq!(api.search("beach").len(), 1);

    api.undo().unwrap();
    assert!(env.exists("x @coast.jpg"));
    assert!(env.exists("y @beach.jpg"));
}

#[test]
fn test_open_skips_names_that_do_not_round_trip() {
    let env = TestEnv::new(&["dup @pet @pet.jpg", "tab\t@pet.jpg", "cat @pet.jpg"]);
    let mut api = env.opened(false);
    assert_eq!(file_names(&api), vec!["cat @pet.jpg"]);

    let cat = id_of(&api, "cat @pet.jpg");
    api.add_tag(cat, "new").unwrap();
    assert!(env.exists("cat @pet @new.jpg"));
    assert!(env.exists("dup @pet @pet.jpg"));
    assert!(env.exists("tab\t@pet.jpg"));
}

#[test]
fn test_remove_tags_and_unknown_label() {
    let env = TestEnv::new(&["cat @a @b @c.jpg", "dog @b.jpg"]);
    let mut api = env.opened(false);
    let cat = id_of(&api, "cat @a @b @c.jpg");

    assert!(matches!(
        api.remove_tags(cat, &["a", "missing"]),
        Err(PhotoTagError::TagNotFound(_))
    ));
    assert!(env.exists("cat @a @b @c.jpg"));

    api.remove_tags(cat, &["@a", "b"]).unwrap();
    assert!(env.exists("cat @c.jpg"));
    // `b` is still on dog, `a` is gone
    assert_eq!(api.available_tags(), vec!["b", "c"]);

    api.undo().unwrap();
    assert!(env.exists("cat @a @b @c.jpg"));
}

#[test]
fn test_redo_after_new_command_is_empty_history() {
    let env = TestEnv::new(&["cat.jpg"]);
    let mut api = env.opened(false);
    let cat = id_of(&api, "cat.jpg");

    api.add_tag(cat, "one").unwrap();
    api.add_tag(cat, "two").unwrap();
    api.undo().unwrap();
    api.undo().unwrap();
    api.add_tag(cat, "three").unwrap();

    assert!(matches!(
        api.redo(),
        Err(PhotoTagError::EmptyHistory(HistoryDirection::Redo))
    ));
    assert!(env.exists("cat @three.jpg"));
}

#[test]
fn test_rename_picture_validation_and_collision() {
    let env = TestEnv::new(&["cat @pet.jpg", "dog @pet.jpg"]);
    let mut api = env.opened(false);
    let cat = id_of(&api, "cat @pet.jpg");

    assert!(matches!(
        api.rename_picture(cat, "bad-name"),
        Err(PhotoTagError::Validation { .. })
    ));
    assert!(matches!(
        api.rename_picture(cat, "cat"),
        Err(PhotoTagError::Validation { .. })
    ));
    assert!(matches!(
        api.rename_picture(cat, "dog"),
        Err(PhotoTagError::FileAlreadyExists(_))
    ));
    assert!(!api.can_undo());

    api.rename_picture(cat, "tabby cat").unwrap();
    assert!(env.exists("tabby cat @pet.jpg"));
}

#[test]
fn test_delete_picture_is_logged_not_undoable() {
    let env = TestEnv::new(&["cat @pet.jpg"]);
    let mut api = env.opened(false);
    let cat = id_of(&api, "cat @pet.jpg");

    let record = api.delete_picture(cat).unwrap();
    assert_eq!(record.severity, Severity::Info);
    assert_eq!(record.message, "Deleted cat @pet.jpg");
    assert!(!env.exists("cat @pet.jpg"));
    assert!(!api.can_undo());
    assert!(matches!(
        api.picture_info(cat),
        Err(PhotoTagError::PictureNotFound(_))
    ));
}

#[test]
fn test_search_empty_query_returns_all() {
    let env = TestEnv::new(&["a @x.jpg", "b.jpg"]);
    let api = env.opened(false);

    assert_eq!(api.search("").len(), 2);
    assert_eq!(api.search("  ").len(), 2);
    assert_eq!(api.search("@x").len(), 1);
    assert!(api.search("y").is_empty());
}

#[test]
fn test_recursive_open_sees_subdirectories() {
    let env = TestEnv::new(&["a.jpg", "sub/b @x.jpg", "sub/deeper/c @x.jpeg"]);
    let api = env.opened(true);
    assert_eq!(api.pictures().len(), 3);
    assert_eq!(api.search("x").len(), 2);
}

#[test]
fn test_history_survives_directory_switch() {
    let env = TestEnv::new(&["cat.jpg", "other/dog.jpg"]);
    let mut api = env.opened(false);
    let cat = id_of(&api, "cat.jpg");
    api.add_tag(cat, "pet").unwrap();

    api.open_directory(env.photos().join("other"), false).unwrap();
    assert_eq!(file_names(&api), vec!["dog.jpg"]);

    // The command still applies to the picture in the first directory
    api.undo().unwrap();
    assert!(env.exists("cat.jpg"));

    api.open_directory(env.photos(), false).unwrap();
    api.redo().unwrap();
    assert!(env.exists("cat @pet.jpg"));
    assert_eq!(api.search("pet").len(), 1);
}

#[test]
fn test_failed_open_keeps_previous_directory() {
    let env = TestEnv::new(&["cat.jpg"]);
    let mut api = env.opened(false);

    assert!(api
        .open_directory(env.photos().join("does-not-exist"), false)
        .is_err());
    assert_eq!(file_names(&api), vec!["cat.jpg"]);
}

#[test]
fn test_settings_round_trip() {
    let env = TestEnv::new(&["cat @pet.jpg"]);
    {
        let mut api = env.opened(false);
        let cat = id_of(&api, "cat @pet.jpg");
        api.add_tag(cat, "travel").unwrap();
        api.save().unwrap();
    }

    let settings = AppSettings::load(&env.settings()).unwrap().unwrap();
    assert_eq!(settings.available_tags, vec!["pet", "travel"]);
    assert_eq!(settings.historical_pictures.len(), 1);
    assert_eq!(settings.historical_pictures[0].tags, vec!["pet", "travel"]);

    // Vocabulary comes back in a new session before any directory is open
    let api = env.api();
    assert_eq!(api.available_tags(), vec!["pet", "travel"]);
    assert_eq!(api.historical_pictures().len(), 1);
}

#[test]
fn test_corrupt_settings_start_empty() {
    let env = TestEnv::new(&[]);
    fs::create_dir_all(env.settings().parent().unwrap()).unwrap();
    fs::write(env.settings(), "{ definitely not json").unwrap();

    let api = env.api();
    assert!(api.available_tags().is_empty());
    assert!(api.historical_pictures().is_empty());
}

#[test]
fn test_settings_path_must_be_a_file() {
    let env = TestEnv::new(&[]);
    let result = PhotoTagApi::builder(env.photos()).build();
    assert!(matches!(result, Err(PhotoTagError::Config { .. })));
}

/// Filesystem whose renames always fail.
#[derive(Debug)]
struct ReadOnlyRenames;

impl FileOperations for ReadOnlyRenames {
    fn list_images(&self, dir: &Path, recursive: bool) -> phototag_core::Result<Vec<PathBuf>> {
        LocalFileSystem.list_images(dir, recursive)
    }

    fn rename(&self, path: &Path, _new_base_name: &str) -> phototag_core::Result<PathBuf> {
        Err(PhotoTagError::io_with_path(
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            path,
        ))
    }

    fn move_to(&self, path: &Path, dest_dir: &Path) -> phototag_core::Result<PathBuf> {
        LocalFileSystem.move_to(path, dest_dir)
    }

    fn delete(&self, path: &Path) -> phototag_core::Result<()> {
        LocalFileSystem.delete(path)
    }
}

#[test]
fn test_failed_rename_rolls_back() {
    let env = TestEnv::new(&["cat @pet.jpg", "dog @pet.jpg"]);
    let mut api = PhotoTagApi::builder(env.settings())
        .case_insensitive_paths(false)
        .file_operations(Arc::new(ReadOnlyRenames))
        .build()
        .unwrap();
    api.open_directory(env.photos(), false).unwrap();
    let cat = id_of(&api, "cat @pet.jpg");

    assert!(api.add_tag(cat, "new").is_err());
    assert!(api.rename_tag("pet", "animal").is_err());

    assert_eq!(file_names(&api), vec!["cat @pet.jpg", "dog @pet.jpg"]);
    assert_eq!(api.available_tags(), vec!["pet"]);
    assert!(!api.can_undo());
    assert!(api.audit_log().is_empty());
}
