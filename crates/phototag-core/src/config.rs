//! Centralized configuration for phototag.
//!
//! Compile-time constants live on unit structs; the few knobs that vary per
//! session are plain structs passed in by the caller.

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "phototag";
}

/// Tag encoding rules shared by the filename codec and the tag store.
pub struct TagConfig;

impl TagConfig {
    /// Character that introduces a tag token in a filename.
    pub const DELIMITER: char = '@';
    /// Separator emitted between filename tokens.
    pub const TOKEN_SEPARATOR: char = ' ';
    /// Recognized image extensions, matched case-insensitively.
    pub const IMAGE_EXTENSIONS: &'static [&'static str] = &["png", "jpg", "jpeg"];
}

/// Shared file and directory names.
pub struct PathsConfig;

impl PathsConfig {
    /// Directory under the platform config dir holding phototag state.
    pub const APP_DIR_NAME: &'static str = AppConfig::APP_NAME;
    /// Default settings snapshot file name.
    pub const SETTINGS_FILE_NAME: &'static str = "phototag-settings.json";
}

/// Per-manager options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerOptions {
    /// Compare picture paths case-insensitively when checking identity.
    ///
    /// Should match the filesystem the pictures live on.
    pub case_insensitive_paths: bool,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            case_insensitive_paths: cfg!(any(windows, target_os = "macos")),
        }
    }
}

/// Check whether a file extension is a recognized image extension.
pub fn is_image_extension(extension: &str) -> bool {
    TagConfig::IMAGE_EXTENSIONS
        .iter()
        .any(|ext| ext.eq_ignore_ascii_case(extension))
}
