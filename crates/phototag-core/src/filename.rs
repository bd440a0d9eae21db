//! Filename codec: tagless name + ordered tags + extension <-> file name.
//!
//! A tagged file name looks like `sunset at sea @beach @2024.jpg`: one or more
//! space-separated words, then zero or more ` @label` tokens, then the
//! extension. Word characters are ASCII letters, digits and `_`.

use crate::config::TagConfig;
use crate::error::{PhotoTagError, Result};
use regex::Regex;
use std::sync::LazyLock;

/// Full grammar a file name must match before its picture is tracked.
static FILENAME_GRAMMAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[0-9A-Za-z_]+(?:[\t\n\x0B\x0C\r ][0-9A-Za-z_]+)*(?:[\t\n\x0B\x0C\r ]@[0-9A-Za-z_]+)*\.(?i:png|jpe?g)$",
    )
    .unwrap()
});

/// Tagless name: words separated by single whitespace characters.
static TAGLESS_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9A-Za-z_]+(?:[\t\n\x0B\x0C\r ][0-9A-Za-z_]+)*$").unwrap()
});

/// Tag label: a single word.
static TAG_LABEL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9A-Za-z_]+$").unwrap());

/// The three components of a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedName {
    pub tagless_name: String,
    pub tags: Vec<String>,
    pub extension: String,
}

/// Encode a file stem (no extension) from a tagless name and ordered tags.
///
/// # Examples
///
/// ```
/// use phototag_core::filename::encode_stem;
///
/// assert_eq!(encode_stem("cat", &["pet", "home"]), "cat @pet @home");
/// assert_eq!(encode_stem("cat", &[] as &[&str]), "cat");
/// ```
pub fn encode_stem<S: AsRef<str>>(tagless_name: &str, tags: &[S]) -> String {
    let mut stem = String::from(tagless_name);
    for tag in tags {
        stem.push(TagConfig::TOKEN_SEPARATOR);
        stem.push(TagConfig::DELIMITER);
        stem.push_str(tag.as_ref());
    }
    stem
}

/// Encode a full file name.
///
/// An empty extension produces a name without a trailing dot.
///
/// # Examples
///
/// ```
/// use phototag_core::filename::encode;
///
/// assert_eq!(encode("sunset", &["beach", "2024"], "jpg"), "sunset @beach @2024.jpg");
/// ```
pub fn encode<S: AsRef<str>>(tagless_name: &str, tags: &[S], extension: &str) -> String {
    let stem = encode_stem(tagless_name, tags);
    if extension.is_empty() {
        stem
    } else {
        format!("{}.{}", stem, extension)
    }
}

/// Split a file name into its components without checking the grammar.
///
/// The extension is everything after the last `.`; the remaining stem is
/// tokenized on the tag delimiter. Tokens are trimmed and empty tag tokens are
/// dropped. Repeated tags are kept; callers that need a set de-duplicate.
pub fn decode(filename: &str) -> DecodedName {
    let (stem, extension) = match filename.rfind('.') {
        Some(pos) => (&filename[..pos], &filename[pos + 1..]),
        None => (filename, ""),
    };

    let mut tokens = stem.split(TagConfig::DELIMITER);
    let tagless_name = tokens.next().unwrap_or_default().trim().to_string();
    let tags = tokens
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();

    DecodedName {
        tagless_name,
        tags,
        extension: extension.to_string(),
    }
}

/// Check a file name against the tagged-image grammar.
pub fn is_valid_filename(filename: &str) -> bool {
    FILENAME_GRAMMAR.is_match(filename)
}

/// Validate then decode a file name.
pub fn parse(filename: &str) -> Result<DecodedName> {
    if !is_valid_filename(filename) {
        return Err(PhotoTagError::validation(
            "file name",
            format!("'{}' is not '<words> [@tag ...].<png|jpg|jpeg>'", filename),
        ));
    }
    Ok(decode(filename))
}

/// Whether `filename` is exactly what [`encode`] produces from its parts.
///
/// The grammar admits names the encoder never writes: repeated tags, or tags
/// separated by whitespace other than a single space.
pub fn is_canonical(decoded: &DecodedName, filename: &str) -> bool {
    let distinct = decoded
        .tags
        .iter()
        .enumerate()
        .all(|(i, tag)| !decoded.tags[..i].contains(tag));
    distinct && encode(&decoded.tagless_name, &decoded.tags, &decoded.extension) == filename
}

/// Validate a tag label, returning it trimmed.
pub fn validate_label(label: &str) -> Result<String> {
    let label = label.trim();
    let label = label
        .strip_prefix(TagConfig::DELIMITER)
        .unwrap_or(label);
    if TAG_LABEL.is_match(label) {
        Ok(label.to_string())
    } else {
        Err(PhotoTagError::validation(
            "tag label",
            format!("'{}' must be a single word of letters, digits or '_'", label),
        ))
    }
}

/// Validate a tagless picture name, returning it trimmed.
pub fn validate_tagless_name(name: &str) -> Result<String> {
    let name = name.trim();
    if TAGLESS_NAME.is_match(name) {
        Ok(name.to_string())
    } else {
        Err(PhotoTagError::validation(
            "picture name",
            format!(
                "'{}' must be words of letters, digits or '_' separated by spaces",
                name
            ),
        ))
    }
}
