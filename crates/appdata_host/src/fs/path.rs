//! Root-confined path values for the app-data tree.
//!
//! [`AppDataPath`] is a list of validated [`EntryName`] segments below the app-data root, so a
//! path can never climb above the root or carry empty/`.`/`..` segments once constructed.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::FsError;

/// Separator used by rendered paths and by directory labels in listings.
pub const SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
/// One validated path component.
pub struct EntryName(String);

impl EntryName {
    /// Validates a single entry name.
    ///
    /// A single trailing `/` (the directory suffix used by listing labels) is accepted and
    /// stripped. Empty names, `.`, `..`, and names containing `/`, `\` or NUL are rejected.
    pub fn parse(raw: &str) -> Result<Self, FsError> {
        let name = raw.strip_suffix(SEPARATOR).unwrap_or(raw);
        if name.is_empty() {
            return Err(FsError::invalid_input("name must not be empty"));
        }
        if name == "." || name == ".." {
            return Err(FsError::invalid_input(format!("`{name}` is not a valid name")));
        }
        if name.contains(['/', '\\', '\0']) {
            return Err(FsError::invalid_input(format!(
                "`{name}` must not contain path separators"
            )));
        }
        Ok(Self(name.to_string()))
    }

    /// Returns the name text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `name.ext`, appending even when the name already carries an extension.
    pub fn with_appended_extension(&self, extension: &str) -> Self {
        Self(format!("{}.{extension}", self.0))
    }
}

impl fmt::Display for EntryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for EntryName {
    type Error = FsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EntryName> for String {
    fn from(value: EntryName) -> Self {
        value.0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
/// Location inside the app-data root.
///
/// Renders as `/a/b` through [`fmt::Display`] and as `/a/b/` through
/// [`AppDataPath::dir_string`]; the root renders as `/` either way.
pub struct AppDataPath {
    segments: Vec<EntryName>,
}

impl AppDataPath {
    /// Returns the app-data root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses and normalizes a rendered path.
    ///
    /// Whitespace is trimmed, backslashes become `/`, empty and `.` segments are dropped, and
    /// `..` pops a segment but never climbs above the root.
    pub fn parse(raw: &str) -> Result<Self, FsError> {
        let mut segments = Vec::new();
        for segment in raw.trim().replace('\\', "/").split(SEPARATOR) {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(EntryName::parse(other)?),
            }
        }
        Ok(Self { segments })
    }

    /// Returns `true` for the app-data root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments below the root.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Validated segments from the root downwards.
    pub fn segments(&self) -> &[EntryName] {
        &self.segments
    }

    /// Last segment, or `None` at the root.
    pub fn name(&self) -> Option<&EntryName> {
        self.segments.last()
    }

    /// Returns the child path `self/name`.
    pub fn join(&self, name: &EntryName) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.clone());
        Self { segments }
    }

    /// Returns `self` extended by every name in `names`.
    pub fn join_all<'a>(&self, names: impl IntoIterator<Item = &'a EntryName>) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(names.into_iter().cloned());
        Self { segments }
    }

    /// Returns the parent path, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.segments.split_last()?;
        Some(Self {
            segments: parent.to_vec(),
        })
    }

    /// Returns `true` when `prefix` equals `self` or is one of its ancestors.
    pub fn starts_with(&self, prefix: &AppDataPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Renders the directory form with a trailing separator (`/docs/`).
    pub fn dir_string(&self) -> String {
        if self.is_root() {
            return SEPARATOR.to_string();
        }
        format!("{self}{SEPARATOR}")
    }

    /// Maps the path onto a native location below `root`.
    pub fn to_native(&self, root: &Path) -> PathBuf {
        let mut native = root.to_path_buf();
        for segment in &self.segments {
            native.push(segment.as_str());
        }
        native
    }
}

impl fmt::Display for AppDataPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, "{SEPARATOR}");
        }
        for segment in &self.segments {
            write!(f, "{SEPARATOR}{segment}")?;
        }
        Ok(())
    }
}

impl TryFrom<String> for AppDataPath {
    type Error = FsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AppDataPath> for String {
    fn from(value: AppDataPath) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_expected_cases() {
        let cases = [
            ("", "/"),
            ("   ", "/"),
            ("foo/bar", "/foo/bar"),
            ("/foo//bar/", "/foo/bar"),
            ("./foo/../bar", "/bar"),
            ("\\\\foo\\\\bar", "/foo/bar"),
            ("/../../", "/"),
            ("/docs/../../../etc", "/etc"),
        ];

        for (input, expected) in cases {
            let parsed = AppDataPath::parse(input).expect("parse");
            assert_eq!(parsed.to_string(), expected, "input={input:?}");
        }
    }

    #[test]
    fn parse_rejects_nul_segments() {
        assert!(matches!(
            AppDataPath::parse("/docs/a\0b"),
            Err(FsError::InvalidInput(_))
        ));
    }

    #[test]
    fn entry_names_strip_directory_suffix_and_reject_traversal() {
        assert_eq!(EntryName::parse("docs/").expect("dir label").as_str(), "docs");
        assert_eq!(EntryName::parse("a.txt").expect("file").as_str(), "a.txt");

        for bad in ["", "/", ".", "..", "../x", "a/b", "a\\b", "docs//"] {
            assert!(EntryName::parse(bad).is_err(), "input={bad:?}");
        }
    }

    #[test]
    fn extension_is_always_appended() {
        let name = EntryName::parse("notes.txt").expect("name");
        assert_eq!(name.with_appended_extension("txt").as_str(), "notes.txt.txt");
    }

    #[test]
    fn directory_form_carries_trailing_separator() {
        let root = AppDataPath::root();
        assert_eq!(root.dir_string(), "/");
        assert!(root.parent().is_none());

        let docs = root.join(&EntryName::parse("docs").expect("name"));
        let drafts = docs.join(&EntryName::parse("drafts").expect("name"));
        assert_eq!(drafts.dir_string(), "/docs/drafts/");
        assert_eq!(drafts.to_string(), "/docs/drafts");
        assert_eq!(drafts.parent(), Some(docs.clone()));
        assert!(drafts.starts_with(&docs));
        assert!(drafts.starts_with(&root));
        assert!(!docs.starts_with(&drafts));
    }

    #[test]
    fn to_native_stays_below_root() {
        let root = Path::new("/tmp/appdata");
        let path = AppDataPath::parse("/docs/../../notes/readme.txt").expect("parse");
        assert_eq!(path.to_native(root), root.join("notes").join("readme.txt"));
        assert_eq!(AppDataPath::root().to_native(root), root.to_path_buf());
    }

    #[test]
    fn serde_uses_rendered_form() {
        let path = AppDataPath::parse("/docs/todo.txt").expect("parse");
        let json = serde_json::to_string(&path).expect("serialize");
        assert_eq!(json, "\"/docs/todo.txt\"");
        let back: AppDataPath = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, path);
    }
}
