//! Listing, metadata, and storage types shared across host contracts and implementations.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::path::{AppDataPath, EntryName, SEPARATOR};

/// Extension appended to every file created through the file manager.
pub const TEXT_FILE_EXTENSION: &str = "txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Directory entry kind.
pub enum EntryKind {
    /// File entry.
    File,
    /// Directory entry.
    Directory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Raw stat result reported by a host adapter for an existing entry.
pub struct HostStat {
    /// File or directory kind.
    pub kind: EntryKind,
    /// Size in bytes (files only; directories report `0`).
    pub size: u64,
    /// Last-modified time in unix milliseconds when available.
    pub modified_at_unix_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raw directory child reported by a host adapter.
pub struct HostDirEntry {
    /// Child name.
    pub name: EntryName,
    /// Stat snapshot captured while listing.
    pub stat: HostStat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Directory entry returned by listing operations.
pub struct ListingEntry {
    /// Base name of the entry.
    pub name: EntryName,
    /// Full app-data path.
    pub path: AppDataPath,
    /// File or directory kind.
    pub kind: EntryKind,
    /// File size in bytes (files only).
    pub size: Option<u64>,
    /// Last-modified time in unix milliseconds when available.
    pub modified_at_unix_ms: Option<u64>,
}

impl ListingEntry {
    /// Builds a listing entry for `name` inside `dir`.
    pub fn new(dir: &AppDataPath, name: EntryName, stat: HostStat) -> Self {
        Self {
            path: dir.join(&name),
            name,
            kind: stat.kind,
            size: (stat.kind == EntryKind::File).then_some(stat.size),
            modified_at_unix_ms: stat.modified_at_unix_ms,
        }
    }

    /// Returns `true` for directories.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Display label: the name, suffixed with `/` for directories.
    pub fn label(&self) -> String {
        if self.is_dir() {
            format!("{}{SEPARATOR}", self.name)
        } else {
            self.name.to_string()
        }
    }
}

fn listing_order(left: &ListingEntry, right: &ListingEntry) -> Ordering {
    match (left.kind, right.kind) {
        (EntryKind::Directory, EntryKind::File) => Ordering::Less,
        (EntryKind::File, EntryKind::Directory) => Ordering::Greater,
        _ => left.name.cmp(&right.name),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Children of one directory, directories first and then by name.
pub struct DirectoryListing {
    /// Directory that was listed.
    pub cwd: AppDataPath,
    /// Child entries in display order.
    pub entries: Vec<ListingEntry>,
}

impl DirectoryListing {
    /// Builds a listing for `cwd` from raw host entries.
    pub fn from_host(cwd: &AppDataPath, children: Vec<HostDirEntry>) -> Self {
        let mut entries: Vec<ListingEntry> = children
            .into_iter()
            .map(|child| ListingEntry::new(cwd, child.name, child.stat))
            .collect();
        entries.sort_by(listing_order);
        Self {
            cwd: cwd.clone(),
            entries,
        }
    }

    /// Display labels in listing order.
    pub fn labels(&self) -> Vec<String> {
        self.entries.iter().map(ListingEntry::label).collect()
    }

    /// Looks up an entry by label or bare name.
    pub fn find(&self, label: &str) -> Option<&ListingEntry> {
        let name = label.strip_suffix(SEPARATOR).unwrap_or(label);
        self.entries.iter().find(|entry| entry.name.as_str() == name)
    }

    /// Returns `true` when `label` matches an entry label exactly.
    pub fn contains(&self, label: &str) -> bool {
        self.entries.iter().any(|entry| entry.label() == label)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the directory has no children.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// On-demand metadata for one entry. Missing entries report `exists: false`.
pub struct FileMetadata {
    /// Rendered app-data path that was inspected.
    pub path: String,
    /// Whether the entry exists.
    pub exists: bool,
    /// Whether the entry is a directory.
    pub is_directory: bool,
    /// File size in bytes (files only).
    pub size: Option<u64>,
    /// Last-modified time in unix milliseconds when available.
    pub modified_at_unix_ms: Option<u64>,
}

impl FileMetadata {
    /// Metadata for an entry that does not exist.
    pub fn missing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            exists: false,
            is_directory: false,
            size: None,
            modified_at_unix_ms: None,
        }
    }

    /// Metadata for an existing entry.
    pub fn from_stat(path: &AppDataPath, stat: HostStat) -> Self {
        let is_directory = stat.kind == EntryKind::Directory;
        Self {
            path: path.to_string(),
            exists: true,
            is_directory,
            size: (!is_directory).then_some(stat.size),
            modified_at_unix_ms: stat.modified_at_unix_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
/// Device-wide storage capacity snapshot.
pub struct StorageStats {
    total_bytes: u64,
    free_bytes: u64,
    used_bytes: u64,
}

impl StorageStats {
    /// Builds stats from capacity and free space; `used = total - free`, clamped at zero.
    pub fn new(total_bytes: u64, free_bytes: u64) -> Self {
        Self {
            total_bytes,
            free_bytes,
            used_bytes: total_bytes.saturating_sub(free_bytes),
        }
    }

    /// Total device capacity in bytes.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Free device space in bytes.
    pub fn free_bytes(&self) -> u64 {
        self.free_bytes
    }

    /// Used device space in bytes.
    pub fn used_bytes(&self) -> u64 {
        self.used_bytes
    }
}
