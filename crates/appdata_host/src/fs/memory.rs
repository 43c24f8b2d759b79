//! In-memory [`HostFs`] adapter used by tests and headless sessions.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use super::error::{FsError, FsResult};
use super::path::AppDataPath;
use super::service::{HostFs, HostFsFuture};
use super::types::{EntryKind, HostDirEntry, HostStat};
use crate::time::next_monotonic_timestamp_ms;

/// Capacity reported by [`MemoryHostFs::default`].
pub const DEFAULT_MEMORY_CAPACITY_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Debug, Clone)]
enum MemoryNode {
    Directory { modified_at_unix_ms: u64 },
    File { text: String, modified_at_unix_ms: u64 },
}

impl MemoryNode {
    fn stat(&self) -> HostStat {
        match self {
            Self::Directory {
                modified_at_unix_ms,
            } => HostStat {
                kind: EntryKind::Directory,
                size: 0,
                modified_at_unix_ms: Some(*modified_at_unix_ms),
            },
            Self::File {
                text,
                modified_at_unix_ms,
            } => HostStat {
                kind: EntryKind::File,
                size: text.len() as u64,
                modified_at_unix_ms: Some(*modified_at_unix_ms),
            },
        }
    }

    fn is_dir(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }
}

#[derive(Debug)]
struct MemoryTree {
    nodes: BTreeMap<AppDataPath, MemoryNode>,
    capacity_bytes: u64,
}

impl MemoryTree {
    fn used_bytes(&self) -> u64 {
        self.nodes
            .values()
            .map(|node| match node {
                MemoryNode::File { text, .. } => text.len() as u64,
                MemoryNode::Directory { .. } => 0,
            })
            .sum()
    }

    fn require_dir(&self, path: &AppDataPath) -> FsResult<()> {
        match self.nodes.get(path) {
            Some(node) if node.is_dir() => Ok(()),
            Some(_) => Err(FsError::invalid_input(format!(
                "path `{path}` is not a directory"
            ))),
            None => Err(FsError::not_found(path)),
        }
    }

    fn require_parent_dir(&self, path: &AppDataPath) -> FsResult<()> {
        match path.parent() {
            Some(parent) => self.require_dir(&parent),
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
/// In-memory app-data tree keyed by [`AppDataPath`].
///
/// Clones share the same tree. File sizes count against a fixed capacity so storage stats and
/// out-of-space failures behave like a small device.
pub struct MemoryHostFs {
    inner: Rc<RefCell<MemoryTree>>,
}

impl Default for MemoryHostFs {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MEMORY_CAPACITY_BYTES)
    }
}

impl MemoryHostFs {
    /// Creates a tree whose root already exists.
    pub fn with_capacity(capacity_bytes: u64) -> Self {
        let fs = Self::without_root(capacity_bytes);
        fs.inner.borrow_mut().nodes.insert(
            AppDataPath::root(),
            MemoryNode::Directory {
                modified_at_unix_ms: next_monotonic_timestamp_ms(),
            },
        );
        fs
    }

    /// Creates a tree with no root directory yet.
    pub fn without_root(capacity_bytes: u64) -> Self {
        Self {
            inner: Rc::new(RefCell::new(MemoryTree {
                nodes: BTreeMap::new(),
                capacity_bytes,
            })),
        }
    }

    /// Returns `true` when anything exists at `path`.
    pub fn exists(&self, path: &AppDataPath) -> bool {
        self.inner.borrow().nodes.contains_key(path)
    }

    fn read_dir_now(&self, path: &AppDataPath) -> FsResult<Vec<HostDirEntry>> {
        let tree = self.inner.borrow();
        tree.require_dir(path)?;
        Ok(tree
            .nodes
            .iter()
            .filter(|(key, _)| key.depth() == path.depth() + 1 && key.starts_with(path))
            .filter_map(|(key, node)| {
                key.name().map(|name| HostDirEntry {
                    name: name.clone(),
                    stat: node.stat(),
                })
            })
            .collect())
    }

    fn make_dir_now(&self, path: &AppDataPath, intermediates: bool) -> FsResult<()> {
        let mut tree = self.inner.borrow_mut();
        if let Some(existing) = tree.nodes.get(path) {
            return if intermediates && existing.is_dir() {
                Ok(())
            } else {
                Err(FsError::already_exists(path))
            };
        }

        if intermediates {
            let mut ancestor = AppDataPath::root();
            for segment in path.segments() {
                if let Some(node) = tree.nodes.get(&ancestor) {
                    if !node.is_dir() {
                        return Err(FsError::invalid_input(format!(
                            "path `{ancestor}` is not a directory"
                        )));
                    }
                } else {
                    tree.nodes.insert(
                        ancestor.clone(),
                        MemoryNode::Directory {
                            modified_at_unix_ms: next_monotonic_timestamp_ms(),
                        },
                    );
                }
                ancestor = ancestor.join(segment);
            }
        } else {
            tree.require_parent_dir(path)?;
        }

        tree.nodes.insert(
            path.clone(),
            MemoryNode::Directory {
                modified_at_unix_ms: next_monotonic_timestamp_ms(),
            },
        );
        Ok(())
    }

    fn read_text_now(&self, path: &AppDataPath) -> FsResult<String> {
        match self.inner.borrow().nodes.get(path) {
            Some(MemoryNode::File { text, .. }) => Ok(text.clone()),
            Some(MemoryNode::Directory { .. }) => Err(FsError::invalid_input(format!(
                "path `{path}` is not a file"
            ))),
            None => Err(FsError::not_found(path)),
        }
    }

    fn write_text_now(&self, path: &AppDataPath, text: &str) -> FsResult<()> {
        let mut tree = self.inner.borrow_mut();
        if path.is_root() {
            return Err(FsError::invalid_input("cannot write to app-data root"));
        }
        tree.require_parent_dir(path)?;

        let previous = match tree.nodes.get(path) {
            Some(MemoryNode::Directory { .. }) => {
                return Err(FsError::invalid_input(format!(
                    "path `{path}` is not a file"
                )))
            }
            Some(MemoryNode::File { text: existing, .. }) => existing.len() as u64,
            None => 0,
        };
        let projected = tree.used_bytes() - previous + text.len() as u64;
        if projected > tree.capacity_bytes {
            return Err(FsError::io(path, "no space left on device"));
        }

        tree.nodes.insert(
            path.clone(),
            MemoryNode::File {
                text: text.to_string(),
                modified_at_unix_ms: next_monotonic_timestamp_ms(),
            },
        );
        Ok(())
    }

    fn delete_now(&self, path: &AppDataPath) {
        self.inner
            .borrow_mut()
            .nodes
            .retain(|key, _| !key.starts_with(path));
    }

    fn rename_now(&self, from: &AppDataPath, to: &AppDataPath) -> FsResult<()> {
        let mut tree = self.inner.borrow_mut();
        if !tree.nodes.contains_key(from) {
            return Err(FsError::not_found(from));
        }
        if tree.nodes.contains_key(to) {
            return Err(FsError::already_exists(to));
        }
        if to.starts_with(from) {
            return Err(FsError::invalid_input(format!(
                "cannot move `{from}` into itself"
            )));
        }
        tree.require_parent_dir(to)?;

        let moved: Vec<AppDataPath> = tree
            .nodes
            .keys()
            .filter(|key| key.starts_with(from))
            .cloned()
            .collect();
        for key in moved {
            if let Some(node) = tree.nodes.remove(&key) {
                let target = to.join_all(&key.segments()[from.depth()..]);
                tree.nodes.insert(target, node);
            }
        }
        Ok(())
    }
}

impl HostFs for MemoryHostFs {
    fn read_dir<'a>(&'a self, path: &'a AppDataPath) -> HostFsFuture<'a, FsResult<Vec<HostDirEntry>>> {
        Box::pin(async move { self.read_dir_now(path) })
    }

    fn make_dir<'a>(
        &'a self,
        path: &'a AppDataPath,
        intermediates: bool,
    ) -> HostFsFuture<'a, FsResult<()>> {
        Box::pin(async move { self.make_dir_now(path, intermediates) })
    }

    fn read_text<'a>(&'a self, path: &'a AppDataPath) -> HostFsFuture<'a, FsResult<String>> {
        Box::pin(async move { self.read_text_now(path) })
    }

    fn write_text<'a>(
        &'a self,
        path: &'a AppDataPath,
        text: &'a str,
    ) -> HostFsFuture<'a, FsResult<()>> {
        Box::pin(async move { self.write_text_now(path, text) })
    }

    fn delete<'a>(&'a self, path: &'a AppDataPath) -> HostFsFuture<'a, FsResult<()>> {
        Box::pin(async move {
            self.delete_now(path);
            Ok(())
        })
    }

    fn rename<'a>(
        &'a self,
        from: &'a AppDataPath,
        to: &'a AppDataPath,
    ) -> HostFsFuture<'a, FsResult<()>> {
        Box::pin(async move { self.rename_now(from, to) })
    }

    fn stat<'a>(&'a self, path: &'a AppDataPath) -> HostFsFuture<'a, FsResult<Option<HostStat>>> {
        Box::pin(async move { Ok(self.inner.borrow().nodes.get(path).map(MemoryNode::stat)) })
    }

    fn free_disk_bytes<'a>(&'a self) -> HostFsFuture<'a, FsResult<u64>> {
        Box::pin(async move {
            let tree = self.inner.borrow();
            Ok(tree.capacity_bytes.saturating_sub(tree.used_bytes()))
        })
    }

    fn total_disk_bytes<'a>(&'a self) -> HostFsFuture<'a, FsResult<u64>> {
        Box::pin(async move { Ok(self.inner.borrow().capacity_bytes) })
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;

    use super::*;

    fn path(raw: &str) -> AppDataPath {
        AppDataPath::parse(raw).expect("path")
    }

    #[test]
    fn memory_host_round_trip_and_recursive_delete() {
        let fs = MemoryHostFs::default();
        let host: &dyn HostFs = &fs;

        block_on(host.make_dir(&path("/docs"), false)).expect("mkdir");
        block_on(host.write_text(&path("/docs/a.txt"), "hello")).expect("write");
        assert_eq!(block_on(host.read_text(&path("/docs/a.txt"))).expect("read"), "hello");

        let children = block_on(host.read_dir(&path("/docs"))).expect("list");
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name.as_str(), "a.txt");
        assert_eq!(children[0].stat.size, 5);

        block_on(host.delete(&path("/docs"))).expect("delete");
        assert!(!fs.exists(&path("/docs")));
        assert!(!fs.exists(&path("/docs/a.txt")));
        block_on(host.delete(&path("/docs"))).expect("delete is idempotent");
    }

    #[test]
    fn read_dir_lists_only_direct_children() {
        let fs = MemoryHostFs::default();
        let host: &dyn HostFs = &fs;
        block_on(host.make_dir(&path("/a/b/c"), true)).expect("mkdir -p");
        block_on(host.write_text(&path("/a/top.txt"), "x")).expect("write");

        let mut names: Vec<String> = block_on(host.read_dir(&path("/a")))
            .expect("list")
            .into_iter()
            .map(|entry| entry.name.to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["b", "top.txt"]);
    }

    #[test]
    fn make_dir_without_intermediates_requires_parent() {
        let fs = MemoryHostFs::default();
        let err = block_on(fs.make_dir(&path("/missing/child"), false)).expect_err("no parent");
        assert_eq!(err, FsError::NotFound("/missing".to_string()));

        block_on(fs.make_dir(&path("/docs"), false)).expect("mkdir");
        let err = block_on(fs.make_dir(&path("/docs"), false)).expect_err("exists");
        assert_eq!(err, FsError::AlreadyExists("/docs".to_string()));
        block_on(fs.make_dir(&path("/docs"), true)).expect("mkdir -p is idempotent");
    }

    #[test]
    fn rename_moves_descendants() {
        let fs = MemoryHostFs::default();
        block_on(fs.make_dir(&path("/old/inner"), true)).expect("mkdir -p");
        block_on(fs.write_text(&path("/old/inner/n.txt"), "n")).expect("write");

        block_on(fs.rename(&path("/old"), &path("/new"))).expect("rename");
        assert!(!fs.exists(&path("/old")));
        assert_eq!(
            block_on(fs.read_text(&path("/new/inner/n.txt"))).expect("read moved"),
            "n"
        );

        let err = block_on(fs.rename(&path("/new"), &path("/new/inner/deeper")))
            .expect_err("move into itself");
        assert!(matches!(err, FsError::InvalidInput(_)));
    }

    #[test]
    fn capacity_limits_writes_and_drives_free_space() {
        let fs = MemoryHostFs::with_capacity(8);
        block_on(fs.write_text(&path("/a.txt"), "12345")).expect("write");
        assert_eq!(block_on(fs.free_disk_bytes()).expect("free"), 3);
        assert_eq!(block_on(fs.total_disk_bytes()).expect("total"), 8);

        let err = block_on(fs.write_text(&path("/b.txt"), "6789")).expect_err("full");
        assert!(matches!(err, FsError::Io { .. }));

        block_on(fs.write_text(&path("/a.txt"), "12345678")).expect("replace fits");
    }

    #[test]
    fn without_root_reports_missing_root() {
        let fs = MemoryHostFs::without_root(16);
        assert_eq!(block_on(fs.stat(&AppDataPath::root())).expect("stat"), None);
        block_on(fs.make_dir(&AppDataPath::root(), true)).expect("create root");
        assert!(fs.exists(&AppDataPath::root()));
    }
}
