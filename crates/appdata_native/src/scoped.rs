//! Native `std::fs` adapter confined to a canonical app-data root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use appdata_host::{
    unix_time_ms, AppDataPath, EntryKind, EntryName, FsError, FsResult, HostDirEntry, HostFs,
    HostFsFuture, HostStat,
};

use crate::disk::disk_space;

fn canonical_root(root: &Path) -> FsResult<PathBuf> {
    fs::canonicalize(root).map_err(|err| {
        FsError::io(
            root.display(),
            format!("failed to canonicalize app-data root: {err}"),
        )
    })
}

fn host_stat(metadata: &fs::Metadata) -> HostStat {
    HostStat {
        kind: if metadata.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        },
        size: metadata.len(),
        modified_at_unix_ms: metadata.modified().ok().and_then(unix_time_ms),
    }
}

fn exists_without_following(native: &Path) -> bool {
    fs::symlink_metadata(native).is_ok()
}

#[derive(Debug, Clone)]
/// Host filesystem rooted at a canonical native directory.
///
/// Every resolved location is checked against the canonical root after symlink resolution, so
/// neither `..` segments nor symlinks inside the tree can reach files outside it.
pub struct ScopedNativeFs {
    root: PathBuf,
}

impl ScopedNativeFs {
    /// Creates an adapter rooted at `root`.
    ///
    /// The root directory (and any missing ancestors) is created if needed and canonicalized
    /// before use.
    pub fn from_root(root: impl AsRef<Path>) -> FsResult<Self> {
        let root = root.as_ref();
        fs::create_dir_all(root).map_err(|err| {
            FsError::io(
                root.display(),
                format!("failed to create app-data root: {err}"),
            )
        })?;
        Ok(Self {
            root: canonical_root(root)?,
        })
    }

    /// Canonical native root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn native(&self, path: &AppDataPath) -> PathBuf {
        path.to_native(&self.root)
    }

    fn ensure_existing_within_root(&self, path: &AppDataPath, native: &Path) -> FsResult<()> {
        let canonical = fs::canonicalize(native).map_err(|err| FsError::from_io(path, err))?;
        if canonical.starts_with(&self.root) {
            Ok(())
        } else {
            Err(FsError::io(path, "path resolves outside scoped app-data root"))
        }
    }

    fn ensure_parent_within_root(&self, path: &AppDataPath, native: &Path) -> FsResult<()> {
        let parent_path = path.parent().unwrap_or_default();
        let parent = native
            .parent()
            .ok_or_else(|| FsError::invalid_input(format!("path `{path}` has no parent")))?;
        let canonical_parent =
            fs::canonicalize(parent).map_err(|err| FsError::from_io(&parent_path, err))?;
        if canonical_parent.starts_with(&self.root) {
            Ok(())
        } else {
            Err(FsError::io(
                path,
                "path parent resolves outside scoped app-data root",
            ))
        }
    }

    fn ensure_nearest_ancestor_within_root(
        &self,
        path: &AppDataPath,
        native: &Path,
    ) -> FsResult<()> {
        let existing = native
            .ancestors()
            .find(|candidate| candidate.exists())
            .ok_or_else(|| FsError::not_found(path))?;
        let canonical = fs::canonicalize(existing).map_err(|err| FsError::from_io(path, err))?;
        if canonical.starts_with(&self.root) {
            Ok(())
        } else {
            Err(FsError::io(path, "path resolves outside scoped app-data root"))
        }
    }

    fn read_dir_now(&self, path: &AppDataPath) -> FsResult<Vec<HostDirEntry>> {
        let native = self.native(path);
        self.ensure_existing_within_root(path, &native)?;

        let meta = fs::metadata(&native).map_err(|err| FsError::from_io(path, err))?;
        if !meta.is_dir() {
            return Err(FsError::invalid_input(format!(
                "path `{path}` is not a directory"
            )));
        }

        let mut entries = Vec::new();
        for entry in fs::read_dir(&native).map_err(|err| FsError::from_io(path, err))? {
            let entry = entry.map_err(|err| FsError::from_io(path, err))?;
            let raw_name = entry.file_name().to_string_lossy().to_string();
            let name = match EntryName::parse(&raw_name) {
                Ok(name) => name,
                Err(err) => {
                    tracing::warn!("skipping unrepresentable entry {raw_name:?} in {path}: {err}");
                    continue;
                }
            };
            let child_path = path.join(&name);
            let child_native = entry.path();
            if let Err(err) = self.ensure_existing_within_root(&child_path, &child_native) {
                tracing::warn!("skipping entry {child_path}: {err}");
                continue;
            }
            let child_meta =
                fs::metadata(&child_native).map_err(|err| FsError::from_io(&child_path, err))?;
            entries.push(HostDirEntry {
                name,
                stat: host_stat(&child_meta),
            });
        }
        Ok(entries)
    }

    fn make_dir_now(&self, path: &AppDataPath, intermediates: bool) -> FsResult<()> {
        let native = self.native(path);
        if path.is_root() {
            if !intermediates && native.is_dir() {
                return Err(FsError::already_exists(path));
            }
            return fs::create_dir_all(&native).map_err(|err| FsError::from_io(path, err));
        }

        if intermediates {
            self.ensure_nearest_ancestor_within_root(path, &native)?;
            fs::create_dir_all(&native).map_err(|err| FsError::from_io(path, err))
        } else {
            self.ensure_parent_within_root(path, &native)?;
            fs::create_dir(&native).map_err(|err| FsError::from_io(path, err))
        }
    }

    fn read_text_now(&self, path: &AppDataPath) -> FsResult<String> {
        let native = self.native(path);
        self.ensure_existing_within_root(path, &native)?;
        let meta = fs::metadata(&native).map_err(|err| FsError::from_io(path, err))?;
        if !meta.is_file() {
            return Err(FsError::invalid_input(format!("path `{path}` is not a file")));
        }
        fs::read_to_string(&native).map_err(|err| FsError::from_io(path, err))
    }

    fn write_text_now(&self, path: &AppDataPath, text: &str) -> FsResult<()> {
        if path.is_root() {
            return Err(FsError::invalid_input("cannot write to app-data root"));
        }
        let native = self.native(path);
        self.ensure_parent_within_root(path, &native)?;
        if exists_without_following(&native) {
            self.ensure_existing_within_root(path, &native)?;
            if native.is_dir() {
                return Err(FsError::invalid_input(format!("path `{path}` is not a file")));
            }
        }
        fs::write(&native, text).map_err(|err| FsError::from_io(path, err))
    }

    fn delete_now(&self, path: &AppDataPath) -> FsResult<()> {
        if path.is_root() {
            return Err(FsError::invalid_input("cannot delete app-data root"));
        }
        let native = self.native(path);
        let Ok(meta) = fs::symlink_metadata(&native) else {
            return Ok(());
        };
        self.ensure_parent_within_root(path, &native)?;

        let removed = if meta.is_dir() {
            fs::remove_dir_all(&native)
        } else {
            fs::remove_file(&native)
        };
        match removed {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(FsError::from_io(path, err)),
            _ => Ok(()),
        }
    }

    fn rename_now(&self, from: &AppDataPath, to: &AppDataPath) -> FsResult<()> {
        if from.is_root() || to.is_root() {
            return Err(FsError::invalid_input("cannot move the app-data root"));
        }
        let from_native = self.native(from);
        let to_native = self.native(to);
        if !exists_without_following(&from_native) {
            return Err(FsError::not_found(from));
        }
        self.ensure_parent_within_root(from, &from_native)?;
        self.ensure_parent_within_root(to, &to_native)?;
        if exists_without_following(&to_native) {
            return Err(FsError::already_exists(to));
        }
        fs::rename(&from_native, &to_native).map_err(|err| FsError::from_io(from, err))
    }

    fn stat_now(&self, path: &AppDataPath) -> FsResult<Option<HostStat>> {
        let native = self.native(path);
        if !exists_without_following(&native) {
            return Ok(None);
        }
        match self.ensure_existing_within_root(path, &native) {
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
            Ok(()) => {}
        }
        let meta = fs::metadata(&native).map_err(|err| FsError::from_io(path, err))?;
        Ok(Some(host_stat(&meta)))
    }

    fn disk_now(&self) -> FsResult<crate::disk::DiskSpace> {
        disk_space(&self.root).map_err(|err| FsError::io(AppDataPath::root(), err.to_string()))
    }
}

impl HostFs for ScopedNativeFs {
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
        Box::pin(async move { self.delete_now(path) })
    }

    fn rename<'a>(
        &'a self,
        from: &'a AppDataPath,
        to: &'a AppDataPath,
    ) -> HostFsFuture<'a, FsResult<()>> {
        Box::pin(async move { self.rename_now(from, to) })
    }

    fn stat<'a>(&'a self, path: &'a AppDataPath) -> HostFsFuture<'a, FsResult<Option<HostStat>>> {
        Box::pin(async move { self.stat_now(path) })
    }

    fn free_disk_bytes<'a>(&'a self) -> HostFsFuture<'a, FsResult<u64>> {
        Box::pin(async move { self.disk_now().map(|space| space.free_bytes) })
    }

    fn total_disk_bytes<'a>(&'a self) -> HostFsFuture<'a, FsResult<u64>> {
        Box::pin(async move { self.disk_now().map(|space| space.total_bytes) })
    }
}
