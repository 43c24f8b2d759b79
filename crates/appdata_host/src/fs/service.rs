//! Host filesystem capability contract.

use std::{future::Future, pin::Pin};

use super::error::FsResult;
use super::path::AppDataPath;
use super::types::{HostDirEntry, HostStat};

/// Object-safe boxed future used by [`HostFs`] async methods.
pub type HostFsFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Host-provided filesystem capability over the app-data tree.
///
/// Adapters resolve [`AppDataPath`] values against their own root. Every call is a single point
/// operation: no retries, batching, or caching.
pub trait HostFs {
    /// Lists the direct children of a directory.
    fn read_dir<'a>(&'a self, path: &'a AppDataPath) -> HostFsFuture<'a, FsResult<Vec<HostDirEntry>>>;

    /// Creates a directory, optionally creating missing ancestors.
    ///
    /// With `intermediates` set, an existing directory is not an error.
    fn make_dir<'a>(
        &'a self,
        path: &'a AppDataPath,
        intermediates: bool,
    ) -> HostFsFuture<'a, FsResult<()>>;

    /// Reads a file as UTF-8 text.
    fn read_text<'a>(&'a self, path: &'a AppDataPath) -> HostFsFuture<'a, FsResult<String>>;

    /// Writes UTF-8 text, creating or fully replacing the file.
    fn write_text<'a>(
        &'a self,
        path: &'a AppDataPath,
        text: &'a str,
    ) -> HostFsFuture<'a, FsResult<()>>;

    /// Deletes a file or, recursively, a directory. Missing paths are not an error.
    fn delete<'a>(&'a self, path: &'a AppDataPath) -> HostFsFuture<'a, FsResult<()>>;

    /// Moves `from` to `to`.
    fn rename<'a>(
        &'a self,
        from: &'a AppDataPath,
        to: &'a AppDataPath,
    ) -> HostFsFuture<'a, FsResult<()>>;

    /// Returns stat data, or `None` when nothing exists at `path`.
    fn stat<'a>(&'a self, path: &'a AppDataPath) -> HostFsFuture<'a, FsResult<Option<HostStat>>>;

    /// Free space on the device backing the app-data root.
    fn free_disk_bytes<'a>(&'a self) -> HostFsFuture<'a, FsResult<u64>>;

    /// Total capacity of the device backing the app-data root.
    fn total_disk_bytes<'a>(&'a self) -> HostFsFuture<'a, FsResult<u64>>;
}
