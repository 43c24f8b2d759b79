//! Domain operations over a [`HostFs`] capability.

use std::rc::Rc;

use appdata_host::{
    AppDataPath, DirectoryListing, EntryKind, EntryName, FileMetadata, FsError, FsResult, HostFs,
    ListingEntry, StorageStats, TEXT_FILE_EXTENSION,
};

#[derive(Clone)]
/// File-management facade scoped to the app-data root.
///
/// Each method is one point operation against the host: nothing is retried, batched, or cached.
pub struct AppDataFiles {
    host: Rc<dyn HostFs>,
}

impl AppDataFiles {
    /// Wraps a host filesystem capability.
    pub fn new(host: Rc<dyn HostFs>) -> Self {
        Self { host }
    }

    /// Creates the app-data root (and missing ancestors) if absent.
    pub async fn ensure_root(&self) -> FsResult<()> {
        tracing::debug!("ensuring app-data root exists");
        self.host.make_dir(&AppDataPath::root(), true).await
    }

    /// Lists the direct children of `path`, directories first.
    pub async fn list(&self, path: &AppDataPath) -> FsResult<DirectoryListing> {
        let children = self.host.read_dir(path).await?;
        let listing = DirectoryListing::from_host(path, children);
        tracing::debug!(path = %path, entries = listing.len(), "listed directory");
        Ok(listing)
    }

    /// Creates the folder `path/name/`.
    pub async fn create_folder(&self, path: &AppDataPath, name: &str) -> FsResult<AppDataPath> {
        let name = EntryName::parse(name)?;
        self.require_dir(path).await?;
        let target = path.join(&name);
        if self.host.stat(&target).await?.is_some() {
            return Err(FsError::already_exists(&target));
        }
        self.host.make_dir(&target, false).await?;
        tracing::debug!(path = %target, "created folder");
        Ok(target)
    }

    /// Creates `path/name.txt` with `content`. The extension is always appended.
    pub async fn create_file(
        &self,
        path: &AppDataPath,
        name: &str,
        content: &str,
    ) -> FsResult<AppDataPath> {
        let name = EntryName::parse(name)?.with_appended_extension(TEXT_FILE_EXTENSION);
        self.require_dir(path).await?;
        let target = path.join(&name);
        if self.host.stat(&target).await?.is_some() {
            return Err(FsError::already_exists(&target));
        }
        self.host.write_text(&target, content).await?;
        tracing::debug!(path = %target, bytes = content.len(), "created file");
        Ok(target)
    }

    /// Reads the full text of `path/name`.
    pub async fn read_file(&self, path: &AppDataPath, name: &str) -> FsResult<String> {
        let target = path.join(&EntryName::parse(name)?);
        self.host.read_text(&target).await
    }

    /// Replaces the full text of the existing file `path/name`.
    ///
    /// Writing never creates: a missing file is [`FsError::NotFound`].
    pub async fn write_file(&self, path: &AppDataPath, name: &str, content: &str) -> FsResult<()> {
        let target = path.join(&EntryName::parse(name)?);
        match self.host.stat(&target).await? {
            None => return Err(FsError::not_found(&target)),
            Some(stat) if stat.kind == EntryKind::Directory => {
                return Err(FsError::invalid_input(format!(
                    "path `{target}` is not a file"
                )))
            }
            Some(_) => {}
        }
        self.host.write_text(&target, content).await?;
        tracing::debug!(path = %target, bytes = content.len(), "saved file");
        Ok(())
    }

    /// Deletes `path/name`, recursively for folders. Missing items are not an error.
    pub async fn delete_item(&self, path: &AppDataPath, name: &str) -> FsResult<()> {
        let target = path.join(&EntryName::parse(name)?);
        self.host.delete(&target).await?;
        tracing::debug!(path = %target, "deleted item");
        Ok(())
    }

    /// Renames `path/old_name` to `path/new_name` and returns the renamed entry.
    ///
    /// The returned entry's label keeps the `/` suffix when a folder was renamed.
    pub async fn rename_item(
        &self,
        path: &AppDataPath,
        old_name: &str,
        new_name: &str,
    ) -> FsResult<ListingEntry> {
        let old_name = EntryName::parse(old_name)?;
        let new_name = EntryName::parse(new_name)?;
        if old_name == new_name {
            return Err(FsError::invalid_input(format!(
                "`{old_name}` already has that name"
            )));
        }

        let source = path.join(&old_name);
        let destination = path.join(&new_name);
        if self.host.stat(&source).await?.is_none() {
            return Err(FsError::not_found(&source));
        }
        if self.host.stat(&destination).await?.is_some() {
            return Err(FsError::already_exists(&destination));
        }
        self.host.rename(&source, &destination).await?;
        tracing::debug!(from = %source, to = %destination, "renamed item");

        let stat = self
            .host
            .stat(&destination)
            .await?
            .ok_or_else(|| FsError::not_found(&destination))?;
        Ok(ListingEntry::new(path, new_name, stat))
    }

    /// Returns metadata for `path/name`; missing or unreadable entries report `exists: false`.
    pub async fn stat_item(&self, path: &AppDataPath, name: &str) -> FileMetadata {
        let Ok(name) = EntryName::parse(name) else {
            return FileMetadata::missing(format!("{}{name}", path.dir_string()));
        };
        let target = path.join(&name);
        match self.host.stat(&target).await {
            Ok(Some(stat)) => FileMetadata::from_stat(&target, stat),
            Ok(None) => FileMetadata::missing(target.to_string()),
            Err(err) => {
                tracing::warn!("stat of {target} failed: {err}");
                FileMetadata::missing(target.to_string())
            }
        }
    }

    /// Device-wide storage capacity.
    pub async fn storage_stats(&self) -> FsResult<StorageStats> {
        let total = self.host.total_disk_bytes().await?;
        let free = self.host.free_disk_bytes().await?;
        Ok(StorageStats::new(total, free))
    }

    async fn require_dir(&self, path: &AppDataPath) -> FsResult<()> {
        match self.host.stat(path).await? {
            Some(stat) if stat.kind == EntryKind::Directory => Ok(()),
            Some(_) => Err(FsError::invalid_input(format!(
                "path `{path}` is not a directory"
            ))),
            None => Err(FsError::not_found(path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use appdata_host::MemoryHostFs;
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;

    use super::*;

    fn files() -> (MemoryHostFs, AppDataFiles) {
        let host = MemoryHostFs::default();
        let files = AppDataFiles::new(Rc::new(host.clone()));
        (host, files)
    }

    fn path(raw: &str) -> AppDataPath {
        AppDataPath::parse(raw).expect("path")
    }

    #[test]
    fn ensure_root_is_idempotent() {
        let host = MemoryHostFs::without_root(1024);
        let files = AppDataFiles::new(Rc::new(host.clone()));
        block_on(files.ensure_root()).expect("create root");
        block_on(files.ensure_root()).expect("root already present");
        assert!(host.exists(&AppDataPath::root()));
    }

    #[test]
    fn list_suffixes_directories_only() {
        let (_, files) = files();
        let root = AppDataPath::root();
        block_on(files.create_folder(&root, "docs")).expect("folder");
        block_on(files.create_file(&root, "note", "hi")).expect("file");

        let listing = block_on(files.list(&root)).expect("list");
        assert_eq!(listing.labels(), vec!["docs/", "note.txt"]);
    }

    #[test]
    fn create_folder_reports_conflicts_and_missing_parent() {
        let (_, files) = files();
        let root = AppDataPath::root();
        block_on(files.create_folder(&root, "docs")).expect("folder");

        assert_eq!(
            block_on(files.create_folder(&root, "docs")).expect_err("duplicate"),
            FsError::AlreadyExists("/docs".to_string())
        );
        assert_eq!(
            block_on(files.create_folder(&path("/missing"), "x")).expect_err("no parent"),
            FsError::NotFound("/missing".to_string())
        );
        assert!(matches!(
            block_on(files.create_folder(&root, "")),
            Err(FsError::InvalidInput(_))
        ));
        assert!(matches!(
            block_on(files.create_folder(&root, "..")),
            Err(FsError::InvalidInput(_))
        ));
    }

    #[test]
    fn create_file_always_appends_txt_and_reads_back() {
        let (_, files) = files();
        let root = AppDataPath::root();

        let created = block_on(files.create_file(&root, "note", "hi")).expect("create");
        assert_eq!(created.to_string(), "/note.txt");
        assert_eq!(block_on(files.read_file(&root, "note.txt")).expect("read"), "hi");

        let doubled = block_on(files.create_file(&root, "note.txt", "x")).expect("create");
        assert_eq!(doubled.to_string(), "/note.txt.txt");

        assert_eq!(
            block_on(files.create_file(&root, "note", "again")).expect_err("exists"),
            FsError::AlreadyExists("/note.txt".to_string())
        );
        block_on(files.create_file(&root, "empty", "")).expect("empty content is allowed");
    }

    #[test]
    fn write_file_replaces_content_and_never_creates() {
        let (_, files) = files();
        let root = AppDataPath::root();
        block_on(files.create_file(&root, "log", "first line that is long")).expect("create");

        block_on(files.write_file(&root, "log.txt", "short")).expect("write");
        assert_eq!(block_on(files.read_file(&root, "log.txt")).expect("read"), "short");

        assert_eq!(
            block_on(files.write_file(&root, "ghost.txt", "x")).expect_err("missing"),
            FsError::NotFound("/ghost.txt".to_string())
        );
        assert_eq!(
            block_on(files.read_file(&root, "ghost.txt")).expect_err("still missing"),
            FsError::NotFound("/ghost.txt".to_string())
        );
    }

    #[test]
    fn delete_item_is_recursive_and_idempotent() {
        let (host, files) = files();
        let root = AppDataPath::root();
        block_on(files.create_folder(&root, "docs")).expect("folder");
        block_on(files.create_file(&path("/docs"), "todo", "x")).expect("file");

        block_on(files.delete_item(&root, "docs/")).expect("delete");
        block_on(files.delete_item(&root, "docs/")).expect("second delete");
        assert!(!host.exists(&path("/docs/todo.txt")));
        assert!(block_on(files.list(&root)).expect("list").is_empty());
    }

    #[test]
    fn rename_item_moves_files_and_keeps_directory_suffix() {
        let (_, files) = files();
        let root = AppDataPath::root();
        block_on(files.create_file(&root, "a", "content")).expect("file");
        block_on(files.create_folder(&root, "old")).expect("folder");

        let renamed = block_on(files.rename_item(&root, "a.txt", "b.txt")).expect("rename file");
        assert_eq!(renamed.label(), "b.txt");
        let listing = block_on(files.list(&root)).expect("list");
        assert!(listing.contains("b.txt"));
        assert!(!listing.contains("a.txt"));

        let renamed = block_on(files.rename_item(&root, "old/", "new")).expect("rename dir");
        assert_eq!(renamed.label(), "new/");
        assert_eq!(renamed.path.to_string(), "/new");
    }

    #[test]
    fn rename_item_reports_conflicts() {
        let (_, files) = files();
        let root = AppDataPath::root();
        block_on(files.create_file(&root, "a", "1")).expect("a");
        block_on(files.create_file(&root, "b", "2")).expect("b");

        assert_eq!(
            block_on(files.rename_item(&root, "a.txt", "b.txt")).expect_err("occupied"),
            FsError::AlreadyExists("/b.txt".to_string())
        );
        assert_eq!(
            block_on(files.rename_item(&root, "zzz.txt", "c.txt")).expect_err("missing"),
            FsError::NotFound("/zzz.txt".to_string())
        );
        assert!(matches!(
            block_on(files.rename_item(&root, "a.txt", "a.txt")),
            Err(FsError::InvalidInput(_))
        ));
    }

    #[test]
    fn stat_item_never_fails() {
        let (_, files) = files();
        let root = AppDataPath::root();
        block_on(files.create_file(&root, "a", "four")).expect("file");

        let present = block_on(files.stat_item(&root, "a.txt"));
        assert!(present.exists);
        assert!(!present.is_directory);
        assert_eq!(present.size, Some(4));
        assert!(present.modified_at_unix_ms.is_some());

        let missing = block_on(files.stat_item(&root, "nope.txt"));
        assert_eq!(missing, FileMetadata::missing("/nope.txt"));

        let invalid = block_on(files.stat_item(&root, "../etc"));
        assert!(!invalid.exists);
    }

    #[test]
    fn storage_stats_used_equals_total_minus_free() {
        let host = MemoryHostFs::with_capacity(100);
        let files = AppDataFiles::new(Rc::new(host));
        block_on(files.create_file(&AppDataPath::root(), "a", "0123456789")).expect("file");

        let stats = block_on(files.storage_stats()).expect("stats");
        assert_eq!(stats.total_bytes(), 100);
        assert_eq!(stats.free_bytes(), 90);
        assert_eq!(stats.used_bytes(), stats.total_bytes() - stats.free_bytes());
    }

    #[test]
    fn docs_todo_scenario() {
        let (_, files) = files();
        let root = AppDataPath::root();
        assert!(block_on(files.list(&root)).expect("list").is_empty());

        block_on(files.create_folder(&root, "docs")).expect("folder");
        let docs = path("/docs/");
        block_on(files.create_file(&docs, "todo", "buy milk")).expect("file");

        assert_eq!(
            block_on(files.list(&docs)).expect("list docs").labels(),
            vec!["todo.txt"]
        );
        assert_eq!(
            block_on(files.read_file(&docs, "todo.txt")).expect("read"),
            "buy milk"
        );
    }
}
