//! Navigation and editing state for the file manager screen.
//!
//! [`FileManagerSession`] is an explicit state object: every user action performs one facade call
//! and then re-reads the current listing and storage stats before returning, so the screen always
//! renders from a fresh snapshot.

use std::cell::Cell;
use std::rc::Rc;

use appdata_host::{
    AppDataPath, DirectoryListing, EntryName, FileMetadata, FsError, FsResult, ListingEntry,
    StorageStats,
};
use thiserror::Error;

use crate::facade::AppDataFiles;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Busy/idle dimension of the session.
pub enum SessionPhase {
    /// No operation outstanding.
    #[default]
    Idle,
    /// Navigation or refresh listing in flight.
    Listing,
    /// Mutating (or file-opening) operation in flight.
    Mutating,
}

#[derive(Debug, Clone, Default)]
/// Shared view of the session phase so a screen can disable controls while busy.
pub struct PhaseWatch(Rc<Cell<SessionPhase>>);

impl PhaseWatch {
    /// Current phase.
    pub fn get(&self) -> SessionPhase {
        self.0.get()
    }

    /// Returns `true` while no operation is outstanding.
    pub fn is_idle(&self) -> bool {
        self.get() == SessionPhase::Idle
    }

    fn set(&self, phase: SessionPhase) {
        self.0.set(phase);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// File currently open for editing.
pub struct OpenFile {
    /// Directory the file was opened from.
    pub dir: AppDataPath,
    /// Name of the file inside [`OpenFile::dir`].
    pub name: EntryName,
    /// Editable in-memory content.
    pub buffer: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Action waiting for explicit user input before it runs.
pub enum PendingAction {
    /// Delete awaiting confirmation.
    Delete {
        /// Directory holding the item.
        dir: AppDataPath,
        /// Listing label of the item to delete.
        label: String,
    },
    /// Rename awaiting a new name.
    Rename {
        /// Directory holding the item.
        dir: AppDataPath,
        /// Listing label of the item to rename.
        label: String,
        /// New-name input, prefilled with the current name.
        input: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Text inputs for the create-folder and create-file forms.
pub struct Drafts {
    /// New folder name.
    pub folder_name: String,
    /// New file name (the `.txt` extension is appended on creation).
    pub file_name: String,
    /// Initial content for the new file.
    pub file_content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of an explicit [`FileManagerSession::refresh`].
pub struct RefreshSnapshot {
    /// Listing of the current directory.
    pub entries: DirectoryListing,
    /// Device storage snapshot.
    pub storage: StorageStats,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Failures surfaced by session actions.
pub enum SessionError {
    /// The action needs an open file.
    #[error("no file is open")]
    NoOpenFile,
    /// The action needs a pending delete or rename of the matching kind.
    #[error("nothing is awaiting confirmation")]
    NothingPending,
    /// The underlying filesystem call failed.
    #[error(transparent)]
    Fs(#[from] FsError),
}

/// Navigation/editing session over one app-data tree.
pub struct FileManagerSession {
    files: AppDataFiles,
    phase: PhaseWatch,
    current_path: AppDataPath,
    entries: DirectoryListing,
    storage: Option<StorageStats>,
    open_file: Option<OpenFile>,
    pending: Option<PendingAction>,
    drafts: Drafts,
}

impl FileManagerSession {
    /// Creates a session at the app-data root and loads its first snapshot.
    pub async fn open(files: AppDataFiles) -> Result<Self, SessionError> {
        let mut session = Self {
            files,
            phase: PhaseWatch::default(),
            current_path: AppDataPath::root(),
            entries: DirectoryListing::default(),
            storage: None,
            open_file: None,
            pending: None,
            drafts: Drafts::default(),
        };
        session.refresh().await?;
        Ok(session)
    }

    /// Directory currently displayed.
    pub fn current_path(&self) -> &AppDataPath {
        &self.current_path
    }

    /// Listing of [`Self::current_path`] from the last refresh.
    pub fn entries(&self) -> &DirectoryListing {
        &self.entries
    }

    /// Storage snapshot from the last refresh, if one succeeded.
    pub fn storage(&self) -> Option<&StorageStats> {
        self.storage.as_ref()
    }

    /// File open for editing, if any.
    pub fn open_file(&self) -> Option<&OpenFile> {
        self.open_file.as_ref()
    }

    /// Action awaiting confirmation or input, if any.
    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    /// Create-form inputs.
    pub fn drafts(&self) -> &Drafts {
        &self.drafts
    }

    /// Mutable create-form inputs.
    pub fn drafts_mut(&mut self) -> &mut Drafts {
        &mut self.drafts
    }

    /// Current busy/idle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase.get()
    }

    /// Shared handle observing the phase while an action is running.
    pub fn phase_watch(&self) -> PhaseWatch {
        self.phase.clone()
    }

    /// Re-reads the listing and storage stats for the current directory.
    pub async fn refresh(&mut self) -> Result<RefreshSnapshot, SessionError> {
        self.phase.set(SessionPhase::Listing);
        let reloaded = self.reload().await;
        self.phase.set(SessionPhase::Idle);
        reloaded?;
        Ok(RefreshSnapshot {
            entries: self.entries.clone(),
            storage: self.storage.unwrap_or_else(|| StorageStats::new(0, 0)),
        })
    }

    /// Enters the folder `label` (a listing label such as `docs/`).
    ///
    /// The current path only changes once the folder has been listed successfully.
    pub async fn open_folder(&mut self, label: &str) -> Result<(), SessionError> {
        let name = EntryName::parse(label)?;
        let target = self.current_path.join(&name);
        self.navigate(target).await
    }

    /// Moves to the parent directory; a no-op at the root.
    pub async fn go_up(&mut self) -> Result<(), SessionError> {
        let Some(parent) = self.current_path.parent() else {
            return Ok(());
        };
        self.navigate(parent).await
    }

    /// Reads `label` into the edit buffer without changing the current directory.
    pub async fn open_file_named(&mut self, label: &str) -> Result<(), SessionError> {
        self.phase.set(SessionPhase::Mutating);
        let outcome = self.files.read_file(&self.current_path, label).await;
        let text = self.finish(outcome).await?;
        self.open_file = Some(OpenFile {
            dir: self.current_path.clone(),
            name: EntryName::parse(label)?,
            buffer: text,
        });
        Ok(())
    }

    /// Replaces the edit buffer of the open file.
    pub fn set_buffer(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        let open = self.open_file.as_mut().ok_or(SessionError::NoOpenFile)?;
        open.buffer = text.into();
        Ok(())
    }

    /// Closes the open file without saving.
    pub fn close_file(&mut self) {
        self.open_file = None;
    }

    /// Writes the edit buffer back to the open file and closes it.
    ///
    /// The file is written in the directory it was opened from, wherever the session has
    /// navigated since. On failure the file stays open so the buffer is not lost.
    pub async fn save_file(&mut self) -> Result<(), SessionError> {
        let open = self.open_file.clone().ok_or(SessionError::NoOpenFile)?;
        self.phase.set(SessionPhase::Mutating);
        let outcome = self
            .files
            .write_file(&open.dir, open.name.as_str(), &open.buffer)
            .await;
        self.finish(outcome).await?;
        self.open_file = None;
        Ok(())
    }

    /// Creates a folder named by [`Drafts::folder_name`] and clears the input.
    pub async fn create_folder(&mut self) -> Result<(), SessionError> {
        if self.drafts.folder_name.is_empty() {
            return Err(FsError::invalid_input("folder name is required").into());
        }
        self.phase.set(SessionPhase::Mutating);
        let outcome = self
            .files
            .create_folder(&self.current_path, &self.drafts.folder_name)
            .await;
        self.finish(outcome).await?;
        self.drafts.folder_name.clear();
        Ok(())
    }

    /// Creates a `.txt` file from [`Drafts::file_name`] and [`Drafts::file_content`].
    ///
    /// Empty content is allowed. Both inputs are cleared on success.
    pub async fn create_file(&mut self) -> Result<(), SessionError> {
        if self.drafts.file_name.is_empty() {
            return Err(FsError::invalid_input("file name is required").into());
        }
        self.phase.set(SessionPhase::Mutating);
        let outcome = self
            .files
            .create_file(
                &self.current_path,
                &self.drafts.file_name,
                &self.drafts.file_content,
            )
            .await;
        self.finish(outcome).await?;
        self.drafts.file_name.clear();
        self.drafts.file_content.clear();
        Ok(())
    }

    /// Asks for confirmation before deleting the listed entry `label`.
    pub fn request_delete(&mut self, label: &str) -> Result<(), SessionError> {
        let label = self.listed_entry(label)?.label();
        self.pending = Some(PendingAction::Delete {
            dir: self.current_path.clone(),
            label,
        });
        Ok(())
    }

    /// Deletes the item awaiting confirmation.
    pub async fn confirm_delete(&mut self) -> Result<(), SessionError> {
        let (dir, label) = match self.pending.take() {
            Some(PendingAction::Delete { dir, label }) => (dir, label),
            other => {
                self.pending = other;
                return Err(SessionError::NothingPending);
            }
        };
        self.phase.set(SessionPhase::Mutating);
        let outcome = self.files.delete_item(&dir, &label).await;
        self.finish(outcome).await
    }

    /// Starts a rename of the listed entry `label`, prefilling the input with its bare name.
    pub fn begin_rename(&mut self, label: &str) -> Result<(), SessionError> {
        let entry = self.listed_entry(label)?;
        let (label, input) = (entry.label(), entry.name.to_string());
        self.pending = Some(PendingAction::Rename {
            dir: self.current_path.clone(),
            label,
            input,
        });
        Ok(())
    }

    /// Updates the new-name input of a pending rename.
    pub fn set_rename_input(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        match self.pending.as_mut() {
            Some(PendingAction::Rename { input, .. }) => {
                *input = text.into();
                Ok(())
            }
            _ => Err(SessionError::NothingPending),
        }
    }

    /// Renames the pending item to the entered name.
    ///
    /// The prompt stays open when the input is empty, unchanged, or the rename fails.
    pub async fn confirm_rename(&mut self) -> Result<ListingEntry, SessionError> {
        let Some(PendingAction::Rename { dir, label, input }) = self.pending.clone() else {
            return Err(SessionError::NothingPending);
        };
        if input.is_empty() {
            return Err(FsError::invalid_input("new name is required").into());
        }
        if EntryName::parse(&input)? == EntryName::parse(&label)? {
            return Err(FsError::invalid_input("choose a different name").into());
        }

        self.phase.set(SessionPhase::Mutating);
        let outcome = self
            .files
            .rename_item(&dir, &label, &input)
            .await;
        let renamed = self.finish(outcome).await?;
        self.pending = None;
        Ok(renamed)
    }

    /// Drops any pending delete or rename.
    pub fn cancel_pending(&mut self) {
        self.pending = None;
    }

    /// Metadata for one entry of the current directory.
    pub async fn item_info(&self, label: &str) -> FileMetadata {
        self.files.stat_item(&self.current_path, label).await
    }

    fn listed_entry(&self, label: &str) -> Result<&ListingEntry, SessionError> {
        let name = EntryName::parse(label)?;
        self.entries
            .find(name.as_str())
            .ok_or_else(|| FsError::not_found(&self.current_path.join(&name)).into())
    }

    /// Lists `target` and reads storage; nothing is committed unless both succeed.
    async fn navigate(&mut self, target: AppDataPath) -> Result<(), SessionError> {
        self.phase.set(SessionPhase::Listing);
        let loaded = match self.files.list(&target).await {
            Ok(listing) => self
                .files
                .storage_stats()
                .await
                .map(|storage| (listing, storage)),
            Err(err) => Err(err),
        };
        self.phase.set(SessionPhase::Idle);
        let (listing, storage) = loaded?;
        self.current_path = target;
        self.entries = listing;
        self.storage = Some(storage);
        tracing::debug!(path = %self.current_path, "navigated");
        Ok(())
    }

    async fn reload(&mut self) -> FsResult<()> {
        let entries = self.files.list(&self.current_path).await?;
        let storage = self.files.storage_stats().await?;
        self.entries = entries;
        self.storage = Some(storage);
        Ok(())
    }

    /// Refreshes after an operation and settles the phase back to idle.
    ///
    /// The refresh runs even when the operation failed; the operation's error wins.
    async fn finish<T>(&mut self, outcome: FsResult<T>) -> Result<T, SessionError> {
        self.phase.set(SessionPhase::Listing);
        let reloaded = self.reload().await;
        self.phase.set(SessionPhase::Idle);
        match (outcome, reloaded) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(refresh_err)) => Err(refresh_err.into()),
            (Err(err), reloaded) => {
                if let Err(refresh_err) = reloaded {
                    tracing::warn!("refresh after failed operation also failed: {refresh_err}");
                }
                Err(err.into())
            }
        }
    }
}
