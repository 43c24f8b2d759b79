//! Typed host-domain contracts for the sandboxed app-data file manager.
//!
//! This crate is the API-first boundary between the file manager and whatever provides the
//! filesystem. It exposes the root-confined [`AppDataPath`] value, listing/metadata/storage
//! models, the [`FsError`] taxonomy, and the object-safe [`HostFs`] capability, together with an
//! in-memory adapter. The native `std::fs` adapter lives in `appdata_native`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod fs;
pub mod time;

pub use fs::error::{FsError, FsResult};
pub use fs::memory::{MemoryHostFs, DEFAULT_MEMORY_CAPACITY_BYTES};
pub use fs::path::{AppDataPath, EntryName, SEPARATOR};
pub use fs::service::{HostFs, HostFsFuture};
pub use fs::types::{
    DirectoryListing, EntryKind, FileMetadata, HostDirEntry, HostStat, ListingEntry,
    StorageStats, TEXT_FILE_EXTENSION,
};
pub use time::{next_monotonic_timestamp_ms, unix_time_ms, unix_time_ms_now};
