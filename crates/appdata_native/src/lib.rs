//! Native host adapter for the app-data file manager.
//!
//! [`ScopedNativeFs`] implements [`appdata_host::HostFs`] over `std::fs`, confined to a canonical
//! root directory. Device capacity comes from [`disk::disk_space`] and the default root location
//! from [`root::default_app_data_root`].

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod disk;
pub mod root;
mod scoped;

pub use disk::{disk_space, DiskSpace};
pub use root::{default_app_data_root, APP_DATA_DIR_NAME, APP_DIR_NAME};
pub use scoped::ScopedNativeFs;
