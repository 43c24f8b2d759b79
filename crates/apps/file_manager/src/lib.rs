//! Sandboxed app-data file manager.
//!
//! [`AppDataFiles`] is the thin operation facade over a [`appdata_host::HostFs`];
//! [`FileManagerSession`] holds the navigation/editing state and refreshes after every action;
//! [`Screen`] is the line-driven terminal front end used by the `appdata_files` binary.

pub mod config;
pub mod facade;
pub mod format;
pub mod logging;
pub mod screen;
pub mod session;

pub use config::{ConfigError, ConfigLoader, FileManagerConfig};
pub use facade::AppDataFiles;
pub use screen::{Flow, Screen};
pub use session::{
    Drafts, FileManagerSession, OpenFile, PendingAction, PhaseWatch, RefreshSnapshot,
    SessionError, SessionPhase,
};
