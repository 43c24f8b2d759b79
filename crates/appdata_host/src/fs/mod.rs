//! App-data filesystem contracts: paths, entry types, errors, and the host capability trait.

pub mod error;
pub mod memory;
pub mod path;
pub mod service;
pub mod types;
