//! File System Module
//!
//! A uniform interface for opening, creating, stating and renaming files.
//! Two implementations:
//! - OsFs: Forwards to the host filesystem
//! - InMemoryFs: Volatile in-memory buffers, for hermetic tests

pub mod types;
pub mod in_memory_fs;
pub mod os_fs;

#[cfg(test)]
mod contract_tests;

pub use types::*;
pub use in_memory_fs::{InMemoryFs, MemFile};
pub use os_fs::{OsFs, OsFile};
