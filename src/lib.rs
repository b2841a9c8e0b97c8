//! just-fs - A swappable file system abstraction
//!
//! Code written against [`FileSystem`] and [`File`] can run on the host
//! filesystem through [`OsFs`] or entirely in memory through [`InMemoryFs`].

pub mod fs;

pub use fs::{
    File, FileContent, FileInfo, FileSystem, FsError, FsResult, InMemoryFs, InitialFiles, OsFs,
};
