//! File System Types
//!
//! Core types and traits shared by every backend.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Read, Seek, Write};
use std::path::Path;
use std::time::SystemTime;

use thiserror::Error;

/// File system errors
#[derive(Error, Debug)]
pub enum FsError {
    /// `source` is the host error when the backend forwards to one.
    #[error("ENOENT: no such file or directory, {operation} '{path}'")]
    NotFound {
        path: String,
        operation: String,
        #[source]
        source: Option<io::Error>,
    },

    #[error("ENOSYS: function not implemented, {operation} '{path}'")]
    Unimplemented {
        path: String,
        operation: String,
        #[source]
        source: Option<io::Error>,
    },

    #[error("EBADF: bad file descriptor, {operation} '{path}'")]
    Closed { path: String, operation: String },

    #[error("EINVAL: invalid argument, {operation} '{path}'")]
    InvalidArgument { path: String, operation: String },

    #[error("{operation} '{path}': {source}")]
    Io {
        path: String,
        operation: String,
        #[source]
        source: io::Error,
    },
}

pub type FsResult<T> = Result<T, FsError>;

impl FsError {
    pub fn not_found(path: &str, operation: &str) -> Self {
        FsError::NotFound {
            path: path.to_string(),
            operation: operation.to_string(),
            source: None,
        }
    }

    pub fn unimplemented(path: &str, operation: &str) -> Self {
        FsError::Unimplemented {
            path: path.to_string(),
            operation: operation.to_string(),
            source: None,
        }
    }

    pub fn closed(path: &str, operation: &str) -> Self {
        FsError::Closed {
            path: path.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Wrap an error reported by the host, keeping the original as the source.
    ///
    /// Missing paths and unsupported operations land in their own variants so
    /// callers can match on them the same way for every backend. The host error
    /// is kept as the source either way.
    pub fn from_io(path: &str, operation: &str, err: io::Error) -> Self {
        let path = path.to_string();
        let operation = operation.to_string();
        match err.kind() {
            io::ErrorKind::NotFound => FsError::NotFound {
                path,
                operation,
                source: Some(err),
            },
            io::ErrorKind::Unsupported => FsError::Unimplemented {
                path,
                operation,
                source: Some(err),
            },
            _ => FsError::Io { path, operation, source: err },
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FsError::NotFound { .. })
    }
}

impl From<FsError> for io::Error {
    fn from(err: FsError) -> Self {
        let kind = match err {
            FsError::Io { source, .. }
            | FsError::NotFound { source: Some(source), .. }
            | FsError::Unimplemented { source: Some(source), .. } => return source,
            FsError::NotFound { .. } => io::ErrorKind::NotFound,
            FsError::Unimplemented { .. } => io::ErrorKind::Unsupported,
            FsError::InvalidArgument { .. } => io::ErrorKind::InvalidInput,
            FsError::Closed { .. } => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

/// Metadata for a file, from `FileSystem::stat` or `File::stat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Final component of the path the file was reached through.
    pub name: String,
    pub size: u64,
    pub is_dir: bool,
    /// Backends that do not track timestamps report `None`.
    pub modified: Option<SystemTime>,
}

impl FileInfo {
    pub fn from_metadata(path: &str, metadata: &std::fs::Metadata) -> Self {
        FileInfo {
            name: base_name(path),
            size: metadata.len(),
            is_dir: metadata.is_dir(),
            modified: metadata.modified().ok(),
        }
    }
}

/// Final component of `path`, or the whole path when it has none (e.g. `/`).
pub fn base_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// File content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Binary(Vec<u8>),
}

impl FileContent {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            FileContent::Text(s) => s.into_bytes(),
            FileContent::Binary(b) => b,
        }
    }
}

impl From<String> for FileContent {
    fn from(s: String) -> Self {
        FileContent::Text(s)
    }
}

impl From<&str> for FileContent {
    fn from(s: &str) -> Self {
        FileContent::Text(s.to_string())
    }
}

impl From<Vec<u8>> for FileContent {
    fn from(v: Vec<u8>) -> Self {
        FileContent::Binary(v)
    }
}

/// Initial files map type
pub type InitialFiles = HashMap<String, FileContent>;

/// An open file handle.
///
/// Sequential access goes through `Read`, `Write` and `Seek`; each handle
/// keeps its own cursor. Once `close` has succeeded every other operation on
/// the handle fails with `FsError::Closed`.
pub trait File: Read + Write + Seek + Send + fmt::Debug {
    /// Path the handle was obtained with.
    fn name(&self) -> &str;

    /// Read at an absolute offset without touching the cursor.
    ///
    /// Returns a short count, possibly zero, when the read runs past the end.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> FsResult<usize>;

    /// Metadata for the file behind this handle.
    fn stat(&self) -> FsResult<FileInfo>;

    /// Release the handle.
    fn close(&mut self) -> FsResult<()>;
}

/// Abstract filesystem interface that can be implemented by different backends.
pub trait FileSystem: Send + Sync {
    /// Open an existing file. Never creates one.
    fn open(&self, path: &str) -> FsResult<Box<dyn File>>;

    /// Create a file, truncating whatever was at `path`.
    fn create(&self, path: &str) -> FsResult<Box<dyn File>>;

    /// Get file information without opening a handle
    fn stat(&self, path: &str) -> FsResult<FileInfo>;

    /// Move a file to a new path, replacing any file already there
    fn rename(&self, from: &str, to: &str) -> FsResult<()>;

    /// Read the whole contents of a file
    fn read_file(&self, path: &str) -> FsResult<Vec<u8>>;

    /// Check if a path exists
    fn exists(&self, path: &str) -> bool {
        self.stat(path).is_ok()
    }

    /// Write content to a file, creating it if it doesn't exist
    fn write_file(&self, path: &str, content: &[u8]) -> FsResult<()> {
        let mut file = self.create(path)?;
        file.write_all(content)
            .map_err(|e| FsError::from_io(path, "write", e))?;
        file.close()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_maps_not_found() {
        let err = FsError::from_io("a.txt", "open", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "ENOENT: no such file or directory, open 'a.txt'");
    }

    #[test]
    fn test_from_io_keeps_host_error_for_not_found() {
        let err = FsError::from_io("a.txt", "open", io::Error::from_raw_os_error(2));
        assert!(err.is_not_found());

        let source = std::error::Error::source(&err)
            .and_then(|e| e.downcast_ref::<io::Error>())
            .unwrap();
        assert_eq!(source.raw_os_error(), Some(2));

        let back: io::Error = err.into();
        assert_eq!(back.raw_os_error(), Some(2));
    }

    #[test]
    fn test_not_found_without_host_error() {
        let err = FsError::not_found("a.txt", "open");
        assert!(std::error::Error::source(&err).is_none());
        let back: io::Error = err.into();
        assert_eq!(back.kind(), io::ErrorKind::NotFound);
        assert!(back.raw_os_error().is_none());
    }

    #[test]
    fn test_from_io_maps_unsupported() {
        let err = FsError::from_io("a.txt", "read_at", io::Error::from(io::ErrorKind::Unsupported));
        assert!(matches!(err, FsError::Unimplemented { .. }));
    }

    #[test]
    fn test_from_io_keeps_underlying_error() {
        let err = FsError::from_io(
            "a.txt",
            "create",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        match &err {
            FsError::Io { source, .. } => assert_eq!(source.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("unexpected error: {other:?}"),
        }

        let back: io::Error = err.into();
        assert_eq!(back.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(back.to_string(), "denied");
    }

    #[test]
    fn test_into_io_error_kinds() {
        let not_found: io::Error = FsError::not_found("x", "open").into();
        assert_eq!(not_found.kind(), io::ErrorKind::NotFound);

        let closed: io::Error = FsError::closed("x", "read").into();
        assert_eq!(closed.kind(), io::ErrorKind::Other);
        assert!(closed.to_string().starts_with("EBADF"));
    }

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("a.txt"), "a.txt");
        assert_eq!(base_name("/tmp/dir/b.txt"), "b.txt");
        assert_eq!(base_name("/"), "/");
    }

    #[test]
    fn test_file_content_into_bytes() {
        assert_eq!(FileContent::from("hi").into_bytes(), b"hi".to_vec());
        assert_eq!(FileContent::from(vec![0u8, 1, 2]).into_bytes(), vec![0, 1, 2]);
    }
}
