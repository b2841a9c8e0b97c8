//! OS File System Implementation
//!
//! Forwards every operation to the host filesystem. Paths are passed through
//! untouched and host errors are wrapped with `FsError::from_io`.

use std::fs;
use std::io::{self, Read, Seek, SeekFrom, Write};

use super::types::*;

/// File system backed by the host operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFs;

impl OsFs {
    pub fn new() -> Self {
        OsFs
    }
}

impl FileSystem for OsFs {
    /// Opens read-only, as the host's `open` does.
    fn open(&self, path: &str) -> FsResult<Box<dyn File>> {
        let file = fs::File::open(path).map_err(|e| FsError::from_io(path, "open", e))?;
        Ok(Box::new(OsFile::new(path, file)))
    }

    fn create(&self, path: &str) -> FsResult<Box<dyn File>> {
        let file = fs::File::create(path).map_err(|e| FsError::from_io(path, "create", e))?;
        tracing::trace!("created {path}");
        Ok(Box::new(OsFile::new(path, file)))
    }

    fn stat(&self, path: &str) -> FsResult<FileInfo> {
        let metadata = fs::metadata(path).map_err(|e| FsError::from_io(path, "stat", e))?;
        Ok(FileInfo::from_metadata(path, &metadata))
    }

    fn rename(&self, from: &str, to: &str) -> FsResult<()> {
        fs::rename(from, to).map_err(|e| {
            // ENOENT covers both a missing source and a missing parent of `to`.
            let source_exists = fs::symlink_metadata(from).is_ok();
            let blamed = if e.kind() == io::ErrorKind::NotFound && source_exists {
                to
            } else {
                from
            };
            FsError::from_io(blamed, "rename", e)
        })?;
        tracing::trace!("renamed {from} -> {to}");
        Ok(())
    }

    fn read_file(&self, path: &str) -> FsResult<Vec<u8>> {
        fs::read(path).map_err(|e| FsError::from_io(path, "open", e))
    }
}

/// Owning wrapper around a host file handle.
#[derive(Debug)]
pub struct OsFile {
    name: String,
    inner: Option<fs::File>,
}

impl OsFile {
    fn new(name: &str, file: fs::File) -> Self {
        Self {
            name: name.to_string(),
            inner: Some(file),
        }
    }

    fn file(&self, operation: &str) -> FsResult<&fs::File> {
        self.inner
            .as_ref()
            .ok_or_else(|| FsError::closed(&self.name, operation))
    }

    fn file_mut(&mut self, operation: &str) -> FsResult<&mut fs::File> {
        self.inner
            .as_mut()
            .ok_or_else(|| FsError::closed(&self.name, operation))
    }
}

impl Read for OsFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file_mut("read")?.read(buf)
    }
}

impl Write for OsFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file_mut("write")?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file_mut("flush")?.flush()
    }
}

impl Seek for OsFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file_mut("seek")?.seek(pos)
    }
}

impl File for OsFile {
    fn name(&self) -> &str {
        &self.name
    }

    #[cfg(unix)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> FsResult<usize> {
        use std::os::unix::fs::FileExt;

        self.file("read_at")?
            .read_at(buf, offset)
            .map_err(|e| FsError::from_io(&self.name, "read_at", e))
    }

    // Other hosts only offer positional reads that move the cursor.
    #[cfg(not(unix))]
    fn read_at(&self, _buf: &mut [u8], _offset: u64) -> FsResult<usize> {
        self.file("read_at")?;
        Err(FsError::unimplemented(&self.name, "read_at"))
    }

    fn stat(&self) -> FsResult<FileInfo> {
        let metadata = self
            .file("stat")?
            .metadata()
            .map_err(|e| FsError::from_io(&self.name, "stat", e))?;
        Ok(FileInfo::from_metadata(&self.name, &metadata))
    }

    fn close(&mut self) -> FsResult<()> {
        match self.inner.take() {
            Some(file) => {
                drop(file);
                Ok(())
            }
            None => Err(FsError::closed(&self.name, "close")),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
