//! In-Memory File System Implementation
//!
//! A volatile file system that keeps every file in a growable byte buffer.
//!
//! The registry owns one record per path. Handles share the record's buffer
//! and keep their own cursor, so a write through one handle is visible to every
//! other handle on the same file, the way descriptors on one inode behave.
//! Each `write` call is applied atomically; ordering writes across handles is
//! up to the caller.

use std::collections::HashMap;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::types::*;

type Record = Arc<RwLock<Vec<u8>>>;

/// In-memory virtual file system.
#[derive(Debug)]
pub struct InMemoryFs {
    data: RwLock<HashMap<String, Record>>,
}

impl InMemoryFs {
    /// Create a new empty in-memory filesystem.
    pub fn new() -> Self {
        Self { data: RwLock::new(HashMap::new()) }
    }

    /// Create with initial files.
    pub fn with_files(files: &InitialFiles) -> Self {
        let data = files
            .iter()
            .map(|(path, content)| {
                let bytes = content.clone().into_bytes();
                (path.clone(), Arc::new(RwLock::new(bytes)))
            })
            .collect();
        Self { data: RwLock::new(data) }
    }

    /// All registered paths, sorted.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.registry().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Snapshot of a file's bytes, or `None` if nothing is stored at `path`.
    pub fn contents(&self, path: &str) -> Option<Vec<u8>> {
        self.registry().get(path).map(|record| read_lock(record).clone())
    }

    fn registry(&self) -> RwLockReadGuard<'_, HashMap<String, Record>> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn registry_mut(&self) -> RwLockWriteGuard<'_, HashMap<String, Record>> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryFs {
    fn default() -> Self {
        Self::new()
    }
}

// A panic while holding a buffer lock cannot leave the Vec itself invalid.
fn read_lock(record: &Record) -> RwLockReadGuard<'_, Vec<u8>> {
    record.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_lock(record: &Record) -> RwLockWriteGuard<'_, Vec<u8>> {
    record.write().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// FileSystem trait implementation
// ============================================================================

impl FileSystem for InMemoryFs {
    fn open(&self, path: &str) -> FsResult<Box<dyn File>> {
        match self.registry().get(path) {
            Some(record) => Ok(Box::new(MemFile::new(path, Arc::clone(record)))),
            None => Err(FsError::not_found(path, "open")),
        }
    }

    fn create(&self, path: &str) -> FsResult<Box<dyn File>> {
        let mut data = self.registry_mut();
        let record = match data.get(path) {
            Some(existing) => {
                tracing::trace!("truncating {path}");
                write_lock(existing).clear();
                Arc::clone(existing)
            }
            None => {
                tracing::trace!("creating {path}");
                let record = Record::default();
                data.insert(path.to_string(), Arc::clone(&record));
                record
            }
        };
        Ok(Box::new(MemFile::new(path, record)))
    }

    fn stat(&self, path: &str) -> FsResult<FileInfo> {
        match self.registry().get(path) {
            Some(record) => Ok(mem_file_info(path, record)),
            None => Err(FsError::not_found(path, "stat")),
        }
    }

    fn rename(&self, from: &str, to: &str) -> FsResult<()> {
        let mut data = self.registry_mut();
        let record = data
            .remove(from)
            .ok_or_else(|| FsError::not_found(from, "rename"))?;
        tracing::trace!("renaming {from} -> {to}");
        data.insert(to.to_string(), record);
        Ok(())
    }

    fn read_file(&self, path: &str) -> FsResult<Vec<u8>> {
        self.contents(path)
            .ok_or_else(|| FsError::not_found(path, "open"))
    }
}

fn mem_file_info(path: &str, record: &Record) -> FileInfo {
    FileInfo {
        name: base_name(path),
        size: read_lock(record).len() as u64,
        is_dir: false,
        modified: None,
    }
}

// ============================================================================
// File handle
// ============================================================================

/// Handle onto a record of an [`InMemoryFs`].
#[derive(Debug)]
pub struct MemFile {
    name: String,
    record: Record,
    pos: u64,
    closed: bool,
}

impl MemFile {
    fn new(name: &str, record: Record) -> Self {
        Self {
            name: name.to_string(),
            record,
            pos: 0,
            closed: false,
        }
    }

    fn check_open(&self, operation: &str) -> FsResult<()> {
        if self.closed {
            return Err(FsError::closed(&self.name, operation));
        }
        Ok(())
    }
}

/// Copy from `content[offset..]` into `buf`, returning the count copied.
fn copy_from(content: &[u8], offset: u64, buf: &mut [u8]) -> usize {
    let start = match usize::try_from(offset) {
        Ok(start) if start < content.len() => start,
        _ => return 0,
    };
    let n = buf.len().min(content.len() - start);
    buf[..n].copy_from_slice(&content[start..start + n]);
    n
}

impl Read for MemFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.check_open("read")?;
        let n = copy_from(&read_lock(&self.record), self.pos, buf);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Write for MemFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check_open("write")?;
        let (start, end) = usize::try_from(self.pos)
            .ok()
            .and_then(|start| Some((start, start.checked_add(buf.len())?)))
            .ok_or_else(|| FsError::InvalidArgument {
                path: self.name.clone(),
                operation: "write".to_string(),
            })?;

        let mut content = write_lock(&self.record);
        if content.len() < end {
            let additional = end - content.len();
            content
                .try_reserve(additional)
                .map_err(|_| FsError::InvalidArgument {
                    path: self.name.clone(),
                    operation: "write".to_string(),
                })?;
            // Writing past the end zero-fills any gap left by a seek.
            content.resize(end, 0);
        }
        content[start..end].copy_from_slice(buf);
        self.pos = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.check_open("flush")?;
        Ok(())
    }
}

impl Seek for MemFile {
    fn seek(&mut self, style: SeekFrom) -> io::Result<u64> {
        self.check_open("seek")?;
        let (base, offset) = match style {
            SeekFrom::Start(n) => {
                self.pos = n;
                return Ok(n);
            }
            SeekFrom::End(n) => (read_lock(&self.record).len() as u64, n),
            SeekFrom::Current(n) => (self.pos, n),
        };
        match base.checked_add_signed(offset) {
            Some(n) => {
                self.pos = n;
                Ok(n)
            }
            None => Err(FsError::InvalidArgument {
                path: self.name.clone(),
                operation: "seek".to_string(),
            }
            .into()),
        }
    }
}

impl File for MemFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_at(&self, buf: &mut [u8], offset: u64) -> FsResult<usize> {
        self.check_open("read_at")?;
        Ok(copy_from(&read_lock(&self.record), offset, buf))
    }

    fn stat(&self) -> FsResult<FileInfo> {
        self.check_open("stat")?;
        Ok(mem_file_info(&self.name, &self.record))
    }

    fn close(&mut self) -> FsResult<()> {
        self.check_open("close")?;
        self.closed = true;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
