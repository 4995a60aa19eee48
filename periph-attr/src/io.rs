//! Attribute file I/O backends
//!
//! The store never touches the filesystem directly; it goes through an
//! [`AttributeIo`] so the same code runs against sysfs and against an
//! in-memory tree in tests.

use std::collections::{HashMap, HashSet};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

/// Raw read/write access to attribute files
pub trait AttributeIo: Send + Sync {
    /// Read the whole file
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Replace the file content
    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()>;
}

/// Real filesystem access (sysfs)
#[derive(Debug, Default, Clone, Copy)]
pub struct SysfsIo;

impl AttributeIo for SysfsIo {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.write_all(data)?;
        file.flush()
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    files: HashMap<PathBuf, Vec<u8>>,
    denied: HashSet<PathBuf>,
    reads: HashMap<PathBuf, usize>,
    writes: HashMap<PathBuf, usize>,
}

/// In-memory attribute tree with per-path access counters
#[derive(Debug, Default)]
pub struct MemoryIo {
    state: Mutex<MemoryState>,
}

impl MemoryIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a file
    pub fn insert(&self, path: impl Into<PathBuf>, content: impl AsRef<[u8]>) {
        self.state
            .lock()
            .files
            .insert(path.into(), content.as_ref().to_vec());
    }

    /// Remove a file so further reads fail with `NotFound`
    pub fn remove(&self, path: &Path) -> Option<Vec<u8>> {
        self.state.lock().files.remove(path)
    }

    /// Make every access to `path` fail with `PermissionDenied`
    pub fn deny(&self, path: impl Into<PathBuf>) {
        self.state.lock().denied.insert(path.into());
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.state.lock().files.get(path).cloned()
    }

    /// Contents as lossy UTF-8
    pub fn text(&self, path: &Path) -> Option<String> {
        self.contents(path)
            .map(|c| String::from_utf8_lossy(&c).into_owned())
    }

    /// Number of read attempts on `path`, failed ones included
    pub fn read_count(&self, path: &Path) -> usize {
        self.state.lock().reads.get(path).copied().unwrap_or(0)
    }

    /// Number of write attempts on `path`, failed ones included
    pub fn write_count(&self, path: &Path) -> usize {
        self.state.lock().writes.get(path).copied().unwrap_or(0)
    }

    pub fn total_reads(&self) -> usize {
        self.state.lock().reads.values().sum()
    }
}

impl AttributeIo for MemoryIo {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let mut state = self.state.lock();
        *state.reads.entry(path.to_path_buf()).or_default() += 1;
        if state.denied.contains(path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
        }
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such attribute"))
    }

    fn write(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut state = self.state.lock();
        *state.writes.entry(path.to_path_buf()).or_default() += 1;
        if state.denied.contains(path) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"));
        }
        state.files.insert(path.to_path_buf(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_counts_accesses() {
        let io = MemoryIo::new();
        let path = Path::new("/dev0/brightness");
        io.insert(path, "10");

        assert_eq!(io.read(path).unwrap(), b"10");
        io.write(path, b"20").unwrap();
        assert_eq!(io.read(path).unwrap(), b"20");

        assert_eq!(io.read_count(path), 2);
        assert_eq!(io.write_count(path), 1);
    }

    #[test]
    fn test_memory_missing_and_denied() {
        let io = MemoryIo::new();
        let missing = Path::new("/dev0/missing");
        assert_eq!(io.read(missing).unwrap_err().kind(), io::ErrorKind::NotFound);

        let locked = Path::new("/dev0/locked");
        io.insert(locked, "1");
        io.deny(locked);
        assert_eq!(
            io.write(locked, b"0").unwrap_err().kind(),
            io::ErrorKind::PermissionDenied
        );
        assert_eq!(io.text(locked).as_deref(), Some("1"));
    }

    #[test]
    fn test_sysfs_write_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matrix_brightness");
        fs::write(&path, "255\n").unwrap();

        SysfsIo.write(&path, b"7").unwrap();
        assert_eq!(SysfsIo.read(&path).unwrap(), b"7");
    }
}
