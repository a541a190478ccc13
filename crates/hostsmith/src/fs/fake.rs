//! Fake — test double for file operations.
//!
//! Provides a deterministic [`FakeFs`] that implements [`FileOps`] using an
//! in-memory file table. Failures can be injected per path or per operation
//! so error paths and temp-file cleanup can be asserted without touching disk.

use std::collections::{BTreeMap, HashSet};
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use super::ops::FileOps;

// ── In-memory state ─────────────────────────────────────────────

/// Mutable inner state protected by a mutex.
#[derive(Default)]
struct Inner {
    files: BTreeMap<PathBuf, Vec<u8>>,
    next_temp: u64,
    fail_open: HashSet<PathBuf>,
    fail_read: HashSet<PathBuf>,
    fail_create: bool,
    fail_rename: bool,
    fail_remove: bool,
}

/// An in-memory file system for deterministic testing.
///
/// Cloning shares the same file table.
#[derive(Clone, Default)]
pub struct FakeFs {
    inner: Arc<Mutex<Inner>>,
}

impl FakeFs {
    /// Create an empty fake file system.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file.
    pub fn add_file(&self, path: impl Into<PathBuf>, contents: impl AsRef<[u8]>) {
        self.inner
            .lock()
            .files
            .insert(path.into(), contents.as_ref().to_vec());
    }

    /// Make `open` fail for `path`.
    pub fn fail_open(&self, path: impl Into<PathBuf>) {
        self.inner.lock().fail_open.insert(path.into());
    }

    /// Make reads from `path` fail after it is opened.
    pub fn fail_read(&self, path: impl Into<PathBuf>) {
        self.inner.lock().fail_read.insert(path.into());
    }

    pub fn fail_create(&self, fail: bool) {
        self.inner.lock().fail_create = fail;
    }

    pub fn fail_rename(&self, fail: bool) {
        self.inner.lock().fail_rename = fail;
    }

    pub fn fail_remove(&self, fail: bool) {
        self.inner.lock().fail_remove = fail;
    }

    /// Contents of `path` as UTF-8, if it exists.
    pub fn read_to_string(&self, path: impl AsRef<Path>) -> Option<String> {
        self.inner
            .lock()
            .files
            .get(path.as_ref())
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Every path currently in the table, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.inner.lock().files.keys().cloned().collect()
    }
}

// ── FileOps implementation ──────────────────────────────────────

impl FileOps for FakeFs {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        let state = self.inner.lock();
        if state.fail_open.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("injected open failure: {}", path.display()),
            ));
        }
        if state.fail_read.contains(path) {
            return Ok(Box::new(FailingReader));
        }
        match state.files.get(path) {
            Some(bytes) => Ok(Box::new(Cursor::new(bytes.clone()))),
            None => Err(not_found(path)),
        }
    }

    fn create_temp(&self, prefix: &str) -> io::Result<(PathBuf, Box<dyn Write + Send>)> {
        let mut state = self.inner.lock();
        if state.fail_create {
            return Err(io::Error::other("injected create failure"));
        }
        state.next_temp += 1;
        let path = PathBuf::from(format!("/tmp/fake/{}{}", prefix, state.next_temp));
        state.files.insert(path.clone(), Vec::new());

        let writer = FakeWriter {
            path: path.clone(),
            inner: Arc::clone(&self.inner),
        };
        Ok((path, Box::new(writer)))
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut state = self.inner.lock();
        if state.fail_rename {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "injected rename failure",
            ));
        }
        let bytes = state.files.remove(from).ok_or_else(|| not_found(from))?;
        state.files.insert(to.to_path_buf(), bytes);
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        let mut state = self.inner.lock();
        if state.fail_remove {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "injected remove failure",
            ));
        }
        state.files.remove(path).map(|_| ()).ok_or_else(|| not_found(path))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.inner.lock().files.contains_key(path)
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such file: {}", path.display()),
    )
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::other("injected read failure"))
    }
}

/// Appends straight into the shared file table.
struct FakeWriter {
    path: PathBuf,
    inner: Arc<Mutex<Inner>>,
}

impl Write for FakeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.inner.lock();
        match state.files.get_mut(&self.path) {
            Some(file) => {
                file.extend_from_slice(buf);
                Ok(buf.len())
            }
            None => Err(not_found(&self.path)),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_and_open() {
        let fs = FakeFs::new();
        fs.add_file("/hosts", "example.com\n");

        let mut contents = String::new();
        fs.open(Path::new("/hosts"))
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "example.com\n");
    }

    #[test]
    fn test_create_temp_is_write_through() {
        let fs = FakeFs::new();
        let (path, mut writer) = fs.create_temp("p-").unwrap();
        assert_eq!(path, PathBuf::from("/tmp/fake/p-1"));

        writer.write_all(b"a\n").unwrap();
        assert_eq!(fs.read_to_string(&path).as_deref(), Some("a\n"));
    }

    #[test]
    fn test_rename_and_remove() {
        let fs = FakeFs::new();
        fs.add_file("/a", "x");
        fs.rename(Path::new("/a"), Path::new("/b")).unwrap();
        assert!(!fs.is_file(Path::new("/a")));
        assert!(fs.is_file(Path::new("/b")));

        fs.remove(Path::new("/b")).unwrap();
        assert!(fs.paths().is_empty());
        assert_eq!(
            fs.remove(Path::new("/b")).unwrap_err().kind(),
            io::ErrorKind::NotFound
        );
    }

    #[test]
    fn test_injected_failures() {
        let fs = FakeFs::new();
        fs.add_file("/locked", "x");
        fs.add_file("/broken", "x");
        fs.fail_open("/locked");
        fs.fail_read("/broken");

        assert!(fs.open(Path::new("/locked")).is_err());

        let mut buf = String::new();
        let err = fs
            .open(Path::new("/broken"))
            .unwrap()
            .read_to_string(&mut buf)
            .unwrap_err();
        assert!(err.to_string().contains("injected"));

        fs.fail_create(true);
        assert!(fs.create_temp("x").is_err());
    }
}
