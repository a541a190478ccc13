//! FileOps trait — abstract interface for every file access.
//!
//! The transformer, the merge pipeline and the sorter never touch
//! `std::fs` directly; they go through this trait.
//! `live.rs` provides the real OS-backed implementation.
//! `fake.rs` provides an in-memory test double with failure injection.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Unified blocking interface over the file system.
///
/// Implementations must be `Send + Sync` so one instance can be shared
/// behind an `Arc` by every worker of a run.
pub trait FileOps: Send + Sync {
    /// Opens an existing file for reading.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;

    /// Creates a new, uniquely named file whose name starts with `prefix`.
    ///
    /// The file outlives the returned writer; the caller owns its removal.
    fn create_temp(&self, prefix: &str) -> io::Result<(PathBuf, Box<dyn Write + Send>)>;

    /// Moves `from` onto `to`, replacing `to` if it exists.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove(&self, path: &Path) -> io::Result<()>;

    fn is_file(&self, path: &Path) -> bool;
}
