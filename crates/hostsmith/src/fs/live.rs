//! Live — OS-backed implementation of [`FileOps`].

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::{Builder, NamedTempFile};

use super::ops::FileOps;

/// Real file system access. Temp files go to `temp_dir`, or the system
/// temp directory when it is unset.
#[derive(Debug, Clone, Default)]
pub struct OsFs {
    temp_dir: Option<PathBuf>,
}

impl OsFs {
    pub fn new(temp_dir: Option<PathBuf>) -> Self {
        Self { temp_dir }
    }

    fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

impl FileOps for OsFs {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(path)?))
    }

    fn create_temp(&self, prefix: &str) -> io::Result<(PathBuf, Box<dyn Write + Send>)> {
        let temp = Builder::new().prefix(prefix).tempfile_in(self.temp_dir())?;
        let (file, path) = temp.keep()?;
        Ok((path, Box::new(BufWriter::new(file))))
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(e),
            // Most likely a move across file systems: copy next to the
            // destination, then swap it in.
            Err(e) => {
                tracing::debug!(
                    "rename {} -> {} failed ({}), falling back to copy",
                    from.display(),
                    to.display(),
                    e
                );
                copy_into_place(from, to)?;
                fs::remove_file(from)
            }
        }
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }
}

fn copy_into_place(from: &Path, to: &Path) -> io::Result<()> {
    let parent = match to.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut staged = NamedTempFile::new_in(parent)?;
    io::copy(&mut File::open(from)?, staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    staged.persist(to)?;
    Ok(())
}
