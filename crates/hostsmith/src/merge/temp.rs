//! Temp — ownership of intermediate files.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::fs::FileOps;

use super::MergeStage;

/// Process-unique name prefix for temp files of `stage`.
pub fn temp_prefix(stage: MergeStage) -> String {
    format!("hostsmith-{}-{}-", std::process::id(), stage)
}

/// Temp files owned by one operation. Whatever is still tracked is removed
/// by [`TempFiles::remove_all`] or, failing that, on drop.
pub struct TempFiles {
    fs: Arc<dyn FileOps>,
    paths: Vec<PathBuf>,
}

impl TempFiles {
    pub fn new(fs: Arc<dyn FileOps>) -> Self {
        Self {
            fs,
            paths: Vec::new(),
        }
    }

    pub fn track(&mut self, path: PathBuf) {
        self.paths.push(path);
    }

    /// Stop owning `path`, e.g. after it was renamed into place.
    pub fn release(&mut self, path: &Path) {
        self.paths.retain(|p| p != path);
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Removes every tracked file. Failures are logged, never returned;
    /// the number of files that could not be removed is.
    pub fn remove_all(&mut self) -> usize {
        let mut failures = 0;
        for path in self.paths.drain(..) {
            if let Err(e) = self.fs.remove(&path) {
                tracing::warn!("failed to remove temp file {}: {}", path.display(), e);
                failures += 1;
            }
        }
        failures
    }
}

impl Drop for TempFiles {
    fn drop(&mut self) {
        self.remove_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::FakeFs;

    #[test]
    fn test_temp_prefix_is_process_unique() {
        let prefix = temp_prefix(MergeStage::Sort);
        assert_eq!(prefix, format!("hostsmith-{}-sort-", std::process::id()));
    }

    #[test]
    fn test_remove_all_and_release() {
        let fs = FakeFs::new();
        fs.add_file("/t1", "");
        fs.add_file("/t2", "");

        let mut temps = TempFiles::new(Arc::new(fs.clone()));
        temps.track(PathBuf::from("/t1"));
        temps.track(PathBuf::from("/t2"));
        temps.release(Path::new("/t2"));
        assert_eq!(temps.len(), 1);

        assert_eq!(temps.remove_all(), 0);
        assert!(temps.is_empty());
        assert_eq!(fs.paths(), vec![PathBuf::from("/t2")]);
    }

    #[test]
    fn test_drop_removes_files() {
        let fs = FakeFs::new();
        fs.add_file("/t1", "");
        {
            let mut temps = TempFiles::new(Arc::new(fs.clone()));
            temps.track(PathBuf::from("/t1"));
        }
        assert!(fs.paths().is_empty());
    }

    #[test]
    fn test_remove_failures_are_counted() {
        let fs = FakeFs::new();
        fs.add_file("/t1", "");
        fs.fail_remove(true);

        let mut temps = TempFiles::new(Arc::new(fs.clone()));
        temps.track(PathBuf::from("/t1"));
        temps.track(PathBuf::from("/gone"));
        assert_eq!(temps.remove_all(), 2);
        assert!(temps.is_empty(), "failed paths are not retried");
    }
}
