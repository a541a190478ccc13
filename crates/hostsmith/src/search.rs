//! Search — locate hosts files under a directory tree.

use std::path::{Path, PathBuf};

use glob::Pattern;
use thiserror::Error;
use walkdir::WalkDir;

/// Pattern used when a directory is searched without one.
pub const DEFAULT_PATTERN: &str = "hosts*";

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid search pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to search {dir}: {source}")]
    Walk {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("no files matching {pattern:?} under {dir}")]
    NotFound { pattern: String, dir: PathBuf },
}

/// Returns every regular file under `dir` whose base name matches the glob
/// `pattern`, in file-name order per directory.
///
/// The whole name must match: `hosts` finds `hosts` but not `hosts.bak`.
/// `*`, `?` and `[...]` classes are supported.
pub fn find_files(pattern: &str, dir: &Path) -> Result<Vec<PathBuf>, SearchError> {
    let matcher = Pattern::new(pattern).map_err(|source| SearchError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let mut found = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|source| SearchError::Walk {
            dir: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if matcher.matches(&entry.file_name().to_string_lossy()) {
            found.push(entry.into_path());
        }
    }

    if found.is_empty() {
        return Err(SearchError::NotFound {
            pattern: pattern.to_string(),
            dir: dir.to_path_buf(),
        });
    }
    tracing::debug!("found {} files matching {:?} under {}", found.len(), pattern, dir.display());
    Ok(found)
}
