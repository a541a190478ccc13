//! Transform module — concurrent, order-preserving normalization of a file.

pub mod file;

use std::any::Any;
use std::path::PathBuf;

use thiserror::Error;

pub use file::FileTransformer;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write normalized {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line} of {path} exceeds {limit} bytes")]
    LineTooLarge {
        path: PathBuf,
        line: usize,
        limit: usize,
    },

    #[error("{path} changed while reading: counted {expected} lines, scanned {actual}")]
    LineCountChanged {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("normalizer panicked on line {line} of {path}: {message}")]
    WorkerPanicked {
        path: PathBuf,
        /// One-based line number.
        line: usize,
        message: String,
    },
}

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
