//! Merge module — normalize many files, concatenate, optionally sort.

pub mod chunked;
pub mod pipeline;
pub mod sort;
pub mod temp;

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::transform::TransformError;

pub use chunked::ChunkedSorter;
pub use pipeline::{MergePipeline, MergeReport};
pub use sort::{Compare, ExternalSorter};
pub use temp::{temp_prefix, TempFiles};

/// The pipeline step an error or temp file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStage {
    Normalize,
    Concatenate,
    Sort,
    Finalize,
}

impl MergeStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStage::Normalize => "normalize",
            MergeStage::Concatenate => "concatenate",
            MergeStage::Sort => "sort",
            MergeStage::Finalize => "finalize",
        }
    }
}

impl fmt::Display for MergeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("no input files given")]
    NoInputs,

    #[error("{stage} stage failed on {path}: {source}")]
    Transform {
        stage: MergeStage,
        path: PathBuf,
        #[source]
        source: TransformError,
    },

    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: MergeStage,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} worker panicked: {message}")]
    WorkerPanicked { stage: MergeStage, message: String },

    #[error("{stage} worker was cancelled: {source}")]
    Join {
        stage: MergeStage,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl MergeError {
    pub fn stage(&self) -> Option<MergeStage> {
        match self {
            MergeError::NoInputs => None,
            MergeError::Transform { stage, .. }
            | MergeError::Stage { stage, .. }
            | MergeError::WorkerPanicked { stage, .. }
            | MergeError::Join { stage, .. } => Some(*stage),
        }
    }
}
