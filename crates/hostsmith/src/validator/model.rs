//! Model — validation outcomes.

use std::path::PathBuf;

use thiserror::Error;

use crate::host::{ConversionError, LineBreakError};

/// The first rule a line violated. Carries the offending text.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("indent is not allowed: {line:?}")]
    IndentNotAllowed { line: String },

    #[error("trailing space is not allowed: {line:?}")]
    TrailingSpaceNotAllowed { line: String },

    #[error("empty line is not allowed")]
    EmptyLineNotAllowed,

    #[error("IP address only line is not allowed: {line:?}")]
    IpOnlyNotAllowed { line: String },

    #[error("{chunk:?} is not IDNA2008 compatible")]
    NotIdna2008Compatible {
        chunk: String,
        #[source]
        source: Option<ConversionError>,
    },

    #[error("{chunk:?} is not RFC 6125 2.2 compatible")]
    NotRfc6125Compatible { chunk: String },

    #[error("failed to trim comment")]
    CommentTrimFailed {
        line: String,
        #[source]
        source: LineBreakError,
    },
}

impl ValidationError {
    /// Stable short name of the violated rule, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IndentNotAllowed { .. } => "indent",
            Self::TrailingSpaceNotAllowed { .. } => "trailing_space",
            Self::EmptyLineNotAllowed => "empty_line",
            Self::IpOnlyNotAllowed { .. } => "ip_only",
            Self::NotIdna2008Compatible { .. } => "idna2008",
            Self::NotRfc6125Compatible { .. } => "rfc6125",
            Self::CommentTrimFailed { .. } => "comment",
        }
    }
}

/// Failure of a whole-file validation.
#[derive(Debug, Error)]
pub enum FileValidationError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line_number} exceeds {limit} bytes")]
    LineTooLarge { line_number: usize, limit: usize },

    #[error("invalid line {line_number} ({line:?}): {source}")]
    InvalidLine {
        /// One-based line number.
        line_number: usize,
        line: String,
        #[source]
        source: ValidationError,
    },
}
