//! Rules — the line validator.

use std::borrow::Cow;
use std::io::BufReader;
use std::path::Path;

use crate::conf::ValidationConfig;
use crate::fs::{FileOps, LineReader, ReadLine};
use crate::host::{self, line, CUTSET, DELIM_DNS};
use crate::parser::MAX_LINE_SIZE;

use super::model::{FileValidationError, ValidationError};

/// Indentation and trailing space are only ever spaces or tabs.
const INDENT: &[char] = &[' ', '\t'];

/// Checks lines against a fixed [`ValidationConfig`]. Never mutates input.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validates one line and returns the first rule it breaks.
    pub fn validate_line(&self, line: &str) -> Result<(), ValidationError> {
        let trimmed = self.trim_line(line)?;
        if trimmed.is_empty() {
            return Ok(());
        }

        if self.config.allow_comment {
            if host::is_comment_line(trimmed) {
                return Ok(());
            }
            let no_comment =
                host::trim_comment(trimmed).map_err(|source| ValidationError::CommentTrimFailed {
                    line: trimmed.to_string(),
                    source,
                })?;
            if no_comment != trimmed {
                return self.validate_line(no_comment);
            }
        }

        if !self.config.allow_ip_address_only && host::is_ip_address(trimmed) {
            return Err(ValidationError::IpOnlyNotAllowed {
                line: trimmed.to_string(),
            });
        }

        let trimmed: Cow<'_, str> = if self.config.allow_underscore {
            Cow::Owned(trimmed.replace('_', "-"))
        } else {
            Cow::Borrowed(trimmed)
        };

        for chunk in line::chunks(&trimmed) {
            self.validate_chunk(chunk)?;
        }
        Ok(())
    }

    /// Validates every line of `path`, stopping at the first invalid one.
    pub fn validate_file(&self, fs: &dyn FileOps, path: &Path) -> Result<(), FileValidationError> {
        let io_err = |source| FileValidationError::Io {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = LineReader::new(BufReader::new(fs.open(path).map_err(io_err)?), MAX_LINE_SIZE);
        let mut line_number = 0;
        while let Some(next) = reader.next_line().map_err(io_err)? {
            line_number += 1;
            let line = match next {
                ReadLine::Line(line) => line,
                ReadLine::TooLarge => {
                    return Err(FileValidationError::LineTooLarge {
                        line_number,
                        limit: MAX_LINE_SIZE,
                    })
                }
            };
            if let Err(source) = self.validate_line(&line) {
                tracing::warn!(
                    "invalid line {} in {}: {} ({})",
                    line_number,
                    path.display(),
                    source,
                    source.kind()
                );
                return Err(FileValidationError::InvalidLine {
                    line_number,
                    line,
                    source,
                });
            }
        }

        tracing::debug!("{} is valid", path.display());
        Ok(())
    }

    fn trim_line<'a>(&self, line: &'a str) -> Result<&'a str, ValidationError> {
        if !self.config.allow_indent && line.trim_start_matches(INDENT) != line {
            return Err(ValidationError::IndentNotAllowed {
                line: line.to_string(),
            });
        }

        if !self.config.allow_trailing_space && line.trim_end_matches(INDENT) != line {
            return Err(ValidationError::TrailingSpaceNotAllowed {
                line: line.to_string(),
            });
        }

        let trimmed = line.trim_matches(CUTSET);
        if trimmed.is_empty() && !self.config.allow_empty_line {
            return Err(ValidationError::EmptyLineNotAllowed);
        }
        Ok(trimmed)
    }

    fn validate_chunk(&self, chunk: &str) -> Result<(), ValidationError> {
        // Leading or trailing IPs are not host names.
        if host::is_ip_address(chunk) {
            return Ok(());
        }

        let mut lenient: Cow<'_, str> = Cow::Borrowed(chunk);

        if self.config.allow_hyphen_double && host::transform_to_unicode(&lenient).is_err() {
            lenient = Cow::Owned(lenient.replace("--", "aa"));
        }

        if self.config.allow_hyphen {
            lenient = Cow::Owned(neutralize_leading_hyphens(&lenient));
        }

        if !self.config.idna_compatible {
            if !host::is_compatible_rfc6125(&lenient, false) {
                return Err(ValidationError::NotRfc6125Compatible {
                    chunk: chunk.to_string(),
                });
            }
            return Ok(());
        }

        match host::to_ascii_registration(&lenient) {
            Ok(ascii) if ascii == lenient => Ok(()),
            Ok(_) => Err(ValidationError::NotIdna2008Compatible {
                chunk: chunk.to_string(),
                source: None,
            }),
            Err(source) => Err(ValidationError::NotIdna2008Compatible {
                chunk: chunk.to_string(),
                source: Some(source),
            }),
        }
    }
}

/// Replaces the `-` starting any label with `a`.
fn neutralize_leading_hyphens(host: &str) -> String {
    host.split(DELIM_DNS)
        .map(|label| match label.strip_prefix('-') {
            Some(rest) => Cow::Owned(format!("a{rest}")),
            None => Cow::Borrowed(label),
        })
        .collect::<Vec<_>>()
        .join(".")
}
