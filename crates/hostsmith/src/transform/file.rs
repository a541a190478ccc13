//! File transformer — count, scan, fan out, join, report.
//!
//! Every line becomes an independent unit on the rayon pool. Each unit owns
//! exactly one slot of a buffer sized by the counting pre-pass, so results
//! come back in input order without any locking. A panicking unit is caught
//! at its own boundary; its siblings still finish and the lowest-numbered
//! panic is reported once everything has joined.

use std::io::{self, BufRead, BufReader, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;

use crate::fs::{FileOps, LineReader, ReadLine};
use crate::parser::{
    Line, LineNormalizer, MetricErrorType, NormalizeMetrics, Normalizer, ParsedLine,
    MAX_LINE_SIZE,
};

use super::{panic_message, TransformError};

enum Outcome {
    Pending,
    Done(ParsedLine),
    Panicked(String),
}

struct Slot {
    line: Line,
    outcome: Outcome,
}

pub struct FileTransformer<N = Normalizer> {
    normalizer: N,
    fs: Arc<dyn FileOps>,
    metrics: Arc<NormalizeMetrics>,
}

impl<N: LineNormalizer> FileTransformer<N> {
    pub fn new(normalizer: N, fs: Arc<dyn FileOps>) -> Self {
        Self {
            normalizer,
            fs,
            metrics: Arc::new(NormalizeMetrics::new()),
        }
    }

    /// Share a metrics sink with other transformers.
    pub fn with_metrics(mut self, metrics: Arc<NormalizeMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn metrics(&self) -> &Arc<NormalizeMetrics> {
        &self.metrics
    }

    /// Normalizes every line of `path`. The result has exactly one entry per
    /// input line, in input order.
    pub fn transform_file(&self, path: &Path) -> Result<Vec<ParsedLine>, TransformError> {
        let started = Instant::now();
        let result = self.run(path);

        let elapsed = started.elapsed().as_nanos() as u64;
        self.metrics.record_file(result.is_ok(), elapsed);
        match &result {
            Ok(lines) => tracing::debug!("normalized {} ({} lines)", path.display(), lines.len()),
            Err(TransformError::Open { .. } | TransformError::Read { .. }) => {
                self.metrics.record_error(MetricErrorType::Io)
            }
            Err(_) => {}
        }
        result
    }

    /// Normalizes `path` and writes the kept lines to `out`, each terminated
    /// by `\n`. Returns the number of lines written.
    pub fn transform_file_to(&self, path: &Path, out: &mut dyn Write) -> Result<usize, TransformError> {
        let lines = self.transform_file(path)?;

        let write_err = |source| TransformError::Write {
            path: path.to_path_buf(),
            source,
        };

        let mut written = 0;
        for line in lines.iter().flatten() {
            out.write_all(line.as_bytes()).map_err(write_err)?;
            out.write_all(b"\n").map_err(write_err)?;
            written += 1;
        }
        out.flush().map_err(write_err)?;
        Ok(written)
    }

    fn run(&self, path: &Path) -> Result<Vec<ParsedLine>, TransformError> {
        let expected = self.count_lines(path)?;
        let mut slots = self.scan(path, expected)?;

        if slots.len() != expected {
            return Err(TransformError::LineCountChanged {
                path: path.to_path_buf(),
                expected,
                actual: slots.len(),
            });
        }

        slots.par_iter_mut().for_each(|slot| {
            let normalizer = &self.normalizer;
            let text = slot.line.text.as_str();
            slot.outcome = match panic::catch_unwind(AssertUnwindSafe(|| normalizer.normalize(text))) {
                Ok(parsed) => Outcome::Done(parsed),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(
                        "normalizer panicked on line {} of {}: {}",
                        slot.line.index + 1,
                        path.display(),
                        message
                    );
                    self.metrics.record_error(MetricErrorType::Panic);
                    Outcome::Panicked(message)
                }
            };
        });

        let mut parsed = Vec::with_capacity(slots.len());
        for slot in slots {
            match slot.outcome {
                Outcome::Done(line) => {
                    self.metrics.record_line(slot.line.text.len(), line.is_some());
                    parsed.push(line);
                }
                Outcome::Panicked(message) => {
                    return Err(TransformError::WorkerPanicked {
                        path: path.to_path_buf(),
                        line: slot.line.index + 1,
                        message,
                    });
                }
                Outcome::Pending => {
                    return Err(TransformError::WorkerPanicked {
                        path: path.to_path_buf(),
                        line: slot.line.index + 1,
                        message: "line was never normalized".to_string(),
                    });
                }
            }
        }
        Ok(parsed)
    }

    fn open(&self, path: &Path) -> Result<BufReader<Box<dyn io::Read + Send>>, TransformError> {
        self.fs
            .open(path)
            .map(BufReader::new)
            .map_err(|source| TransformError::Open {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Counts lines the way [`LineReader`] will split them: a final
    /// line without terminator still counts.
    fn count_lines(&self, path: &Path) -> Result<usize, TransformError> {
        let mut reader = self.open(path)?;
        let mut count = 0;
        let mut last = None;

        loop {
            let buf = reader.fill_buf().map_err(|source| TransformError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            if buf.is_empty() {
                break;
            }
            count += buf.iter().filter(|&&b| b == b'\n').count();
            last = buf.last().copied();
            let len = buf.len();
            reader.consume(len);
        }

        if matches!(last, Some(b) if b != b'\n') {
            count += 1;
        }
        Ok(count)
    }

    fn scan(&self, path: &Path, expected: usize) -> Result<Vec<Slot>, TransformError> {
        let mut reader = LineReader::new(self.open(path)?, MAX_LINE_SIZE);
        let mut slots = Vec::with_capacity(expected);

        loop {
            let index = slots.len();
            let next = reader.next_line().map_err(|source| TransformError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            match next {
                None => break,
                Some(ReadLine::Line(text)) => slots.push(Slot {
                    line: Line::new(index, text),
                    outcome: Outcome::Pending,
                }),
                Some(ReadLine::TooLarge) => {
                    self.metrics.record_error(MetricErrorType::TooLarge);
                    return Err(TransformError::LineTooLarge {
                        path: path.to_path_buf(),
                        line: index + 1,
                        limit: MAX_LINE_SIZE,
                    });
                }
            }
        }
        Ok(slots)
    }
}
