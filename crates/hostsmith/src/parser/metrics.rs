use std::sync::atomic::{AtomicU64, Ordering};
use serde::Serialize;

/// Error categories for metrics recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricErrorType {
    /// A normalizer unit panicked (caught via catch_unwind)
    Panic,
    /// Line exceeded MAX_LINE_SIZE
    TooLarge,
    /// Open, read or write failure
    Io,
}

/// A wrapper that forces the wrapped data onto its own cache line(s).
///
/// Uses `#[repr(align(64))]` so each counter group starts on a 64-byte
/// boundary and worker threads bumping different groups do not contend
/// for the same cache line.
#[repr(align(64))]
#[derive(Debug, Default)]
pub struct CacheAligned<T>(pub T);

/// Per-line counters (hottest path - updated once per input line)
#[derive(Debug, Default)]
pub struct LineMetrics {
    pub scanned: AtomicU64,
    pub kept: AtomicU64,
    pub dropped: AtomicU64,
    pub bytes: AtomicU64,
}

/// Per-file counters and timing
#[derive(Debug, Default)]
pub struct FileMetrics {
    pub transformed: AtomicU64,
    pub failed: AtomicU64,
    pub time_nanos: AtomicU64,
}

/// Error counters by type
#[derive(Debug, Default)]
pub struct ErrorMetrics {
    pub panic: AtomicU64,
    pub too_large: AtomicU64,
    pub io: AtomicU64,
}

/// Counters for normalization runs, shared by every worker of a run.
///
/// All operations use `Ordering::Relaxed`; `snapshot()` reads are not
/// transactional across fields, which is fine for reporting.
#[derive(Debug, Default)]
pub struct NormalizeMetrics {
    /// Group 1: line counters (HOTTEST PATH)
    pub lines: CacheAligned<LineMetrics>,

    /// Group 2: file totals and timing
    pub files: CacheAligned<FileMetrics>,

    /// Group 3: error counters
    pub errors: CacheAligned<ErrorMetrics>,
}

impl NormalizeMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one normalized line
    #[inline]
    pub fn record_line(&self, bytes: usize, kept: bool) {
        self.lines.0.scanned.fetch_add(1, Ordering::Relaxed);
        self.lines.0.bytes.fetch_add(bytes as u64, Ordering::Relaxed);
        if kept {
            self.lines.0.kept.fetch_add(1, Ordering::Relaxed);
        } else {
            self.lines.0.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record the end of one file transform
    #[inline]
    pub fn record_file(&self, success: bool, time_nanos: u64) {
        if success {
            self.files.0.transformed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.files.0.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.files.0.time_nanos.fetch_add(time_nanos, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_error(&self, error_type: MetricErrorType) {
        match error_type {
            MetricErrorType::Panic => self.errors.0.panic.fetch_add(1, Ordering::Relaxed),
            MetricErrorType::TooLarge => self.errors.0.too_large.fetch_add(1, Ordering::Relaxed),
            MetricErrorType::Io => self.errors.0.io.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let files_transformed = self.files.0.transformed.load(Ordering::Relaxed);
        let files_failed = self.files.0.failed.load(Ordering::Relaxed);
        let time_ns = self.files.0.time_nanos.load(Ordering::Relaxed);
        let total_files = files_transformed + files_failed;

        MetricsSnapshot {
            lines_scanned: self.lines.0.scanned.load(Ordering::Relaxed),
            lines_kept: self.lines.0.kept.load(Ordering::Relaxed),
            lines_dropped: self.lines.0.dropped.load(Ordering::Relaxed),
            bytes_read: self.lines.0.bytes.load(Ordering::Relaxed),

            files_transformed,
            files_failed,
            avg_file_time_ms: if total_files > 0 {
                (time_ns as f64 / total_files as f64) / 1_000_000.0
            } else {
                0.0
            },

            worker_panics: self.errors.0.panic.load(Ordering::Relaxed),
            lines_too_large: self.errors.0.too_large.load(Ordering::Relaxed),
            io_errors: self.errors.0.io.load(Ordering::Relaxed),
        }
    }
}

/// A read-only snapshot of normalization metrics, serializable to JSON for
/// `--stats` output or structured logging.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    // Lines
    pub lines_scanned: u64,
    pub lines_kept: u64,
    pub lines_dropped: u64,
    pub bytes_read: u64,

    // Files
    pub files_transformed: u64,
    pub files_failed: u64,
    pub avg_file_time_ms: f64,

    // Errors
    pub worker_panics: u64,
    pub lines_too_large: u64,
    pub io_errors: u64,
}
