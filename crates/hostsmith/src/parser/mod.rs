/// Line normalization module
///
/// Turns raw hosts-file lines into their canonical form according to a
/// `NormalizationConfig`.
///
/// # Architecture
///
/// - `traits.rs`: the `LineNormalizer` seam used by the file transformer
/// - `normalize.rs`: the configurable `Normalizer`
/// - `model.rs`: `Line` and `ParsedLine`
/// - `metrics.rs`: run counters
///
/// # Guarantees
///
/// - Line-local: one input line in, at most one output line out
/// - Deterministic, and idempotent with comment and IP trimming on
/// - Malformed host chunks are dropped, never reported as errors

pub mod traits;
pub mod normalize;
pub mod metrics;
pub mod model;

// Re-export commonly used types
pub use traits::LineNormalizer;
pub use normalize::Normalizer;
pub use model::{Line, ParsedLine};
pub use metrics::{MetricErrorType, MetricsSnapshot, NormalizeMetrics};

// Constants
pub const MAX_LINE_SIZE: usize = 1_048_576; // 1MB
