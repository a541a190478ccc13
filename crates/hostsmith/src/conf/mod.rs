//! Conf module — configuration model and loading.

pub mod model;
pub mod load;

pub use model::{
    AppConfig, ConfigError, NormalizationConfig, SortConfig, ValidationConfig,
    DEFAULT_SORT_CHUNK_BYTES,
};
