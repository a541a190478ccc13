//! Model — AppConfig and the per-stage option records.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::host::{is_ip_address, LineOrder};

/// Default in-memory budget for one sort run (64 MiB).
pub const DEFAULT_SORT_CHUNK_BYTES: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory for intermediate files; the system temp dir when unset.
    pub temp_dir: Option<PathBuf>,
    pub sort_chunk_bytes: usize,
    pub normalize: NormalizationConfig,
    pub validate: ValidationConfig,
}

/// Line normalization options. Frozen before a run starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    /// Prefixed to every kept host line when non-empty.
    pub replacement_ip: String,
    pub idna_compatible_out: bool,
    pub omit_empty_line: bool,
    pub sort_after_parse: bool,
    pub sort_as_reverse_dns: bool,
    pub trim_comment: bool,
    pub trim_leading_ip: bool,
    pub trim_leading_space: bool,
    pub trim_trailing_space: bool,
}

/// Leniency switches for the validator. All off means strict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub allow_comment: bool,
    pub allow_empty_line: bool,
    pub allow_hyphen: bool,
    pub allow_hyphen_double: bool,
    pub allow_indent: bool,
    pub allow_ip_address_only: bool,
    pub allow_trailing_space: bool,
    pub allow_underscore: bool,
    pub idna_compatible: bool,
}

/// Whether and how the merged output gets sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortConfig {
    pub enabled: bool,
    pub reverse_dns: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            normalize: NormalizationConfig::default(),
            validate: ValidationConfig::default(),
            temp_dir: None,
            sort_chunk_bytes: DEFAULT_SORT_CHUNK_BYTES,
        }
    }
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            replacement_ip: String::new(),
            idna_compatible_out: true,
            omit_empty_line: true,
            sort_after_parse: false,
            sort_as_reverse_dns: false,
            trim_comment: true,
            trim_leading_ip: true,
            trim_leading_space: true,
            trim_trailing_space: true,
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            allow_comment: false,
            allow_empty_line: true,
            allow_hyphen: false,
            allow_hyphen_double: false,
            allow_indent: false,
            allow_ip_address_only: false,
            allow_trailing_space: false,
            allow_underscore: false,
            idna_compatible: true,
        }
    }
}

impl NormalizationConfig {
    pub fn sort(&self) -> SortConfig {
        SortConfig {
            enabled: self.sort_after_parse || self.sort_as_reverse_dns,
            reverse_dns: self.sort_as_reverse_dns,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.replacement_ip.is_empty() && !is_ip_address(&self.replacement_ip) {
            return Err(ConfigError::Invalid(format!(
                "normalize.replacement_ip is not an IP address: {:?}",
                self.replacement_ip
            )));
        }
        Ok(())
    }
}

impl SortConfig {
    pub fn order(&self) -> Option<LineOrder> {
        LineOrder::from_flags(self.enabled, self.reverse_dns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Defaults ────────────────────────────────────────────────

    #[test]
    fn test_normalization_config_defaults() {
        let cfg = NormalizationConfig::default();
        assert!(cfg.replacement_ip.is_empty());
        assert!(cfg.idna_compatible_out);
        assert!(cfg.omit_empty_line);
        assert!(!cfg.sort_after_parse);
        assert!(!cfg.sort_as_reverse_dns);
        assert!(cfg.trim_comment);
        assert!(cfg.trim_leading_ip);
        assert!(cfg.trim_leading_space);
        assert!(cfg.trim_trailing_space);
    }

    #[test]
    fn test_validation_config_defaults() {
        let cfg = ValidationConfig::default();
        assert!(cfg.allow_empty_line);
        assert!(cfg.idna_compatible);
        assert!(!cfg.allow_comment);
        assert!(!cfg.allow_underscore);
        assert!(!cfg.allow_trailing_space);
    }

    #[test]
    fn test_app_config_defaults() {
        let cfg = AppConfig::default();
        assert!(cfg.temp_dir.is_none());
        assert_eq!(cfg.sort_chunk_bytes, DEFAULT_SORT_CHUNK_BYTES);
    }

    // ── SortConfig ──────────────────────────────────────────────

    #[test]
    fn test_sort_config_reverse_dns_implies_sort() {
        let cfg = NormalizationConfig {
            sort_as_reverse_dns: true,
            ..Default::default()
        };
        let sort = cfg.sort();
        assert!(sort.enabled);
        assert_eq!(sort.order(), Some(LineOrder::ReverseDns));
    }

    #[test]
    fn test_sort_config_disabled_by_default() {
        assert_eq!(NormalizationConfig::default().sort().order(), None);
    }

    // ── Validation ──────────────────────────────────────────────

    #[test]
    fn test_replacement_ip_must_be_ip() {
        let cfg = NormalizationConfig {
            replacement_ip: "localhost".to_string(),
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("replacement_ip"), "got: {err}");

        let cfg = NormalizationConfig {
            replacement_ip: "0.0.0.0".to_string(),
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    // ── Serialization ───────────────────────────────────────────

    #[test]
    fn test_app_config_deserialize_partial_toml() {
        let toml_str = r#"
            sort_chunk_bytes = 4096

            [normalize]
            replacement_ip = "0.0.0.0"
            sort_as_reverse_dns = true

            [validate]
            allow_underscore = true
        "#;
        let cfg: AppConfig = toml::from_str(toml_str).expect("Should accept partial TOML");
        assert_eq!(cfg.sort_chunk_bytes, 4096);
        assert_eq!(cfg.normalize.replacement_ip, "0.0.0.0");
        assert!(cfg.normalize.sort_as_reverse_dns);
        assert!(cfg.normalize.trim_comment); // default
        assert!(cfg.validate.allow_underscore);
        assert!(cfg.validate.idna_compatible); // default
    }

    #[test]
    fn test_app_config_toml_round_trip() {
        let cfg = AppConfig::default();
        let toml_str = toml::to_string(&cfg).expect("Should serialize to TOML");
        let back: AppConfig = toml::from_str(&toml_str).expect("Should deserialize from TOML");
        assert_eq!(back.normalize, cfg.normalize);
        assert_eq!(back.validate, cfg.validate);
        assert_eq!(back.sort_chunk_bytes, cfg.sort_chunk_bytes);
    }
}
