//! Load — config loading from file and environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use super::model::{AppConfig, ConfigError};

/// Default config file, looked up relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "hostsmith.toml";

impl AppConfig {
    /// Load configuration from file or environment variables
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var("HOSTSMITH_CONFIG_FILE")
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Same as [`AppConfig::load`] with an explicit config file path.
    /// A missing file means defaults.
    pub fn load_from(config_path: &Path) -> Result<Self, ConfigError> {
        let mut config = if config_path.exists() {
            tracing::info!("Loading configuration from: {}", config_path.display());
            Self::from_file(config_path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", config_path.display());
            Self::default()
        };

        config.apply_env_from(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay environment overrides. `lookup` resolves a variable name.
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(ip) = lookup("HOSTSMITH_USE_IP") {
            self.normalize.replacement_ip = ip;
        }
        if let Some(dir) = lookup("HOSTSMITH_TEMP_DIR").filter(|d| !d.is_empty()) {
            self.temp_dir = Some(PathBuf::from(dir));
        }
        if let Some(bytes) = lookup("HOSTSMITH_SORT_CHUNK_BYTES").and_then(|s| s.parse().ok()) {
            self.sort_chunk_bytes = bytes;
        }
    }

    /// Check that configuration values are sane
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sort_chunk_bytes == 0 {
            return Err(ConfigError::Invalid(
                "sort_chunk_bytes must be > 0".to_string(),
            ));
        }
        self.normalize.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // ── from_file ───────────────────────────────────────────────

    #[test]
    fn test_from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[normalize]\ntrim_comment = false").unwrap();

        let cfg = AppConfig::from_file(file.path()).unwrap();
        assert!(!cfg.normalize.trim_comment);
        assert!(cfg.normalize.trim_leading_ip);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AppConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.normalize.trim_comment);
    }

    #[test]
    fn test_load_from_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sort_chunk_bytes = 0").unwrap();

        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got: {err}");
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::from_file(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_from_file_bad_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "sort_chunk_bytes = \"lots\"").unwrap();

        let err = AppConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    }

    // ── Environment overrides ───────────────────────────────────

    #[test]
    fn test_env_overrides_file_values() {
        let mut cfg = AppConfig::default();
        cfg.normalize.replacement_ip = "127.0.0.1".to_string();

        cfg.apply_env_from(env(&[
            ("HOSTSMITH_USE_IP", "0.0.0.0"),
            ("HOSTSMITH_TEMP_DIR", "/var/tmp"),
            ("HOSTSMITH_SORT_CHUNK_BYTES", "1024"),
        ]));

        assert_eq!(cfg.normalize.replacement_ip, "0.0.0.0");
        assert_eq!(cfg.temp_dir, Some(PathBuf::from("/var/tmp")));
        assert_eq!(cfg.sort_chunk_bytes, 1024);
    }

    #[test]
    fn test_env_ignores_unparseable_numbers() {
        let mut cfg = AppConfig::default();
        cfg.apply_env_from(env(&[("HOSTSMITH_SORT_CHUNK_BYTES", "big")]));
        assert_eq!(cfg.sort_chunk_bytes, AppConfig::default().sort_chunk_bytes);
    }

    // ── validate ────────────────────────────────────────────────

    #[test]
    fn test_validate_rejects_zero_chunk() {
        let cfg = AppConfig {
            sort_chunk_bytes: 0,
            ..Default::default()
        };
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("sort_chunk_bytes"));
    }

    #[test]
    fn test_validate_rejects_bad_replacement_ip() {
        let mut cfg = AppConfig::default();
        cfg.normalize.replacement_ip = "not-an-ip".to_string();
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_default_passes() {
        assert!(AppConfig::default().validate().is_ok());
    }
}
