use std::path::Path;

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use reqwest::Url;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Prefix for environment overrides; `__` separates nested keys.
pub const ENV_PREFIX: &str = "SPRINTPILOT_";

/// Configuration error types
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Invalid backend base_url: {0}. Must be an absolute http(s) URL")]
    InvalidBaseUrl(String),

    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Invalid min_score: {0}. Must be between 0.0 and 1.0")]
    InvalidMinScore(f64),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .sprintpilot/config.yaml (project config)
    /// 3. .sprintpilot/local.yaml (local overrides, optional)
    /// 4. Environment variables (SPRINTPILOT_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".sprintpilot/config.yaml"))
            .merge(Yaml::file(".sprintpilot/local.yaml"))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file. Environment overrides still
    /// apply on top of it.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            anyhow::bail!("Config file not found: {}", path.display());
        }
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let base_url = config.backend.base_url.trim();
        match Url::parse(base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => return Err(ConfigError::InvalidBaseUrl(base_url.to_string())),
        }

        if config.backend.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.backend.timeout_secs));
        }

        let min_score = config.resolution.min_score;
        if !(0.0..=1.0).contains(&min_score) {
            return Err(ConfigError::InvalidMinScore(min_score));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn yaml_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        write!(file, "{contents}").expect("write");
        file.flush().expect("flush");
        file
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://localhost:3000/api");
        assert_eq!(config.backend.timeout_secs, 60);
        assert!((config.resolution.min_score - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
backend:
  base_url: https://pm.example.com/api
  api_token: secret-token
  timeout_secs: 10
resolution:
  min_score: 0.5
session:
  default_project_id: 11111111-1111-1111-1111-111111111111
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.backend.base_url, "https://pm.example.com/api");
        assert_eq!(config.backend.api_token.as_deref(), Some("secret-token"));
        assert_eq!(config.backend.timeout_secs, 10);
        assert!((config.resolution.min_score - 0.5).abs() < f64::EPSILON);
        assert_eq!(
            config.session.default_project_id.as_deref(),
            Some("11111111-1111-1111-1111-111111111111")
        );
        assert_eq!(config.logging.rotation, "daily");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_base_url() {
        let mut config = Config::default();
        config.backend.base_url = "not a url".to_string();
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBaseUrl("not a url".to_string()))
        );

        config.backend.base_url = "ftp://example.com".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.backend.timeout_secs = 0;
        assert_eq!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTimeout(0))
        );
    }

    #[test]
    fn test_validate_min_score_range() {
        let mut config = Config::default();
        config.resolution.min_score = 1.5;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMinScore(_))
        ));

        config.resolution.min_score = 0.0;
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogLevel(level)) => assert_eq!(level, "invalid"),
            other => panic!("Expected InvalidLogLevel error, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        match ConfigLoader::validate(&config) {
            Err(ConfigError::InvalidLogFormat(format)) => assert_eq!(format, "xml"),
            other => panic!("Expected InvalidLogFormat error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_from_file_with_env_override() {
        let file = yaml_file("backend:\n  base_url: http://pm.local/api\n  timeout_secs: 30\n");

        temp_env::with_vars(
            [
                ("SPRINTPILOT_BACKEND__TIMEOUT_SECS", Some("15")),
                ("SPRINTPILOT_RESOLUTION__MIN_SCORE", Some("0.6")),
            ],
            || {
                let config = ConfigLoader::load_from_file(file.path()).expect("load");
                assert_eq!(config.backend.base_url, "http://pm.local/api");
                assert_eq!(config.backend.timeout_secs, 15, "env should win");
                assert!((config.resolution.min_score - 0.6).abs() < f64::EPSILON);
            },
        );
    }

    #[test]
    fn test_load_from_missing_file() {
        assert!(ConfigLoader::load_from_file("/nonexistent/sprintpilot.yaml").is_err());
    }

    #[test]
    fn test_load_from_file_rejects_invalid() {
        let file = yaml_file("resolution:\n  min_score: 2.0\n");
        temp_env::with_vars_unset(["SPRINTPILOT_RESOLUTION__MIN_SCORE"], || {
            assert!(ConfigLoader::load_from_file(file.path()).is_err());
        });
    }

    #[test]
    fn test_hierarchical_merging() {
        let base_file = yaml_file("backend:\n  timeout_secs: 5\nlogging:\n  level: info\n  format: json\n");
        let override_file = yaml_file("logging:\n  level: debug\n");

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(base_file.path()))
            .merge(Yaml::file(override_file.path()))
            .extract()
            .expect("extract");

        assert_eq!(config.logging.level, "debug", "Override should win for nested fields");
        assert_eq!(config.logging.format, "json", "Base value should persist");
        assert_eq!(config.backend.timeout_secs, 5);
    }
}
