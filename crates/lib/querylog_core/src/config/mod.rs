//! Configuration: file loading, environment overrides and validation.
//!
//! Settings are read once from a YAML file (or defaults), overridden by
//! `SQL_LOGGER_*` environment variables, validated, and compiled into an
//! immutable [`LoggerConfig`] that is handed to the writer.

pub mod validation;

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use crate::alert::slack::SlackConfig;
use crate::naming::NamingConfig;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "SQL_LOGGER_";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid {name} pattern: {source}")]
    InvalidPattern {
        name: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid value for {key}: {value:?}")]
    InvalidEnv { key: String, value: String },

    #[error("Validation error: {}", .0.join("; "))]
    Validation(Vec<String>),
}

/// On-disk configuration, as deserialized from YAML.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub directory: String,
    pub override_log: bool,
    pub log_queries: bool,
    pub all_queries_pattern: String,
    pub log_slow_queries: bool,
    /// Slow-query threshold in seconds.
    pub slow_queries_min_exec_time: f64,
    pub slow_queries_pattern: String,
    pub naming: NamingConfig,
    pub slack: Option<SlackConfig>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            directory: "logs/sql".to_string(),
            override_log: false,
            log_queries: true,
            all_queries_pattern: "(?i).*".to_string(),
            log_slow_queries: true,
            slow_queries_min_exec_time: 0.1,
            slow_queries_pattern: "(?i).*".to_string(),
            naming: NamingConfig::default(),
            slack: None,
        }
    }
}

impl ConfigFile {
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Apply `SQL_LOGGER_*` overrides using the given variable lookup.
    ///
    /// | Variable                         | Field                         |
    /// |----------------------------------|-------------------------------|
    /// | `SQL_LOGGER_DIRECTORY`           | `directory`                   |
    /// | `SQL_LOGGER_OVERRIDE_LOG`        | `override_log`                |
    /// | `SQL_LOGGER_LOG_QUERIES`         | `log_queries`                 |
    /// | `SQL_LOGGER_ALL_PATTERN`         | `all_queries_pattern`         |
    /// | `SQL_LOGGER_LOG_SLOW_QUERIES`    | `log_slow_queries`            |
    /// | `SQL_LOGGER_SLOW_MIN_TIME`       | `slow_queries_min_exec_time`  |
    /// | `SQL_LOGGER_SLOW_PATTERN`        | `slow_queries_pattern`        |
    /// | `SQL_LOGGER_SLACK_WEBHOOK_URL`   | `slack.webhook_url`           |
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            let key = format!("{ENV_PREFIX}{name}");
            lookup(&key).map(|value| (key, value))
        };

        if let Some((_, v)) = var("DIRECTORY") {
            self.directory = v;
        }
        if let Some((k, v)) = var("OVERRIDE_LOG") {
            self.override_log = parse_bool(&k, &v)?;
        }
        if let Some((k, v)) = var("LOG_QUERIES") {
            self.log_queries = parse_bool(&k, &v)?;
        }
        if let Some((_, v)) = var("ALL_PATTERN") {
            self.all_queries_pattern = v;
        }
        if let Some((k, v)) = var("LOG_SLOW_QUERIES") {
            self.log_slow_queries = parse_bool(&k, &v)?;
        }
        if let Some((k, v)) = var("SLOW_MIN_TIME") {
            self.slow_queries_min_exec_time = v
                .trim()
                .parse::<f64>()
                .map_err(|_| ConfigError::InvalidEnv { key: k, value: v })?;
        }
        if let Some((_, v)) = var("SLOW_PATTERN") {
            self.slow_queries_pattern = v;
        }
        if let Some((_, v)) = var("SLACK_WEBHOOK_URL") {
            self.slack.get_or_insert_with(SlackConfig::default).webhook_url = v;
        }

        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnv {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

/// Strip trailing `/` and `\` separators from a configured directory.
fn strip_trailing_separators(dir: &str) -> PathBuf {
    PathBuf::from(dir.trim_end_matches(['/', '\\']))
}

/// Validated, read-only logger configuration.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub directory: PathBuf,
    pub log_all_queries: bool,
    pub all_queries_pattern: Regex,
    pub log_slow_queries: bool,
    pub slow_queries_pattern: Regex,
    pub slow_threshold_secs: f64,
    pub override_file_on_first_query: bool,
    pub naming: NamingConfig,
    pub slack: Option<SlackConfig>,
}

impl LoggerConfig {
    /// Load from an optional YAML file, then apply process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut file = match path {
            Some(p) => ConfigFile::from_path(p)?,
            None => ConfigFile::default(),
        };
        file.apply_env(|key| std::env::var(key).ok())?;
        Self::try_from(file)
    }
}

impl TryFrom<ConfigFile> for LoggerConfig {
    type Error = ConfigError;

    fn try_from(file: ConfigFile) -> Result<Self, ConfigError> {
        let errors = validation::validate(&file);
        if !errors.is_empty() {
            return Err(ConfigError::Validation(errors));
        }

        let all_queries_pattern =
            Regex::new(&file.all_queries_pattern).map_err(|source| ConfigError::InvalidPattern {
                name: "all_queries",
                source,
            })?;
        let slow_queries_pattern = Regex::new(&file.slow_queries_pattern).map_err(|source| {
            ConfigError::InvalidPattern {
                name: "slow_queries",
                source,
            }
        })?;

        Ok(Self {
            directory: strip_trailing_separators(&file.directory),
            log_all_queries: file.log_queries,
            all_queries_pattern,
            log_slow_queries: file.log_slow_queries,
            slow_queries_pattern,
            slow_threshold_secs: file.slow_queries_min_exec_time,
            override_file_on_first_query: file.override_log,
            naming: file.naming,
            slack: file.slack.filter(|s| !s.webhook_url.trim().is_empty()),
        })
    }
}
