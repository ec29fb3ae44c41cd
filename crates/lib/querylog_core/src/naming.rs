//! Log file naming.

use chrono::{Local, NaiveDate};
use serde::Deserialize;

/// File naming settings, part of the `naming` config block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    pub all_queries_name: String,
    pub slow_queries_name: String,
    /// Appended verbatim, including the leading dot.
    pub extension: String,
    /// Prefix each file name with the current local date (`YYYY-MM-DD-`).
    pub date_prefix: bool,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            all_queries_name: "log".to_string(),
            slow_queries_name: "slow-log".to_string(),
            extension: ".sql".to_string(),
            date_prefix: true,
        }
    }
}

/// Resolves the file name of each log stream within the log directory.
pub trait FileNaming: Send + Sync {
    fn for_all_queries(&self) -> String;
    fn for_slow_queries(&self) -> String;
}

/// Default naming: optional date prefix, configured base name and extension.
#[derive(Debug, Clone)]
pub struct FileNames {
    config: NamingConfig,
}

impl FileNames {
    pub fn new(config: NamingConfig) -> Self {
        Self { config }
    }

    fn build(&self, base: &str, today: NaiveDate) -> String {
        if self.config.date_prefix {
            format!("{}-{base}{}", today.format("%Y-%m-%d"), self.config.extension)
        } else {
            format!("{base}{}", self.config.extension)
        }
    }
}

impl FileNaming for FileNames {
    fn for_all_queries(&self) -> String {
        self.build(&self.config.all_queries_name, Local::now().date_naive())
    }

    fn for_slow_queries(&self) -> String {
        self.build(&self.config.slow_queries_name, Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn dated_names() {
        let names = FileNames::new(NamingConfig::default());
        assert_eq!(names.build("log", date()), "2024-03-09-log.sql");
        assert_eq!(names.build("slow-log", date()), "2024-03-09-slow-log.sql");
    }

    #[test]
    fn undated_names() {
        let names = FileNames::new(NamingConfig {
            date_prefix: false,
            extension: ".txt".into(),
            ..NamingConfig::default()
        });
        assert_eq!(names.for_all_queries(), "log.txt");
        assert_eq!(names.for_slow_queries(), "slow-log.txt");
    }

    #[test]
    fn streams_never_share_a_file() {
        let names = FileNames::new(NamingConfig::default());
        assert_ne!(names.for_all_queries(), names.for_slow_queries());
    }
}
