//! Stream inclusion policy.
//!
//! Both predicates are pure. Patterns are searched for anywhere in the SQL
//! text; a pattern that should match the whole query must anchor itself.

use crate::config::LoggerConfig;
use crate::record::QueryRecord;

/// Whether the record belongs in the all-queries log.
pub fn include_in_all(record: &QueryRecord, config: &LoggerConfig) -> bool {
    config.log_all_queries && config.all_queries_pattern.is_match(record.sql())
}

/// Whether the record belongs in the slow-queries log.
pub fn include_in_slow(record: &QueryRecord, config: &LoggerConfig) -> bool {
    config.log_slow_queries
        && record.elapsed_secs() >= config.slow_threshold_secs
        && config.slow_queries_pattern.is_match(record.sql())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFile;
    use crate::record::{QueryEvent, normalize};

    fn config(log_all: bool, all: &str, log_slow: bool, slow: &str, threshold: f64) -> LoggerConfig {
        LoggerConfig::try_from(ConfigFile {
            log_queries: log_all,
            all_queries_pattern: all.into(),
            log_slow_queries: log_slow,
            slow_queries_pattern: slow.into(),
            slow_queries_min_exec_time: threshold,
            ..ConfigFile::default()
        })
        .unwrap()
    }

    fn record(sql: &str, time: Option<f64>) -> QueryRecord {
        normalize(1, QueryEvent::legacy(sql, None, time)).unwrap()
    }

    #[test]
    fn all_requires_flag() {
        let cfg = config(false, ".*", true, ".*", 1.0);
        assert!(!include_in_all(&record("SELECT 1", Some(0.0)), &cfg));
    }

    #[test]
    fn all_searches_unanchored() {
        let cfg = config(true, "FROM users", true, ".*", 1.0);
        assert!(include_in_all(&record("SELECT * FROM users WHERE id = 1", None), &cfg));
        assert!(!include_in_all(&record("SELECT * FROM orders", None), &cfg));
    }

    #[test]
    fn anchored_pattern_is_honoured() {
        let cfg = config(true, "^SELECT", true, ".*", 1.0);
        assert!(!include_in_all(&record("  INSERT INTO t SELECT 1", None), &cfg));
    }

    #[test]
    fn slow_requires_flag() {
        let cfg = config(true, ".*", false, ".*", 0.0);
        assert!(!include_in_slow(&record("SELECT 1", Some(5.0)), &cfg));
    }

    #[test]
    fn slow_below_threshold_is_excluded() {
        let cfg = config(true, ".*", true, ".*", 1.0);
        assert!(!include_in_slow(&record("SELECT 1", Some(0.999)), &cfg));
        assert!(include_in_slow(&record("SELECT 1", Some(1.0)), &cfg));
    }

    #[test]
    fn slow_requires_pattern() {
        let cfg = config(true, ".*", true, "(?i)update", 0.5);
        assert!(!include_in_slow(&record("SELECT 1", Some(3.0)), &cfg));
        assert!(include_in_slow(&record("update t set a = 1", Some(3.0)), &cfg));
    }

    #[test]
    fn missing_time_counts_as_zero() {
        let cfg = config(true, ".*", true, ".*", 0.0);
        assert!(include_in_slow(&record("SELECT 1", None), &cfg));

        let cfg = config(true, ".*", true, ".*", 0.1);
        assert!(!include_in_slow(&record("SELECT 1", None), &cfg));
    }

    #[test]
    fn both_streams_can_match() {
        let cfg = config(true, "SELECT", true, ".*", 1.0);
        let r = record("SELECT * FROM users", Some(2.5));
        assert!(include_in_all(&r, &cfg));
        assert!(include_in_slow(&r, &cfg));
    }
}
