//! Config validation. Collects every problem instead of stopping at the first.

use url::Url;

use super::ConfigFile;

/// Validate a loaded config file.
/// Returns a list of validation error messages (empty = valid).
pub fn validate(file: &ConfigFile) -> Vec<String> {
    let mut errors = Vec::new();

    if file.directory.trim_end_matches(['/', '\\']).trim().is_empty() {
        errors.push("directory must not be empty".to_string());
    }

    let threshold = file.slow_queries_min_exec_time;
    if !threshold.is_finite() || threshold < 0.0 {
        errors.push(format!(
            "slow_queries_min_exec_time must be a non-negative number of seconds, got {threshold}"
        ));
    }

    if file.naming.all_queries_name.trim().is_empty() {
        errors.push("naming.all_queries_name must not be empty".to_string());
    }
    if file.naming.slow_queries_name.trim().is_empty() {
        errors.push("naming.slow_queries_name must not be empty".to_string());
    }
    if file.naming.all_queries_name.trim() == file.naming.slow_queries_name.trim() {
        errors.push("naming: all-queries and slow-queries files must differ".to_string());
    }
    for name in [&file.naming.all_queries_name, &file.naming.slow_queries_name] {
        if name.contains(['/', '\\']) {
            errors.push(format!("naming: file name {name:?} must not contain a separator"));
        }
    }

    if let Some(slack) = &file.slack {
        let url = slack.webhook_url.trim();
        if !url.is_empty() {
            match Url::parse(url) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(parsed) => errors.push(format!(
                    "slack.webhook_url must use http or https, got {}",
                    parsed.scheme()
                )),
                Err(e) => errors.push(format!("slack.webhook_url is not a valid URL: {e}")),
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::slack::SlackConfig;

    #[test]
    fn default_is_valid() {
        assert!(validate(&ConfigFile::default()).is_empty());
    }

    #[test]
    fn rejects_empty_directory() {
        let file = ConfigFile {
            directory: "//".into(),
            ..ConfigFile::default()
        };
        assert_eq!(validate(&file), vec!["directory must not be empty"]);
    }

    #[test]
    fn rejects_negative_threshold() {
        let file = ConfigFile {
            slow_queries_min_exec_time: -1.0,
            ..ConfigFile::default()
        };
        let errors = validate(&file);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("slow_queries_min_exec_time"));
    }

    #[test]
    fn zero_threshold_is_valid() {
        let file = ConfigFile {
            slow_queries_min_exec_time: 0.0,
            ..ConfigFile::default()
        };
        assert!(validate(&file).is_empty());
    }

    #[test]
    fn rejects_colliding_file_names() {
        let mut file = ConfigFile::default();
        file.naming.date_prefix = false;
        file.naming.slow_queries_name = file.naming.all_queries_name.clone();
        assert_eq!(validate(&file).len(), 1);
    }

    #[test]
    fn rejects_colliding_file_names_with_date_prefix() {
        let mut file = ConfigFile::default();
        file.naming.date_prefix = true;
        file.naming.slow_queries_name = file.naming.all_queries_name.clone();
        let errors = validate(&file);
        assert_eq!(errors, vec!["naming: all-queries and slow-queries files must differ"]);
    }

    #[test]
    fn rejects_bad_webhook_url() {
        let file = ConfigFile {
            slack: Some(SlackConfig {
                webhook_url: "ftp://example.com/hook".into(),
                ..SlackConfig::default()
            }),
            ..ConfigFile::default()
        };
        let errors = validate(&file);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("http or https"));
    }

    #[test]
    fn multiple_problems_accumulate() {
        let mut file = ConfigFile {
            directory: String::new(),
            slow_queries_min_exec_time: f64::INFINITY,
            ..ConfigFile::default()
        };
        file.naming.all_queries_name = "a/b".into();
        assert_eq!(validate(&file).len(), 3);
    }
}
