//! Slow-query alerting.
//!
//! The writer talks to an [`AlertNotifier`] capability and never to a
//! transport directly. Delivery failures are reported back to the writer,
//! which records them as warnings without touching the log files.

pub mod slack;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::config::LoggerConfig;
use crate::record::QueryRecord;

/// Title carried by every slow-query alert.
pub const SLOW_QUERY_TITLE: &str = "Slow query detected";

/// A query this many times slower than the threshold is critical.
const CRITICAL_FACTOR: f64 = 10.0;

/// Errors that can occur while delivering an alert.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Alert rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Info,
    Warning,
    Critical,
}

/// Structured alert payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub level: AlertLevel,
    pub title: String,
    pub context: BTreeMap<String, String>,
}

impl Alert {
    /// Build the alert for a record that matched the slow-query policy.
    pub fn slow_query(record: &QueryRecord, threshold_secs: f64) -> Self {
        let elapsed = record.elapsed_secs();
        let level = if threshold_secs > 0.0 && elapsed >= threshold_secs * CRITICAL_FACTOR {
            AlertLevel::Critical
        } else {
            AlertLevel::Warning
        };

        let mut context = BTreeMap::new();
        context.insert("sql".to_string(), record.sql().to_string());
        context.insert("time".to_string(), format!("{elapsed}s"));
        context.insert("threshold".to_string(), format!("{threshold_secs}s"));
        context.insert("number".to_string(), record.number().to_string());
        if !record.bindings().is_empty() {
            context.insert(
                "bindings".to_string(),
                serde_json::Value::from(record.bindings().to_vec()).to_string(),
            );
        }

        Self {
            level,
            title: SLOW_QUERY_TITLE.to_string(),
            context,
        }
    }
}

/// Delivers alerts to an external channel.
pub trait AlertNotifier: Send + Sync {
    fn notify(&self, alert: &Alert) -> Result<(), NotifyError>;

    /// Notifier identifier for debugging/logging.
    fn name(&self) -> &str;
}

/// Accepts and drops every alert.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl AlertNotifier for NoopNotifier {
    fn notify(&self, _alert: &Alert) -> Result<(), NotifyError> {
        Ok(())
    }

    fn name(&self) -> &str {
        "NoopNotifier"
    }
}

/// Build the notifier described by the configuration.
///
/// Slack when a webhook is configured, otherwise [`NoopNotifier`].
pub fn from_config(config: &LoggerConfig) -> Result<Arc<dyn AlertNotifier>, NotifyError> {
    match &config.slack {
        Some(slack) => Ok(Arc::new(slack::SlackNotifier::new(slack.clone())?)),
        None => Ok(Arc::new(NoopNotifier)),
    }
}
