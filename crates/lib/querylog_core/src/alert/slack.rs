//! Slack incoming-webhook notifier.
//!
//! Posts one attachment message per alert. Uses a blocking client with a
//! short timeout since the pipeline itself is synchronous.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::{Alert, AlertLevel, AlertNotifier, NotifyError};

/// Request timeout for webhook delivery.
const TIMEOUT: Duration = Duration::from_secs(5);

/// Longest SQL excerpt sent to Slack, in characters.
const MAX_SQL_CHARS: usize = 1000;

/// Slack settings, the `slack` config block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlackConfig {
    pub webhook_url: String,
    pub channel: Option<String>,
    pub username: String,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            channel: None,
            username: "querylog".to_string(),
        }
    }
}

#[derive(Serialize)]
struct Message<'a> {
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    channel: Option<&'a str>,
    text: &'a str,
    attachments: Vec<Attachment<'a>>,
}

#[derive(Serialize)]
struct Attachment<'a> {
    color: &'static str,
    title: &'a str,
    fields: Vec<Field>,
}

#[derive(Serialize)]
struct Field {
    title: String,
    value: String,
    short: bool,
}

pub struct SlackNotifier {
    client: Client,
    config: SlackConfig,
}

impl SlackNotifier {
    pub fn new(config: SlackConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Transport(format!("build Slack client: {e}")))?;
        Ok(Self { client, config })
    }

    fn message<'a>(&'a self, alert: &'a Alert) -> Message<'a> {
        let color = match alert.level {
            AlertLevel::Info => "good",
            AlertLevel::Warning => "warning",
            AlertLevel::Critical => "danger",
        };
        let fields = alert
            .context
            .iter()
            .map(|(key, value)| Field {
                title: key.clone(),
                value: if key == "sql" {
                    truncate(value, MAX_SQL_CHARS)
                } else {
                    value.clone()
                },
                short: key != "sql" && key != "bindings",
            })
            .collect();

        Message {
            username: &self.config.username,
            channel: self.config.channel.as_deref(),
            text: &alert.title,
            attachments: vec![Attachment {
                color,
                title: &alert.title,
                fields,
            }],
        }
    }
}

impl AlertNotifier for SlackNotifier {
    fn notify(&self, alert: &Alert) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.config.webhook_url)
            .json(&self.message(alert))
            .send()
            .map_err(|e| NotifyError::Transport(format!("Slack request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().unwrap_or_else(|_| "<no body>".to_string());
            return Err(NotifyError::Rejected { status, body });
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "SlackNotifier"
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
