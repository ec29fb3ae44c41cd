//! Query writer, the capture-and-routing orchestrator.
//!
//! For each event: normalize, make sure the log directory exists (first
//! query only), render the line, then fan out to the all-queries and
//! slow-queries files. A slow-query match also raises one alert.
//! Normalization and directory failures abort the save; per-stream write
//! failures and alert failures are returned as warnings.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::alert::{self, Alert, AlertNotifier, NotifyError};
use crate::config::LoggerConfig;
use crate::error::{Error, Result};
use crate::format::{EntryFormatter, Formatter};
use crate::naming::{FileNames, FileNaming};
use crate::policy::{include_in_all, include_in_slow};
use crate::record::{QueryEvent, QueryRecord, RawQueryEvent, normalize};
use crate::router::{FileRouter, Stream, write_line};

/// Outcome of a save that was not aborted.
#[derive(Debug, Default)]
pub struct SaveReport {
    /// Streams the line was successfully written to.
    pub written: Vec<Stream>,
    /// Whether the record matched the slow-query policy.
    pub slow_match: bool,
    /// Whether the alert for a slow match was delivered.
    pub alert_sent: bool,
    /// Non-fatal failures: `FileWriteFailed` and `NotificationFailed`.
    pub warnings: Vec<Error>,
}

impl SaveReport {
    pub fn wrote(&self, stream: Stream) -> bool {
        self.written.contains(&stream)
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

pub struct QueryWriter {
    config: LoggerConfig,
    router: FileRouter,
    formatter: Arc<dyn Formatter>,
    notifier: Arc<dyn AlertNotifier>,
}

impl QueryWriter {
    /// Writer with the default file naming and entry format.
    pub fn new(config: LoggerConfig, notifier: Arc<dyn AlertNotifier>) -> Self {
        let naming = Arc::new(FileNames::new(config.naming.clone()));
        Self::with_parts(config, naming, Arc::new(EntryFormatter::new()), notifier)
    }

    pub fn with_parts(
        config: LoggerConfig,
        naming: Arc<dyn FileNaming>,
        formatter: Arc<dyn Formatter>,
        notifier: Arc<dyn AlertNotifier>,
    ) -> Self {
        let router = FileRouter::new(
            config.directory.clone(),
            naming,
            config.override_file_on_first_query,
        );
        Self {
            config,
            router,
            formatter,
            notifier,
        }
    }

    /// Writer whose notifier is built from the configuration.
    pub fn from_config(config: LoggerConfig) -> core::result::Result<Self, NotifyError> {
        let notifier = alert::from_config(&config)?;
        Ok(Self::new(config, notifier))
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn router(&self) -> &FileRouter {
        &self.router
    }

    /// Capture one executed query as query `number` of the current run.
    pub fn save(&self, number: u64, event: QueryEvent) -> Result<SaveReport> {
        self.save_record(normalize(number, event)?)
    }

    /// Capture a record that has already been normalized.
    pub fn save_record(&self, record: QueryRecord) -> Result<SaveReport> {
        self.router.ensure_directory(record.number())?;

        let line = self.formatter.line(&record);
        let mut report = SaveReport::default();

        if include_in_all(&record, &self.config) {
            let route = self.router.resolve(Stream::AllQueries, record.number());
            match write_line(&route, &line) {
                Ok(()) => report.written.push(Stream::AllQueries),
                Err(e) => record_warning(&mut report, e),
            }
        }

        if include_in_slow(&record, &self.config) {
            report.slow_match = true;
            let route = self.router.resolve(Stream::SlowQueries, record.number());
            match write_line(&route, &line) {
                Ok(()) => report.written.push(Stream::SlowQueries),
                Err(e) => record_warning(&mut report, e),
            }

            let alert = Alert::slow_query(&record, self.config.slow_threshold_secs);
            match self.notifier.notify(&alert) {
                Ok(()) => report.alert_sent = true,
                Err(e) => record_warning(&mut report, Error::NotificationFailed(e)),
            }
        }

        debug!(
            number = record.number(),
            written = ?report.written,
            slow = report.slow_match,
            "query captured"
        );
        Ok(report)
    }

    /// Like [`save`](Self::save), for an event read from JSON.
    pub fn save_raw(&self, number: u64, raw: RawQueryEvent) -> Result<SaveReport> {
        self.save(number, QueryEvent::try_from(raw)?)
    }
}

fn record_warning(report: &mut SaveReport, error: Error) {
    warn!("QueryWriter: {error}");
    report.warnings.push(error);
}
