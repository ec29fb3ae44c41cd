//! The `ingest` command: feeds JSON-lines query events through the logger.
//!
//! Each non-blank line is one event, either unified
//! (`{"event": {"sql": .., "bindings": [..], "time": ..}}`) or legacy
//! (`{"sql": .., "bindings": [..], "time": ..}`).

use std::fmt;
use std::io::BufRead;

use log::{error, warn};
use querylog_core::router::Stream;
use querylog_core::{RawQueryEvent, SqlLogger};

use crate::Result;

/// Totals for one ingest run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub processed: u64,
    pub written_all: u64,
    pub written_slow: u64,
    pub alerts: u64,
    pub warnings: u64,
    pub rejected: u64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed={} written_all={} written_slow={} alerts={} warnings={} rejected={}",
            self.processed,
            self.written_all,
            self.written_slow,
            self.alerts,
            self.warnings,
            self.rejected
        )
    }
}

/// Log every event in `reader`.
///
/// Lines that are not valid JSON or fail the shape check are counted as
/// rejected and skipped. A fatal pipeline error stops the run.
pub fn run<R: BufRead>(logger: &SqlLogger, reader: R) -> Result<Summary> {
    let mut summary = Summary::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let raw: RawQueryEvent = match serde_json::from_str(&line) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("line {line_no}: invalid JSON: {e}");
                summary.rejected += 1;
                continue;
            }
        };

        match logger.log_raw(raw) {
            Ok(report) => {
                summary.processed += 1;
                if report.wrote(Stream::AllQueries) {
                    summary.written_all += 1;
                }
                if report.wrote(Stream::SlowQueries) {
                    summary.written_slow += 1;
                }
                if report.alert_sent {
                    summary.alerts += 1;
                }
                summary.warnings += report.warnings.len() as u64;
            }
            Err(e @ querylog_core::Error::DirectoryCreationFailed { .. }) => {
                error!("line {line_no}: {e}");
                return Err(e.into());
            }
            Err(e) => {
                warn!("line {line_no}: {e}");
                summary.rejected += 1;
            }
        }
    }

    Ok(summary)
}
