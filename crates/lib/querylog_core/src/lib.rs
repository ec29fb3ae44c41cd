//! # querylog_core
//!
//! Query capture-and-routing pipeline: normalizes executed-query events,
//! evaluates the all-queries and slow-queries policies, writes formatted
//! lines to the matching log files and escalates slow queries to an
//! injected alert notifier.

pub mod alert;
pub mod config;
pub mod error;
pub mod format;
pub mod logger;
pub mod naming;
pub mod policy;
pub mod record;
pub mod router;
pub mod writer;

pub use error::{Error, Result};
pub use logger::SqlLogger;
pub use record::{QueryEvent, QueryRecord, RawQueryEvent};
pub use writer::{QueryWriter, SaveReport};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
