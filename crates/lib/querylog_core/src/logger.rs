//! Run-scoped logger facade.
//!
//! Numbers queries for the caller: the first query after construction or
//! [`SqlLogger::reset`] is query `1`. The writer itself keeps no state.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::Result;
use crate::record::{QueryEvent, RawQueryEvent, normalize};
use crate::writer::{QueryWriter, SaveReport};

pub struct SqlLogger {
    writer: QueryWriter,
    counter: AtomicU64,
}

impl SqlLogger {
    pub fn new(writer: QueryWriter) -> Self {
        Self {
            writer,
            counter: AtomicU64::new(0),
        }
    }

    pub fn writer(&self) -> &QueryWriter {
        &self.writer
    }

    /// Number of queries numbered in the current run.
    pub fn count(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Start a new run; the next query is number `1` again.
    pub fn reset(&self) {
        self.counter.store(0, Ordering::SeqCst);
    }

    fn next_number(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Log one event. A malformed event is rejected before it is numbered,
    /// so it never takes the slot of the run's first query.
    pub fn log(&self, event: QueryEvent) -> Result<SaveReport> {
        let record = normalize(1, event)?.with_number(self.next_number());
        self.writer.save_record(record)
    }

    /// Log an event read from JSON. Rejected events do not consume a
    /// sequence number.
    pub fn log_raw(&self, raw: RawQueryEvent) -> Result<SaveReport> {
        let event = QueryEvent::try_from(raw)?;
        self.log(event)
    }
}
