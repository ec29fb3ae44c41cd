//! Query records and the normalizer that builds them.
//!
//! Hosts report executed queries in one of two shapes. The unified shape is
//! a single event object carrying the SQL, its bindings and the elapsed
//! time. The legacy shape is a bare SQL string with bindings and time passed
//! alongside it. Both are modelled as variants of [`QueryEvent`] and
//! normalized into one immutable [`QueryRecord`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// A query execution event as reported by the host.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryEvent {
    /// Unified event object. Any separately supplied bindings or time do not
    /// exist in this shape and are never consulted.
    Unified {
        sql: String,
        bindings: Vec<Value>,
        time: f64,
    },
    /// Bare SQL string with explicitly supplied bindings and time.
    Legacy {
        sql: String,
        bindings: Option<Vec<Value>>,
        time: Option<f64>,
    },
}

impl QueryEvent {
    /// Unified event carrying its own bindings and elapsed seconds.
    pub fn unified(sql: impl Into<String>, bindings: Vec<Value>, time: f64) -> Self {
        QueryEvent::Unified {
            sql: sql.into(),
            bindings,
            time,
        }
    }

    /// Bare SQL with optionally supplied bindings and elapsed seconds.
    pub fn legacy(sql: impl Into<String>, bindings: Option<Vec<Value>>, time: Option<f64>) -> Self {
        QueryEvent::Legacy {
            sql: sql.into(),
            bindings,
            time,
        }
    }
}

/// One normalized, immutable executed query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryRecord {
    number: u64,
    sql: String,
    bindings: Vec<Value>,
    time: Option<f64>,
}

impl QueryRecord {
    /// Position of the query within the current run; `1` is the first query.
    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn bindings(&self) -> &[Value] {
        &self.bindings
    }

    /// Elapsed execution time in seconds, when the event shape supplied it.
    pub fn time(&self) -> Option<f64> {
        self.time
    }

    /// Elapsed seconds for threshold comparison; missing timing counts as zero.
    pub fn elapsed_secs(&self) -> f64 {
        self.time.unwrap_or(0.0)
    }

    pub fn is_first(&self) -> bool {
        self.number == 1
    }

    /// Move an already validated record to another position in the run.
    pub(crate) fn with_number(self, number: u64) -> Self {
        debug_assert!(number > 0);
        Self { number, ..self }
    }
}

/// Normalize a host event into a [`QueryRecord`].
///
/// Pure; performs no I/O. Rejects events whose fields cannot form a complete
/// record with [`Error::MalformedQueryEvent`].
pub fn normalize(number: u64, event: QueryEvent) -> Result<QueryRecord> {
    if number == 0 {
        return Err(Error::MalformedQueryEvent(
            "sequence number must be positive".into(),
        ));
    }

    let (sql, bindings, time) = match event {
        QueryEvent::Unified {
            sql,
            bindings,
            time,
        } => (sql, bindings, Some(time)),
        QueryEvent::Legacy {
            sql,
            bindings,
            time,
        } => (sql, bindings.unwrap_or_default(), time),
    };

    if sql.trim().is_empty() {
        return Err(Error::MalformedQueryEvent("query has no SQL text".into()));
    }
    if let Some(t) = time
        && (!t.is_finite() || t < 0.0)
    {
        return Err(Error::MalformedQueryEvent(format!(
            "elapsed time must be a non-negative number, got {t}"
        )));
    }

    Ok(QueryRecord {
        number,
        sql,
        bindings,
        time,
    })
}

/// Loosely-typed event as read from JSON.
///
/// A nested `event` object is the unified shape; a top-level `sql` string is
/// the legacy shape. Carrying both is ambiguous and is rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawQueryEvent {
    #[serde(default)]
    pub event: Option<RawUnifiedEvent>,
    #[serde(default)]
    pub sql: Option<String>,
    #[serde(default)]
    pub bindings: Option<Vec<Value>>,
    #[serde(default)]
    pub time: Option<f64>,
}

/// The `event` object of a unified-shape [`RawQueryEvent`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUnifiedEvent {
    #[serde(default)]
    pub sql: Option<String>,
    #[serde(default)]
    pub bindings: Option<Vec<Value>>,
    #[serde(default)]
    pub time: Option<f64>,
}

impl TryFrom<RawQueryEvent> for QueryEvent {
    type Error = Error;

    fn try_from(raw: RawQueryEvent) -> Result<Self> {
        match (raw.event, raw.sql) {
            (Some(_), Some(_)) => Err(Error::MalformedQueryEvent(
                "ambiguous event: both `event` object and top-level `sql` present".into(),
            )),
            (Some(event), None) => {
                let sql = event.sql.ok_or_else(|| {
                    Error::MalformedQueryEvent("unified event is missing `sql`".into())
                })?;
                let time = event.time.ok_or_else(|| {
                    Error::MalformedQueryEvent("unified event is missing `time`".into())
                })?;
                if raw.bindings.is_some() || raw.time.is_some() {
                    tracing::debug!("ignoring explicit bindings/time on unified event");
                }
                Ok(QueryEvent::Unified {
                    sql,
                    bindings: event.bindings.unwrap_or_default(),
                    time,
                })
            }
            (None, Some(sql)) => Ok(QueryEvent::Legacy {
                sql,
                bindings: raw.bindings,
                time: raw.time,
            }),
            (None, None) => Err(Error::MalformedQueryEvent(
                "event has neither an `event` object nor a `sql` string".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawQueryEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn unified_event_takes_fields_from_object() {
        let record = normalize(
            3,
            QueryEvent::unified("SELECT * FROM users WHERE id = ?", vec![json!(7)], 0.25),
        )
        .unwrap();
        assert_eq!(record.number(), 3);
        assert_eq!(record.sql(), "SELECT * FROM users WHERE id = ?");
        assert_eq!(record.bindings(), &[json!(7)]);
        assert_eq!(record.time(), Some(0.25));
        assert!(!record.is_first());
    }

    #[test]
    fn legacy_event_uses_explicit_arguments() {
        let record = normalize(
            1,
            QueryEvent::legacy("DELETE FROM t WHERE a = ?", Some(vec![json!("x")]), Some(1.5)),
        )
        .unwrap();
        assert_eq!(record.bindings(), &[json!("x")]);
        assert_eq!(record.time(), Some(1.5));
        assert!(record.is_first());
    }

    #[test]
    fn legacy_event_defaults_missing_arguments() {
        let record = normalize(2, QueryEvent::legacy("SELECT 1", None, None)).unwrap();
        assert!(record.bindings().is_empty());
        assert_eq!(record.time(), None);
        assert_eq!(record.elapsed_secs(), 0.0);
    }

    #[test]
    fn rejects_empty_sql() {
        let err = normalize(1, QueryEvent::legacy("   ", None, None)).unwrap_err();
        assert!(matches!(err, Error::MalformedQueryEvent(_)));
    }

    #[test]
    fn rejects_zero_sequence_number() {
        let err = normalize(0, QueryEvent::legacy("SELECT 1", None, None)).unwrap_err();
        assert!(matches!(err, Error::MalformedQueryEvent(_)));
    }

    #[test]
    fn rejects_negative_or_nan_time() {
        assert!(normalize(1, QueryEvent::unified("SELECT 1", vec![], -0.1)).is_err());
        assert!(normalize(1, QueryEvent::legacy("SELECT 1", None, Some(f64::NAN))).is_err());
    }

    #[test]
    fn raw_unified_ignores_explicit_arguments() {
        let event = QueryEvent::try_from(raw(json!({
            "event": { "sql": "SELECT 1", "bindings": [1, 2], "time": 0.5 },
            "bindings": ["ignored"],
            "time": 99.0
        })))
        .unwrap();
        assert_eq!(
            event,
            QueryEvent::unified("SELECT 1", vec![json!(1), json!(2)], 0.5)
        );
    }

    #[test]
    fn raw_legacy_shape() {
        let event = QueryEvent::try_from(raw(json!({
            "sql": "UPDATE t SET a = ?",
            "bindings": [true],
            "time": 0.01
        })))
        .unwrap();
        assert_eq!(
            event,
            QueryEvent::legacy("UPDATE t SET a = ?", Some(vec![json!(true)]), Some(0.01))
        );
    }

    #[test]
    fn raw_ambiguous_shape_is_rejected() {
        let err = QueryEvent::try_from(raw(json!({
            "event": { "sql": "SELECT 1", "time": 0.1 },
            "sql": "SELECT 2"
        })))
        .unwrap_err();
        assert!(err.to_string().contains("ambiguous"));
    }

    #[test]
    fn raw_without_either_shape_is_malformed() {
        let err = QueryEvent::try_from(raw(json!({ "bindings": [1], "time": 1.0 }))).unwrap_err();
        assert!(matches!(err, Error::MalformedQueryEvent(_)));
    }

    #[test]
    fn raw_unified_missing_sql_is_malformed() {
        let err = QueryEvent::try_from(raw(json!({ "event": { "time": 1.0 } }))).unwrap_err();
        assert!(matches!(err, Error::MalformedQueryEvent(_)));
    }
}
