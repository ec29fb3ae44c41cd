//! Log line rendering.

use chrono::{DateTime, Local};
use serde_json::Value;

use crate::record::QueryRecord;

/// Renders a record into the text written to the log files.
pub trait Formatter: Send + Sync {
    /// One self-contained, newline-terminated line.
    fn line(&self, record: &QueryRecord) -> String;
}

/// Default entry format:
///
/// ```text
/// /* Query 3 - 2024-03-09 10:15:02 [12.50ms] */ SELECT * FROM users WHERE id = 7;
/// ```
///
/// `?` placeholders outside quoted literals are replaced by the rendered
/// bindings; line breaks inside the SQL are folded into spaces.
#[derive(Debug, Clone, Default)]
pub struct EntryFormatter;

impl EntryFormatter {
    pub fn new() -> Self {
        Self
    }

    fn render(&self, record: &QueryRecord, now: DateTime<Local>) -> String {
        let time = match record.time() {
            Some(secs) => format!("{:.2}ms", secs * 1000.0),
            None => "n/a".to_string(),
        };
        let sql = interpolate(record.sql(), record.bindings());
        let sql: String = sql
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let sql = sql.trim_end_matches(';');

        format!(
            "/* Query {} - {} [{time}] */ {sql};\n",
            record.number(),
            now.format("%Y-%m-%d %H:%M:%S"),
        )
    }
}

impl Formatter for EntryFormatter {
    fn line(&self, record: &QueryRecord) -> String {
        self.render(record, Local::now())
    }
}

/// Replace `?` placeholders outside quoted literals with rendered bindings.
///
/// Inside a literal a backslash escapes the next character, so MySQL-style
/// `'it\'s'` stays one literal. Placeholders beyond the number of bindings
/// are left as-is.
pub fn interpolate(sql: &str, bindings: &[Value]) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut values = bindings.iter();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in sql.chars() {
        if escaped {
            escaped = false;
            out.push(c);
            continue;
        }
        match (quote, c) {
            (Some(_), '\\') => {
                escaped = true;
                out.push(c);
            }
            (None, '\'' | '"' | '`') => {
                quote = Some(c);
                out.push(c);
            }
            (Some(q), _) if c == q => {
                quote = None;
                out.push(c);
            }
            (None, '?') => match values.next() {
                Some(value) => out.push_str(&render_binding(value)),
                None => out.push('?'),
            },
            _ => out.push(c),
        }
    }

    out
}

fn render_binding(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote_literal(s),
        other => quote_literal(&other.to_string()),
    }
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
