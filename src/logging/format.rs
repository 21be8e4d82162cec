//! Line format shared by every sink
//!
//! `2026-01-21T14:30:45.123Z INFO  message file=main.rs line=12`

use std::fmt::{self, Write as _};

use chrono::{SecondsFormat, Utc};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use super::level::Level;
use super::logger::TARGET;

/// Target of fatal records, which travel as `ERROR` events
pub const FATAL_TARGET: &str = "applog::fatal";

/// Field carrying the timestamp taken once when the facade emits a record
pub const TIMESTAMP_FIELD: &str = "applog.timestamp";

/// Current time in the record format
pub(crate) fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Event formatter producing one plain-text line per record
///
/// Records from the facade carry their own timestamp, so every sink prints
/// the same one. Other `tracing` events are stamped as each sink formats
/// them and their copies can differ by a few milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordFormat;

impl<S, N> FormatEvent<S, N> for RecordFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let target = event.metadata().target();
        let mut record = RecordVisitor {
            facade: target == TARGET || target == FATAL_TARGET,
            ..RecordVisitor::default()
        };
        event.record(&mut record);

        let level = if target == FATAL_TARGET {
            Level::Fatal
        } else {
            Level::from(*event.metadata().level())
        };
        let stamp = record.timestamp.unwrap_or_else(timestamp);

        write!(writer, "{} {:<5} {}", stamp, level, record.message)?;
        for (name, value) in &record.fields {
            write!(writer, " {}={}", name, value)?;
        }
        writeln!(writer)
    }
}

#[derive(Default)]
struct RecordVisitor {
    facade: bool,
    timestamp: Option<String>,
    message: String,
    fields: Vec<(&'static str, String)>,
}

impl Visit for RecordVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else if self.facade && field.name() == TIMESTAMP_FIELD {
            self.timestamp = Some(value.to_string());
        } else {
            self.fields.push((field.name(), quote(value)));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            self.fields.push((field.name(), quote(&format!("{:?}", value))));
        }
    }
}

/// Quote values that would otherwise break `key=value` parsing
fn quote(value: &str) -> String {
    if value.is_empty() || value.contains(|c: char| c.is_whitespace() || c == '"' || c == '=') {
        format!("{:?}", value)
    } else {
        value.to_string()
    }
}
