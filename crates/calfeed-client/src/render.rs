//! Output rendering for event lists.

use calfeed_core::Event;
use chrono::{DateTime, Utc};

use crate::error::{ClientError, ClientResult};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Text shown when a feed yields no events.
pub const NO_EVENTS_TEXT: &str = "No events";

/// How an event list is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per event.
    #[default]
    Tty,
    /// A JSON array of events.
    Json,
}

/// Renders `events` in the requested format.
pub fn render(events: &[Event], format: OutputFormat) -> ClientResult<String> {
    match format {
        OutputFormat::Tty => Ok(render_tty(events)),
        OutputFormat::Json => {
            serde_json::to_string_pretty(events).map_err(|e| ClientError::Render(e.to_string()))
        }
    }
}

fn render_tty(events: &[Event]) -> String {
    if events.is_empty() {
        return NO_EVENTS_TEXT.to_string();
    }

    events.iter().map(tty_line).collect::<Vec<_>>().join("\n")
}

fn tty_line(event: &Event) -> String {
    let mut line = format!(
        "{} → {}  {}",
        format_instant(event.start_date),
        format_instant(event.end_date),
        event.effective_title()
    );
    if event.is_past {
        line.push_str("  [past]");
    }
    line
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format(TIME_FORMAT).to_string()
}
