//! Output formatting for upcoming events.
//!
//! Two formats are supported:
//! - **TTY**: a header line followed by one `<summary> (<start>)` line per event
//! - **JSON**: machine-readable output for scripting
//!
//! # Example
//!
//! ```rust
//! use fireman_core::format::{OutputFormat, OutputFormatter};
//!
//! let formatter = OutputFormatter::new(OutputFormat::Tty);
//! assert_eq!(
//!     formatter.format(&[]),
//!     "Upcoming events:\nNo upcoming events found.\n"
//! );
//! ```

use serde::{Deserialize, Serialize};

use crate::event::UpcomingEvent;

/// Header printed before the event list.
pub const UPCOMING_HEADER: &str = "Upcoming events:";

/// Line printed when the query returned nothing.
pub const NO_EVENTS_TEXT: &str = "No upcoming events found.";

/// The output format for the event summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable terminal output.
    #[default]
    Tty,
    /// Machine-readable JSON output.
    Json,
}

/// JSON document emitted by [`OutputFormat::Json`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonOutput {
    /// The events, in start order.
    pub events: Vec<JsonEvent>,
}

/// A single event in [`JsonOutput`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonEvent {
    pub summary: String,
    pub start: String,
    pub all_day: bool,
}

impl From<&UpcomingEvent> for JsonEvent {
    fn from(event: &UpcomingEvent) -> Self {
        Self {
            summary: event.summary.clone(),
            start: event.start.to_string(),
            all_day: event.start.is_all_day(),
        }
    }
}

/// Renders upcoming events in the chosen format.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    /// Creates a formatter for the given format.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats the events. The returned string ends with a newline.
    pub fn format(&self, events: &[UpcomingEvent]) -> String {
        match self.format {
            OutputFormat::Tty => format_tty(events),
            OutputFormat::Json => {
                let output = JsonOutput {
                    events: events.iter().map(JsonEvent::from).collect(),
                };
                // Only strings and bools, serialization cannot fail.
                let mut json = serde_json::to_string_pretty(&output).unwrap_or_default();
                json.push('\n');
                json
            }
        }
    }
}

/// Formats a single event line.
pub fn event_line(event: &UpcomingEvent) -> String {
    format!("{} ({})", event.summary, event.start)
}

fn format_tty(events: &[UpcomingEvent]) -> String {
    let mut out = String::new();
    out.push_str(UPCOMING_HEADER);
    out.push('\n');

    if events.is_empty() {
        out.push_str(NO_EVENTS_TEXT);
        out.push('\n');
        return out;
    }

    for event in events {
        out.push_str(&event_line(event));
        out.push('\n');
    }
    out
}
