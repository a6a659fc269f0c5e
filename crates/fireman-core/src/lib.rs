//! Core types: upcoming events, output formatting, tracing

pub mod event;
pub mod format;
pub mod tracing;

pub use crate::tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
pub use event::{EventStart, StartTime, UpcomingEvent};
pub use format::{
    JsonEvent, JsonOutput, NO_EVENTS_TEXT, OutputFormat, OutputFormatter, UPCOMING_HEADER,
    event_line,
};
