//! Event types for upcoming calendar events.
//!
//! - [`UpcomingEvent`]: one entry of an upcoming-events query
//! - [`EventStart`]: when the event starts, as the calendar reported it

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

/// The start of an event.
///
/// Calendar APIs return either an RFC3339 date-time or, for all-day events,
/// a bare date. The text is kept verbatim and printed unchanged; use
/// [`EventStart::parse`] for the typed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventStart {
    raw: String,
    all_day: bool,
}

/// A parsed [`EventStart`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartTime {
    /// A timed start, with the offset it was reported with.
    DateTime(DateTime<FixedOffset>),
    /// An all-day date.
    Date(NaiveDate),
}

impl EventStart {
    /// A timed start, expected in RFC3339.
    pub fn date_time(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            all_day: false,
        }
    }

    /// An all-day start, expected as `YYYY-MM-DD`.
    pub fn date(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            all_day: true,
        }
    }

    /// The start exactly as reported.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true for all-day events.
    pub fn is_all_day(&self) -> bool {
        self.all_day
    }

    /// Parses the reported text.
    pub fn parse(&self) -> Result<StartTime, chrono::ParseError> {
        if self.all_day {
            NaiveDate::parse_from_str(&self.raw, "%Y-%m-%d").map(StartTime::Date)
        } else {
            DateTime::parse_from_rfc3339(&self.raw).map(StartTime::DateTime)
        }
    }
}

impl fmt::Display for EventStart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// An upcoming calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingEvent {
    /// The event title. Empty when the calendar has none.
    pub summary: String,
    /// When the event starts.
    pub start: EventStart,
}

impl UpcomingEvent {
    /// Creates a new upcoming event.
    pub fn new(summary: impl Into<String>, start: EventStart) -> Self {
        Self {
            summary: summary.into(),
            start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_prints_verbatim() {
        for raw in [
            "2024-01-02T09:00:00Z",
            "2024-01-02T09:00:00+00:00",
            "2024-01-02T09:00:00.000-05:00",
        ] {
            assert_eq!(EventStart::date_time(raw).to_string(), raw);
        }
    }

    #[test]
    fn timed_start_parses_with_offset() {
        let start = EventStart::date_time("2024-01-02T09:00:00-05:00");
        assert!(!start.is_all_day());

        let StartTime::DateTime(at) = start.parse().unwrap() else {
            panic!("expected a date-time");
        };
        assert_eq!(at.offset().local_minus_utc(), -5 * 3600);
    }

    #[test]
    fn all_day_start() {
        let start = EventStart::date("2024-03-15");
        assert!(start.is_all_day());
        assert_eq!(start.as_str(), "2024-03-15");
        assert_eq!(
            start.parse().unwrap(),
            StartTime::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );
    }

    #[test]
    fn unparsable_start_is_kept() {
        let start = EventStart::date_time("tomorrow");
        assert!(start.parse().is_err());
        assert_eq!(start.to_string(), "tomorrow");

        assert!(EventStart::date("2024-13-40").parse().is_err());
    }

    #[test]
    fn event_serializes_raw_start() {
        let event = UpcomingEvent::new("Standup", EventStart::date("2024-01-02"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["summary"], "Standup");
        assert_eq!(json["start"]["raw"], "2024-01-02");
        assert_eq!(json["start"]["all_day"], true);
    }
}
