//! Raw event type from the calendar provider.
//!
//! A [`RawEvent`] carries the event fields exactly as the remote API returned
//! them. Timestamps stay textual until the normalizer resolves them in the
//! local timezone.

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// One boundary (start or end) of a raw event.
///
/// The precise timestamp is preferred; the date-only value is the fallback
/// the API uses for all-day events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum RawEventTime {
    /// RFC 3339 timestamp, e.g. `2024-01-05T09:00:00+01:00`.
    DateTime(String),
    /// Calendar date, e.g. `2024-01-05`.
    Date(String),
}

impl RawEventTime {
    /// Picks the precise timestamp when present, else the date.
    ///
    /// Empty strings count as absent. Returns `None` when neither is set.
    pub fn from_parts(date_time: Option<String>, date: Option<String>) -> Option<Self> {
        match (date_time.filter(|s| !s.is_empty()), date.filter(|s| !s.is_empty())) {
            (Some(dt), _) => Some(Self::DateTime(dt)),
            (None, Some(d)) => Some(Self::Date(d)),
            (None, None) => None,
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// Resolves this boundary to an instant in `tz`.
    ///
    /// Only RFC 3339 timestamps resolve. A bare date has no time of day and
    /// is reported as an error, which makes the caller skip the event.
    pub fn resolve<Tz: TimeZone>(&self, tz: &Tz) -> Result<DateTime<Tz>, String> {
        match self {
            Self::DateTime(text) => DateTime::parse_from_rfc3339(text.trim())
                .map(|dt| dt.with_timezone(tz))
                .map_err(|e| format!("invalid timestamp {:?}: {}", text, e)),
            Self::Date(text) => Err(format!("date-only value {:?} has no time of day", text)),
        }
    }
}

/// A calendar event as listed by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawEvent {
    /// Provider-assigned identifier.
    pub id: String,
    /// Start boundary; `None` when the API sent neither a timestamp nor a date.
    pub start: Option<RawEventTime>,
    /// End boundary, same rules as `start`.
    pub end: Option<RawEventTime>,
    /// Event title.
    pub summary: Option<String>,
    /// Free-text notes. Preferred over the summary when non-blank.
    pub description: Option<String>,
    /// Set on instances expanded from a recurring series.
    pub recurring_event_id: Option<String>,
}

impl RawEvent {
    /// Creates a timed event from two RFC 3339 timestamps.
    pub fn timed(id: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            start: Some(RawEventTime::DateTime(start.into())),
            end: Some(RawEventTime::DateTime(end.into())),
            ..Self::default()
        }
    }

    /// Sets the title.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Sets the notes.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Marks the event as an instance of the series `id`.
    pub fn with_recurring_event_id(mut self, id: impl Into<String>) -> Self {
        self.recurring_event_id = Some(id.into());
        self
    }

    /// True when the event is an instance of a recurring series.
    pub fn is_recurring_instance(&self) -> bool {
        self.recurring_event_id
            .as_deref()
            .is_some_and(|id| !id.is_empty())
    }

    /// Trimmed description, falling back to the trimmed summary.
    ///
    /// A description made only of whitespace counts as missing.
    pub fn effective_description(&self) -> String {
        let pick = |field: &Option<String>| {
            field
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
        };
        pick(&self.description)
            .or_else(|| pick(&self.summary))
            .unwrap_or_default()
    }
}
