//! Normalized billable event.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time::day_key;

/// A calendar event reduced to what the billing report needs.
///
/// Produced by the normalizer in `gcalbill-providers` and folded into a
/// [`DailyAggregate`](crate::aggregate::DailyAggregate).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedEvent {
    /// The local calendar day the event starts on.
    pub day: NaiveDate,
    /// Event duration rounded to whole hours.
    pub hours: i64,
    /// Trimmed description with any filter prefix removed.
    pub description: String,
}

impl NormalizedEvent {
    /// Creates a new normalized event.
    pub fn new(day: NaiveDate, hours: i64, description: impl Into<String>) -> Self {
        Self {
            day,
            hours,
            description: description.into(),
        }
    }

    /// Returns the `YYYY-MM-DD` key of the event's day.
    pub fn day_key(&self) -> String {
        day_key(self.day)
    }
}
