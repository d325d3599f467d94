//! Public holiday entries.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::time::day_key;

/// One public holiday in the caller's country.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HolidayEntry {
    /// The day of the holiday.
    pub day: NaiveDate,
    /// The holiday's name as published by the holiday calendar.
    pub description: String,
}

impl HolidayEntry {
    /// Creates a new holiday entry.
    pub fn new(day: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            day,
            description: description.into(),
        }
    }

    /// Returns the `YYYY-MM-DD` key of the holiday.
    pub fn day_key(&self) -> String {
        day_key(self.day)
    }
}
