//! Per-day accumulation of billable hours.
//!
//! A [`DailyAggregate`] maps each calendar day to the sum of the hours of the
//! events folded into it and the `", "`-joined list of their descriptions.
//! It is owned by a single collector task and never shared.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::event::NormalizedEvent;

/// Separator used when concatenating descriptions of the same day.
pub const DESCRIPTION_SEPARATOR: &str = ", ";

/// Accumulated work for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayTotal {
    /// Sum of rounded hours of every event on that day.
    pub total_hours: i64,
    /// Descriptions joined in fold order.
    pub description: String,
}

/// Mapping from calendar day to its accumulated work.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyAggregate {
    days: BTreeMap<NaiveDate, DayTotal>,
}

impl DailyAggregate {
    /// Creates an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one event's contribution into the aggregate.
    ///
    /// Folding is additive: folding the same event twice counts it twice.
    pub fn fold(&mut self, day: NaiveDate, hours: i64, description: &str) {
        self.days
            .entry(day)
            .and_modify(|total| {
                total.total_hours += hours;
                total.description.push_str(DESCRIPTION_SEPARATOR);
                total.description.push_str(description);
            })
            .or_insert_with(|| DayTotal {
                total_hours: hours,
                description: description.to_string(),
            });
    }

    /// Folds a normalized event.
    pub fn fold_event(&mut self, event: &NormalizedEvent) {
        self.fold(event.day, event.hours, &event.description);
    }

    /// Returns the accumulated work for `day`, if any.
    pub fn get(&self, day: NaiveDate) -> Option<&DayTotal> {
        self.days.get(&day)
    }

    /// Returns true if at least one event was folded into `day`.
    pub fn contains_day(&self, day: NaiveDate) -> bool {
        self.days.contains_key(&day)
    }

    /// Number of distinct days present.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Returns true if no event has been folded.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Iterates over days in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &DayTotal)> {
        self.days.iter()
    }
}

impl<'a> Extend<&'a NormalizedEvent> for DailyAggregate {
    fn extend<I: IntoIterator<Item = &'a NormalizedEvent>>(&mut self, iter: I) {
        for event in iter {
            self.fold_event(event);
        }
    }
}

impl<'a> FromIterator<&'a NormalizedEvent> for DailyAggregate {
    fn from_iter<I: IntoIterator<Item = &'a NormalizedEvent>>(iter: I) -> Self {
        let mut agg = Self::new();
        agg.extend(iter);
        agg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn fold_inserts_new_day() {
        let mut agg = DailyAggregate::new();
        agg.fold(date(2024, 1, 5), 3, "parser");

        let day = agg.get(date(2024, 1, 5)).unwrap();
        assert_eq!(day.total_hours, 3);
        assert_eq!(day.description, "parser");
        assert_eq!(agg.len(), 1);
    }

    #[test]
    fn fold_merges_same_day_in_order() {
        let mut agg = DailyAggregate::new();
        agg.fold(date(2024, 1, 5), 3, "parser");
        agg.fold(date(2024, 1, 5), 2, "review");

        let day = agg.get(date(2024, 1, 5)).unwrap();
        assert_eq!(day.total_hours, 5);
        assert_eq!(day.description, "parser, review");
        assert_eq!(agg.len(), 1);
    }

    #[test]
    fn totals_do_not_depend_on_fold_order() {
        let events = vec![
            NormalizedEvent::new(date(2024, 1, 5), 3, "a"),
            NormalizedEvent::new(date(2024, 1, 6), 1, "b"),
            NormalizedEvent::new(date(2024, 1, 5), 4, "c"),
            NormalizedEvent::new(date(2024, 1, 5), -1, "d"),
            NormalizedEvent::new(date(2024, 1, 6), 2, "e"),
        ];

        let forward: DailyAggregate = events.iter().collect();
        let backward: DailyAggregate = events.iter().rev().collect();

        for day in [date(2024, 1, 5), date(2024, 1, 6)] {
            assert_eq!(
                forward.get(day).unwrap().total_hours,
                backward.get(day).unwrap().total_hours
            );
        }
        assert_eq!(forward.get(date(2024, 1, 5)).unwrap().total_hours, 6);
        assert_eq!(backward.get(date(2024, 1, 5)).unwrap().description, "d, c, a");
    }

    #[test]
    fn folding_twice_double_counts() {
        let event = NormalizedEvent::new(date(2024, 1, 5), 3, "a");
        let mut agg = DailyAggregate::new();
        agg.fold_event(&event);
        agg.fold_event(&event);
        assert_eq!(agg.get(date(2024, 1, 5)).unwrap().total_hours, 6);
    }

    #[test]
    fn iterates_in_date_order() {
        let mut agg = DailyAggregate::new();
        agg.fold(date(2024, 1, 10), 3, "c");
        agg.fold(date(2023, 12, 31), 1, "a");
        agg.fold(date(2024, 1, 5), 2, "b");

        let days: Vec<NaiveDate> = agg.iter().map(|(day, _)| *day).collect();
        assert_eq!(days, vec![date(2023, 12, 31), date(2024, 1, 5), date(2024, 1, 10)]);
    }

    #[test]
    fn empty_aggregate() {
        let agg = DailyAggregate::new();
        assert!(agg.is_empty());
        assert!(!agg.contains_day(date(2024, 1, 5)));
    }
}
