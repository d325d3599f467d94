//! Report assembly.
//!
//! [`build_report`] joins a [`DailyAggregate`] with the fetched holiday list.
//! It is a pure function: no I/O and no mutation of its inputs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::aggregate::DailyAggregate;
use crate::holiday::HolidayEntry;

/// One day of billed work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// The worked day.
    pub day: NaiveDate,
    /// Total rounded hours for the day.
    pub hours: i64,
    /// Descriptions of the day's events, comma separated.
    pub description: String,
}

/// The billing report for one period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Worked days in chronological order.
    pub rows: Vec<ReportRow>,
    /// Public holidays that fall on a worked day, in chronological order.
    pub holidays: Vec<HolidayEntry>,
    /// Sum of hours over all rows.
    pub total_hours: i64,
    /// Number of distinct worked days.
    pub day_count: usize,
}

impl Report {
    /// Returns true if no work was recorded in the period.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the `YYYY-MM-DD` keys of all rows, in order.
    pub fn day_keys(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| crate::time::day_key(row.day))
            .collect()
    }
}

/// Builds the report from the aggregate and the holiday list.
///
/// Rows come out in the aggregate's date order, which matches the
/// lexicographic order of the `YYYY-MM-DD` keys.
pub fn build_report(agg: &DailyAggregate, holidays: &[HolidayEntry]) -> Report {
    let rows: Vec<ReportRow> = agg
        .iter()
        .map(|(day, total)| ReportRow {
            day: *day,
            hours: total.total_hours,
            description: total.description.clone(),
        })
        .collect();

    let total_hours = rows.iter().map(|row| row.hours).sum();
    let day_count = rows.len();

    let mut overlap: Vec<HolidayEntry> = holidays
        .iter()
        .filter(|holiday| agg.contains_day(holiday.day))
        .cloned()
        .collect();
    overlap.sort_by_key(|holiday| holiday.day);

    Report {
        rows,
        holidays: overlap,
        total_hours,
        day_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::NormalizedEvent;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn same_day_events_form_one_row() {
        let mut agg = DailyAggregate::new();
        agg.fold_event(&NormalizedEvent::new(date(2024, 1, 5), 3, "parser"));
        agg.fold_event(&NormalizedEvent::new(date(2024, 1, 5), 2, "tests"));

        let report = build_report(&agg, &[]);

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.rows[0].hours, 5);
        assert_eq!(report.rows[0].description, "parser, tests");
        assert_eq!(report.total_hours, 5);
        assert_eq!(report.day_count, 1);
    }

    #[test]
    fn rows_are_sorted_and_totals_summed() {
        let mut agg = DailyAggregate::new();
        agg.fold(date(2024, 1, 10), 3, "c");
        agg.fold(date(2024, 1, 5), 2, "a");
        agg.fold(date(2024, 1, 5), 3, "b");

        let report = build_report(&agg, &[]);

        assert_eq!(report.day_keys(), vec!["2024-01-05", "2024-01-10"]);
        assert_eq!(report.day_count, 2);
        assert_eq!(report.total_hours, 8);
        assert!(report.holidays.is_empty());
    }

    #[test]
    fn holiday_overlap_keeps_only_worked_days() {
        let mut agg = DailyAggregate::new();
        agg.fold(date(2024, 5, 1), 4, "release");

        let holidays = vec![
            HolidayEntry::new(date(2024, 5, 2), "Other"),
            HolidayEntry::new(date(2024, 5, 1), "Labor Day"),
        ];
        let report = build_report(&agg, &holidays);

        assert_eq!(
            report.holidays,
            vec![HolidayEntry::new(date(2024, 5, 1), "Labor Day")]
        );
    }

    #[test]
    fn holiday_overlap_is_sorted() {
        let mut agg = DailyAggregate::new();
        agg.fold(date(2024, 12, 25), 1, "oncall");
        agg.fold(date(2024, 12, 24), 1, "oncall");

        let holidays = vec![
            HolidayEntry::new(date(2024, 12, 25), "Christmas Day"),
            HolidayEntry::new(date(2024, 12, 24), "Christmas Eve"),
        ];
        let report = build_report(&agg, &holidays);

        let keys: Vec<String> = report.holidays.iter().map(HolidayEntry::day_key).collect();
        assert_eq!(keys, vec!["2024-12-24", "2024-12-25"]);
    }

    #[test]
    fn empty_inputs_give_empty_report() {
        let report = build_report(&DailyAggregate::new(), &[]);
        assert!(report.is_empty());
        assert_eq!(report, Report::default());
    }

    #[test]
    fn inputs_are_left_untouched() {
        let mut agg = DailyAggregate::new();
        agg.fold(date(2024, 1, 5), 2, "a");
        let snapshot = agg.clone();
        let holidays = vec![HolidayEntry::new(date(2024, 1, 6), "x")];

        let _ = build_report(&agg, &holidays);

        assert_eq!(agg, snapshot);
        assert_eq!(holidays.len(), 1);
    }
}
