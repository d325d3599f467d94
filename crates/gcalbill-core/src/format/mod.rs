//! Output formatting for billing reports.
//!
//! This module renders a [`Report`] in one of three output styles:
//! - **Tab**: tab-separated columns, the default terminal output
//! - **Dash**: dash-separated columns, easier to paste into invoices
//! - **JSON**: machine-readable output
//!
//! # Example
//!
//! ```rust
//! use gcalbill_core::format::{OutputFormatter, OutputStyle, ReportHeader};
//! use gcalbill_core::{DailyAggregate, DateRange, build_report};
//! use chrono::NaiveDate;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
//! let header = ReportHeader::new("acme", DateRange::new(start, end).unwrap());
//! let report = build_report(&DailyAggregate::new(), &[]);
//!
//! let text = OutputFormatter::new(OutputStyle::Dash).render(&report, &header);
//! assert!(text.starts_with("Listing work done on acme project"));
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::holiday::HolidayEntry;
use crate::report::{Report, ReportRow};
use crate::time::{DAY_KEY_FORMAT, DateRange};


/// The output style for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStyle {
    /// Tab-separated columns.
    #[default]
    Tab,
    /// Dash-separated columns.
    Dash,
    /// Pretty-printed JSON.
    Json,
}

/// Context printed above the report rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeader {
    /// Symbolic calendar (project) name, empty for the primary calendar.
    pub calendar: String,
    /// The billed period.
    pub range: DateRange,
}

impl ReportHeader {
    /// Creates a new header.
    pub fn new(calendar: impl Into<String>, range: DateRange) -> Self {
        Self {
            calendar: calendar.into(),
            range,
        }
    }
}

/// Report with its header, as emitted in JSON mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonReport {
    /// Calendar (project) name.
    pub calendar: String,
    /// First billed day.
    pub start: NaiveDate,
    /// Day after the last billed day.
    pub end: NaiveDate,
    /// Worked days.
    pub days: Vec<ReportRow>,
    /// Public holidays falling on worked days.
    pub holidays: Vec<HolidayEntry>,
    /// Sum of hours.
    pub total_hours: i64,
    /// Number of worked days.
    pub day_count: usize,
}

/// Renders reports in a fixed style.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputFormatter {
    style: OutputStyle,
}

impl OutputFormatter {
    /// Creates a formatter for the given style.
    pub fn new(style: OutputStyle) -> Self {
        Self { style }
    }

    /// Returns the configured style.
    pub fn style(&self) -> OutputStyle {
        self.style
    }

    /// Renders the report as text in the configured style.
    pub fn render(&self, report: &Report, header: &ReportHeader) -> String {
        match self.style {
            OutputStyle::Tab => self.format_tab(report, header),
            OutputStyle::Dash => self.format_dash(report, header),
            OutputStyle::Json => {
                // Plain data with string keys, serialization cannot fail.
                serde_json::to_string_pretty(&self.format_json(report, header))
                    .unwrap_or_default()
            }
        }
    }

    /// Tab-separated rendering.
    pub fn format_tab(&self, report: &Report, header: &ReportHeader) -> String {
        let mut out = title_line(header);
        out.push_str(&format!("{:>10}\tHr\tDescription\n", "Date"));
        for row in &report.rows {
            out.push_str(&format!(
                "{:>10}\t{:>2}\t{}\n",
                row.day.format(DAY_KEY_FORMAT),
                row.hours,
                row.description
            ));
        }
        out.push_str(&totals(report));
        out.push_str(&holiday_section(report));
        out
    }

    /// Dash-separated rendering.
    pub fn format_dash(&self, report: &Report, header: &ReportHeader) -> String {
        let mut out = title_line(header);
        out.push_str(&format!("{:>10} - Hr - Description\n", "Date"));
        for row in &report.rows {
            out.push_str(&format!(
                "{:>10} - {}h - {}\n",
                row.day.format(DAY_KEY_FORMAT),
                row.hours,
                row.description
            ));
        }
        out.push_str(&totals(report));
        out.push_str(&holiday_section(report));
        out
    }

    /// Builds the JSON representation.
    pub fn format_json(&self, report: &Report, header: &ReportHeader) -> JsonReport {
        JsonReport {
            calendar: header.calendar.clone(),
            start: header.range.start,
            end: header.range.end,
            days: report.rows.clone(),
            holidays: report.holidays.clone(),
            total_hours: report.total_hours,
            day_count: report.day_count,
        }
    }
}

fn title_line(header: &ReportHeader) -> String {
    format!(
        "Listing work done on {} project from {} to {}\n",
        header.calendar,
        header.range.start.format(DAY_KEY_FORMAT),
        header.range.end.format(DAY_KEY_FORMAT)
    )
}

fn totals(report: &Report) -> String {
    format!(
        "\nTotal workhour sum for given period:\t\t{} hours\n\
         Total active days for given period:\t\t{} days\n",
        report.total_hours, report.day_count
    )
}

fn holiday_section(report: &Report) -> String {
    if report.holidays.is_empty() {
        return String::new();
    }
    let mut out = String::from("\nPublic holidays on worked days:\n");
    for holiday in &report.holidays {
        out.push_str(&format!(
            "{:>10}\t{}\n",
            holiday.day.format(DAY_KEY_FORMAT),
            holiday.description
        ));
    }
    out
}
