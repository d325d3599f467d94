//! Core types: billing periods, daily aggregate, holidays, report building and rendering

pub mod aggregate;
pub mod error;
pub mod event;
pub mod format;
pub mod holiday;
pub mod report;
pub mod time;
pub mod tracing;

pub use aggregate::{DailyAggregate, DayTotal};
pub use error::{CoreError, CoreResult};
pub use event::NormalizedEvent;
pub use format::{JsonReport, OutputFormatter, OutputStyle, ReportHeader};
pub use holiday::HolidayEntry;
pub use report::{Report, ReportRow, build_report};
pub use time::{DateRange, TimeWindow, day_key, parse_day, round_to_hours};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
