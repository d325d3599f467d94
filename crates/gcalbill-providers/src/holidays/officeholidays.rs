//! Holiday calendars from officeholidays.com.

use chrono::NaiveDate;
use gcalbill_core::HolidayEntry;
use icalendar::{
    Calendar, CalendarComponent, CalendarDateTime, Component, DatePerhapsTime, Event, EventLike,
};
use tracing::debug;
use url::Url;

use crate::error::{ProviderError, ProviderResult};
use crate::http::read_success_body;
use crate::provider::BoxFuture;

use super::HolidayCalendar;

/// ICS export endpoint, keyed by the `tbl_country` query parameter.
pub const OFFICEHOLIDAYS_URL: &str = "https://www.officeholidays.com/ics/ics_country_iso.php";

/// Downloads a country's holidays as ICS.
#[derive(Debug, Clone)]
pub struct OfficeHolidays {
    http: reqwest::Client,
}

impl OfficeHolidays {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Calendar URL for `country`.
    pub fn url_for(&self, country: &str) -> ProviderResult<Url> {
        Url::parse_with_params(OFFICEHOLIDAYS_URL, &[("tbl_country", country)])
            .map_err(|e| ProviderError::configuration(format!("invalid holiday URL: {}", e)))
    }

    async fn fetch(&self, country: &str) -> ProviderResult<Vec<HolidayEntry>> {
        let url = self.url_for(country)?;
        debug!(%url, "fetching holiday calendar");
        let response = self.http.get(url).send().await?;
        let body = read_success_body(response).await?;
        parse_holiday_ics(&body)
    }
}

impl HolidayCalendar for OfficeHolidays {
    fn holidays<'a>(&'a self, country: &'a str) -> BoxFuture<'a, ProviderResult<Vec<HolidayEntry>>> {
        Box::pin(async move {
            self.fetch(country)
                .await
                .map_err(|e| e.with_provider("officeholidays"))
        })
    }
}

/// Parses the VEVENTs of an ICS document into holiday entries.
///
/// Each event contributes its `DTSTART` day and its `SUMMARY`. Events
/// missing either are skipped.
pub fn parse_holiday_ics(ics: &str) -> ProviderResult<Vec<HolidayEntry>> {
    let calendar = ics.parse::<Calendar>().map_err(|e| {
        ProviderError::invalid_response(format!("invalid holiday calendar: {}", e))
    })?;

    Ok(calendar
        .iter()
        .filter_map(|component| match component {
            CalendarComponent::Event(event) => holiday_from_event(event),
            _ => None,
        })
        .collect())
}

fn holiday_from_event(event: &Event) -> Option<HolidayEntry> {
    let Some(day) = event.get_start().map(start_day) else {
        debug!(uid = ?event.get_uid(), "skipping holiday without DTSTART");
        return None;
    };
    let Some(summary) = event.get_summary().map(str::trim).filter(|s| !s.is_empty()) else {
        debug!(uid = ?event.get_uid(), "skipping holiday without SUMMARY");
        return None;
    };
    Some(HolidayEntry::new(day, summary))
}

fn start_day(start: DatePerhapsTime) -> NaiveDate {
    match start {
        DatePerhapsTime::Date(date) => date,
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => dt.date_naive(),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => naive.date(),
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, .. }) => {
            date_time.date()
        }
    }
}
