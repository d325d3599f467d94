//! Public holiday lookup.
//!
//! The lookup geolocates the caller's country from its public IP and then
//! downloads that country's holiday calendar. It is best effort: any failure
//! or an expired time budget yields an empty holiday list, never an error.
//!
//! ```text
//! ┌──────────────────┐  country   ┌──────────────────┐
//! │    Geolocator    │ ─────────▶ │ HolidayCalendar  │
//! │  (ifconfig.co)   │            │ (officeholidays) │
//! └──────────────────┘            └────────┬─────────┘
//!                                          │
//!                                          ▼
//!                                   HolidayLookup
//! ```

mod fetcher;
mod geoip;
mod officeholidays;

use gcalbill_core::HolidayEntry;

use crate::error::ProviderResult;
use crate::provider::BoxFuture;

pub use fetcher::{DEFAULT_HOLIDAY_TIMEOUT, HolidayFetcher};
pub use geoip::{IFCONFIG_URL, IfconfigGeolocator};
pub use officeholidays::{OFFICEHOLIDAYS_URL, OfficeHolidays, parse_holiday_ics};

/// Resolves the caller's country.
pub trait Geolocator: Send + Sync {
    /// Returns an ISO 3166-1 alpha-2 country code.
    fn country_code(&self) -> BoxFuture<'_, ProviderResult<String>>;
}

/// Source of public holidays for a country.
pub trait HolidayCalendar: Send + Sync {
    fn holidays<'a>(&'a self, country: &'a str) -> BoxFuture<'a, ProviderResult<Vec<HolidayEntry>>>;
}

/// Outcome of a holiday lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolidayLookup {
    /// The calendar was fetched and parsed.
    Found(Vec<HolidayEntry>),
    /// A step failed; the reason is kept for logging.
    Unavailable(String),
    /// The lookup did not finish within its budget.
    TimedOut,
}

impl HolidayLookup {
    /// Collapses the outcome to its entries; degraded outcomes are empty.
    pub fn into_entries(self) -> Vec<HolidayEntry> {
        match self {
            Self::Found(entries) => entries,
            Self::Unavailable(_) | Self::TimedOut => Vec::new(),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn degraded_lookups_collapse_to_empty() {
        assert!(HolidayLookup::TimedOut.into_entries().is_empty());
        assert!(HolidayLookup::Unavailable("dns".into()).into_entries().is_empty());
    }

    #[test]
    fn found_lookup_keeps_entries() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let lookup = HolidayLookup::Found(vec![HolidayEntry::new(day, "Labour Day")]);
        assert!(lookup.is_found());
        assert_eq!(lookup.into_entries().len(), 1);
    }
}
