//! Time-bounded holiday lookup.

use std::time::Duration;

use gcalbill_core::HolidayEntry;
use tracing::{info, warn};

use crate::cancel::CancelSignal;
use crate::error::{ProviderError, ProviderResult};
use crate::http::build_client;

use super::{Geolocator, HolidayCalendar, HolidayLookup, IfconfigGeolocator, OfficeHolidays};

/// Budget for the whole geolocation plus download sequence.
pub const DEFAULT_HOLIDAY_TIMEOUT: Duration = Duration::from_secs(20);

/// Runs the geolocate-then-download sequence under one timeout.
pub struct HolidayFetcher {
    geolocator: Box<dyn Geolocator>,
    calendar: Box<dyn HolidayCalendar>,
    country: Option<String>,
    timeout: Duration,
    cancel: CancelSignal,
}

impl std::fmt::Debug for HolidayFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HolidayFetcher")
            .field("country", &self.country)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl HolidayFetcher {
    pub fn new(
        geolocator: Box<dyn Geolocator>,
        calendar: Box<dyn HolidayCalendar>,
        timeout: Duration,
    ) -> Self {
        Self {
            geolocator,
            calendar,
            country: None,
            timeout,
            cancel: CancelSignal::new(),
        }
    }

    /// Fetcher backed by ifconfig.co and officeholidays.com.
    pub fn online(timeout: Duration) -> ProviderResult<Self> {
        let http = build_client(timeout)?;
        Ok(Self::new(
            Box::new(IfconfigGeolocator::new(http.clone())),
            Box::new(OfficeHolidays::new(http)),
            timeout,
        ))
    }

    /// Skips geolocation and uses `country` directly. Blank values are ignored.
    pub fn with_country(mut self, country: Option<String>) -> Self {
        self.country = country
            .map(|c| c.trim().to_ascii_uppercase())
            .filter(|c| !c.is_empty());
        self
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    /// Runs the lookup and reports how it ended.
    pub async fn lookup(&self) -> HolidayLookup {
        match tokio::time::timeout(self.timeout, self.cancel.guard(self.run())).await {
            Ok(Ok(entries)) => HolidayLookup::Found(entries),
            Ok(Err(err)) => {
                warn!(error = %err, "public holidays unavailable");
                HolidayLookup::Unavailable(err.to_string())
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "public holiday lookup timed out");
                HolidayLookup::TimedOut
            }
        }
    }

    /// Runs the lookup; degraded outcomes give an empty list.
    pub async fn fetch(&self) -> Vec<HolidayEntry> {
        self.lookup().await.into_entries()
    }

    async fn run(&self) -> ProviderResult<Vec<HolidayEntry>> {
        let country = match &self.country {
            Some(country) => country.clone(),
            None => self.geolocator.country_code().await?,
        };
        if country.is_empty() {
            return Err(ProviderError::invalid_response("empty country code"));
        }

        let entries = self.calendar.holidays(&country).await?;
        info!(%country, count = entries.len(), "fetched public holidays");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::BoxFuture;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedCountry {
        code: &'static str,
        delay: Duration,
        calls: Arc<AtomicUsize>,
    }

    impl Geolocator for FixedCountry {
        fn country_code(&self) -> BoxFuture<'_, ProviderResult<String>> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(self.delay).await;
                Ok(self.code.to_string())
            })
        }
    }

    struct FailingGeolocator;

    impl Geolocator for FailingGeolocator {
        fn country_code(&self) -> BoxFuture<'_, ProviderResult<String>> {
            Box::pin(async { Err(ProviderError::network("dns failure")) })
        }
    }

    struct StaticHolidays;

    impl HolidayCalendar for StaticHolidays {
        fn holidays<'a>(
            &'a self,
            country: &'a str,
        ) -> BoxFuture<'a, ProviderResult<Vec<HolidayEntry>>> {
            Box::pin(async move {
                let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
                Ok(vec![HolidayEntry::new(day, format!("{} Labour Day", country))])
            })
        }
    }

    struct BrokenCalendar;

    impl HolidayCalendar for BrokenCalendar {
        fn holidays<'a>(
            &'a self,
            _country: &'a str,
        ) -> BoxFuture<'a, ProviderResult<Vec<HolidayEntry>>> {
            Box::pin(async {
                Err(ProviderError::invalid_response("invalid holiday calendar")
                    .with_provider("officeholidays"))
            })
        }
    }

    fn geolocator(delay: Duration) -> (Box<dyn Geolocator>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let geo = FixedCountry {
            code: "HR",
            delay,
            calls: calls.clone(),
        };
        (Box::new(geo), calls)
    }

    #[tokio::test(start_paused = true)]
    async fn found_holidays() {
        let (geo, _) = geolocator(Duration::from_millis(10));
        let fetcher = HolidayFetcher::new(geo, Box::new(StaticHolidays), Duration::from_secs(20));

        let lookup = fetcher.lookup().await;
        assert_eq!(
            lookup.into_entries(),
            vec![HolidayEntry::new(
                NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                "HR Labour Day"
            )]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_yields_empty_set() {
        let (geo, _) = geolocator(Duration::from_secs(3600));
        let fetcher = HolidayFetcher::new(geo, Box::new(StaticHolidays), Duration::from_secs(20));

        assert_eq!(fetcher.lookup().await, HolidayLookup::TimedOut);
        assert!(fetcher.fetch().await.is_empty());
    }

    #[tokio::test]
    async fn failure_yields_empty_set() {
        let fetcher = HolidayFetcher::new(
            Box::new(FailingGeolocator),
            Box::new(StaticHolidays),
            Duration::from_secs(20),
        );

        let lookup = fetcher.lookup().await;
        assert!(matches!(lookup, HolidayLookup::Unavailable(ref reason) if reason.contains("dns")));
        assert!(lookup.into_entries().is_empty());
    }

    #[tokio::test]
    async fn calendar_failure_yields_empty_set() {
        let (geo, calls) = geolocator(Duration::ZERO);
        let fetcher = HolidayFetcher::new(geo, Box::new(BrokenCalendar), Duration::from_secs(20));

        let lookup = fetcher.lookup().await;
        assert!(matches!(
            lookup,
            HolidayLookup::Unavailable(ref reason) if reason.contains("officeholidays")
        ));
        assert!(fetcher.fetch().await.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn country_override_skips_geolocation() {
        let (geo, calls) = geolocator(Duration::ZERO);
        let fetcher = HolidayFetcher::new(geo, Box::new(StaticHolidays), Duration::from_secs(20))
            .with_country(Some(" de ".to_string()));

        let entries = fetcher.fetch().await;
        assert_eq!(entries[0].description, "DE Labour Day");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancelled_lookup_is_unavailable() {
        let (geo, _) = geolocator(Duration::ZERO);
        let cancel = CancelSignal::new();
        cancel.cancel();
        let fetcher = HolidayFetcher::new(geo, Box::new(StaticHolidays), Duration::from_secs(20))
            .with_cancel(cancel);

        assert!(matches!(fetcher.lookup().await, HolidayLookup::Unavailable(_)));
    }
}
