//! Report pipeline supervisor.
//!
//! Two tasks run side by side: the event collector (fatal on error) and the
//! holiday lookup (best effort, bounded by its own timeout). The supervisor
//! waits for the collector, then for the holidays, and builds the report.
//! Everything sits under one outer deadline. When it expires before the
//! events are in, the shared cancel signal fires, both tasks are aborted and
//! the run fails. A holiday lookup still running at the deadline is aborted
//! and the report goes out without holidays.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, TimeZone};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use gcalbill_core::{DailyAggregate, Report, build_report};
use gcalbill_providers::{
    CalendarProvider, CancelSignal, EventCollector, HolidayFetcher, HolidayLookup,
    NormalizeOptions, ProviderError, ProviderResult,
};

use crate::config::ReportConfig;
use crate::error::{ClientError, ClientResult};

/// One report run, ready to start.
pub struct ReportPipeline<Tz: TimeZone = Local> {
    provider: Arc<dyn CalendarProvider>,
    collector: EventCollector<Tz>,
    holidays: Option<HolidayFetcher>,
    deadline: Duration,
    cancel: CancelSignal,
}

impl<Tz: TimeZone> std::fmt::Debug for ReportPipeline<Tz> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportPipeline")
            .field("provider", &self.provider.name())
            .field("holidays", &self.holidays)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}

impl ReportPipeline<Local> {
    /// Pipeline for the local timezone with the online holiday sources.
    pub fn from_config(
        provider: Arc<dyn CalendarProvider>,
        config: &ReportConfig,
    ) -> ClientResult<Self> {
        let options = NormalizeOptions::new()
            .with_prefix(&config.search)
            .with_include_recurring(config.include_recurring);
        let collector = EventCollector::local(&config.calendar, config.range, options);

        let mut pipeline = Self::new(provider, collector, config.timeout);
        if config.holidays.enabled {
            let fetcher = HolidayFetcher::online(config.holidays.timeout)?
                .with_country(config.holidays.country.clone());
            pipeline = pipeline.with_holidays(fetcher);
        }
        Ok(pipeline)
    }
}

impl<Tz> ReportPipeline<Tz>
where
    Tz: TimeZone + Send + Sync + 'static,
    Tz::Offset: Send + Sync,
{
    pub fn new(
        provider: Arc<dyn CalendarProvider>,
        collector: EventCollector<Tz>,
        deadline: Duration,
    ) -> Self {
        let cancel = CancelSignal::new();
        Self {
            provider,
            collector: collector.with_cancel(cancel.clone()),
            holidays: None,
            deadline,
            cancel,
        }
    }

    /// Adds the holiday lookup. Without it the report carries no holidays.
    pub fn with_holidays(mut self, fetcher: HolidayFetcher) -> Self {
        self.holidays = Some(fetcher.with_cancel(self.cancel.clone()));
        self
    }

    /// Handle on the signal that stops in-flight requests.
    pub fn cancel_signal(&self) -> CancelSignal {
        self.cancel.clone()
    }

    /// Runs both tasks and builds the report.
    ///
    /// # Errors
    ///
    /// Returns the collector's error, or [`ClientError::Timeout`] when the
    /// deadline expires before collection ends. Holiday failures and slow
    /// holiday lookups never surface here.
    pub async fn run(self) -> ClientResult<Report> {
        let Self {
            provider,
            collector,
            holidays,
            deadline,
            cancel,
        } = self;

        let mut events_task: JoinHandle<ProviderResult<DailyAggregate>> =
            tokio::spawn(async move { collector.collect(provider.as_ref()).await });
        let mut holiday_task: Option<JoinHandle<HolidayLookup>> =
            holidays.map(|fetcher| tokio::spawn(async move { fetcher.lookup().await }));

        let deadline_at = Instant::now() + deadline;

        let result = match tokio::time::timeout_at(deadline_at, &mut events_task).await {
            Ok(Ok(Ok(agg))) => {
                let lookup = match holiday_task.as_mut() {
                    Some(task) => await_holidays(task, deadline_at).await,
                    None => HolidayLookup::Found(Vec::new()),
                };
                if !lookup.is_found() {
                    debug!(?lookup, "building report without holidays");
                }
                Ok(build_report(&agg, &lookup.into_entries()))
            }
            Ok(Ok(Err(err))) => Err(err.into()),
            Ok(Err(err)) => Err(ProviderError::internal(format!(
                "event collector failed: {}",
                err
            ))
            .into()),
            Err(_) => {
                warn!(?deadline, "report deadline expired");
                Err(ClientError::Timeout(format!(
                    "report not ready after {}s",
                    deadline.as_secs()
                )))
            }
        };

        if result.is_err() {
            cancel.cancel();
            events_task.abort();
        }
        if let Some(task) = &holiday_task {
            task.abort();
        }
        result
    }
}

/// Waits for the holiday lookup, but never past the report deadline.
async fn await_holidays(
    task: &mut JoinHandle<HolidayLookup>,
    deadline_at: Instant,
) -> HolidayLookup {
    match tokio::time::timeout_at(deadline_at, task).await {
        Ok(Ok(lookup)) => lookup,
        Ok(Err(err)) => HolidayLookup::Unavailable(format!("holiday task failed: {}", err)),
        Err(_) => {
            warn!("public holiday lookup still running at the report deadline");
            HolidayLookup::TimedOut
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use gcalbill_core::{DateRange, HolidayEntry};
    use gcalbill_providers::{
        BoxFuture, EventNormalizer, Geolocator, HolidayCalendar, MemoryProvider, ProviderErrorCode,
        RawEvent,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn january_provider() -> MemoryProvider {
        MemoryProvider::new()
            .with_page(vec![
                RawEvent::timed("1", "2024-01-05T09:00:00Z", "2024-01-05T11:00:00Z")
                    .with_summary("parser"),
                RawEvent::timed("2", "2024-01-05T13:00:00Z", "2024-01-05T14:00:00Z")
                    .with_summary("review"),
            ])
            .with_page(vec![
                RawEvent::timed("3", "2024-01-10T09:00:00Z", "2024-01-10T14:00:00Z")
                    .with_summary("release"),
            ])
    }

    fn pipeline(provider: MemoryProvider, deadline: Duration) -> ReportPipeline<Utc> {
        let range = DateRange::new(date(2024, 1, 1), date(2024, 2, 1)).unwrap();
        let collector = EventCollector::new(
            "",
            range,
            EventNormalizer::new(NormalizeOptions::new(), Utc),
        );
        ReportPipeline::new(Arc::new(provider), collector, deadline)
    }

    struct SlowCountry(Duration);

    impl Geolocator for SlowCountry {
        fn country_code(&self) -> BoxFuture<'_, ProviderResult<String>> {
            Box::pin(async move {
                tokio::time::sleep(self.0).await;
                Ok("HR".to_string())
            })
        }
    }

    struct JanuaryHolidays;

    impl HolidayCalendar for JanuaryHolidays {
        fn holidays<'a>(
            &'a self,
            _country: &'a str,
        ) -> BoxFuture<'a, ProviderResult<Vec<HolidayEntry>>> {
            Box::pin(async move {
                Ok(vec![
                    HolidayEntry::new(date(2024, 1, 1), "New Year"),
                    HolidayEntry::new(date(2024, 1, 10), "Company Day"),
                ])
            })
        }
    }

    fn holidays(geolocation_delay: Duration, timeout: Duration) -> HolidayFetcher {
        HolidayFetcher::new(
            Box::new(SlowCountry(geolocation_delay)),
            Box::new(JanuaryHolidays),
            timeout,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn report_joins_events_and_holidays() {
        let report = pipeline(january_provider(), Duration::from_secs(120))
            .with_holidays(holidays(Duration::from_secs(1), Duration::from_secs(20)))
            .run()
            .await
            .unwrap();

        assert_eq!(report.day_keys(), vec!["2024-01-05", "2024-01-10"]);
        assert_eq!(report.day_count, 2);
        assert_eq!(report.total_hours, 8);
        assert_eq!(
            report.holidays,
            vec![HolidayEntry::new(date(2024, 1, 10), "Company Day")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn holiday_timeout_still_yields_report() {
        let report = pipeline(january_provider(), Duration::from_secs(120))
            .with_holidays(holidays(Duration::from_secs(60), Duration::from_secs(20)))
            .run()
            .await
            .unwrap();

        assert_eq!(report.total_hours, 8);
        assert!(report.holidays.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn holidays_slower_than_deadline_do_not_fail_the_run() {
        let started = Instant::now();
        let report = pipeline(january_provider(), Duration::from_secs(120))
            .with_holidays(holidays(Duration::from_secs(200), Duration::from_secs(300)))
            .run()
            .await
            .unwrap();

        assert_eq!(report.day_keys(), vec!["2024-01-05", "2024-01-10"]);
        assert_eq!(report.total_hours, 8);
        assert!(report.holidays.is_empty());
        assert!(started.elapsed() <= Duration::from_secs(121));
    }

    #[tokio::test(start_paused = true)]
    async fn without_holidays() {
        let report = pipeline(january_provider(), Duration::from_secs(120))
            .run()
            .await
            .unwrap();
        assert_eq!(report.day_count, 2);
        assert!(report.holidays.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn deadline_expiry_is_fatal_and_cancels() {
        let provider = january_provider().with_latency(Duration::from_secs(3600));
        let pipeline = pipeline(provider, Duration::from_secs(120))
            .with_holidays(holidays(Duration::from_secs(1), Duration::from_secs(20)));
        let cancel = pipeline.cancel_signal();

        let err = pipeline.run().await.unwrap_err();

        assert!(matches!(err, ClientError::Timeout(_)));
        assert!(err.to_string().contains("120s"));
        assert!(cancel.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn collector_error_is_fatal() {
        let provider = january_provider().failing_at(
            1,
            ProviderErrorCode::RateLimited,
            "quota exceeded",
        );
        let pipeline = pipeline(provider, Duration::from_secs(120))
            .with_holidays(holidays(Duration::from_secs(3600), Duration::from_secs(7200)));
        let cancel = pipeline.cancel_signal();

        let err = pipeline.run().await.unwrap_err();

        assert!(matches!(
            err,
            ClientError::Provider(ref e) if e.code() == ProviderErrorCode::RateLimited
        ));
        assert!(cancel.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn empty_calendar_gives_empty_report() {
        let report = pipeline(MemoryProvider::new().with_page(vec![]), Duration::from_secs(120))
            .run()
            .await
            .unwrap();
        assert!(report.is_empty());
        assert_eq!(report.total_hours, 0);
    }
}
