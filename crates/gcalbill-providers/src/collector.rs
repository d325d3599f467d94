//! Calendar event collection.
//!
//! [`EventCollector`] resolves the configured calendar, walks every page of
//! the event listing for the billing period and folds each billable event
//! into a [`DailyAggregate`]. Any provider error aborts the collection.

use chrono::{Local, TimeZone};
use gcalbill_core::{DailyAggregate, DateRange};
use tracing::{debug, info};

use crate::cancel::CancelSignal;
use crate::error::{ProviderError, ProviderResult};
use crate::normalize::{EventNormalizer, NormalizeOptions};
use crate::provider::{CalendarProvider, EventQuery, PRIMARY_CALENDAR_ID};

/// Maps a symbolic calendar name to a provider calendar id.
///
/// An empty name selects the primary calendar without any request. Otherwise
/// the first calendar whose display name equals `name` wins.
///
/// # Errors
///
/// Returns a configuration error if no calendar carries that name, or the
/// provider error if the listing fails.
pub async fn resolve_calendar_id(
    provider: &dyn CalendarProvider,
    name: &str,
    cancel: &CancelSignal,
) -> ProviderResult<String> {
    if name.is_empty() {
        return Ok(PRIMARY_CALENDAR_ID.to_string());
    }

    let calendars = cancel.guard(provider.list_calendars()).await?;
    calendars
        .into_iter()
        .find(|c| c.name == name)
        .map(|c| {
            debug!(calendar = %name, id = %c.id, "resolved calendar");
            c.id
        })
        .ok_or_else(|| {
            ProviderError::configuration(format!("unable to find calendar ID for {:?}", name))
                .with_provider(provider.name())
        })
}

/// Collects the billable events of one calendar over one period.
#[derive(Debug, Clone)]
pub struct EventCollector<Tz: TimeZone = Local> {
    calendar: String,
    range: DateRange,
    normalizer: EventNormalizer<Tz>,
    cancel: CancelSignal,
    page_size: Option<u32>,
}

impl EventCollector<Local> {
    /// Collector using the local timezone for day boundaries.
    pub fn local(calendar: impl Into<String>, range: DateRange, options: NormalizeOptions) -> Self {
        Self::new(calendar, range, EventNormalizer::local(options))
    }
}

impl<Tz: TimeZone> EventCollector<Tz> {
    pub fn new(calendar: impl Into<String>, range: DateRange, normalizer: EventNormalizer<Tz>) -> Self {
        Self {
            calendar: calendar.into(),
            range,
            normalizer,
            cancel: CancelSignal::new(),
            page_size: None,
        }
    }

    /// Shares the run's cancellation signal with this collector.
    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    /// Overrides the number of events requested per page.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Walks all pages and folds every billable event.
    ///
    /// Each page is requested exactly once, in order, until the provider
    /// stops returning a continuation token.
    pub async fn collect(&self, provider: &dyn CalendarProvider) -> ProviderResult<DailyAggregate> {
        let calendar_id = resolve_calendar_id(provider, &self.calendar, &self.cancel).await?;
        let window = self.range.to_window(self.normalizer.tz()).map_err(|e| {
            ProviderError::configuration(format!("invalid billing period: {}", e)).with_source(e)
        })?;

        let mut query = EventQuery::new(&calendar_id, window);
        if let Some(size) = self.page_size {
            query = query.with_page_size(size);
        }

        let mut agg = DailyAggregate::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;
        let mut seen = 0usize;
        let mut billed = 0usize;

        loop {
            let page = self
                .cancel
                .guard(provider.list_events_page(&query, page_token.as_deref()))
                .await?;
            pages += 1;
            seen += page.events.len();
            debug!(
                calendar = %calendar_id,
                page = pages,
                events = page.events.len(),
                "fetched event page"
            );

            for event in self.normalizer.normalize_all(&page.events) {
                agg.fold_event(&event);
                billed += 1;
            }

            if !page.has_more() {
                break;
            }
            page_token = page.next_page_token;
        }

        info!(
            calendar = %calendar_id,
            pages,
            events = seen,
            billed,
            days = agg.len(),
            "collected calendar events"
        );
        Ok(agg)
    }
}
