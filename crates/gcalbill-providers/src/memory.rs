//! In-memory calendar provider.
//!
//! Serves a fixed list of calendars and pre-built event pages. Page `n`
//! (zero based) is returned for the continuation token `page-n`, so a caller
//! that follows tokens walks the pages in order. Every request is recorded.

use std::sync::Mutex;
use std::time::Duration;

use crate::error::{ProviderError, ProviderErrorCode, ProviderResult};
use crate::provider::{BoxFuture, CalendarInfo, CalendarProvider, EventPage, EventQuery};
use crate::raw_event::RawEvent;

/// A recorded `list_events_page` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub calendar_id: String,
    pub page_token: Option<String>,
}

#[derive(Debug)]
pub struct MemoryProvider {
    calendars: Vec<CalendarInfo>,
    pages: Vec<Vec<RawEvent>>,
    failure: Option<(usize, ProviderErrorCode, String)>,
    latency: Option<Duration>,
    requests: Mutex<Vec<PageRequest>>,
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProvider {
    pub fn new() -> Self {
        Self {
            calendars: Vec::new(),
            pages: Vec::new(),
            failure: None,
            latency: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_calendar(mut self, calendar: CalendarInfo) -> Self {
        self.calendars.push(calendar);
        self
    }

    /// Appends one page of events.
    pub fn with_page(mut self, events: Vec<RawEvent>) -> Self {
        self.pages.push(events);
        self
    }

    /// Makes the request for page `index` fail with `code`.
    pub fn failing_at(mut self, index: usize, code: ProviderErrorCode, message: &str) -> Self {
        self.failure = Some((index, code, message.to_string()));
        self
    }

    /// Delays every page response.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Every page request received so far, in order.
    pub fn requests(&self) -> Vec<PageRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn page_index(token: Option<&str>) -> ProviderResult<usize> {
        match token {
            None => Ok(0),
            Some(t) => t
                .strip_prefix("page-")
                .and_then(|n| n.parse().ok())
                .ok_or_else(|| ProviderError::bad_request(format!("unknown page token {:?}", t))),
        }
    }

    fn page(&self, index: usize) -> ProviderResult<EventPage> {
        if let Some((at, code, message)) = &self.failure
            && *at == index
        {
            return Err(ProviderError::new(*code, message.clone()).with_provider("memory"));
        }
        let events = self.pages.get(index).cloned().unwrap_or_default();
        let page = EventPage::new(events);
        if index + 1 < self.pages.len() {
            Ok(page.with_next_page_token(format!("page-{}", index + 1)))
        } else {
            Ok(page)
        }
    }
}

impl CalendarProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>> {
        Box::pin(async move { Ok(self.calendars.clone()) })
    }

    fn list_events_page<'a>(
        &'a self,
        query: &'a EventQuery,
        page_token: Option<&'a str>,
    ) -> BoxFuture<'a, ProviderResult<EventPage>> {
        Box::pin(async move {
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(PageRequest {
                    calendar_id: query.calendar_id.clone(),
                    page_token: page_token.map(str::to_owned),
                });
            }
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            let index = Self::page_index(page_token)?;
            self.page(index)
        })
    }
}
