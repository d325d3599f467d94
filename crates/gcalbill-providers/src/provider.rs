//! CalendarProvider trait definition.
//!
//! The collector only needs two capabilities from a calendar backend: the
//! list of calendars visible to the account, and one page of events for a
//! calendar and time window. Pagination of events is driven by the caller
//! so that every page is consumed exactly once.

use std::future::Future;
use std::pin::Pin;

use gcalbill_core::TimeWindow;

use crate::error::ProviderResult;
use crate::raw_event::RawEvent;

/// Identifier of the account's default calendar.
pub const PRIMARY_CALENDAR_ID: &str = "primary";

/// Maximum events requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 200;

/// A calendar visible to the authenticated account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarInfo {
    /// Provider identifier, used in event queries.
    pub id: String,
    /// Display name, matched against the configured calendar name.
    pub name: String,
}

impl CalendarInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Parameters of an event listing.
///
/// The listing covers events starting in `[window.start, window.end)`,
/// excludes deleted events, expands recurring series into single instances
/// and orders by start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    pub calendar_id: String,
    pub window: TimeWindow,
    pub page_size: u32,
}

impl EventQuery {
    pub fn new(calendar_id: impl Into<String>, window: TimeWindow) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            window,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

/// One page of an event listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPage {
    pub events: Vec<RawEvent>,
    /// Continuation token; `None` on the last page.
    pub next_page_token: Option<String>,
}

impl EventPage {
    pub fn new(events: Vec<RawEvent>) -> Self {
        Self {
            events,
            next_page_token: None,
        }
    }

    pub fn with_next_page_token(mut self, token: impl Into<String>) -> Self {
        self.next_page_token = Some(token.into());
        self
    }

    /// True if another page follows. An empty token counts as the end.
    pub fn has_more(&self) -> bool {
        self.next_page_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// A boxed future for async trait methods.
///
/// Keeps the trait object-safe so the collector can work on
/// `&dyn CalendarProvider`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A remote calendar backend.
///
/// Implementations must be `Send + Sync` so a provider can be shared with a
/// spawned collector task behind an `Arc`.
pub trait CalendarProvider: Send + Sync {
    /// Short backend name used in logs and error messages.
    fn name(&self) -> &str;

    /// Lists every calendar visible to the account, following pagination
    /// internally.
    fn list_calendars(&self) -> BoxFuture<'_, ProviderResult<Vec<CalendarInfo>>>;

    /// Fetches one page of events. `page_token` is `None` for the first page.
    fn list_events_page<'a>(
        &'a self,
        query: &'a EventQuery,
        page_token: Option<&'a str>,
    ) -> BoxFuture<'a, ProviderResult<EventPage>>;
}
