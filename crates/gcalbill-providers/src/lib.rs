//! Calendar and holiday sources for gcalbill.
//!
//! - [`CalendarProvider`]: the calendar backend seam, with the Google
//!   implementation in `google` and an in-memory one in `memory`
//!   (behind the `test-util` feature)
//! - [`EventNormalizer`]: raw event to billable `(day, hours, description)`
//! - [`EventCollector`]: page walk and fold into a `DailyAggregate`
//! - [`HolidayFetcher`]: best-effort, time-bounded public holiday lookup
//! - [`CancelSignal`]: run-wide cancellation of in-flight requests
//!
//! ```text
//! ┌─────────────────┐         ┌──────────────────┐
//! │ GoogleProvider  │         │  HolidayFetcher  │
//! └────────┬────────┘         └────────┬─────────┘
//!          │ EventPage                 │ HolidayLookup
//!          ▼                           │
//! ┌─────────────────┐                  │
//! │ EventCollector  │                  │
//! │  + Normalizer   │                  │
//! └────────┬────────┘                  │
//!          │ DailyAggregate            │
//!          └────────────┬──────────────┘
//!                       ▼
//!                 build_report()
//! ```

pub mod cancel;
pub mod collector;
pub mod error;
#[cfg(feature = "google")]
pub mod google;
pub mod holidays;
pub mod http;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod normalize;
pub mod provider;
pub mod raw_event;

pub use cancel::CancelSignal;
pub use collector::{EventCollector, resolve_calendar_id};
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use holidays::{
    DEFAULT_HOLIDAY_TIMEOUT, Geolocator, HolidayCalendar, HolidayFetcher, HolidayLookup,
};
#[cfg(any(test, feature = "test-util"))]
pub use memory::MemoryProvider;
pub use normalize::{EventNormalizer, NormalizeOptions};
pub use provider::{
    BoxFuture, CalendarInfo, CalendarProvider, DEFAULT_PAGE_SIZE, EventPage, EventQuery,
    PRIMARY_CALENDAR_ID,
};
pub use raw_event::{RawEvent, RawEventTime};
