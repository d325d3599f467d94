//! RawEvent to NormalizedEvent conversion.
//!
//! The normalizer applies, in order:
//! 1. recurring-instance exclusion (unless recurring events are included)
//! 2. description selection (description, else summary, both trimmed)
//! 3. prefix filtering and stripping
//! 4. timestamp resolution in the local timezone and hour rounding
//!
//! Any event that fails a step is skipped. Skipping is never an error.

use chrono::{Local, TimeZone};
use gcalbill_core::{NormalizedEvent, round_to_hours};
use tracing::debug;

use crate::raw_event::RawEvent;

/// Per-run normalization settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Description prefix an event must carry to be billed. Empty disables
    /// filtering.
    pub prefix: String,
    /// Bill instances of recurring series as independent events.
    pub include_recurring: bool,
}

impl NormalizeOptions {
    /// No prefix filter, recurring instances skipped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the billing prefix. Matching is case-sensitive.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Bills recurring instances when `include` is true.
    pub fn with_include_recurring(mut self, include: bool) -> Self {
        self.include_recurring = include;
        self
    }
}

/// Turns raw events into billable `(day, hours, description)` records.
#[derive(Debug, Clone)]
pub struct EventNormalizer<Tz: TimeZone = Local> {
    options: NormalizeOptions,
    tz: Tz,
}

impl EventNormalizer<Local> {
    /// Normalizer resolving times in the process's local timezone.
    pub fn local(options: NormalizeOptions) -> Self {
        Self::new(options, Local)
    }
}

impl<Tz: TimeZone> EventNormalizer<Tz> {
    /// Normalizer resolving times in `tz`.
    pub fn new(options: NormalizeOptions, tz: Tz) -> Self {
        Self { options, tz }
    }

    /// Timezone that defines day boundaries.
    pub fn tz(&self) -> &Tz {
        &self.tz
    }

    /// Normalizes one event, or returns `None` if it should be skipped.
    pub fn normalize(&self, raw: &RawEvent) -> Option<NormalizedEvent> {
        if raw.is_recurring_instance() && !self.options.include_recurring {
            debug!(event = %raw.id, "skipping recurring instance");
            return None;
        }

        let description = self.filter_description(raw.effective_description())?;

        let (Some(start), Some(end)) = (raw.start.as_ref(), raw.end.as_ref()) else {
            debug!(event = %raw.id, "skipping event without start or end");
            return None;
        };

        let start = match start.resolve(&self.tz) {
            Ok(t) => t,
            Err(reason) => {
                debug!(event = %raw.id, %reason, "skipping event with unusable start");
                return None;
            }
        };
        let end = match end.resolve(&self.tz) {
            Ok(t) => t,
            Err(reason) => {
                debug!(event = %raw.id, %reason, "skipping event with unusable end");
                return None;
            }
        };

        let hours = round_to_hours(end - start.clone());
        Some(NormalizedEvent::new(start.date_naive(), hours, description))
    }

    /// Normalizes a batch, dropping skipped events.
    pub fn normalize_all<'a, I>(&'a self, events: I) -> impl Iterator<Item = NormalizedEvent> + 'a
    where
        I: IntoIterator<Item = &'a RawEvent>,
        I::IntoIter: 'a,
    {
        events.into_iter().filter_map(|raw| self.normalize(raw))
    }

    fn filter_description(&self, description: String) -> Option<String> {
        let prefix = self.options.prefix.as_str();
        if prefix.is_empty() {
            return Some(description);
        }
        match description.strip_prefix(prefix) {
            Some(rest) => Some(rest.trim().to_string()),
            None => {
                debug!(%description, %prefix, "skipping event without billing prefix");
                None
            }
        }
    }
}
