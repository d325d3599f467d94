//! Google Calendar API v3 client.
//!
//! Thin HTTP layer: builds the listing requests, checks statuses and maps
//! the JSON payloads onto [`RawEvent`] and [`CalendarInfo`].

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{ProviderError, ProviderResult};
use crate::http::{build_client, read_success_body};
use crate::provider::{CalendarInfo, DEFAULT_PAGE_SIZE, EventPage, EventQuery};
use crate::raw_event::{RawEvent, RawEventTime};

/// Base URL for Google Calendar API v3.
const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Authenticated API client.
#[derive(Debug)]
pub struct GoogleCalendarClient {
    http_client: reqwest::Client,
    access_token: String,
    base_url: String,
}

impl GoogleCalendarClient {
    pub fn new(access_token: impl Into<String>, timeout: Duration) -> ProviderResult<Self> {
        Ok(Self {
            http_client: build_client(timeout)?,
            access_token: access_token.into(),
            base_url: CALENDAR_API_BASE.to_string(),
        })
    }

    /// Fetches one page of `events.list`.
    pub async fn list_events_page(
        &self,
        query: &EventQuery,
        page_token: Option<&str>,
    ) -> ProviderResult<EventPage> {
        let url = format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&query.calendar_id)
        );

        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&event_query_params(query, page_token))
            .send()
            .await?;
        let body = read_success_body(response).await?;
        let page = parse_event_page(&body)?;

        debug!(
            calendar = %query.calendar_id,
            events = page.events.len(),
            more = page.has_more(),
            "listed events"
        );
        Ok(page)
    }

    /// Lists every calendar of the account, following `nextPageToken`.
    pub async fn list_calendars(&self) -> ProviderResult<Vec<CalendarInfo>> {
        let url = format!("{}/users/me/calendarList", self.base_url);
        let mut calendars = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![("maxResults", DEFAULT_PAGE_SIZE.to_string())];
            if let Some(ref token) = page_token {
                params.push(("pageToken", token.clone()));
            }

            let response = self
                .http_client
                .get(&url)
                .bearer_auth(&self.access_token)
                .query(&params)
                .send()
                .await?;
            let body = read_success_body(response).await?;
            let list: CalendarListResponse = serde_json::from_str(&body).map_err(|e| {
                ProviderError::invalid_response(format!("failed to parse calendar list: {}", e))
            })?;

            calendars.extend(
                list.items
                    .into_iter()
                    .map(|entry| CalendarInfo::new(entry.id, entry.summary)),
            );

            match list.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        debug!(count = calendars.len(), "listed calendars");
        Ok(calendars)
    }
}

/// Query string of an `events.list` request.
fn event_query_params(query: &EventQuery, page_token: Option<&str>) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("timeMin", query.window.start.to_rfc3339()),
        ("timeMax", query.window.end.to_rfc3339()),
        ("showDeleted", "false".to_string()),
        ("singleEvents", "true".to_string()),
        ("orderBy", "startTime".to_string()),
        ("maxResults", query.page_size.to_string()),
    ];
    if let Some(token) = page_token {
        params.push(("pageToken", token.to_string()));
    }
    params
}

fn parse_event_page(body: &str) -> ProviderResult<EventPage> {
    let response: EventListResponse = serde_json::from_str(body).map_err(|e| {
        ProviderError::invalid_response(format!("failed to parse event list: {}", e))
    })?;

    let mut page = EventPage::new(response.items.into_iter().map(convert_event).collect());
    page.next_page_token = response.next_page_token;
    Ok(page)
}

fn convert_event(event: ApiEvent) -> RawEvent {
    RawEvent {
        id: event.id.unwrap_or_default(),
        start: event.start.and_then(ApiEventTime::into_raw),
        end: event.end.and_then(ApiEventTime::into_raw),
        summary: event.summary,
        description: event.description,
        recurring_event_id: event.recurring_event_id,
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventListResponse {
    #[serde(default)]
    items: Vec<ApiEvent>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    id: Option<String>,
    summary: Option<String>,
    description: Option<String>,
    start: Option<ApiEventTime>,
    end: Option<ApiEventTime>,
    recurring_event_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date: Option<String>,
    date_time: Option<String>,
}

impl ApiEventTime {
    fn into_raw(self) -> Option<RawEventTime> {
        RawEventTime::from_parts(self.date_time, self.date)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarListResponse {
    #[serde(default)]
    items: Vec<CalendarListEntry>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CalendarListEntry {
    id: String,
    #[serde(default)]
    summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use gcalbill_core::TimeWindow;

    fn query() -> EventQuery {
        EventQuery::new(
            "team@group.calendar.google.com",
            TimeWindow::new(
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            ),
        )
    }

    #[test]
    fn event_params_fix_listing_semantics() {
        let params = event_query_params(&query(), Some("CiAKGjBp"));
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("timeMin"), Some("2024-01-01T00:00:00+00:00"));
        assert_eq!(get("timeMax"), Some("2024-02-01T00:00:00+00:00"));
        assert_eq!(get("showDeleted"), Some("false"));
        assert_eq!(get("singleEvents"), Some("true"));
        assert_eq!(get("orderBy"), Some("startTime"));
        assert_eq!(get("maxResults"), Some("200"));
        assert_eq!(get("pageToken"), Some("CiAKGjBp"));
    }

    #[test]
    fn first_page_has_no_token() {
        let params = event_query_params(&query(), None);
        assert!(params.iter().all(|(k, _)| *k != "pageToken"));
    }

    #[test]
    fn parse_page_with_timed_and_all_day_events() {
        let body = r#"{
            "kind": "calendar#events",
            "nextPageToken": "next-1",
            "items": [
                {
                    "id": "evt1",
                    "summary": "BILL: parser",
                    "start": {"dateTime": "2024-01-05T09:00:00+01:00", "timeZone": "Europe/Zagreb"},
                    "end": {"dateTime": "2024-01-05T11:00:00+01:00"},
                    "status": "confirmed"
                },
                {
                    "id": "evt2",
                    "summary": "Offsite",
                    "start": {"date": "2024-01-08"},
                    "end": {"date": "2024-01-09"}
                },
                {
                    "id": "evt3_20240110T090000Z",
                    "summary": "Standup",
                    "description": "  daily sync ",
                    "recurringEventId": "evt3",
                    "start": {"dateTime": "2024-01-10T09:00:00Z"},
                    "end": {"dateTime": "2024-01-10T09:15:00Z"}
                }
            ]
        }"#;

        let page = parse_event_page(body).unwrap();
        assert!(page.has_more());
        assert_eq!(page.events.len(), 3);

        let timed = &page.events[0];
        assert_eq!(
            timed.start,
            Some(RawEventTime::DateTime("2024-01-05T09:00:00+01:00".into()))
        );
        assert!(!timed.is_recurring_instance());

        assert!(page.events[1].start.as_ref().unwrap().is_all_day());

        let recurring = &page.events[2];
        assert!(recurring.is_recurring_instance());
        assert_eq!(recurring.effective_description(), "daily sync");
    }

    #[test]
    fn last_page_has_no_token() {
        let page = parse_event_page(r#"{"items": []}"#).unwrap();
        assert!(!page.has_more());
        assert!(page.events.is_empty());
    }

    #[test]
    fn malformed_page_is_invalid_response() {
        let err = parse_event_page("<html>quota</html>").unwrap_err();
        assert_eq!(
            err.code(),
            crate::error::ProviderErrorCode::InvalidResponse
        );
    }

    #[test]
    fn parse_calendar_list_page() {
        let body = r#"{
            "items": [
                {"id": "me@example.com", "summary": "me@example.com", "primary": true},
                {"id": "abc@group.calendar.google.com", "summary": "acme"}
            ],
            "nextPageToken": "p2"
        }"#;
        let list: CalendarListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].id, "me@example.com");
        assert_eq!(list.items[1].summary, "acme");
        assert_eq!(list.next_page_token.as_deref(), Some("p2"));
    }
}
