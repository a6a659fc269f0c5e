//! Google Calendar API client.
//!
//! Lists upcoming events on one calendar through an [`AuthenticatedClient`].

use chrono::{DateTime, SecondsFormat, Utc};
use fireman_core::{EventStart, UpcomingEvent};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};

use super::config::GoogleConfig;
use super::manager::AuthenticatedClient;

/// Parameters of an events.list request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventQuery {
    /// Calendar identifier, e.g. `primary`.
    pub calendar_id: String,
    /// Lower bound on event start time.
    pub time_min: DateTime<Utc>,
    /// Maximum number of events.
    pub max_results: usize,
    /// Expand recurring events into single instances.
    pub single_events: bool,
    /// Include deleted events.
    pub show_deleted: bool,
}

impl EventQuery {
    /// Upcoming events from now on, recurring events expanded, deleted
    /// events excluded.
    pub fn upcoming(calendar_id: impl Into<String>, max_results: usize) -> Self {
        Self::upcoming_from(calendar_id, max_results, Utc::now())
    }

    /// Same as [`EventQuery::upcoming`] with an explicit lower bound.
    pub fn upcoming_from(
        calendar_id: impl Into<String>,
        max_results: usize,
        time_min: DateTime<Utc>,
    ) -> Self {
        Self {
            calendar_id: calendar_id.into(),
            time_min,
            max_results,
            single_events: true,
            show_deleted: false,
        }
    }

    /// Query string parameters.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("showDeleted", self.show_deleted.to_string()),
            ("singleEvents", self.single_events.to_string()),
            (
                "timeMin",
                self.time_min.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            ),
            ("maxResults", self.max_results.to_string()),
            // The API only accepts startTime ordering for expanded events.
            ("orderBy", "startTime".to_string()),
        ]
    }
}

/// Google Calendar API client.
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    api_base: String,
    calendar_id: String,
    max_results: usize,
}

impl GoogleCalendarClient {
    /// Creates a client for the calendar named in the configuration.
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            api_base: config.api_base.trim_end_matches('/').to_string(),
            calendar_id: config.calendar_id.clone(),
            max_results: config.max_results,
        }
    }

    /// Lists the next upcoming events, ordered by start time.
    pub async fn list_upcoming_events(
        &self,
        client: &mut AuthenticatedClient,
    ) -> ProviderResult<Vec<UpcomingEvent>> {
        let query = EventQuery::upcoming(&self.calendar_id, self.max_results);
        self.list_events(client, &query).await
    }

    /// Runs an events.list query.
    pub async fn list_events(
        &self,
        client: &mut AuthenticatedClient,
        query: &EventQuery,
    ) -> ProviderResult<Vec<UpcomingEvent>> {
        let url = format!(
            "{}/calendars/{}/events",
            self.api_base,
            urlencoding::encode(&query.calendar_id)
        );

        let response = client
            .get(&url)
            .await?
            .query(&query.params())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::network("request timeout")
                } else if e.is_connect() {
                    ProviderError::network(format!("connection failed: {}", e))
                } else {
                    ProviderError::network(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ProviderError::authentication("access token expired or invalid"));
        }

        if status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::authorization("access denied to calendar"));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::not_found(format!(
                "calendar {} not found",
                query.calendar_id
            )));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::rate_limited("rate limit exceeded"));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::server(format!(
                "API error ({}): {}",
                status, body
            )));
        }

        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read response: {}", e))
        })?;

        let list: EventListResponse = serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("failed to parse response: {}", e))
        })?;

        let mut events: Vec<UpcomingEvent> =
            list.items.into_iter().filter_map(convert_event).collect();
        events.truncate(query.max_results);

        debug!(
            "fetched {} events from calendar {}",
            events.len(),
            query.calendar_id
        );
        Ok(events)
    }
}

/// Converts an API event, skipping cancelled events and events without a
/// start. The start text is kept as reported, even when it does not parse.
fn convert_event(event: ApiEvent) -> Option<UpcomingEvent> {
    if event.status.as_deref() == Some("cancelled") {
        return None;
    }

    let id = event.id.as_deref().unwrap_or("<unknown>");
    let start = event.start?;
    let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());

    let start = match (non_empty(start.date_time), non_empty(start.date)) {
        (Some(dt), _) => EventStart::date_time(dt),
        (None, Some(date)) => EventStart::date(date),
        (None, None) => {
            warn!("event {} has no start time", id);
            return None;
        }
    };

    if let Err(e) = start.parse() {
        warn!("event {}: unexpected start {:?}: {}", id, start.as_str(), e);
    }

    Some(UpcomingEvent::new(event.summary.unwrap_or_default(), start))
}

/// Response from the events.list endpoint.
#[derive(Debug, Deserialize)]
struct EventListResponse {
    #[serde(default)]
    items: Vec<ApiEvent>,
}

/// A single event from the Google Calendar API.
#[derive(Debug, Deserialize)]
struct ApiEvent {
    id: Option<String>,
    summary: Option<String>,
    start: Option<ApiEventTime>,
    status: Option<String>,
}

/// Event time from the API.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEventTime {
    date: Option<String>,
    date_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::error::ProviderErrorCode;
    use crate::google::config::OAuthCredentials;
    use crate::google::manager::TokenManager;
    use crate::google::tokens::{TokenInfo, TokenStore};
    use crate::store::RemoteStore;

    fn setup(server_uri: &str) -> (GoogleCalendarClient, AuthenticatedClient) {
        let credentials = OAuthCredentials::new("client-id", "client-secret")
            .with_endpoints(format!("{}/auth", server_uri), format!("{}/token", server_uri));
        let config = GoogleConfig::new(credentials).with_api_base(server_uri);
        let tokens = TokenStore::new(RemoteStore::in_memory(), "token.json");
        let manager = TokenManager::new(config.clone(), tokens).unwrap();
        let token =
            TokenInfo::new("T1", Some("R1".to_string()), Some(3600), config.scopes.clone())
                .unwrap();
        (GoogleCalendarClient::new(&config), manager.client_for(token).unwrap())
    }

    #[test]
    fn parse_event_list_response() {
        let json = r#"{
            "kind": "calendar#events",
            "items": [
                {
                    "id": "event1",
                    "summary": "Standup",
                    "start": { "dateTime": "2024-01-02T09:00:00Z" },
                    "end": { "dateTime": "2024-01-02T09:15:00Z" },
                    "status": "confirmed"
                },
                {
                    "id": "event2",
                    "summary": "Offsite",
                    "start": { "date": "2024-01-05" },
                    "end": { "date": "2024-01-06" }
                }
            ]
        }"#;

        let response: EventListResponse = serde_json::from_str(json).unwrap();
        let events: Vec<UpcomingEvent> =
            response.items.into_iter().filter_map(convert_event).collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].summary, "Standup");
        assert_eq!(events[0].start.to_string(), "2024-01-02T09:00:00Z");
        assert!(events[1].start.is_all_day());
    }

    #[test]
    fn convert_skips_cancelled_and_startless_events() {
        let json = r#"{
            "items": [
                { "id": "a", "status": "cancelled" },
                { "id": "b", "summary": "No start", "start": {} },
                { "id": "c", "start": { "dateTime": "2024-01-02T09:00:00+01:00" } }
            ]
        }"#;

        let response: EventListResponse = serde_json::from_str(json).unwrap();
        let events: Vec<UpcomingEvent> =
            response.items.into_iter().filter_map(convert_event).collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "");
        assert_eq!(events[0].start.to_string(), "2024-01-02T09:00:00+01:00");
    }

    #[test]
    fn convert_keeps_start_text_verbatim() {
        let json = r#"{
            "items": [
                {
                    "id": "a",
                    "summary": "UTC",
                    "start": { "dateTime": "2024-01-02T09:00:00.000+00:00" }
                },
                { "id": "b", "summary": "Odd", "start": { "dateTime": "soon" } },
                {
                    "id": "c",
                    "summary": "Fallback",
                    "start": { "dateTime": "", "date": "2024-01-05" }
                }
            ]
        }"#;

        let response: EventListResponse = serde_json::from_str(json).unwrap();
        let events: Vec<UpcomingEvent> =
            response.items.into_iter().filter_map(convert_event).collect();
        let starts: Vec<String> = events.iter().map(|e| e.start.to_string()).collect();
        assert_eq!(starts, vec!["2024-01-02T09:00:00.000+00:00", "soon", "2024-01-05"]);
        assert!(events[2].start.is_all_day());
    }

    #[test]
    fn upcoming_query_params() {
        let now = Utc::now();
        let query = EventQuery::upcoming_from("primary", 10, now);
        let params = query.params();

        assert!(params.contains(&("showDeleted", "false".to_string())));
        assert!(params.contains(&("singleEvents", "true".to_string())));
        assert!(params.contains(&("maxResults", "10".to_string())));
        assert!(params.contains(&("orderBy", "startTime".to_string())));

        let (_, time_min) = params.iter().find(|(k, _)| *k == "timeMin").unwrap();
        assert_eq!(DateTime::parse_from_rfc3339(time_min).unwrap(), now);
    }

    #[tokio::test]
    async fn list_upcoming_events_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(header("authorization", "Bearer T1"))
            .and(query_param("maxResults", "10"))
            .and(query_param("singleEvents", "true"))
            .and(query_param("showDeleted", "false"))
            .and(query_param("orderBy", "startTime"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {
                        "id": "e1",
                        "summary": "Standup",
                        "start": { "dateTime": "2024-01-02T09:00:00Z" }
                    }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (calendar, mut client) = setup(&server.uri());
        let before = Utc::now();
        let events = calendar.list_upcoming_events(&mut client).await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "Standup");

        let requests = server.received_requests().await.unwrap();
        let (_, time_min) = requests[0]
            .url
            .query_pairs()
            .find(|(k, _)| k == "timeMin")
            .unwrap();
        let time_min = DateTime::parse_from_rfc3339(&time_min).unwrap();
        assert!(time_min >= before);
    }

    #[tokio::test]
    async fn list_empty_calendar() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "calendar#events"
            })))
            .mount(&server)
            .await;

        let (calendar, mut client) = setup(&server.uri());
        let events = calendar.list_upcoming_events(&mut client).await.unwrap();
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn list_events_error_statuses() {
        let cases: [(u16, ProviderErrorCode); 5] = [
            (401, ProviderErrorCode::AuthenticationFailed),
            (403, ProviderErrorCode::AuthorizationFailed),
            (404, ProviderErrorCode::NotFound),
            (429, ProviderErrorCode::RateLimited),
            (500, ProviderErrorCode::ServerError),
        ];

        for (status, code) in cases {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(status))
                .mount(&server)
                .await;

            let (calendar, mut client) = setup(&server.uri());
            let err = calendar.list_upcoming_events(&mut client).await.unwrap_err();
            assert_eq!(err.code(), code, "status {}", status);
        }
    }

    #[tokio::test]
    async fn list_events_invalid_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let (calendar, mut client) = setup(&server.uri());
        let err = calendar.list_upcoming_events(&mut client).await.unwrap_err();
        assert_eq!(err.code(), ProviderErrorCode::InvalidResponse);
    }
}
