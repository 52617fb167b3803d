use crate::{
    apollo::{
        CalendarDay, CookieEntry, StoredCookies,
        calendar::RawCalendarResponse,
    },
    config::ApolloConfig,
};
use chrono::NaiveDate;
use reqwest::{Client, StatusCode, header, redirect};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{collections::HashMap, time::Duration};
use tracing::error;
use url::Url;

/// Session cookies the portal rotates; only these are harvested during refresh.
const TARGET_COOKIE_NAMES: [&str; 2] = ["__ModuleSessionCookie", "__ModuleSessionCookie2"];

#[derive(thiserror::Error, Debug)]
pub enum ApolloClientError {
    #[error("Apollo request timed out.")]
    Timeout,
    #[error("Apollo request failed with {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("Failed to parse Apollo response.")]
    InvalidResponse(#[source] serde_json::Error),
    #[error("Apollo request failed.")]
    Http(#[source] reqwest::Error),
    #[error("Invalid Apollo URL.")]
    Url(#[source] url::ParseError),
}

impl ApolloClientError {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(error)
        }
    }
}

/// Result of a punch attempt, translated from the vendor response.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PunchResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub punch_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub punch_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Current punch state of the user as reported by the portal.
#[derive(Debug, Clone, PartialEq)]
pub struct PunchStatus {
    pub work_type: i64,
    pub rest_type: i64,
    pub location_name: Option<String>,
    pub error_message: Option<String>,
}

#[derive(Deserialize)]
struct RawPunchResponse {
    #[serde(rename = "Data")]
    data: Option<RawPunchData>,
}

// The punch endpoint mixes casing conventions within one payload.
#[derive(Deserialize, Default)]
struct RawPunchData {
    #[serde(rename = "punchDate")]
    punch_date: Option<String>,
    #[serde(rename = "punchType")]
    punch_type: Option<i64>,
    #[serde(rename = "LocationName")]
    location_name: Option<String>,
}

#[derive(Deserialize)]
struct RawPunchStatusResponse {
    #[serde(rename = "Data")]
    data: Option<RawPunchStatusData>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
struct RawPunchStatusData {
    work_type: Option<i64>,
    rest_type: Option<i64>,
    location_name: Option<String>,
    error_message: Option<String>,
}

/// HTTP client for the Apollo HR portal. All requests authenticate with the
/// user's stored session cookies; redirects are never followed so that session
/// rotation stays observable.
#[derive(Debug, Clone)]
pub struct ApolloClient {
    client: Client,
    base_url: Url,
}

impl ApolloClient {
    pub fn new(config: &ApolloConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Fetches the user's shift calendar for the given month, keyed by local date.
    pub async fn fetch_calendar(
        &self,
        year: i32,
        month: u32,
        cookies: &StoredCookies,
    ) -> Result<HashMap<NaiveDate, CalendarDay>, ApolloClientError> {
        let mut url = self.endpoint("/backend/pt/api/EmployeeCalendars/scheduling")?;
        url.query_pairs_mut()
            .append_pair("year", &year.to_string())
            .append_pair("month", &month.to_string());

        let body = self
            .execute(
                self.client
                    .get(url)
                    .header(header::COOKIE, cookies.header())
                    .header("functioncode", "PersonalShiftSchedule"),
            )
            .await?;

        let response = serde_json::from_str::<RawCalendarResponse>(&body)
            .map_err(ApolloClientError::InvalidResponse)?;
        Ok(response
            .data
            .into_iter()
            .flat_map(|data| data.calendars)
            .filter_map(|entry| entry.into_calendar_day())
            .map(|day| (day.date, day))
            .collect())
    }

    /// Performs a punch. Upstream failures are folded into the result rather
    /// than bubbled up, so one failed punch never aborts a batch.
    pub async fn punch(&self, attendance_type: u8, cookies: &StoredCookies) -> PunchResult {
        match self.request_punch(attendance_type, cookies).await {
            Ok(result) => result,
            Err(err) => {
                error!("Punch request failed: {err}");
                PunchResult {
                    success: false,
                    punch_date: None,
                    punch_type: None,
                    location_name: None,
                    message: Some(err.to_string()),
                }
            }
        }
    }

    async fn request_punch(
        &self,
        attendance_type: u8,
        cookies: &StoredCookies,
    ) -> Result<PunchResult, ApolloClientError> {
        let url = self.endpoint("/backend/pt/api/checkIn/punch/web")?;
        let body = self
            .execute(
                self.client
                    .post(url)
                    .header(header::COOKIE, cookies.header())
                    .header("actioncode", "Default")
                    .header("functioncode", "PunchCard")
                    .json(&json!({ "AttendanceType": attendance_type, "IsOverride": false })),
            )
            .await?;

        let data = if body.trim().is_empty() {
            RawPunchData::default()
        } else {
            serde_json::from_str::<RawPunchResponse>(&body)
                .map_err(ApolloClientError::InvalidResponse)?
                .data
                .unwrap_or_default()
        };

        Ok(PunchResult {
            success: true,
            punch_date: data.punch_date,
            punch_type: data.punch_type,
            location_name: data.location_name,
            message: None,
        })
    }

    /// Retrieves the user's current punch state.
    pub async fn fetch_punch_status(
        &self,
        cookies: &StoredCookies,
    ) -> Result<PunchStatus, ApolloClientError> {
        let url = self.endpoint("/backend/pt/api/checkin/punchedTypeWithLocation")?;
        let body = self
            .execute(
                self.client
                    .get(url)
                    .header(header::COOKIE, cookies.header())
                    .header("actioncode", "Default")
                    .header("functioncode", "PunchCard"),
            )
            .await?;

        let data = if body.trim().is_empty() {
            RawPunchStatusData::default()
        } else {
            serde_json::from_str::<RawPunchStatusResponse>(&body)
                .map_err(ApolloClientError::InvalidResponse)?
                .data
                .unwrap_or_default()
        };

        Ok(PunchStatus {
            work_type: data.work_type.unwrap_or_default(),
            rest_type: data.rest_type.unwrap_or_default(),
            location_name: data.location_name,
            error_message: data.error_message,
        })
    }

    /// Probes an authenticated endpoint and harvests rotated session cookie
    /// values from the response. Returns an empty list when the portal didn't
    /// rotate anything.
    pub async fn refresh_session_cookies(
        &self,
        cookies: &StoredCookies,
    ) -> Result<Vec<CookieEntry>, ApolloClientError> {
        let url = self.endpoint("/backend/pt/api/checkin/punchedTypeWithLocation")?;
        let response = self
            .client
            .get(url)
            .header(header::COOKIE, cookies.header())
            .header("actioncode", "Default")
            .header("functioncode", "PunchCard")
            .send()
            .await
            .map_err(ApolloClientError::from_reqwest)?;

        let mut refreshed = vec![];
        for value in response.headers().get_all(header::SET_COOKIE) {
            let Ok(value) = value.to_str() else {
                continue;
            };
            let Some((name, rest)) = value.split_once('=') else {
                continue;
            };

            let name = name.trim();
            if !TARGET_COOKIE_NAMES.contains(&name) {
                continue;
            }

            let value = rest.split(';').next().unwrap_or_default().trim();
            if !value.is_empty() {
                refreshed.push(CookieEntry::new(name, value));
            }
        }

        // Session rotation may answer with a redirect; that's still a refresh.
        let status = response.status();
        if !status.is_success() && !status.is_redirection() {
            let message = response.text().await.unwrap_or_default();
            return Err(ApolloClientError::Status {
                status,
                message: if message.is_empty() {
                    status.to_string()
                } else {
                    message
                },
            });
        }

        Ok(refreshed)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApolloClientError> {
        self.base_url.join(path).map_err(ApolloClientError::Url)
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<String, ApolloClientError> {
        let response = request
            .send()
            .await
            .map_err(ApolloClientError::from_reqwest)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(ApolloClientError::from_reqwest)?;
        if !status.is_success() {
            return Err(ApolloClientError::Status {
                status,
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
            });
        }

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::{ApolloClient, ApolloClientError};
    use crate::{apollo::StoredCookies, config::ApolloConfig};
    use chrono::NaiveDate;
    use httpmock::MockServer;
    use serde_json::json;
    use url::Url;

    fn mock_client(server: &MockServer) -> anyhow::Result<ApolloClient> {
        ApolloClient::new(&ApolloConfig {
            base_url: Url::parse(&server.base_url())?,
            request_timeout_secs: 15,
        })
    }

    fn cookies() -> anyhow::Result<StoredCookies> {
        StoredCookies::parse("__ModuleSessionCookie=abc; other=1")
    }

    #[tokio::test]
    async fn fetches_and_translates_calendar() -> anyhow::Result<()> {
        let server = MockServer::start();
        let calendar_mock = server
            .mock(|when, then| {
                when.method(httpmock::Method::GET)
                    .path("/backend/pt/api/EmployeeCalendars/scheduling")
                    .query_param("year", "2024")
                    .query_param("month", "9")
                    .header("functioncode", "PersonalShiftSchedule")
                    .header("cookie", "__ModuleSessionCookie=abc; other=1");
                then.status(200).json_body(json!({
                    "Data": {
                        "Calendars": [{
                            "Date": "2024-09-02T00:00:00+08:00",
                            "ShiftSchedule": {
                                "CycleStatus": 1,
                                "WorkOnTime": "2024-09-02T08:30:00+08:00",
                                "WorkOffTime": "2024-09-02T17:30:00+08:00",
                                "RestMinutes": 60
                            }
                        }]
                    }
                }));
            });

        let calendar = mock_client(&server)?
            .fetch_calendar(2024, 9, &cookies()?)
            .await?;
        calendar_mock.assert();

        let day = &calendar[&NaiveDate::from_ymd_opt(2024, 9, 2).unwrap()];
        assert!(day.is_working_day);
        assert_eq!(day.scheduled_minutes, Some(480));

        Ok(())
    }

    #[tokio::test]
    async fn punch_folds_upstream_errors_into_result() -> anyhow::Result<()> {
        let server = MockServer::start();
        server
            .mock(|when, then| {
                when.method(httpmock::Method::POST)
                    .path("/backend/pt/api/checkIn/punch/web");
                then.status(401).body("Authorization has been denied.");
            });

        let result = mock_client(&server)?.punch(1, &cookies()?).await;
        assert!(!result.success);
        assert_eq!(
            result.message.as_deref(),
            Some("Apollo request failed with 401 Unauthorized: Authorization has been denied.")
        );

        Ok(())
    }

    #[tokio::test]
    async fn punch_translates_vendor_payload() -> anyhow::Result<()> {
        let server = MockServer::start();
        let punch_mock = server
            .mock(|when, then| {
                when.method(httpmock::Method::POST)
                    .path("/backend/pt/api/checkIn/punch/web")
                    .header("actioncode", "Default")
                    .header("functioncode", "PunchCard")
                    .json_body(json!({ "AttendanceType": 1, "IsOverride": false }));
                then.status(200).json_body(json!({
                    "Data": {
                        "punchDate": "2024-09-02 08:12:33",
                        "punchType": 1,
                        "LocationName": "Taipei HQ"
                    }
                }));
            });

        let result = mock_client(&server)?.punch(1, &cookies()?).await;
        punch_mock.assert();

        assert!(result.success);
        assert_eq!(result.punch_date.as_deref(), Some("2024-09-02 08:12:33"));
        assert_eq!(result.punch_type, Some(1));
        assert_eq!(result.location_name.as_deref(), Some("Taipei HQ"));
        assert!(result.message.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn fetches_punch_status() -> anyhow::Result<()> {
        let server = MockServer::start();
        server
            .mock(|when, then| {
                when.method(httpmock::Method::GET)
                    .path("/backend/pt/api/checkin/punchedTypeWithLocation");
                then.status(200).json_body(json!({
                    "Data": { "WorkType": 1, "RestType": 0, "LocationName": "Taipei HQ" }
                }));
            });

        let status = mock_client(&server)?.fetch_punch_status(&cookies()?).await?;
        assert_eq!(status.work_type, 1);
        assert_eq!(status.rest_type, 0);
        assert_eq!(status.location_name.as_deref(), Some("Taipei HQ"));
        assert!(status.error_message.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn refresh_harvests_only_target_cookies() -> anyhow::Result<()> {
        let server = MockServer::start();
        server
            .mock(|when, then| {
                when.method(httpmock::Method::GET)
                    .path("/backend/pt/api/checkin/punchedTypeWithLocation");
                then.status(200)
                    .header(
                        "set-cookie",
                        "__ModuleSessionCookie=fresh; Path=/; HttpOnly",
                    )
                    .header("set-cookie", "unrelated=nope; Path=/")
                    .json_body(json!({ "Data": {} }));
            });

        let refreshed = mock_client(&server)?
            .refresh_session_cookies(&cookies()?)
            .await?;
        assert_eq!(refreshed.len(), 1);
        assert_eq!(refreshed[0].name, "__ModuleSessionCookie");
        assert_eq!(refreshed[0].value, "fresh");

        Ok(())
    }

    #[tokio::test]
    async fn refresh_returns_empty_when_nothing_rotated() -> anyhow::Result<()> {
        let server = MockServer::start();
        server
            .mock(|when, then| {
                when.method(httpmock::Method::GET)
                    .path("/backend/pt/api/checkin/punchedTypeWithLocation");
                then.status(200).json_body(json!({ "Data": {} }));
            });

        let refreshed = mock_client(&server)?
            .refresh_session_cookies(&cookies()?)
            .await?;
        assert!(refreshed.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn refresh_fails_on_server_errors() -> anyhow::Result<()> {
        let server = MockServer::start();
        server
            .mock(|when, then| {
                when.method(httpmock::Method::GET)
                    .path("/backend/pt/api/checkin/punchedTypeWithLocation");
                then.status(503).body("upstream unavailable");
            });

        let error = mock_client(&server)?
            .refresh_session_cookies(&cookies()?)
            .await
            .unwrap_err();
        assert!(matches!(error, ApolloClientError::Status { .. }));
        assert_eq!(
            error.to_string(),
            "Apollo request failed with 503 Service Unavailable: upstream unavailable"
        );

        Ok(())
    }
}
