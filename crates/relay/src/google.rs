//! Upstream Google OAuth and calendar client.
//!
//! The relay handlers talk to Google through the [`CalendarProvider`]
//! trait so tests can substitute a stub. [`GoogleCalendar`] is the
//! production implementation: consent-URL construction, authorization-code
//! exchange, and the v3 free-busy query for the primary calendar.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use mostrador_core::RelayError;

use crate::token::OAuthTokens;

const AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const FREEBUSY_ENDPOINT: &str = "https://www.googleapis.com/calendar/v3/freeBusy";

/// Read-only calendar access is all the relay ever asks for.
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

/// One busy window on the primary calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: String,
    pub end: String,
}

/// The relay's view of the upstream OAuth / calendar service.
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// The consent-screen URL the visitor is redirected to.
    fn auth_url(&self) -> String;

    /// Exchange an authorization code for tokens.
    async fn exchange_code(&self, code: &str) -> Result<OAuthTokens, RelayError>;

    /// Busy intervals on the primary calendar between the given ISO-8601
    /// instants.
    async fn free_busy(
        &self,
        tokens: &OAuthTokens,
        start_time: &str,
        end_time: &str,
    ) -> Result<Vec<BusyInterval>, RelayError>;
}

/// Production Google client.
pub struct GoogleCalendar {
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    http: reqwest::Client,
}

impl GoogleCalendar {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendar {
    fn auth_url(&self) -> String {
        let url = reqwest::Url::parse_with_params(
            AUTH_ENDPOINT,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_type", "code"),
                ("scope", CALENDAR_SCOPE),
                ("access_type", "offline"),
            ],
        );
        match url {
            Ok(url) => url.into(),
            // AUTH_ENDPOINT is a constant valid URL; parse only fails on it
            Err(e) => {
                warn!(error = %e, "Failed to build consent URL");
                AUTH_ENDPOINT.to_string()
            }
        }
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthTokens, RelayError> {
        debug!("Exchanging authorization code");

        let response = self
            .http
            .post(TOKEN_ENDPOINT)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| RelayError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "Token exchange rejected");
            return Err(RelayError::TokenExchange(format!(
                "status {status}: {body}"
            )));
        }

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| RelayError::TokenExchange(e.to_string()))?;

        Ok(OAuthTokens {
            access_token: token_response.access_token,
            refresh_token: token_response.refresh_token,
        })
    }

    async fn free_busy(
        &self,
        tokens: &OAuthTokens,
        start_time: &str,
        end_time: &str,
    ) -> Result<Vec<BusyInterval>, RelayError> {
        let body = FreeBusyQuery {
            time_min: start_time.to_string(),
            time_max: end_time.to_string(),
            items: vec![CalendarId { id: "primary".into() }],
        };

        let response = self
            .http
            .post(FREEBUSY_ENDPOINT)
            .bearer_auth(&tokens.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| RelayError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!(status, "Free-busy query rejected");
            return Err(RelayError::Upstream(format!("status {status}")));
        }

        let parsed: FreeBusyResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Upstream(e.to_string()))?;

        Ok(parsed
            .calendars
            .primary
            .map(|c| c.busy)
            .unwrap_or_default())
    }
}

// --- Wire types ---

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FreeBusyQuery {
    time_min: String,
    time_max: String,
    items: Vec<CalendarId>,
}

#[derive(Debug, Serialize)]
struct CalendarId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct FreeBusyResponse {
    #[serde(default)]
    calendars: FreeBusyCalendars,
}

#[derive(Debug, Default, Deserialize)]
struct FreeBusyCalendars {
    #[serde(default)]
    primary: Option<FreeBusyCalendar>,
}

#[derive(Debug, Deserialize)]
struct FreeBusyCalendar {
    #[serde(default)]
    busy: Vec<BusyInterval>,
}
