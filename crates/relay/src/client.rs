//! Client side of the relay, used from a chat session.
//!
//! Thin reqwest wrapper over the relay's HTTP surface: exposes the
//! consent-screen entry URL and the free-busy query, mapping the relay's
//! status codes back onto [`RelayError`].

use serde::Serialize;
use tracing::debug;

use mostrador_core::RelayError;

use crate::google::BusyInterval;

/// Relay base URL when none is configured.
pub const DEFAULT_RELAY_URL: &str = "http://localhost:4000";

pub struct RelayClient {
    base_url: String,
    http: reqwest::Client,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Where to send the user to authorize calendar access.
    pub fn auth_url(&self) -> String {
        format!("{}/auth/google", self.base_url)
    }

    /// Busy intervals on the primary calendar between two ISO-8601 instants.
    pub async fn free_busy(
        &self,
        start_time: &str,
        end_time: &str,
    ) -> Result<Vec<BusyInterval>, RelayError> {
        let url = format!("{}/api/calendar/free-busy", self.base_url);
        debug!(%start_time, %end_time, "Querying relay free-busy");

        let response = self
            .http
            .post(&url)
            .json(&FreeBusyBody {
                start_time,
                end_time,
            })
            .send()
            .await
            .map_err(|e| RelayError::Network(e.to_string()))?;

        match response.status().as_u16() {
            200 => response
                .json()
                .await
                .map_err(|e| RelayError::Upstream(e.to_string())),
            401 => Err(RelayError::NotAuthenticated),
            400 => Err(RelayError::MissingField("startTime/endTime".into())),
            status => Err(RelayError::Upstream(format!("status {status}"))),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FreeBusyBody<'a> {
    start_time: &'a str,
    end_time: &'a str,
}
