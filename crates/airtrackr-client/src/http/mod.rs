// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! HTTP access to the AirTrackr backend and the photo API.

mod photos;

pub use photos::{PhotoService, PLANESPOTTERS_URL};

use std::time::Duration;

use log::{debug, warn};
use reqwest::StatusCode;

use crate::error::NetworkError;
use crate::protocol::{decode_current, decode_history, AircraftReport, HistoryTrail, TrailLength};

/// Default backend when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = concat!("airtrackr/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|e| {
            warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
}

/// GET `url` and return the status and body.
pub(crate) async fn get_body(
    http: &reqwest::Client,
    url: &str,
) -> Result<(StatusCode, Vec<u8>), NetworkError> {
    let request_error = |source| NetworkError::Request {
        url: url.to_string(),
        source,
    };

    let response = http.get(url).send().await.map_err(request_error)?;
    let status = response.status();
    if !status.is_success() {
        return Err(NetworkError::Status {
            url: url.to_string(),
            status,
        });
    }

    let body = response.bytes().await.map_err(request_error)?;
    debug!("GET {} -> {} ({} bytes)", url, status, body.len());
    Ok((status, body.to_vec()))
}

/// Client for the first-party backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Create a client for `base_url` (trailing slashes are ignored).
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_http(base_url, http_client())
    }

    /// Create a client sharing an existing `reqwest::Client`.
    #[must_use]
    pub fn with_http(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The underlying HTTP client, for sharing connection pools.
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    #[must_use]
    pub fn current_url(&self) -> String {
        format!("{}/aircraft/current/", self.base_url)
    }

    #[must_use]
    pub fn history_url(&self, icao: &str, trail: TrailLength) -> String {
        format!(
            "{}/aircraft/history/{}{}",
            self.base_url,
            icao,
            trail.query().unwrap_or_default()
        )
    }

    /// Fetch every aircraft the backend currently knows about.
    pub async fn fetch_current(&self) -> Result<Vec<AircraftReport>, NetworkError> {
        let url = self.current_url();
        let (_, body) = get_body(&self.http, &url).await?;
        decode_current(&body).map_err(|source| NetworkError::Decode { url, source })
    }

    /// Fetch the history trail for `icao`.
    ///
    /// The backend answers 204 when it has no history; that is an empty trail.
    pub async fn fetch_history(
        &self,
        icao: &str,
        trail: TrailLength,
    ) -> Result<HistoryTrail, NetworkError> {
        let url = self.history_url(icao, trail);
        let (status, body) = get_body(&self.http, &url).await?;
        if status == StatusCode::NO_CONTENT || body.is_empty() {
            return Ok(HistoryTrail::empty(icao));
        }
        decode_history(icao, &body).map_err(|source| NetworkError::Decode { url, source })
    }
}
