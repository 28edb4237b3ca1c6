//! Publishing API client.
//!
//! Provides a sync HTTP client for the Official Accounts API. Every call
//! authenticates with an access token passed as a query parameter.

mod drafts;
mod media;
mod token;

use std::time::Duration;

use serde::de::DeserializeOwned;
use ureq::Agent;
use ureq::http::Response;

use crate::error::PublishError;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Public API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.weixin.qq.com";

/// Official Accounts API client.
pub struct WxClient {
    agent: Agent,
    base_url: String,
}

impl WxClient {
    /// Create a client for the API at `base_url`.
    pub fn new(base_url: &str) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Full URL of an API path.
    fn api_url(&self, path: &str) -> String {
        format!("{}/cgi-bin/{}", self.base_url, path)
    }

    /// POST a JSON payload and decode the JSON answer.
    fn post_json<T: DeserializeOwned>(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<T, PublishError> {
        let payload_bytes = serde_json::to_vec(payload)?;

        let response = self
            .agent
            .post(url)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        read_json(response)
    }
}

impl Default for WxClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl std::fmt::Debug for WxClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WxClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Decode a JSON response, turning 4xx/5xx statuses into
/// [`PublishError::HttpResponse`].
fn read_json<T: DeserializeOwned>(response: Response<ureq::Body>) -> Result<T, PublishError> {
    let status = response.status().as_u16();
    let mut body_reader = response.into_body();

    if status >= 400 {
        let error_body = body_reader
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(PublishError::HttpResponse {
            status,
            body: error_body,
        });
    }

    Ok(body_reader.read_json()?)
}
