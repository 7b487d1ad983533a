use std::time::Duration;

use chrono::Utc;
use reqwest::{
    StatusCode, Url,
    blocking::{Client, Response},
    header::RETRY_AFTER,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    config::Endpoints,
    spotify::{ApiError, auth, auth::Credentials},
    types::AppToken,
};

/// Fixed connect/read timeout for every request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Blocking Spotify Web API client authenticated with client credentials.
///
/// Meant to live on the worker thread: `reqwest::blocking` must not be
/// created or dropped inside an async runtime.
pub struct SpotifyClient {
    http: Client,
    endpoints: Endpoints,
    credentials: Credentials,
    token: Option<AppToken>,
}

impl SpotifyClient {
    pub fn new(endpoints: Endpoints, credentials: Credentials) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            endpoints,
            credentials,
            token: None,
        })
    }

    /// Returns a valid access token, requesting a new one when none is held
    /// or the current one is about to expire.
    pub(crate) fn access_token(&mut self) -> Result<String, ApiError> {
        let now = Utc::now().timestamp() as u64;
        let token = match self.token.take() {
            Some(t) if !auth::is_expired(&t, now) => t,
            _ => auth::request_token(&self.http, &self.endpoints.token_url, &self.credentials)?,
        };
        let access_token = token.access_token.clone();
        self.token = Some(token);
        Ok(access_token)
    }

    /// Builds `{api_url}/{segments...}?{query}` with each segment escaped.
    pub(crate) fn endpoint(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Url, ApiError> {
        let mut url =
            Url::parse(&self.endpoints.api_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.endpoints.api_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    pub(crate) fn get_json<T: DeserializeOwned>(&mut self, url: &str) -> Result<T, ApiError> {
        let token = self.access_token()?;
        log::debug!("GET {}", url);

        let response = self.http.get(url).bearer_auth(token).send()?;
        let json = check_status(response)?.json::<T>()?;
        Ok(json)
    }
}

/// Maps a non-success response to an [`ApiError`].
///
/// 429 becomes [`ApiError::RateLimited`] with the raw `Retry-After` value so
/// the caller can decide on the wait; anything else becomes
/// [`ApiError::Status`] with the message from the error body.
pub(crate) fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.trim().to_string());
        log::debug!("rate limited, retry-after: {:?}", retry_after);
        return Err(ApiError::RateLimited { retry_after });
    }

    let body = response.text().unwrap_or_default();
    let message = error_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Extracts a human readable message from a Spotify error body.
///
/// Web API errors look like `{"error": {"status": 404, "message": "..."}}`,
/// the accounts service answers `{"error": "...", "error_description": "..."}`.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;

    let message = json["error"]["message"]
        .as_str()
        .or_else(|| json["error_description"].as_str())
        .or_else(|| json["error"].as_str())?;

    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}
