use chrono::Utc;
use reqwest::{StatusCode, blocking::Client};

use crate::{
    spotify::{ApiError, client},
    types::{AppToken, TokenResponse},
};

/// Renew the token when it has less than this many seconds left.
const EXPIRY_MARGIN_SECS: u64 = 60;
const DEFAULT_EXPIRES_IN: u64 = 3600;

/// Client ID and secret of a registered Spotify application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Requests an app access token with the client-credentials grant.
///
/// The client ID and secret are sent as HTTP basic auth. A rejection by the
/// token endpoint (bad credentials) maps to [`ApiError::Auth`]; a 429 maps to
/// [`ApiError::RateLimited`] like every other endpoint.
pub fn request_token(
    http: &Client,
    token_url: &str,
    credentials: &Credentials,
) -> Result<AppToken, ApiError> {
    log::debug!("requesting client-credentials token from {}", token_url);

    let response = http
        .post(token_url)
        .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()?;

    let status = response.status();
    if !status.is_success() && status != StatusCode::TOO_MANY_REQUESTS {
        let body = response.text().unwrap_or_default();
        let message = client::error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("token request failed").to_string());
        return Err(ApiError::Auth(message));
    }

    let json = client::check_status(response)?.json::<TokenResponse>()?;

    Ok(AppToken {
        access_token: json.access_token,
        token_type: json.token_type.unwrap_or_else(|| "Bearer".to_string()),
        expires_in: json.expires_in.unwrap_or(DEFAULT_EXPIRES_IN),
        obtained_at: Utc::now().timestamp() as u64,
    })
}

/// True when `token` is expired or about to expire at `now` (unix seconds).
pub fn is_expired(token: &AppToken, now: u64) -> bool {
    now + EXPIRY_MARGIN_SECS >= token.obtained_at + token.expires_in
}
