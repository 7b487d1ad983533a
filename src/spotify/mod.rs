//! # Spotify Integration Module
//!
//! This module is the API client the fetch pipeline talks to. It hides HTTP,
//! authentication and response decoding behind the [`CatalogApi`] trait so
//! the pipeline can be driven by the real Web API or by a scripted fake.
//!
//! ## Architecture
//!
//! ```text
//! Fetch Pipeline (pagination, backoff, filtering)
//!          ↓
//! CatalogApi trait
//!          ↓
//! SpotifyClient
//!     ├── Authentication (client credentials)
//!     └── Playlist listings (user playlists, playlist items)
//!          ↓
//! HTTP Layer (reqwest::blocking, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Authentication
//!
//! [`auth`] implements the client-credentials flow. No user authorization is
//! involved: only public playlists are readable. The token is requested
//! lazily on the first call and renewed shortly before it expires.
//!
//! ## Rate Limiting
//!
//! The client never sleeps. A `429 Too Many Requests` response becomes
//! [`ApiError::RateLimited`] carrying the raw `Retry-After` header, and the
//! caller decides how long to wait and whether to retry. Every other
//! non-success status is a fatal [`ApiError::Status`].
//!
//! ## API Coverage
//!
//! - `POST /api/token` - client-credentials token
//! - `GET /users/{user_id}/playlists` - public playlists of a user
//! - `GET /playlists/{playlist_id}/tracks` - items of a playlist
//!
//! Both listings are paginated; follow-up pages are fetched through the
//! `next` URL returned with each page.

pub mod auth;
pub mod client;
pub mod playlists;

pub use auth::Credentials;
pub use client::SpotifyClient;

use thiserror::Error;

use crate::types::{Page, Playlist, PlaylistItem};

/// Errors raised by the catalog API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 429. `retry_after` is the raw `Retry-After` header, if any.
    #[error("Rate limited (429)")]
    RateLimited { retry_after: Option<String> },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("http status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Paginated read access to the catalog.
///
/// `next` is the cursor returned with the previous page; `None` requests the
/// first page.
pub trait CatalogApi {
    fn authenticate(&mut self) -> Result<(), ApiError>;

    fn user_playlists(
        &mut self,
        user_id: &str,
        next: Option<&str>,
    ) -> Result<Page<Playlist>, ApiError>;

    fn playlist_items(
        &mut self,
        playlist_id: &str,
        next: Option<&str>,
    ) -> Result<Page<PlaylistItem>, ApiError>;
}
