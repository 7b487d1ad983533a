//! Configuration management for Spotifetchr.
//!
//! This module handles loading configuration values from environment variables
//! and the `.env` file, and knows where the settings file lives. Values are
//! resolved once at startup into plain structs ([`Endpoints`]) that are passed
//! around explicitly instead of being read from the environment on every call.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults

use std::{env, path::PathBuf};

use crate::Res;

/// Name of the application directory inside the platform data directory.
pub const APP_DIR: &str = "spotifetchr";

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

pub const ENV_API_URL: &str = "SPOTIFY_API_URL";
pub const ENV_TOKEN_URL: &str = "SPOTIFY_API_TOKEN_URL";
pub const ENV_CLIENT_ID: &str = "SPOTIFY_API_AUTH_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "SPOTIFY_API_AUTH_CLIENT_SECRET";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the application directory if it doesn't exist. The `.env` file
/// itself is optional:
/// - Linux: `~/.local/share/spotifetchr/.env`
/// - macOS: `~/Library/Application Support/spotifetchr/.env`
/// - Windows: `%LOCALAPPDATA%/spotifetchr/.env`
///
/// # Errors
///
/// Returns an error if the directory cannot be created or an existing `.env`
/// file cannot be parsed.
pub async fn load_env() -> Res<()> {
    let path = app_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path)?;
    }
    Ok(())
}

/// Platform-specific application data directory.
pub fn app_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Location of the plaintext settings file (credentials and last username).
pub fn settings_path() -> PathBuf {
    app_dir().join("config.json")
}

/// Base URLs of the Spotify services the client talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api_url: String,
    pub token_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Resolves endpoints from `SPOTIFY_API_URL` and `SPOTIFY_API_TOKEN_URL`,
    /// falling back to the public Spotify URLs.
    pub fn from_env() -> Self {
        Self {
            api_url: env_or(ENV_API_URL, DEFAULT_API_URL),
            token_url: env_or(ENV_TOKEN_URL, DEFAULT_TOKEN_URL),
        }
    }
}

/// Client ID from the environment, if set and non-empty.
pub fn spotify_client_id() -> Option<String> {
    non_empty_env(ENV_CLIENT_ID)
}

/// Client secret from the environment, if set and non-empty.
///
/// The secret should never be printed; use [`crate::utils::mask_secret`].
pub fn spotify_client_secret() -> Option<String> {
    non_empty_env(ENV_CLIENT_SECRET)
}

fn env_or(key: &str, default: &str) -> String {
    non_empty_env(key)
        .map(|v| v.trim_end_matches('/').to_string())
        .unwrap_or_else(|| default.to_string())
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
