use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::Settings;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("invalid settings file: {0}")]
    SerdeError(#[from] serde_json::Error),
}

/// Plaintext store for the client credentials and the last used username.
pub struct SettingsManager {
    path: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    pub fn new(path: PathBuf, settings: Settings) -> Self {
        Self { path, settings }
    }

    /// Loads the settings at `path`. A missing, unreadable or corrupt file
    /// yields empty settings.
    pub async fn load(path: PathBuf) -> Self {
        match Self::try_load(&path).await {
            Ok(settings) => Self::new(path, settings),
            Err(e) => {
                log::debug!("no usable settings at {}: {}", path.display(), e);
                Self::new(path, Settings::default())
            }
        }
    }

    async fn try_load(path: &Path) -> Result<Settings, SettingsError> {
        let content = async_fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    pub async fn persist(&self) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.settings)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    pub fn set_credentials(&mut self, client_id: &str, client_secret: &str) -> &mut Self {
        self.settings.client_id = client_id.trim().to_string();
        self.settings.client_secret = client_secret.trim().to_string();
        self
    }

    pub fn set_username(&mut self, username: &str) -> &mut Self {
        self.settings.last_username = username.trim().to_string();
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
