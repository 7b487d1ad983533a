use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::{
    config::{self, Endpoints},
    dedup,
    export::{self, ExportError},
    management::{SettingsError, SettingsManager},
    spotify::Credentials,
    types::TrackRow,
    utils::{self, SortColumn, SortState},
    worker::FetchRequest,
};

/// Values supplied for a fetch before falling back to the saved settings.
#[derive(Debug, Clone, Default)]
pub struct FetchInput {
    pub user_id: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "Please enter Client ID, Client Secret, and Spotify username (missing: {}).",
    .missing.join(", ")
)]
pub struct InputError {
    pub missing: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupReport {
    NoData,
    NoDuplicates,
    Removed(usize),
}

/// Everything one run of the tool works on: settings, endpoints, and the
/// current row set with its sort and the rows removed by the last
/// deduplication.
///
/// Constructed once at startup and passed by reference.
pub struct Session {
    settings: SettingsManager,
    endpoints: Endpoints,
    rows: Vec<TrackRow>,
    removed: Vec<TrackRow>,
    sort: SortState,
}

impl Session {
    pub fn new(settings: SettingsManager, endpoints: Endpoints) -> Self {
        Self {
            settings,
            endpoints,
            rows: Vec::new(),
            removed: Vec::new(),
            sort: SortState::default(),
        }
    }

    /// Opens the session with the settings file from the data directory and
    /// the endpoints from the environment.
    pub async fn open() -> Self {
        let settings = SettingsManager::load(config::settings_path()).await;
        Self::new(settings, Endpoints::from_env())
    }

    pub fn settings(&self) -> &SettingsManager {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsManager {
        &mut self.settings
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Combines `input` with the saved settings into a fetch request.
    ///
    /// Supplied values win over saved ones. Fails before anything touches the
    /// network when a value is missing on both sides.
    pub fn resolve_fetch(&self, input: FetchInput) -> Result<FetchRequest, InputError> {
        let saved = self.settings.settings();
        let pick = |given: Option<String>, stored: &str| {
            given
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .or_else(|| Some(stored.trim().to_string()).filter(|v| !v.is_empty()))
        };

        let client_id = pick(input.client_id, &saved.client_id);
        let client_secret = pick(input.client_secret, &saved.client_secret);
        let user_id = pick(input.user_id, &saved.last_username);

        match (client_id, client_secret, user_id) {
            (Some(client_id), Some(client_secret), Some(user_id)) => Ok(FetchRequest {
                user_id,
                credentials: Credentials {
                    client_id,
                    client_secret,
                },
            }),
            (client_id, client_secret, user_id) => {
                let mut missing = Vec::new();
                if client_id.is_none() {
                    missing.push("Client ID");
                }
                if client_secret.is_none() {
                    missing.push("Client Secret");
                }
                if user_id.is_none() {
                    missing.push("Spotify username");
                }
                Err(InputError { missing })
            }
        }
    }

    /// Saves the values of a fetch request as the new settings.
    pub async fn remember(&mut self, request: &FetchRequest) -> Result<(), SettingsError> {
        self.settings
            .set_credentials(
                &request.credentials.client_id,
                &request.credentials.client_secret,
            )
            .set_username(&request.user_id);
        self.settings.persist().await
    }

    /// Replaces the row set with a fresh fetch result in the default view.
    pub fn replace_rows(&mut self, mut rows: Vec<TrackRow>) {
        utils::sort_rows_default(&mut rows);
        self.rows = rows;
        self.removed.clear();
        self.sort = SortState::default();
    }

    pub fn clear_rows(&mut self) {
        self.replace_rows(Vec::new());
    }

    pub fn rows(&self) -> &[TrackRow] {
        &self.rows
    }

    /// Rows removed by the last deduplication that found duplicates.
    pub fn removed(&self) -> &[TrackRow] {
        &self.removed
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    /// Column header click; see [`SortState::toggle`].
    pub fn sort_by(&mut self, column: SortColumn) -> SortState {
        self.sort.toggle(column);
        utils::sort_rows_by(&mut self.rows, self.sort.column, self.sort.descending);
        self.sort
    }

    pub fn set_sort(&mut self, column: SortColumn, descending: bool) {
        self.sort = SortState { column, descending };
        utils::sort_rows_by(&mut self.rows, column, descending);
    }

    pub fn remove_duplicates(&mut self) -> DedupReport {
        if self.rows.is_empty() {
            return DedupReport::NoData;
        }

        let outcome = dedup::deduplicate(&self.rows);
        if !outcome.found_duplicates() {
            return DedupReport::NoDuplicates;
        }

        let removed = outcome.removed_count();
        self.rows = outcome.kept;
        self.removed = outcome.removed;
        DedupReport::Removed(removed)
    }

    /// Exports the rows in their current order.
    pub fn export(&self, path: &Path) -> Result<PathBuf, ExportError> {
        export::export_xlsx(&self.rows, path)
    }
}
