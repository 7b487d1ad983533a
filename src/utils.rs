use std::{fmt, str::FromStr, time::Duration};

use clap::ValueEnum;

use crate::types::TrackRow;

/// Wait used when a rate-limit response carries no usable `Retry-After`.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortColumn {
    Artist,
    Title,
    Album,
    Playlist,
}

impl SortColumn {
    fn key(self, row: &TrackRow) -> String {
        match self {
            SortColumn::Artist => row.artist.to_lowercase(),
            SortColumn::Title => row.title.to_lowercase(),
            SortColumn::Album => row.album.to_lowercase(),
            SortColumn::Playlist => row.playlist.to_lowercase(),
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortColumn::Artist => "artist",
            SortColumn::Title => "title",
            SortColumn::Album => "album",
            SortColumn::Playlist => "playlist",
        };
        f.write_str(name)
    }
}

impl FromStr for SortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "artist" => Ok(SortColumn::Artist),
            "title" => Ok(SortColumn::Title),
            "album" => Ok(SortColumn::Album),
            "playlist" | "playlist name" => Ok(SortColumn::Playlist),
            other => Err(format!(
                "Unknown column '{}'. Use artist, title, album or playlist.",
                other
            )),
        }
    }
}

/// Current column sort of the table view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: SortColumn,
    pub descending: bool,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: SortColumn::Album,
            descending: false,
        }
    }
}

impl SortState {
    /// Header click: the current column flips direction, another column
    /// starts ascending.
    pub fn toggle(&mut self, column: SortColumn) {
        if self.column == column {
            self.descending = !self.descending;
        } else {
            self.column = column;
            self.descending = false;
        }
    }
}

/// Default grouping view: album, then artist, then title, case-insensitive.
pub fn sort_rows_default(rows: &mut [TrackRow]) {
    rows.sort_by_cached_key(|r| {
        (
            r.album.to_lowercase(),
            r.artist.to_lowercase(),
            r.title.to_lowercase(),
        )
    });
}

/// Stable single-column sort. Descending order keeps the relative order of
/// rows with equal keys.
pub fn sort_rows_by(rows: &mut [TrackRow], column: SortColumn, descending: bool) {
    if descending {
        rows.sort_by(|a, b| column.key(b).cmp(&column.key(a)));
    } else {
        rows.sort_by_cached_key(|r| column.key(r));
    }
}

/// Parses a `Retry-After` header value given in seconds.
///
/// Returns `None` when the value is absent or not a whole number of seconds
/// (HTTP dates are not used by the Web API).
pub fn parse_retry_after(value: Option<&str>) -> Option<Duration> {
    value?.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Masks all but the last four characters of a secret for display.
pub fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count == 0 {
        return String::new();
    }
    if count <= 4 {
        return "•".repeat(count);
    }
    let visible: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "•".repeat(count - 4), visible)
}

/// Appends `.xlsx` when `path` has no extension.
pub fn with_xlsx_extension(path: &std::path::Path) -> std::path::PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension("xlsx")
    }
}
