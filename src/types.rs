use serde::{Deserialize, Serialize};
use tabled::Tabled;

pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_ALBUM: &str = "Unknown Album";
pub const UNKNOWN_PLAYLIST: &str = "Unknown Playlist";

/// Access token obtained through the client-credentials flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// One page of a paginated listing. `next` holds the URL of the following
/// page and is absent on the last one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.next.as_deref().is_some_and(|n| !n.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub owner: Option<PlaylistOwner>,
    #[serde(default)]
    pub tracks: Option<PlaylistTracksRef>,
}

impl Playlist {
    pub fn owner_id(&self) -> &str {
        self.owner
            .as_ref()
            .and_then(|o| o.id.as_deref())
            .unwrap_or_default()
    }

    /// Track count reported by the listing. Can include since-deleted or
    /// local tracks, so it is an upper bound on what the items endpoint yields.
    pub fn track_total(&self) -> u64 {
        self.tracks.as_ref().map_or(0, |t| t.total)
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_PLAYLIST)
    }

    /// True when the playlist was created by `user_id` rather than merely
    /// followed. Comparison ignores case.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id().to_lowercase() == user_id.to_lowercase()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistOwner {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistTracksRef {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub track: Option<PlayableItem>,
}

/// A track or episode inside a playlist. Only the fields needed to build a
/// [`TrackRow`] are modelled; episodes simply carry a different `type`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayableItem {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "Vec::new")]
    pub artists: Vec<Option<TrackArtist>>,
    #[serde(default)]
    pub album: Option<TrackAlbum>,
}

impl PlayableItem {
    pub fn is_track(&self) -> bool {
        self.kind.as_deref() == Some("track")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackArtist {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackAlbum {
    #[serde(default)]
    pub name: Option<String>,
}

/// A flattened playlist entry as shown in the table and written to the
/// spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Tabled)]
pub struct TrackRow {
    #[tabled(rename = "Artist")]
    pub artist: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Album")]
    pub album: String,
    #[tabled(rename = "Playlist Name")]
    pub playlist: String,
}

impl TrackRow {
    pub fn new(artist: &str, title: &str, album: &str, playlist: &str) -> Self {
        Self {
            artist: artist.to_string(),
            title: title.to_string(),
            album: album.to_string(),
            playlist: playlist.to_string(),
        }
    }

    /// Builds a row from a playlist item, or `None` when the item has no
    /// track or is not of type `track` (podcast episodes).
    pub fn from_item(item: &PlaylistItem, playlist: &str) -> Option<Self> {
        let track = item.track.as_ref().filter(|t| t.is_track())?;

        let artist = track
            .artists
            .iter()
            .flatten()
            .filter_map(|a| a.name.as_deref())
            .filter(|n| !n.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        let title = track.name.clone().unwrap_or_default();
        let album = track
            .album
            .as_ref()
            .and_then(|a| a.name.clone())
            .unwrap_or_default();

        Some(Self {
            artist: or_placeholder(artist, UNKNOWN_ARTIST),
            title: or_placeholder(title, UNKNOWN_TITLE),
            album: or_placeholder(album, UNKNOWN_ALBUM),
            playlist: playlist.to_string(),
        })
    }

    /// Case-insensitive `(artist, title)` identity used for deduplication.
    pub fn dedup_key(&self) -> (String, String) {
        (self.artist.to_lowercase(), self.title.to_lowercase())
    }
}

fn or_placeholder(value: String, placeholder: &str) -> String {
    if value.is_empty() {
        placeholder.to_string()
    } else {
        value
    }
}

/// Persisted user settings. Stored as plaintext JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub last_username: String,
}

#[derive(Tabled)]
pub struct SettingTableRow {
    #[tabled(rename = "Setting")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
}
