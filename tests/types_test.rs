use serde_json::json;
use spotifetchr::types::*;

fn item(value: serde_json::Value) -> PlaylistItem {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_track_row_from_item() {
    let item = item(json!({
        "is_local": false,
        "track": {
            "type": "track",
            "name": "Around the World",
            "artists": [{ "name": "Daft Punk" }],
            "album": { "name": "Homework" }
        }
    }));

    let row = TrackRow::from_item(&item, "Chill").unwrap();
    assert_eq!(row, TrackRow::new("Daft Punk", "Around the World", "Homework", "Chill"));
}

#[test]
fn test_track_row_joins_artists_and_skips_empty_names() {
    let item = item(json!({
        "track": {
            "type": "track",
            "name": "Collab",
            "artists": [{ "name": "A" }, null, { "name": "" }, { "name": "B" }],
            "album": { "name": "X" }
        }
    }));

    let row = TrackRow::from_item(&item, "P").unwrap();
    assert_eq!(row.artist, "A, B");
}

#[test]
fn test_track_row_placeholders() {
    let item = item(json!({
        "track": { "type": "track", "name": "", "artists": [] }
    }));

    let row = TrackRow::from_item(&item, "P").unwrap();
    assert_eq!(row.artist, UNKNOWN_ARTIST);
    assert_eq!(row.title, UNKNOWN_TITLE);
    assert_eq!(row.album, UNKNOWN_ALBUM);
}

#[test]
fn test_track_row_skips_non_tracks() {
    let episode = item(json!({ "track": { "type": "episode", "name": "Show" } }));
    assert!(TrackRow::from_item(&episode, "P").is_none());

    let missing = item(json!({ "track": null }));
    assert!(TrackRow::from_item(&missing, "P").is_none());

    let empty = item(json!({}));
    assert!(TrackRow::from_item(&empty, "P").is_none());
}

#[test]
fn test_playlist_helpers() {
    let playlist: Playlist = serde_json::from_value(json!({
        "id": "p1",
        "name": "",
        "owner": { "id": "Alice" },
        "tracks": { "total": 12 }
    }))
    .unwrap();

    assert_eq!(playlist.display_name(), UNKNOWN_PLAYLIST);
    assert_eq!(playlist.track_total(), 12);
    assert!(playlist.is_owned_by("alice"));
    assert!(!playlist.is_owned_by("bob"));

    let bare: Playlist = serde_json::from_value(json!({ "id": "p2" })).unwrap();
    assert_eq!(bare.owner_id(), "");
    assert_eq!(bare.track_total(), 0);
    assert!(!bare.is_owned_by("alice"));
}

#[test]
fn test_page_has_next() {
    let page: Page<Playlist> =
        serde_json::from_value(json!({ "items": [], "next": "https://next" })).unwrap();
    assert!(page.has_next());

    let last: Page<Playlist> = serde_json::from_value(json!({ "items": [], "next": null })).unwrap();
    assert!(!last.has_next());
}

#[test]
fn test_dedup_key_ignores_case() {
    let a = TrackRow::new("ABBA", "Waterloo", "X", "P1");
    let b = TrackRow::new("abba", "WATERLOO", "Y", "P2");
    assert_eq!(a.dedup_key(), b.dedup_key());
}

#[test]
fn test_page_total_and_extra_fields() {
    let page: Page<PlaylistItem> = serde_json::from_value(json!({
        "items": [{
            "is_local": true,
            "added_by": { "id": "alice" },
            "track": { "type": "track", "name": "Demo", "artists": [], "album": null }
        }],
        "next": null,
        "total": 7
    }))
    .unwrap();

    assert_eq!(page.total, Some(7));
    assert_eq!(page.items.len(), 1);
    assert_eq!(TrackRow::from_item(&page.items[0], "P").unwrap().title, "Demo");

    let playlist: Playlist = serde_json::from_value(json!({
        "id": "p1",
        "owner": { "id": "alice", "display_name": "Alice" }
    }))
    .unwrap();
    assert_eq!(playlist.owner_id(), "alice");
}
