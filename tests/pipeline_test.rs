use std::{
    collections::{HashMap, VecDeque},
    sync::mpsc::{self, Receiver},
    thread,
    time::{Duration, Instant},
};

use serde_json::{Value, json};
use spotifetchr::{
    cancel::CancelFlag,
    events::FetchEvent,
    pipeline::{self, Backoff, PROGRESS_EVERY},
    spotify::{ApiError, CatalogApi},
    types::{Page, Playlist, PlaylistItem, TrackRow},
    worker,
};

/// Scripted catalog. Pages are keyed by `users/{id}` or `playlists/{id}` for
/// the first page and by the `next` cursor for the following ones.
#[derive(Default)]
struct FakeApi {
    pages: HashMap<String, Value>,
    rate_limits: VecDeque<Option<String>>,
    page_limits: HashMap<String, VecDeque<Option<String>>>,
    auth_error: Option<String>,
    requested: Vec<String>,
}

impl FakeApi {
    fn with_page(mut self, key: &str, page: Value) -> Self {
        self.pages.insert(key.to_string(), page);
        self
    }

    fn rate_limited(mut self, retry_after: Option<&str>) -> Self {
        self.rate_limits.push_back(retry_after.map(str::to_string));
        self
    }

    /// Answers the next request for `key` with a 429.
    fn rate_limited_at(mut self, key: &str, retry_after: Option<&str>) -> Self {
        self.page_limits
            .entry(key.to_string())
            .or_default()
            .push_back(retry_after.map(str::to_string));
        self
    }

    fn throttle(&mut self) -> Result<(), ApiError> {
        match self.rate_limits.pop_front() {
            Some(retry_after) => Err(ApiError::RateLimited { retry_after }),
            None => Ok(()),
        }
    }

    fn page<T: serde::de::DeserializeOwned>(&mut self, key: String) -> Result<Page<T>, ApiError> {
        self.throttle()?;
        self.requested.push(key.clone());
        if let Some(retry_after) = self.page_limits.get_mut(&key).and_then(VecDeque::pop_front) {
            return Err(ApiError::RateLimited { retry_after });
        }
        match self.pages.get(&key) {
            Some(page) => Ok(serde_json::from_value(page.clone()).expect("valid fixture")),
            None => Err(ApiError::Status {
                status: 404,
                message: "Resource not found".to_string(),
            }),
        }
    }
}

impl CatalogApi for FakeApi {
    fn authenticate(&mut self) -> Result<(), ApiError> {
        self.throttle()?;
        match &self.auth_error {
            Some(message) => Err(ApiError::Auth(message.clone())),
            None => Ok(()),
        }
    }

    fn user_playlists(
        &mut self,
        user_id: &str,
        next: Option<&str>,
    ) -> Result<Page<Playlist>, ApiError> {
        let key = next.map_or_else(|| format!("users/{}", user_id), str::to_string);
        self.page(key)
    }

    fn playlist_items(
        &mut self,
        playlist_id: &str,
        next: Option<&str>,
    ) -> Result<Page<PlaylistItem>, ApiError> {
        let key = next.map_or_else(|| format!("playlists/{}", playlist_id), str::to_string);
        self.page(key)
    }
}

fn playlist(id: &str, name: &str, owner: &str, total: u64) -> Value {
    json!({
        "id": id,
        "name": name,
        "owner": { "id": owner, "display_name": owner },
        "tracks": { "total": total }
    })
}

fn track(artist: &str, title: &str, album: &str) -> Value {
    json!({
        "is_local": false,
        "track": {
            "type": "track",
            "name": title,
            "artists": [{ "name": artist }],
            "album": { "name": album }
        }
    })
}

fn episode(title: &str) -> Value {
    json!({
        "is_local": false,
        "track": { "type": "episode", "name": title }
    })
}

fn page(items: Vec<Value>, next: Option<&str>) -> Value {
    let total = items.len();
    json!({ "items": items, "next": next, "total": total })
}

fn fast_backoff() -> Backoff {
    Backoff {
        tick: Duration::from_millis(1),
        default_delay: Duration::from_secs(5),
    }
}

fn run(api: &mut FakeApi, user_id: &str, backoff: &Backoff) -> Vec<FetchEvent> {
    let (tx, rx) = mpsc::channel();
    pipeline::run(api, user_id, &tx, &CancelFlag::new(), backoff);
    drain(&rx)
}

fn drain(rx: &Receiver<FetchEvent>) -> Vec<FetchEvent> {
    rx.try_iter().collect()
}

fn done_rows(events: &[FetchEvent]) -> &[TrackRow] {
    match events.last() {
        Some(FetchEvent::Done(rows)) => rows,
        other => panic!("expected a Done event last, got {:?}", other),
    }
}

fn messages(events: &[FetchEvent]) -> Vec<&str> {
    events
        .iter()
        .filter_map(|e| match e {
            FetchEvent::Message(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}

fn progress(events: &[FetchEvent]) -> Vec<u64> {
    events
        .iter()
        .filter_map(|e| match e {
            FetchEvent::Progress(n) => Some(*n),
            _ => None,
        })
        .collect()
}

fn alice_catalog() -> FakeApi {
    FakeApi::default()
        .with_page(
            "users/alice",
            page(
                vec![
                    playlist("p1", "Road Trip", "alice", 2),
                    playlist("p2", "Bob's Mix", "bob", 1),
                    playlist("p3", "Gym", "ALICE", 1),
                ],
                None,
            ),
        )
        .with_page(
            "playlists/p1",
            page(
                vec![
                    track("Queen", "Don't Stop Me Now", "Jazz"),
                    track("ABBA", "Waterloo", "Waterloo"),
                ],
                None,
            ),
        )
        .with_page(
            "playlists/p2",
            page(vec![track("Bob", "Followed", "Not Mine")], None),
        )
        .with_page(
            "playlists/p3",
            page(vec![track("Survivor", "Eye of the Tiger", "Eye of the Tiger")], None),
        )
}

#[test]
fn test_fetches_only_owned_playlists() {
    let mut api = alice_catalog();
    let events = run(&mut api, "alice", &fast_backoff());

    assert_eq!(
        events[..3],
        [
            FetchEvent::Message("Found 3 playlists (before filtering by owner).".to_string()),
            FetchEvent::ProgressTotal(3),
            FetchEvent::Progress(3),
        ]
    );

    let rows = done_rows(&events);
    assert_eq!(
        rows,
        [
            TrackRow::new("Survivor", "Eye of the Tiger", "Eye of the Tiger", "Gym"),
            TrackRow::new("Queen", "Don't Stop Me Now", "Jazz", "Road Trip"),
            TrackRow::new("ABBA", "Waterloo", "Waterloo", "Road Trip"),
        ]
    );

    // Bob's playlist is followed, not owned
    assert!(!api.requested.contains(&"playlists/p2".to_string()));
}

#[test]
fn test_followed_playlist_is_excluded() {
    let mut api = FakeApi::default()
        .with_page(
            "users/alice",
            page(
                vec![
                    playlist("rt", "Road Trip", "alice", 2),
                    playlist("ot", "Other", "bob", 5),
                ],
                None,
            ),
        )
        .with_page(
            "playlists/rt",
            page(vec![track("B", "Y", "Z"), track("A", "X", "Z")], None),
        );
    let events = run(&mut api, "alice", &fast_backoff());

    assert_eq!(
        done_rows(&events),
        [
            TrackRow::new("A", "X", "Z", "Road Trip"),
            TrackRow::new("B", "Y", "Z", "Road Trip"),
        ]
    );
}

#[test]
fn test_owner_match_ignores_case_of_input() {
    let mut api = alice_catalog();
    let events = run(&mut api, "Alice", &fast_backoff());

    assert_eq!(done_rows(&events).len(), 3);
}

#[test]
fn test_no_owned_playlists() {
    let mut api = FakeApi::default().with_page(
        "users/alice",
        page(vec![playlist("p2", "Bob's Mix", "bob", 4)], None),
    );
    let events = run(&mut api, "alice", &fast_backoff());

    assert_eq!(
        messages(&events),
        vec![
            "Found 1 playlists (before filtering by owner).",
            "No public playlists created by 'alice' were found.",
        ]
    );
    assert!(done_rows(&events).is_empty());
    assert!(!events.iter().any(|e| matches!(e, FetchEvent::ProgressTotal(_))));
}

#[test]
fn test_skipped_items_still_advance_progress() {
    let mut api = FakeApi::default()
        .with_page("users/alice", page(vec![playlist("p1", "Mixed", "alice", 3)], None))
        .with_page(
            "playlists/p1",
            page(
                vec![
                    track("A", "Song", "Album"),
                    episode("Podcast #1"),
                    json!({ "is_local": false, "track": null }),
                ],
                None,
            ),
        );
    let events = run(&mut api, "alice", &fast_backoff());

    assert_eq!(progress(&events), vec![2, 3]);
    assert_eq!(done_rows(&events), [TrackRow::new("A", "Song", "Album", "Mixed")]);
}

#[test]
fn test_progress_every_twenty_items() {
    let items: Vec<Value> = (0..25)
        .map(|n| track("Artist", &format!("Song {}", n), "Album"))
        .collect();
    let mut api = FakeApi::default()
        .with_page("users/alice", page(vec![playlist("p1", "Long", "alice", 25)], None))
        .with_page("playlists/p1", page(items, None));
    let events = run(&mut api, "alice", &fast_backoff());

    assert_eq!(progress(&events), vec![PROGRESS_EVERY, 25]);
    assert_eq!(done_rows(&events).len(), 25);
}

#[test]
fn test_progress_is_clamped_to_reported_total() {
    // The listing reports one track, the items endpoint yields three
    let mut api = FakeApi::default()
        .with_page("users/alice", page(vec![playlist("p1", "Stale", "alice", 1)], None))
        .with_page(
            "playlists/p1",
            page(
                vec![
                    track("A", "1", "X"),
                    track("A", "2", "X"),
                    track("A", "3", "X"),
                ],
                None,
            ),
        );
    let events = run(&mut api, "alice", &fast_backoff());

    assert!(events.contains(&FetchEvent::ProgressTotal(1)));
    assert!(progress(&events).iter().all(|&p| p <= 1));
    assert_eq!(done_rows(&events).len(), 3);
}

#[test]
fn test_zero_reported_total_uses_denominator_of_one() {
    let mut api = FakeApi::default()
        .with_page("users/alice", page(vec![playlist("p1", "Empty", "alice", 0)], None))
        .with_page("playlists/p1", page(vec![], None));
    let events = run(&mut api, "alice", &fast_backoff());

    assert!(events.contains(&FetchEvent::ProgressTotal(1)));
    assert!(done_rows(&events).is_empty());
}

#[test]
fn test_follows_next_cursors() {
    let mut api = FakeApi::default()
        .with_page(
            "users/alice",
            page(vec![playlist("p1", "One", "alice", 3)], Some("users-page-2")),
        )
        .with_page(
            "users-page-2",
            page(vec![playlist("p2", "Two", "alice", 1)], None),
        )
        .with_page(
            "playlists/p1",
            page(
                vec![track("A", "1", "X"), track("A", "2", "X")],
                Some("p1-page-2"),
            ),
        )
        .with_page("p1-page-2", page(vec![track("A", "3", "X")], None))
        .with_page("playlists/p2", page(vec![track("B", "4", "Y")], None));
    let events = run(&mut api, "alice", &fast_backoff());

    assert_eq!(done_rows(&events).len(), 4);
    assert_eq!(
        api.requested,
        vec![
            "users/alice",
            "users-page-2",
            "playlists/p1",
            "p1-page-2",
            "playlists/p2",
        ]
    );
}

#[test]
fn test_rate_limit_waits_and_retries() {
    let mut api = alice_catalog().rate_limited(Some("2"));
    let backoff = Backoff {
        tick: Duration::from_millis(20),
        default_delay: Duration::from_secs(5),
    };

    let started = Instant::now();
    let events = run(&mut api, "alice", &backoff);

    assert!(started.elapsed() >= Duration::from_millis(40));
    assert_eq!(
        events[0],
        FetchEvent::Message("Rate limited (429). Waiting 2s…".to_string())
    );
    assert_eq!(done_rows(&events).len(), 3);
}

#[test]
fn test_rate_limit_without_usable_retry_after_uses_default() {
    let mut api = alice_catalog()
        .rate_limited(Some("soon"))
        .rate_limited(None);
    let events = run(&mut api, "alice", &fast_backoff());

    assert_eq!(
        messages(&events)[..2],
        ["Rate limited (429). Waiting 5s…", "Rate limited (429). Waiting 5s…"]
    );
    assert_eq!(done_rows(&events).len(), 3);
}

#[test]
fn test_zero_retry_after_still_waits_one_tick() {
    let mut api = alice_catalog().rate_limited(Some("0"));
    let events = run(&mut api, "alice", &fast_backoff());

    assert_eq!(messages(&events)[0], "Rate limited (429). Waiting 1s…");
    assert_eq!(done_rows(&events).len(), 3);
}

fn paged_catalog() -> FakeApi {
    FakeApi::default()
        .with_page(
            "users/alice",
            page(vec![playlist("p1", "One", "alice", 3)], Some("users-page-2")),
        )
        .with_page(
            "users-page-2",
            page(vec![playlist("p2", "Two", "alice", 1)], None),
        )
        .with_page(
            "playlists/p1",
            page(
                vec![track("A", "1", "X"), track("A", "2", "X")],
                Some("p1-page-2"),
            ),
        )
        .with_page("p1-page-2", page(vec![track("A", "3", "X")], None))
        .with_page("playlists/p2", page(vec![track("B", "4", "Y")], None))
}

#[test]
fn test_rate_limited_item_page_retries_same_cursor() {
    let mut api = paged_catalog().rate_limited_at("p1-page-2", Some("1"));
    let events = run(&mut api, "alice", &fast_backoff());

    assert_eq!(
        api.requested,
        vec![
            "users/alice",
            "users-page-2",
            "playlists/p1",
            "p1-page-2",
            "p1-page-2",
            "playlists/p2",
        ]
    );
    assert!(messages(&events).contains(&"Rate limited (429). Waiting 1s…"));
    assert_eq!(done_rows(&events).len(), 4);
}

#[test]
fn test_rate_limited_playlist_page_retries_same_cursor() {
    let mut api = paged_catalog().rate_limited_at("users-page-2", None);
    let events = run(&mut api, "alice", &fast_backoff());

    assert_eq!(
        api.requested[..3],
        ["users/alice", "users-page-2", "users-page-2"]
    );
    assert!(messages(&events).contains(&"Rate limited (429). Waiting 5s…"));
    assert_eq!(
        messages(&events).last(),
        Some(&"Found 2 playlists (before filtering by owner).")
    );
    assert_eq!(done_rows(&events).len(), 4);
}

#[test]
fn test_api_error_ends_run_with_error_event() {
    // p1 is owned but its items are missing from the catalog
    let mut api = FakeApi::default()
        .with_page("users/alice", page(vec![playlist("p1", "Gone", "alice", 2)], None));
    let events = run(&mut api, "alice", &fast_backoff());

    match events.last() {
        Some(FetchEvent::Error(text)) => assert!(text.contains("404")),
        other => panic!("expected an Error event, got {:?}", other),
    }
    assert!(!events.iter().any(|e| matches!(e, FetchEvent::Done(_))));
}

#[test]
fn test_auth_error_ends_run_before_listing() {
    let mut api = alice_catalog();
    api.auth_error = Some("invalid_client".to_string());
    let events = run(&mut api, "alice", &fast_backoff());

    assert_eq!(
        events,
        vec![FetchEvent::Error(
            "Authentication failed: invalid_client".to_string()
        )]
    );
    assert!(api.requested.is_empty());
}

#[test]
fn test_cancelled_before_start_emits_nothing() {
    let mut api = alice_catalog();
    let (tx, rx) = mpsc::channel();
    let cancel = CancelFlag::new();
    cancel.cancel();

    pipeline::run(&mut api, "alice", &tx, &cancel, &fast_backoff());

    assert!(drain(&rx).is_empty());
    assert!(api.requested.is_empty());
}

#[test]
fn test_cancel_during_backoff_stops_worker() {
    let api = alice_catalog().rate_limited(Some("1000"));
    let backoff = Backoff {
        tick: Duration::from_millis(10),
        default_delay: Duration::from_secs(5),
    };
    let mut handle = worker::spawn_with(move || Ok(api), "alice".to_string(), backoff);

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut events = Vec::new();
    loop {
        let polled = handle.poll();
        events.extend(polled.events);

        let waiting = messages(&events)
            .iter()
            .any(|m| m.starts_with("Rate limited (429)"));
        if waiting && !handle.is_cancelled() {
            handle.cancel();
        }
        if polled.disconnected {
            break;
        }
        assert!(Instant::now() < deadline, "worker did not stop after cancel");
        thread::sleep(Duration::from_millis(5));
    }
    handle.join();

    assert!(handle.is_cancelled());
    assert!(!events.iter().any(FetchEvent::is_terminal));
}

#[test]
fn test_worker_reports_client_construction_failure() {
    let mut handle = worker::spawn_with(
        || -> Result<FakeApi, ApiError> { Err(ApiError::InvalidUrl("not a url".to_string())) },
        "alice".to_string(),
        fast_backoff(),
    );

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut events = Vec::new();
    loop {
        let polled = handle.poll();
        events.extend(polled.events);
        if polled.disconnected {
            break;
        }
        assert!(Instant::now() < deadline, "worker did not finish");
        thread::sleep(Duration::from_millis(5));
    }
    handle.join();

    assert_eq!(
        events,
        vec![FetchEvent::Error("invalid url: not a url".to_string())]
    );
}

#[test]
fn test_worker_delivers_done_through_queue() {
    let api = alice_catalog();
    let mut handle = worker::spawn_with(move || Ok(api), "alice".to_string(), fast_backoff());

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut events = Vec::new();
    loop {
        let polled = handle.poll();
        events.extend(polled.events);
        if polled.disconnected {
            break;
        }
        assert!(Instant::now() < deadline, "worker did not finish");
        thread::sleep(Duration::from_millis(5));
    }
    handle.join();

    assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    assert_eq!(done_rows(&events).len(), 3);
}
