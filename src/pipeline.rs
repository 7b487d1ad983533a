//! # Fetch Pipeline
//!
//! Turns a username into a flat, sorted list of [`TrackRow`]s:
//!
//! 1. authenticate
//! 2. page through the user's public playlists
//! 3. keep the playlists the user owns (case-insensitive owner id match)
//! 4. page through each owned playlist's items and flatten them into rows
//! 5. sort by album, artist, title
//!
//! Progress is reported through [`FetchEvent`]s. Rate-limited calls wait for
//! the signaled delay in one-tick steps while watching the [`CancelFlag`],
//! then retry the same call. Any other API error ends the run.

use std::{sync::mpsc::Sender, thread, time::Duration};

use thiserror::Error;

use crate::{
    cancel::CancelFlag,
    events::FetchEvent,
    spotify::{ApiError, CatalogApi},
    types::{Playlist, TrackRow},
    utils,
};

/// A progress event is emitted at least every this many processed items.
pub const PROGRESS_EVERY: u64 = 20;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("fetch cancelled")]
    Cancelled,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Rate-limit wait configuration.
///
/// The signaled delay is counted in whole seconds and waited out one `tick`
/// per second, checking for cancellation before every tick.
#[derive(Debug, Clone)]
pub struct Backoff {
    pub tick: Duration,
    pub default_delay: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            default_delay: utils::DEFAULT_RETRY_AFTER,
        }
    }
}

impl Backoff {
    /// Delay for a `Retry-After` value, falling back to `default_delay`.
    pub fn delay_for(&self, retry_after: Option<&str>) -> Duration {
        utils::parse_retry_after(retry_after).unwrap_or(self.default_delay)
    }
}

/// Runs the pipeline and reports the result on `events`.
///
/// Emits [`FetchEvent::Done`] on success and [`FetchEvent::Error`] on a fatal
/// API error. A cancelled run returns without a terminal event.
pub fn run<A: CatalogApi>(
    api: &mut A,
    user_id: &str,
    events: &Sender<FetchEvent>,
    cancel: &CancelFlag,
    backoff: &Backoff,
) {
    let mut fetcher = Fetcher::new(api, events, cancel, backoff);
    match fetcher.fetch(user_id) {
        Ok(rows) => fetcher.emit(FetchEvent::Done(rows)),
        Err(FetchError::Cancelled) => log::debug!("fetch for {} cancelled", user_id),
        Err(FetchError::Api(e)) => {
            log::debug!("fetch for {} failed: {:?}", user_id, e);
            fetcher.emit(FetchEvent::Error(e.to_string()));
        }
    }
}

pub struct Fetcher<'a, A> {
    api: &'a mut A,
    events: &'a Sender<FetchEvent>,
    cancel: &'a CancelFlag,
    backoff: &'a Backoff,
}

impl<'a, A: CatalogApi> Fetcher<'a, A> {
    pub fn new(
        api: &'a mut A,
        events: &'a Sender<FetchEvent>,
        cancel: &'a CancelFlag,
        backoff: &'a Backoff,
    ) -> Self {
        Self {
            api,
            events,
            cancel,
            backoff,
        }
    }

    /// Fetches and sorts the rows of all playlists owned by `user_id`.
    ///
    /// Does not emit the terminal event; see [`run`].
    pub fn fetch(&mut self, user_id: &str) -> Result<Vec<TrackRow>, FetchError> {
        self.call(|api| api.authenticate())?;
        self.check_cancelled()?;

        let playlists: Vec<Playlist> = self
            .all_user_playlists(user_id)?
            .into_iter()
            .filter(|pl| pl.is_owned_by(user_id))
            .collect();

        if playlists.is_empty() {
            self.emit(FetchEvent::Message(format!(
                "No public playlists created by '{}' were found.",
                user_id
            )));
            return Ok(Vec::new());
        }

        let total = playlists
            .iter()
            .map(Playlist::track_total)
            .sum::<u64>()
            .max(1);
        self.emit(FetchEvent::ProgressTotal(total));

        let mut rows = Vec::new();
        let mut processed = 0u64;
        let mut reported = 0u64;

        for playlist in &playlists {
            self.check_cancelled()?;
            let name = playlist.display_name();
            log::debug!("fetching items of playlist {} ({})", name, playlist.id);

            let mut next: Option<String> = None;
            loop {
                let page = self.call(|api| api.playlist_items(&playlist.id, next.as_deref()))?;
                log::debug!(
                    "{}: {} items on page (total {:?})",
                    playlist.id,
                    page.items.len(),
                    page.total
                );

                for item in &page.items {
                    self.check_cancelled()?;
                    processed += 1;

                    let row = TrackRow::from_item(item, name);
                    let skipped = row.is_none();
                    rows.extend(row);

                    if skipped || processed % PROGRESS_EVERY == 0 || processed >= total {
                        self.emit(FetchEvent::Progress(processed.min(total)));
                        reported = processed;
                    }
                }

                if !page.has_next() {
                    break;
                }
                self.check_cancelled()?;
                next = page.next;
            }
        }

        // The last item may not have hit a reporting boundary when the
        // reported totals overestimate what was yielded.
        if processed != reported {
            self.emit(FetchEvent::Progress(processed.min(total)));
        }

        utils::sort_rows_default(&mut rows);
        Ok(rows)
    }

    fn all_user_playlists(&mut self, user_id: &str) -> Result<Vec<Playlist>, FetchError> {
        let mut playlists = Vec::new();
        let mut next: Option<String> = None;

        loop {
            let page = self.call(|api| api.user_playlists(user_id, next.as_deref()))?;
            log::debug!(
                "{}: {} playlists on page (total {:?})",
                user_id,
                page.items.len(),
                page.total
            );
            playlists.extend(page.items.iter().cloned());

            if !page.has_next() {
                break;
            }
            self.check_cancelled()?;
            next = page.next;
        }

        self.emit(FetchEvent::Message(format!(
            "Found {} playlists (before filtering by owner).",
            playlists.len()
        )));
        Ok(playlists)
    }

    /// Runs `op`, waiting out and retrying rate-limit errors until it
    /// succeeds, fails otherwise, or the run is cancelled.
    fn call<T>(
        &mut self,
        mut op: impl FnMut(&mut A) -> Result<T, ApiError>,
    ) -> Result<T, FetchError> {
        loop {
            self.check_cancelled()?;
            match op(&mut *self.api) {
                Ok(value) => return Ok(value),
                Err(ApiError::RateLimited { retry_after }) => {
                    let delay = self.backoff.delay_for(retry_after.as_deref());
                    self.wait(delay)?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn wait(&mut self, delay: Duration) -> Result<(), FetchError> {
        // At least one tick, so a zero Retry-After cannot spin the loop.
        let seconds = delay.as_secs().max(1);
        self.emit(FetchEvent::Message(format!(
            "Rate limited (429). Waiting {}s…",
            seconds
        )));
        log::debug!("backing off for {}s", seconds);

        for _ in 0..seconds {
            self.check_cancelled()?;
            thread::sleep(self.backoff.tick);
        }
        self.check_cancelled()
    }

    fn check_cancelled(&self) -> Result<(), FetchError> {
        if self.cancel.is_cancelled() {
            Err(FetchError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn emit(&self, event: FetchEvent) {
        // A closed queue means nobody is listening anymore; keep going and
        // let the cancellation flag stop the run.
        if self.events.send(event).is_err() {
            log::debug!("fetch event dropped, receiver is gone");
        }
    }
}
