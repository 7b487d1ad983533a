//! # Fetch Events
//!
//! The messages the fetch worker sends to the foreground, and the small state
//! machine the foreground folds them into.
//!
//! Events travel over a FIFO queue, so the foreground sees them in emission
//! order. Errors cross the thread boundary as text only: the foreground never
//! handles worker error types, it displays [`FetchEvent::Error`] payloads.

use crate::types::TrackRow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchEvent {
    /// Denominator for the progress display. Always at least 1.
    ProgressTotal(u64),
    /// Number of playlist items processed so far.
    Progress(u64),
    /// Informational status text (playlist count, rate-limit waits, ...).
    Message(String),
    /// Terminal success event carrying the sorted rows.
    Done(Vec<TrackRow>),
    /// Terminal failure event carrying the error description.
    Error(String),
}

impl FetchEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, FetchEvent::Done(_) | FetchEvent::Error(_))
    }
}

/// How a fetch run ended, as seen by the foreground.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Rows(Vec<TrackRow>),
    Failed(String),
    /// The worker stopped without a terminal event.
    Cancelled,
}

/// Foreground view of a running fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchStatus {
    total: u64,
    processed: u64,
    message: Option<String>,
    outcome: Option<FetchOutcome>,
}

impl FetchStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one event into the status. Events after a terminal event are
    /// ignored.
    pub fn apply(&mut self, event: FetchEvent) {
        if self.outcome.is_some() {
            return;
        }

        match event {
            FetchEvent::ProgressTotal(total) => {
                self.total = total.max(1);
                self.processed = 0;
                self.message = Some(format!("Processing… 0/{}", self.total));
            }
            FetchEvent::Progress(processed) => {
                self.processed = processed;
                self.message = Some(format!("Processing… {}/{}", self.position(), self.total));
            }
            FetchEvent::Message(text) => self.message = Some(text),
            FetchEvent::Done(rows) => {
                self.message = Some(format!("Parsed {} tracks.", rows.len()));
                self.processed = self.total;
                self.outcome = Some(FetchOutcome::Rows(rows));
            }
            FetchEvent::Error(text) => {
                self.message = Some("Error".to_string());
                self.outcome = Some(FetchOutcome::Failed(text));
            }
        }
    }

    /// Marks a worker that went away without a terminal event as cancelled.
    pub fn finish_without_result(&mut self) {
        if self.outcome.is_none() {
            self.outcome = Some(FetchOutcome::Cancelled);
        }
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Processed count clamped to the denominator. The reported totals can
    /// include tracks that are no longer yielded, and the display must not
    /// run past 100%.
    pub fn position(&self) -> u64 {
        if self.total == 0 {
            self.processed
        } else {
            self.processed.min(self.total)
        }
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn outcome(&self) -> Option<&FetchOutcome> {
        self.outcome.as_ref()
    }

    pub fn take_outcome(&mut self) -> Option<FetchOutcome> {
        self.outcome.take()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }
}
