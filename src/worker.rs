use std::{
    sync::mpsc::{self, Receiver, TryRecvError},
    thread::{self, JoinHandle},
};

use crate::{
    cancel::CancelFlag,
    config::Endpoints,
    events::FetchEvent,
    pipeline::{self, Backoff},
    spotify::{ApiError, CatalogApi, Credentials, SpotifyClient},
};

/// A validated fetch request: everything the worker needs, nothing shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub user_id: String,
    pub credentials: Credentials,
}

/// Events drained from the queue in one poll.
#[derive(Debug, Default)]
pub struct Polled {
    pub events: Vec<FetchEvent>,
    /// The worker dropped its end of the queue: no more events will come.
    pub disconnected: bool,
}

/// Foreground handle on a running fetch worker.
///
/// The queue (worker → foreground) and the cancellation flag (foreground →
/// worker) are the only state shared with the worker thread.
pub struct FetchHandle {
    receiver: Receiver<FetchEvent>,
    cancel: CancelFlag,
    join: Option<JoinHandle<()>>,
}

impl FetchHandle {
    /// Drains all queued events without blocking.
    pub fn poll(&self) -> Polled {
        let mut polled = Polled::default();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => polled.events.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    polled.disconnected = true;
                    break;
                }
            }
        }
        polled
    }

    /// Requests cooperative cancellation. The worker stops at its next check.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Blocks until the worker thread has exited. Only call once the queue
    /// reported `disconnected`, never from the polling loop while it runs.
    pub fn join(&mut self) {
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                log::warn!("fetch worker panicked");
            }
        }
    }
}

/// Starts the fetch worker against the Spotify Web API.
///
/// The HTTP client is built on the worker thread; a failure to build it is
/// reported as a [`FetchEvent::Error`] like any other fatal error.
pub fn spawn(request: FetchRequest, endpoints: Endpoints) -> FetchHandle {
    let credentials = request.credentials;
    spawn_with(
        move || SpotifyClient::new(endpoints, credentials),
        request.user_id,
        Backoff::default(),
    )
}

/// Starts the fetch worker with an API client built by `make_api` on the
/// worker thread.
pub fn spawn_with<A, F>(make_api: F, user_id: String, backoff: Backoff) -> FetchHandle
where
    A: CatalogApi,
    F: FnOnce() -> Result<A, ApiError> + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    let cancel = CancelFlag::new();
    let worker_cancel = cancel.clone();

    let join = thread::Builder::new()
        .name("fetch-worker".to_string())
        .spawn(move || match make_api() {
            Ok(mut api) => pipeline::run(&mut api, &user_id, &sender, &worker_cancel, &backoff),
            Err(e) => {
                let _ = sender.send(FetchEvent::Error(e.to_string()));
            }
        });

    let join = match join {
        Ok(join) => Some(join),
        Err(e) => {
            // Without a thread the receiver is disconnected right away; the
            // foreground sees the error and stops.
            log::warn!("failed to start fetch worker: {}", e);
            let (sender, receiver) = mpsc::channel();
            let _ = sender.send(FetchEvent::Error(format!("Failed to start worker: {}", e)));
            return FetchHandle {
                receiver,
                cancel,
                join: None,
            };
        }
    };

    FetchHandle {
        receiver,
        cancel,
        join,
    }
}
