use std::{path::PathBuf, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    cli::browse,
    error,
    events::{FetchEvent, FetchOutcome, FetchStatus},
    info,
    management::{DedupReport, FetchInput, Session},
    success,
    types::TrackRow,
    utils::SortColumn,
    warning,
    worker::{self, FetchHandle},
};

/// How often the foreground drains the worker queue.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub input: FetchInput,
    pub dedup: bool,
    pub show_removed: bool,
    pub sort: Option<SortColumn>,
    pub descending: bool,
    pub export: Option<PathBuf>,
    pub interactive: bool,
}

pub async fn fetch(session: &mut Session, opts: FetchOptions) {
    let request = match session.resolve_fetch(opts.input) {
        Ok(request) => request,
        Err(e) => error!("{}", e),
    };

    if let Err(e) = session.remember(&request).await {
        warning!("Failed to save config: {}", e);
    }

    session.clear_rows();
    info!("Authenticating…");

    let handle = worker::spawn(request, session.endpoints().clone());
    match watch(handle).await {
        FetchOutcome::Rows(rows) => session.replace_rows(rows),
        FetchOutcome::Failed(text) => error!("{}", text),
        FetchOutcome::Cancelled => {
            warning!("Fetch cancelled.");
            return;
        }
    }

    if opts.dedup {
        remove_duplicates(session, opts.show_removed);
    }

    if let Some(column) = opts.sort {
        session.set_sort(column, opts.descending);
    }

    if !session.rows().is_empty() {
        print_rows(session.rows());
    }
    info!("Tracks: {}", session.rows().len());

    if let Some(path) = opts.export {
        export(session, &path);
    }

    if opts.interactive {
        browse::browse(session).await;
    }
}

/// Foreground loop: drains the worker queue on a fixed interval, renders
/// progress, and turns Ctrl-C into a cancellation request. Never blocks on
/// the worker.
pub async fn watch(mut handle: FetchHandle) -> FetchOutcome {
    let pb = progress_bar();
    let mut status = FetchStatus::new();
    let mut ticker = tokio::time::interval(POLL_INTERVAL);

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                if handle.is_cancelled() {
                    // second Ctrl-C: stop waiting for an in-flight request
                    pb.finish_and_clear();
                    std::process::exit(130);
                }
                handle.cancel();
                pb.set_message("Cancelling…");
            }
            _ = ticker.tick() => {
                let polled = handle.poll();
                for event in polled.events {
                    if let FetchEvent::Message(text) = &event {
                        pb.suspend(|| info!("{}", text));
                    }
                    status.apply(event);
                    render(&pb, &status);
                }

                if status.is_finished() {
                    break;
                }
                if polled.disconnected {
                    handle.join();
                    status.finish_without_result();
                    break;
                }
            }
        }
    }

    pb.finish_and_clear();
    status.take_outcome().unwrap_or(FetchOutcome::Cancelled)
}

fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::with_template("{bar:40.green/black} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb
}

fn render(pb: &ProgressBar, status: &FetchStatus) {
    pb.set_length(status.total());
    pb.set_position(status.position());
    if let Some(message) = status.message() {
        pb.set_message(message.to_string());
    }
}

pub fn print_rows(rows: &[TrackRow]) {
    println!("{}", Table::new(rows));
}

pub fn remove_duplicates(session: &mut Session, show_removed: bool) {
    match session.remove_duplicates() {
        DedupReport::NoData => info!("There is no data to process."),
        DedupReport::NoDuplicates => info!("No duplicate tracks were found."),
        DedupReport::Removed(count) => {
            success!(
                "Successfully removed {} duplicate track{}!",
                count,
                if count == 1 { "" } else { "s" }
            );
            if show_removed {
                print_rows(session.removed());
            }
        }
    }
}

pub fn export(session: &Session, path: &std::path::Path) {
    match session.export(path) {
        Ok(written) => success!(
            "Exported {} rows to: {}",
            session.rows().len(),
            written.display()
        ),
        Err(e) => warning!("{}", e),
    }
}
