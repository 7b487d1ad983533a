//! # CLI Module
//!
//! The command layer of Spotifetchr. Each command resolves its inputs against
//! the [`Session`](crate::management::Session), delegates to the management,
//! worker and export layers, and presents the result with the terminal
//! macros, `tabled` tables and an `indicatif` progress bar.
//!
//! ## Commands
//!
//! - [`save_credentials`] - Stores client id and secret in the settings file
//! - [`save_username`] - Stores the last used Spotify username
//! - [`show_config`] - Prints the settings file and endpoints in a table
//! - [`fetch`] - Runs a fetch in the background and reports progress
//! - [`browse`] - Interactive prompt for sorting, deduplicating and exporting
//!
//! ## Fetch flow
//!
//! ```text
//! resolve inputs ──► persist settings ──► spawn worker
//!                                             │ events (FIFO)
//!                                             ▼
//!                    poll every 100 ms ◄── progress / message / done / error
//!                          │
//!                          ▼
//!       dedup ──► sort ──► table ──► export ──► browse
//! ```
//!
//! Ctrl-C during a fetch sets the cancellation flag; the worker stops at its
//! next check and the run produces no rows. A second Ctrl-C exits at once.
//!
//! ## Usage
//!
//! ```bash
//! spotifetchr credentials --client-id <ID> --client-secret <SECRET>
//! spotifetchr fetch alice --dedup --export tracks.xlsx
//! spotifetchr fetch --interactive
//! ```

mod browse;
mod credentials;
mod fetch;

pub use browse::BrowseCommand;
pub use browse::browse;
pub use credentials::save_credentials;
pub use credentials::save_username;
pub use credentials::show_config;
pub use fetch::FetchOptions;
pub use fetch::POLL_INTERVAL;
pub use fetch::fetch;
pub use fetch::watch;
