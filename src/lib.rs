//! Spotifetchr Library
//!
//! This library fetches the public playlists created by a Spotify user,
//! flattens their tracks into rows, and offers deduplication, sorting and
//! spreadsheet export on top of the resulting row set.
//!
//! # Modules
//!
//! - `cancel` - Cooperative cancellation flag shared with the worker thread
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `dedup` - Duplicate track detection and resolution
//! - `events` - Progress events exchanged between worker and foreground
//! - `export` - Spreadsheet export
//! - `management` - Settings persistence and the session context
//! - `pipeline` - Paginated fetch with rate-limit backoff
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Sorting and parsing helpers
//! - `worker` - Background fetch thread and its message queue
//!
//! # Example
//!
//! ```
//! use spotifetchr::{config, management::Session};
//!
//! #[tokio::main]
//! async fn main() -> spotifetchr::Res<()> {
//!     config::load_env().await?;
//!     let session = Session::open().await;
//!     Ok(())
//! }
//! ```

pub mod cancel;
pub mod cli;
pub mod config;
pub mod dedup;
pub mod events;
pub mod export;
pub mod management;
pub mod pipeline;
pub mod spotify;
pub mod types;
pub mod utils;
pub mod worker;

/// A convenient Result type alias for operations that may fail.
///
/// Used by the command layer where errors of several kinds are only ever
/// displayed. Keeps `Send + Sync` bounds so values can cross into async
/// contexts.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// ```
/// info!("Fetching playlists for {}", user);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// ```
/// success!("Exported {} rows", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only used for fatal conditions in the command layer. Code after this
/// macro does not run.
///
/// ```
/// error!("Failed to load configuration");
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// ```
/// warning!("No duplicate tracks were found.");
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
