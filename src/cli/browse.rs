use std::{io::Write, path::PathBuf, str::FromStr};

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    cli::fetch::{export, print_rows, remove_duplicates},
    info,
    management::Session,
    utils::SortColumn,
    warning,
};

/// One line typed at the browse prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    List,
    Sort(SortColumn),
    Dedup,
    Removed,
    Export(PathBuf),
    Count,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ParseCommandError(String);

impl FromStr for BrowseCommand {
    type Err = ParseCommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let line = s.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "list" | "ls" => Ok(BrowseCommand::List),
            "sort" => {
                if rest.is_empty() {
                    return Err(ParseCommandError(
                        "Usage: sort <artist|title|album|playlist>".to_string(),
                    ));
                }
                rest.parse().map(BrowseCommand::Sort).map_err(ParseCommandError)
            }
            "dedup" => Ok(BrowseCommand::Dedup),
            "removed" => Ok(BrowseCommand::Removed),
            "export" => {
                if rest.is_empty() {
                    return Err(ParseCommandError("Usage: export <path>".to_string()));
                }
                Ok(BrowseCommand::Export(PathBuf::from(rest)))
            }
            "count" => Ok(BrowseCommand::Count),
            "help" | "?" => Ok(BrowseCommand::Help),
            "quit" | "exit" | "q" => Ok(BrowseCommand::Quit),
            "" => Err(ParseCommandError(String::new())),
            other => Err(ParseCommandError(format!(
                "Unknown command '{}'. Type 'help' for a list of commands.",
                other
            ))),
        }
    }
}

const HELP: &str = "\
Commands:
  list                 show the current rows
  sort <column>        sort by artist, title, album or playlist
                       (again on the same column flips the direction)
  dedup                remove duplicate tracks
  removed              show the rows removed by the last dedup
  export <path>        write the rows to an .xlsx file
  count                show the number of rows
  help                 show this help
  quit                 leave browse mode (also Ctrl-C)";

/// Interactive prompt over the current row set. Returns on `quit`, Ctrl-C or
/// end of input.
pub async fn browse(session: &mut Session) {
    info!("Browse mode. Type 'help' for a list of commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        let read = tokio::select! {
            read = lines.next_line() => read,
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        };
        let line = match read {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warning!("Failed to read input: {}", e);
                break;
            }
        };

        let command = match line.parse::<BrowseCommand>() {
            Ok(command) => command,
            Err(e) => {
                if !e.0.is_empty() {
                    warning!("{}", e);
                }
                continue;
            }
        };

        if !run(session, command) {
            break;
        }
    }
}

/// Executes one command. Returns `false` when browsing should stop.
fn run(session: &mut Session, command: BrowseCommand) -> bool {
    match command {
        BrowseCommand::List => {
            if session.rows().is_empty() {
                info!("There is no data to show.");
            } else {
                print_rows(session.rows());
            }
        }
        BrowseCommand::Sort(column) => {
            let state = session.sort_by(column);
            print_rows(session.rows());
            info!(
                "Sorted by {} ({})",
                state.column,
                if state.descending {
                    "descending"
                } else {
                    "ascending"
                }
            );
        }
        BrowseCommand::Dedup => remove_duplicates(session, false),
        BrowseCommand::Removed => {
            if session.removed().is_empty() {
                info!("No rows have been removed.");
            } else {
                print_rows(session.removed());
            }
        }
        BrowseCommand::Export(path) => export(session, &path),
        BrowseCommand::Count => info!("Tracks: {}", session.rows().len()),
        BrowseCommand::Help => println!("{}", HELP),
        BrowseCommand::Quit => return false,
    }
    true
}
