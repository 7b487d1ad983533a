use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotifetchr::{
    cli, config,
    management::{FetchInput, Session},
    utils::SortColumn,
    warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    /// Print diagnostic logs (RUST_LOG overrides)
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Save Spotify client credentials
    Credentials(CredentialsOptions),

    /// Save the Spotify username to fetch by default
    Username(UsernameOptions),

    /// Show the saved settings
    Config,

    #[clap(about = "Fetch the tracks of a user's public playlists")]
    Fetch(FetchArgs),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct CredentialsOptions {
    /// Client ID of your Spotify app
    #[clap(long)]
    pub client_id: String,

    /// Client secret of your Spotify app
    #[clap(long)]
    pub client_secret: String,
}

#[derive(Parser, Debug, Clone)]
pub struct UsernameOptions {
    pub name: String,
}

#[derive(Parser, Debug, Clone)]
pub struct FetchArgs {
    /// Spotify username (defaults to the last one used)
    pub username: Option<String>,

    /// Client ID (overrides environment and saved settings)
    #[clap(long)]
    pub client_id: Option<String>,

    /// Client secret (overrides environment and saved settings)
    #[clap(long)]
    pub client_secret: Option<String>,

    /// Remove duplicate tracks after fetching
    #[clap(long)]
    pub dedup: bool,

    /// Show the rows removed by --dedup
    #[clap(long, requires = "dedup")]
    pub show_removed: bool,

    /// Sort by a single column
    #[clap(long, value_enum)]
    pub sort: Option<SortColumn>,

    /// Sort in descending order
    #[clap(long, requires = "sort")]
    pub descending: bool,

    /// Export the rows to an .xlsx file
    #[clap(long)]
    pub export: Option<PathBuf>,

    /// Browse the rows interactively after fetching
    #[clap(short, long)]
    pub interactive: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_logger(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment. Err: {}", e);
    }

    let mut session = Session::open().await;

    match cli.command {
        Command::Credentials(opt) => {
            cli::save_credentials(&mut session, &opt.client_id, &opt.client_secret).await
        }
        Command::Username(opt) => cli::save_username(&mut session, &opt.name).await,
        Command::Config => cli::show_config(&session),
        Command::Fetch(args) => {
            let opts = cli::FetchOptions {
                input: FetchInput {
                    user_id: args.username,
                    client_id: args.client_id.or_else(config::spotify_client_id),
                    client_secret: args.client_secret.or_else(config::spotify_client_secret),
                },
                dedup: args.dedup,
                show_removed: args.show_removed,
                sort: args.sort,
                descending: args.descending,
                export: args.export,
                interactive: args.interactive,
            };
            cli::fetch(&mut session, opts).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
