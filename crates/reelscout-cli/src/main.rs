use clap::{ArgAction, Parser, Subcommand};
use commands::{auth, browse, config, details, explore, search};
use reelscout_models::{MediaKind, SortOrder};

mod boundary;
mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "reelscout")]
#[command(about = "ReelScout - Discover movies and TV series from your terminal")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse popular titles with optional filters
    #[command(long_about = "Show the popular feed for movies or TV series. Filters narrow the feed; --pages keeps scrolling past the first page the same way the infinite-scroll trigger does.")]
    Browse {
        /// movie or series
        #[arg(long, default_value = "movie")]
        kind: MediaKind,

        /// Genre id (see `reelscout genres`)
        #[arg(long)]
        genre: Option<u32>,

        /// Release year (first air year for series)
        #[arg(long)]
        year: Option<i32>,

        /// Minimum average rating
        #[arg(long)]
        min_rating: Option<f32>,

        /// popularity.desc, vote_average.desc, release_date.desc, title.asc, ...
        #[arg(long, default_value = "popularity.desc")]
        sort: SortOrder,

        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Search titles by name
    Search {
        text: String,

        #[arg(long, default_value = "movie")]
        kind: MediaKind,
    },
    /// Show type-ahead suggestions for partial input
    Suggest {
        text: String,

        #[arg(long, default_value = "movie")]
        kind: MediaKind,
    },
    /// Show full details for one title
    Details {
        kind: MediaKind,
        id: u64,
    },
    /// List genres and their ids
    Genres {
        #[arg(long, default_value = "movie")]
        kind: MediaKind,
    },
    /// Interactive explorer: type to search, commands to filter and scroll
    #[command(long_about = "Line-driven explorer over the live feed. Plain lines are treated as the contents of the search box; lines starting with ':' are commands. Type :help inside for the list.")]
    Explore {
        #[arg(long, default_value = "movie")]
        kind: MediaKind,
    },
    /// Start a session
    Login {
        /// User name (if not provided, will prompt)
        #[arg(long)]
        user: Option<String>,

        /// Session token (if not provided, will prompt)
        #[arg(long)]
        token: Option<String>,
    },
    /// End the current session
    Logout,
    /// Show the logged-in user's dashboard
    #[command(alias = "dashboard")]
    Whoami,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the full API key
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },
    /// Store the TMDB API key
    SetKey {
        /// API key (if not provided, will prompt)
        key: Option<String>,
    },
    /// Write a default configuration file, prompting for the common settings
    Init,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let settings = config::load_config()?;
    logging::init_logging(cli.verbose, cli.quiet, &settings.logging)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Browse {
            kind,
            genre,
            year,
            min_rating,
            sort,
            pages,
        } => {
            let filters = browse::BrowseFilters {
                genre,
                year,
                min_rating,
                sort,
            };
            browse::run_browse(&settings, kind, filters, pages, &output).await
        }
        Commands::Search { text, kind } => search::run_search(&settings, kind, &text, &output).await,
        Commands::Suggest { text, kind } => search::run_suggest(&settings, kind, &text, &output).await,
        Commands::Details { kind, id } => details::run_details(&settings, kind, id, &output).await,
        Commands::Genres { kind } => browse::run_genres(&settings, kind, &output).await,
        Commands::Explore { kind } => explore::run_explore(&settings, kind, &output).await,
        Commands::Login { user, token } => auth::run_login(user, token, &output),
        Commands::Logout => auth::run_logout(&output),
        Commands::Whoami => auth::run_dashboard(&output),
        Commands::Config { cmd } => config::run_config(cmd, settings, &output),
    }
}
