use clap::{
    ArgGroup, CommandFactory, Parser,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotai::{ai::DEFAULT_LIMIT, cli, config, error, utils, warning};

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
#[command(group(
    ArgGroup::new("mode").args([
        "natural_search",
        "genre_seeds",
        "get_similar",
        "search_track",
        "get_playlists",
        "get_playlist_details",
        "completions",
    ])
))]
struct Cli {
    /// Search tracks by a natural-language description (-ns)
    #[clap(long)]
    natural_search: bool,

    /// Description used by natural search and genre seeds
    #[clap(long)]
    description: Option<String>,

    /// Number of results
    #[clap(long = "N", value_name = "N", value_parser = utils::parse_count, default_value_t = DEFAULT_LIMIT)]
    count: u32,

    /// Get N similar tracks for the track given with --track-id
    #[clap(long)]
    get_similar: bool,

    /// Spotify track ID for --get-similar
    #[clap(long, visible_alias = "trackId")]
    track_id: Option<String>,

    /// Search tracks by name and show N results
    #[clap(long, value_name = "NAME")]
    search_track: Option<String>,

    /// Suggest Spotify genre seeds for --description
    #[clap(long)]
    genre_seeds: bool,

    /// List the playlists of SPOTIFY_USER_ID
    #[clap(long)]
    get_playlists: bool,

    /// Show a single playlist with its tracks
    #[clap(long, value_name = "PLAYLIST_ID")]
    get_playlist_details: Option<String>,

    /// Print verbose diagnostics
    #[clap(long)]
    verbose: bool,

    /// Print shell completions
    #[clap(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse_from(utils::normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    spotai::set_verbose(cli.verbose);

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let description = cli
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());

    // argument checks come before any configuration or network access
    if (cli.natural_search || cli.genre_seeds) && description.is_none() {
        error!("Description is required for natural search. Pass it with --description.");
    }
    if cli.get_similar && cli.track_id.is_none() {
        error!("Track ID is required for similar tracks. Pass it with --track-id.");
    }

    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment. Err: {}", e);
    }
    let config = config::Config::from_env();

    match (&cli, description) {
        (Cli { natural_search: true, .. }, Some(description)) => {
            cli::natural_search(&config, description, cli.count, true).await
        }
        (Cli { genre_seeds: true, .. }, Some(description)) => {
            cli::genre_seeds(&config, description).await
        }
        (Cli { get_similar: true, track_id: Some(track_id), .. }, _) => {
            cli::similar_tracks(&config, track_id, cli.count).await
        }
        (Cli { search_track: Some(name), .. }, _) => {
            cli::search_track(&config, name, cli.count).await
        }
        (Cli { get_playlists: true, .. }, _) => cli::playlists(&config).await,
        (Cli { get_playlist_details: Some(id), .. }, _) => {
            cli::playlist_details(&config, id).await
        }
        _ => {
            let _ = Cli::command().print_help();
        }
    }
}
