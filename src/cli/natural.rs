use crate::{
    ai::{self, SpotifyAi},
    cli::{llm_client, spotify_client},
    config::Config,
    info, render, success, warning,
};

/// Finds tracks matching a free-text description and prints them.
///
/// Authenticates with Spotify first, so bad credentials are reported before
/// any language model request is paid for. The search itself is
/// [`SpotifyAi::natural_language_search`], including its bounded padding
/// rounds.
///
/// # Arguments
///
/// * `config` - Configuration with Spotify and OpenAI credentials
/// * `description` - Free-text description of the wanted music
/// * `limit` - Number of distinct tracks to find
/// * `print_results` - Print the track table after the summary line
///
/// # Error Handling
///
/// - **Missing credentials**: Terminate with error message
/// - **Authentication failure**: Warning, no search
/// - **Search failure**: Warning naming the cause, e.g. too few tracks found
///
/// # Example Usage
///
/// ```bash
/// spotai --natural-search --description "upbeat pop with strong bass" --N 10
/// ```
///
/// # Output Example
///
/// ```text
/// [o] Natural search with description: upbeat pop with strong bass
/// [✓] Found 10 tracks
/// ```
pub async fn natural_search(config: &Config, description: &str, limit: u32, print_results: bool) {
    let spotify = spotify_client(config);
    let llm = llm_client(config);

    // fail on bad credentials before spending model requests
    if let Err(e) = spotify.authenticate().await {
        warning!("{}", e);
        return;
    }

    let ai = SpotifyAi::new(spotify, llm);

    info!("Natural search with description: {}", description);

    match ai.natural_language_search(description, limit).await {
        Ok(tracks) => {
            success!("Found {} tracks", tracks.len());
            if print_results {
                println!("{}", render::tracks_table(&tracks));
            }
        }
        Err(e) => warning!("Natural search failed: {}", e),
    }
}

/// Prints the genre seeds matching a free-text description.
///
/// Only catalog genre seeds are printed, see [`ai::generate_genre_seeds`].
/// Requires OpenAI credentials; Spotify is not contacted.
///
/// ```bash
/// spotai --genre-seeds --description "melancholic indie with piano"
/// ```
pub async fn genre_seeds(config: &Config, description: &str) {
    let llm = llm_client(config);

    info!("Genre seeds for description: {}", description);

    let genres = ai::generate_genre_seeds(&llm, description).await;
    if genres.is_empty() {
        warning!("No matching genre seeds found");
        return;
    }

    success!("Genre seeds: {}", genres.join(", "));
}
