use crate::{
    ai,
    cli::spotify_client,
    config::Config,
    info, render, spotify::SpotifyApi, success, utils, warning,
};

/// Prints tracks similar to a given track.
///
/// # Arguments
///
/// * `config` - Configuration with Spotify credentials
/// * `track_id` - Spotify ID of the seed track
/// * `limit` - Number of tracks to request
///
/// Spotify may return fewer tracks than requested; unlike natural search
/// this command does not pad the result. An empty result is a warning.
///
/// # Example Usage
///
/// ```bash
/// spotai --get-similar --track-id 4uLU6hMCjMI75M1A2tKUQC --N 10
/// ```
pub async fn similar_tracks(config: &Config, track_id: &str, limit: u32) {
    let spotify = spotify_client(config);

    info!("Get {} similar tracks for track ID: {}", limit, track_id);

    let pb = utils::spinner("Fetching similar tracks...");
    let result = ai::similar_tracks(&spotify, track_id, limit).await;
    pb.finish_and_clear();

    match result {
        Ok(tracks) if tracks.is_empty() => warning!("No similar tracks found"),
        Ok(tracks) => {
            success!("Found {} similar tracks", tracks.len());
            println!("{}", render::tracks_table(&tracks));
        }
        Err(e) => warning!("Failed to fetch similar tracks: {}", e),
    }
}

/// Prints up to `limit` tracks whose name matches `name`.
pub async fn search_track(config: &Config, name: &str, limit: u32) {
    let spotify = spotify_client(config);

    info!("Search for track: {}", name);

    let pb = utils::spinner("Searching tracks...");
    let result = spotify.search_tracks(name, limit).await;
    pb.finish_and_clear();

    match result {
        Ok(tracks) if tracks.is_empty() => warning!("No tracks found for '{}'", name),
        Ok(tracks) => println!("{}", render::tracks_table(&tracks)),
        Err(e) => warning!("Failed to search tracks: {}", e),
    }
}
