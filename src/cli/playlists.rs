use crate::{
    cli::spotify_client,
    config::Config,
    error, info, render, spotify::SpotifyApi, success, utils, warning,
};

/// Prints the public playlists of the configured Spotify user.
///
/// The user comes from `SPOTIFY_USER_ID`; a missing user ID or missing
/// Spotify credentials terminate the program. All pages of the listing are
/// fetched before the table is printed.
///
/// # Example Usage
///
/// ```bash
/// spotai --get-playlists
/// ```
pub async fn playlists(config: &Config) {
    // check both before talking to Spotify
    let user_id = match config.spotify_user_id() {
        Ok(user_id) => user_id,
        Err(e) => error!("{}", e),
    };
    let spotify = spotify_client(config);

    let pb = utils::spinner("Fetching playlists...");
    let result = spotify.user_playlists(&user_id).await;
    pb.finish_and_clear();

    match result {
        Ok(playlists) if playlists.is_empty() => {
            info!("User {} has no public playlists", user_id)
        }
        Ok(playlists) => {
            success!("Found {} playlists", playlists.len());
            println!("{}", render::playlists_table(&playlists));
        }
        Err(e) => warning!("Failed to fetch playlists: {}", e),
    }
}

/// Prints a playlist's metadata followed by a table of its tracks.
///
/// # Arguments
///
/// * `config` - Configuration with Spotify credentials
/// * `playlist_id` - Spotify ID of the playlist
///
/// Removed tracks, local files and episodes are left out of the table,
/// see [`render::playlist_tracks`].
///
/// # Output Example
///
/// ```text
/// [o] Playlist: Morning Coffee
/// [o] Owner: spotify
/// [o] Followers: 1204
/// [o] URL: https://open.spotify.com/playlist/37i9dQZF1DX
/// ```
pub async fn playlist_details(config: &Config, playlist_id: &str) {
    let spotify = spotify_client(config);

    let pb = utils::spinner("Fetching playlist...");
    let result = spotify.playlist(playlist_id).await;
    pb.finish_and_clear();

    let details = match result {
        Ok(details) => details,
        Err(e) => {
            warning!("Failed to fetch playlist {}: {}", playlist_id, e);
            return;
        }
    };

    info!("Playlist: {}", details.name);
    info!(
        "Owner: {}",
        details
            .owner
            .display_name
            .as_deref()
            .unwrap_or(&details.owner.id)
    );
    if let Some(description) = details.description.as_deref().filter(|d| !d.is_empty()) {
        info!("Description: {}", description);
    }
    info!("Followers: {}", details.followers.total);
    if let Some(url) = &details.external_urls.spotify {
        info!("URL: {}", url);
    }

    let tracks = render::playlist_tracks(&details);
    if tracks.is_empty() {
        warning!("Playlist has no tracks");
        return;
    }

    println!("{}", render::tracks_table(&tracks));
}
