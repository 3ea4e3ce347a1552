//! # CLI Module
//!
//! This module provides the command-line interface layer for spotai. Each
//! function implements one branch of the `spotai` command: it checks the
//! configuration it needs, builds the clients, runs the query and prints the
//! result as a table.
//!
//! ## Command Categories
//!
//! ### Natural Language
//!
//! - [`natural_search`] - Tracks matching a free-text description
//! - [`genre_seeds`] - Genre seeds matching a free-text description
//!
//! ### Tracks
//!
//! - [`similar_tracks`] - Tracks similar to a given track ID
//! - [`search_track`] - Tracks matching a name
//!
//! ### Playlists
//!
//! - [`playlists`] - Playlists of the configured Spotify user
//! - [`playlist_details`] - One playlist with its tracks
//!
//! ## Error Handling
//!
//! Missing credentials are fatal and exit with code 1 before any request is
//! sent. Failures of the remote services are reported as warnings; the
//! command still completes.

mod natural;
mod playlists;
mod tracks;

pub use natural::genre_seeds;
pub use natural::natural_search;
pub use playlists::playlist_details;
pub use playlists::playlists;
pub use tracks::search_track;
pub use tracks::similar_tracks;

use crate::{
    config::Config,
    error,
    llm::OpenAiClient,
    spotify::SpotifyClient,
};

fn spotify_client(config: &Config) -> SpotifyClient {
    match config.spotify_credentials() {
        Ok(credentials) => SpotifyClient::new(credentials),
        Err(e) => error!("{}", e),
    }
}

fn llm_client(config: &Config) -> OpenAiClient {
    match config.llm_settings() {
        Ok(settings) => OpenAiClient::new(settings),
        Err(e) => error!("{}", e),
    }
}
