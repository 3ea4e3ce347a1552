//! # Spotify Integration Module
//!
//! This module provides the interface to the Spotify Web API used by spotai.
//! It handles the client-credentials authentication flow, HTTP communication,
//! rate limiting and error mapping.
//!
//! ## Architecture
//!
//! ```text
//! Application Layer (CLI, SpotifyAi)
//!          ↓
//! SpotifyApi trait
//!          ↓
//! SpotifyClient
//!     ├── Authentication (client credentials, cached token)
//!     ├── Recommendations
//!     ├── Track search
//!     └── Playlists (listing, details)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! Higher layers only depend on [`SpotifyApi`], so tests and alternative
//! backends can provide their own implementation.
//!
//! ## API Coverage
//!
//! - `POST /api/token` - Client credentials token
//! - `GET /recommendations` - Recommended tracks for seeds and audio features
//! - `GET /search` - Track search
//! - `GET /users/{user_id}/playlists` - Public playlists of a user
//! - `GET /playlists/{playlist_id}` - Playlist details and items
//!
//! ## Error Handling
//!
//! - **Rate Limiting**: `429` responses wait for `Retry-After` (up to 120 seconds)
//! - **Bad Gateway**: `502` responses are retried a few times
//! - **API Errors**: other non-success statuses carry Spotify's error message

pub mod auth;
pub mod client;

use std::fmt;

pub use auth::TokenManager;
pub use client::SpotifyClient;

use crate::{
    params::RecommendationParams,
    types::{PlaylistDetails, PlaylistSummary, RecommendationsResponse, Track},
};

#[derive(Debug)]
pub enum SpotifyError {
    Http(reqwest::Error),
    Auth(String),
    Api { status: u16, message: String },
    RateLimited { retry_after: u64 },
}

impl From<reqwest::Error> for SpotifyError {
    fn from(err: reqwest::Error) -> Self {
        SpotifyError::Http(err)
    }
}

impl fmt::Display for SpotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpotifyError::Http(e) => write!(f, "request to Spotify failed: {}", e),
            SpotifyError::Auth(e) => write!(f, "Spotify authentication failed: {}", e),
            SpotifyError::Api { status, message } => {
                write!(f, "Spotify API error {}: {}", status, message)
            }
            SpotifyError::RateLimited { retry_after } => write!(
                f,
                "rate limited by Spotify, retry after {} seconds",
                retry_after
            ),
        }
    }
}

impl std::error::Error for SpotifyError {}

/// The Spotify operations spotai relies on.
#[allow(async_fn_in_trait)]
pub trait SpotifyApi {
    async fn recommendations(
        &self,
        params: &RecommendationParams,
    ) -> Result<RecommendationsResponse, SpotifyError>;

    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, SpotifyError>;

    async fn user_playlists(&self, user_id: &str) -> Result<Vec<PlaylistSummary>, SpotifyError>;

    async fn playlist(&self, playlist_id: &str) -> Result<PlaylistDetails, SpotifyError>;
}
