//! Projection of API results into printable tables.
//!
//! Nothing here performs I/O; the CLI decides when and where to print.

use tabled::Table;

use crate::types::{PlaylistDetails, PlaylistSummary, PlaylistTableRow, Track, TrackTableRow};

/// Table row for one track.
///
/// Artists are joined with `", "`; a track without a Spotify URL gets an
/// empty URL column.
pub fn track_row(track: &Track) -> TrackTableRow {
    TrackTableRow {
        id: track.id.clone(),
        name: track.name.clone(),
        artists: track
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        url: track.external_urls.spotify.clone().unwrap_or_default(),
    }
}

pub fn track_rows(tracks: &[Track]) -> Vec<TrackTableRow> {
    tracks.iter().map(track_row).collect()
}

/// Renders tracks as a table with the columns ID, name, artists and URL.
///
/// # Example
///
/// ```rust,ignore
/// let tracks = spotify.search_tracks("Bohemian Rhapsody", 3).await?;
/// println!("{}", render::tracks_table(&tracks));
/// ```
pub fn tracks_table(tracks: &[Track]) -> String {
    Table::new(track_rows(tracks)).to_string()
}

/// Table rows for playlists. The owner column falls back to the owner's
/// user ID when no display name is set.
pub fn playlist_rows(playlists: &[PlaylistSummary]) -> Vec<PlaylistTableRow> {
    playlists
        .iter()
        .map(|p| PlaylistTableRow {
            id: p.id.clone(),
            name: p.name.clone(),
            owner: p
                .owner
                .display_name
                .clone()
                .unwrap_or_else(|| p.owner.id.clone()),
            tracks: p.tracks.total,
            url: p.external_urls.spotify.clone().unwrap_or_default(),
        })
        .collect()
}

/// Renders playlists as a table with the columns ID, name, owner, track
/// count and URL.
pub fn playlists_table(playlists: &[PlaylistSummary]) -> String {
    Table::new(playlist_rows(playlists)).to_string()
}

/// Tracks of a playlist that exist on Spotify.
///
/// Removed tracks (`"track": null`), local files (`is_local`, no ID) and
/// episodes without an ID are skipped.
pub fn playlist_tracks(details: &PlaylistDetails) -> Vec<Track> {
    details
        .tracks
        .items
        .iter()
        .filter_map(|item| item.track.as_ref())
        .filter(|track| !track.is_local && !track.id.is_empty())
        .cloned()
        .collect()
}
