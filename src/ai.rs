//! Natural-language track search on top of the Spotify recommendations
//! endpoint.
//!
//! [`SpotifyAi`] asks a language model to translate a free-text description
//! into [`RecommendationParams`], queries Spotify with them and pads the
//! result with further rounds until enough distinct tracks were found.

use std::{collections::HashSet, fmt};

use crate::{
    debug, genres,
    llm::{CompletionModel, MUSIC_ANALYST_PROMPT, ObjectRequest},
    params::{RecommendationParams, schema},
    spotify::{SpotifyApi, SpotifyError},
    types::{GenreSuggestions, Track},
    warning,
};

pub const DEFAULT_LIMIT: u32 = 5;

/// Upper bound on re-synthesis rounds after the initial request.
pub const MAX_PADDING_ATTEMPTS: u32 = 10;

#[derive(Debug)]
pub enum SearchError {
    /// The language model did not produce usable parameters.
    ParamsUnavailable,
    /// The initial recommendations request failed.
    Spotify(SpotifyError),
    /// The padding rounds were exhausted before `requested` tracks were found.
    InsufficientResults {
        found: usize,
        requested: usize,
        attempts: u32,
    },
}

impl From<SpotifyError> for SearchError {
    fn from(err: SpotifyError) -> Self {
        SearchError::Spotify(err)
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::ParamsUnavailable => {
                write!(f, "failed to generate recommendation parameters")
            }
            SearchError::Spotify(e) => write!(f, "{}", e),
            SearchError::InsufficientResults {
                found,
                requested,
                attempts,
            } => write!(
                f,
                "found only {} of {} requested tracks after {} additional attempts",
                found, requested, attempts
            ),
        }
    }
}

impl std::error::Error for SearchError {}

/// Natural-language front end for the Spotify recommendations endpoint.
///
/// Combines a [`SpotifyApi`] backend with a [`CompletionModel`]. Both are
/// generic so tests and alternative backends can plug in their own
/// implementation.
///
/// # Example
///
/// ```rust,ignore
/// let config = Config::from_env();
/// let spotify = SpotifyClient::new(config.spotify_credentials()?);
/// let llm = OpenAiClient::new(config.llm_settings()?);
///
/// let ai = SpotifyAi::new(spotify, llm);
/// let tracks = ai
///     .natural_language_search("upbeat pop with strong bass", 5)
///     .await?;
/// ```
pub struct SpotifyAi<S, L> {
    spotify: S,
    llm: L,
    max_padding_attempts: u32,
}

impl<S: SpotifyApi, L: CompletionModel> SpotifyAi<S, L> {
    /// Creates the agent with the default bound of
    /// [`MAX_PADDING_ATTEMPTS`] padding rounds.
    pub fn new(spotify: S, llm: L) -> Self {
        SpotifyAi {
            spotify,
            llm,
            max_padding_attempts: MAX_PADDING_ATTEMPTS,
        }
    }

    /// Overrides how many padding rounds [`natural_language_search`] may run
    /// after the initial request. `0` disables padding.
    ///
    /// [`natural_language_search`]: SpotifyAi::natural_language_search
    pub fn with_max_padding_attempts(mut self, attempts: u32) -> Self {
        self.max_padding_attempts = attempts;
        self
    }

    pub fn spotify(&self) -> &S {
        &self.spotify
    }

    pub fn llm(&self) -> &L {
        &self.llm
    }

    /// Asks the language model for recommendation parameters matching
    /// `description`.
    ///
    /// The request carries the music analyst system prompt and the
    /// `RecommendationsParams` schema, and the response is validated with
    /// [`RecommendationParams::from_llm_value`].
    ///
    /// # Returns
    ///
    /// - `Some(params)` - Every audio feature bound is present and in range,
    ///   with one to five catalog genres
    /// - `None` - Empty description (no request is sent), request error,
    ///   unparsable output or a response that does not satisfy the schema
    ///
    /// Failures are logged as warnings, never retried.
    pub async fn generate_recommendation_params(
        &self,
        description: &str,
    ) -> Option<RecommendationParams> {
        let description = description.trim();
        if description.is_empty() {
            warning!("Cannot generate recommendation parameters for an empty description");
            return None;
        }

        let request = ObjectRequest {
            schema_name: schema::RECOMMENDATION_PARAMS_SCHEMA,
            schema: schema::recommendation_params(),
            system: MUSIC_ANALYST_PROMPT,
            prompt: format!(
                "Generate recommendation parameters for the description \"{}\"",
                description
            ),
        };

        let value = match self.llm.generate_object(request).await {
            Ok(value) => value,
            Err(e) => {
                warning!("Generation of recommendation parameters failed: {}", e);
                return None;
            }
        };

        match RecommendationParams::from_llm_value(&value) {
            Ok(params) => Some(params),
            Err(e) => {
                warning!("Recommendation parameters do not match the schema: {}", e);
                debug!("Rejected response: {}", value);
                None
            }
        }
    }

    /// Suggests genre seeds for `description`, see [`generate_genre_seeds`].
    pub async fn generate_genre_seeds(&self, description: &str) -> Vec<String> {
        generate_genre_seeds(&self.llm, description).await
    }

    /// Finds `limit` distinct tracks matching a free-text description.
    ///
    /// # Arguments
    ///
    /// * `description` - Free-text description, e.g. "upbeat pop with strong bass"
    /// * `limit` - Number of tracks wanted; `0` is treated as `1`
    ///
    /// # Returns
    ///
    /// - `Ok(tracks)` - Exactly `limit` distinct tracks
    /// - `Err(SearchError::ParamsUnavailable)` - The first parameter synthesis failed
    /// - `Err(SearchError::Spotify)` - The first recommendations request failed
    /// - `Err(SearchError::InsufficientResults)` - The padding rounds ran out
    ///   before `limit` distinct tracks were found
    ///
    /// # Padding
    ///
    /// Spotify often returns fewer tracks than asked for, and at most 100 per
    /// request. While fewer than `limit` distinct tracks were collected,
    /// parameters are regenerated and Spotify is queried again:
    /// - each round costs one of the bounded attempts, successful or not
    /// - a failed synthesis or request is logged and the loop moves on
    /// - tracks are deduplicated by `(id, name)`, keeping the first occurrence
    ///
    /// Nothing is printed besides warnings; rendering is up to the caller.
    pub async fn natural_language_search(
        &self,
        description: &str,
        limit: u32,
    ) -> Result<Vec<Track>, SearchError> {
        let requested = limit.max(1);
        let target = requested as usize;

        let mut params = self
            .generate_recommendation_params(description)
            .await
            .ok_or(SearchError::ParamsUnavailable)?;
        params.set_limit(requested);
        debug!("Recommendations params: {}", params.to_value());

        let first = self.spotify.recommendations(&params).await?;
        let mut tracks = dedup_tracks(first.tracks);

        let mut attempts = 0;
        while tracks.len() < target {
            if attempts >= self.max_padding_attempts {
                return Err(SearchError::InsufficientResults {
                    found: tracks.len(),
                    requested: target,
                    attempts,
                });
            }
            attempts += 1;

            debug!(
                "Found {} of {} tracks, searching for more ({}/{})",
                tracks.len(),
                target,
                attempts,
                self.max_padding_attempts
            );

            let Some(mut params) = self.generate_recommendation_params(description).await else {
                continue;
            };
            params.set_limit(requested);

            match self.spotify.recommendations(&params).await {
                Ok(res) => {
                    tracks.extend(res.tracks);
                    tracks = dedup_tracks(tracks);
                }
                Err(e) => warning!("Recommendations request failed: {}", e),
            }
        }

        tracks.truncate(target);
        Ok(tracks)
    }
}

/// Suggests genre seeds for `description`.
///
/// The model is shown the full genre seed catalog, but its answer is still
/// filtered with [`genres::filter_genre_seeds`]: the result only ever holds
/// catalog entries, lowercased and without duplicates.
///
/// # Returns
///
/// The matching genre seeds in the order suggested. An empty description,
/// a failed request or a response without a `genres` list yields an empty
/// list; failures are logged as warnings.
pub async fn generate_genre_seeds<L: CompletionModel>(llm: &L, description: &str) -> Vec<String> {
    let description = description.trim();
    if description.is_empty() {
        return Vec::new();
    }

    let request = ObjectRequest {
        schema_name: schema::GENRE_SEEDS_SCHEMA,
        schema: schema::genre_seeds(),
        system: MUSIC_ANALYST_PROMPT,
        prompt: format!(
            "Suggest Spotify genre seeds for the description \"{}\". Choose only from: {}",
            description,
            genres::GENRE_SEEDS.join(", ")
        ),
    };

    let value = match llm.generate_object(request).await {
        Ok(value) => value,
        Err(e) => {
            warning!("Generation of genre seeds failed: {}", e);
            return Vec::new();
        }
    };

    match serde_json::from_value::<GenreSuggestions>(value) {
        Ok(suggestions) => genres::filter_genre_seeds(suggestions.genres),
        Err(e) => {
            warning!("Genre seeds do not match the schema: {}", e);
            Vec::new()
        }
    }
}

/// Tracks similar to the given track.
///
/// # Arguments
///
/// * `spotify` - Spotify backend
/// * `track_id` - Spotify ID of the seed track
/// * `limit` - Number of tracks to request, clamped to Spotify's 1..=100
///
/// # Returns
///
/// The recommended tracks, deduplicated. Spotify may return fewer than
/// `limit`; no padding is done here.
pub async fn similar_tracks<S: SpotifyApi>(
    spotify: &S,
    track_id: &str,
    limit: u32,
) -> Result<Vec<Track>, SpotifyError> {
    let mut params = RecommendationParams::for_track(track_id);
    params.set_limit(limit);

    let res = spotify.recommendations(&params).await?;
    Ok(dedup_tracks(res.tracks))
}

/// Removes repeated tracks, keeping the first occurrence of each
/// `(id, name)` pair.
pub fn dedup_tracks(tracks: Vec<Track>) -> Vec<Track> {
    let mut seen = HashSet::new();
    tracks
        .into_iter()
        .filter(|t| seen.insert((t.id.clone(), t.name.clone())))
        .collect()
}
