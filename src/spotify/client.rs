use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{
    config::SpotifyCredentials,
    debug,
    params::RecommendationParams,
    spotify::{SpotifyApi, SpotifyError, TokenManager},
    types::{
        Paging, PlaylistDetails, PlaylistItem, PlaylistSummary, RecommendationsResponse,
        SearchResponse, SpotifyErrorResponse, Track,
    },
    warning,
};

const MAX_RETRY_AFTER: u64 = 120;
const MAX_RATE_LIMIT_RETRIES: u32 = 5;
const MAX_BAD_GATEWAY_RETRIES: u32 = 3;
const BAD_GATEWAY_DELAY: Duration = Duration::from_secs(5);
const MAX_SEARCH_LIMIT: u32 = 50;
const PLAYLIST_PAGE_SIZE: u32 = 50;

/// HTTP client for the Spotify Web API using client credentials.
///
/// Every request goes through [`SpotifyClient::get_json`], which attaches a
/// cached access token and deals with rate limiting, flaky gateways and
/// expired tokens. The client implements [`SpotifyApi`], which is what the
/// rest of the crate depends on.
///
/// # Example
///
/// ```rust,ignore
/// let config = Config::from_env();
/// let spotify = SpotifyClient::new(config.spotify_credentials()?);
///
/// spotify.authenticate().await?;
/// let tracks = spotify.search_tracks("Bohemian Rhapsody", 5).await?;
/// ```
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    tokens: TokenManager,
    bad_gateway_delay: Duration,
}

impl SpotifyClient {
    /// Creates a client for the API and token endpoints in `credentials`.
    ///
    /// No request is sent until the first API call or [`authenticate`].
    ///
    /// [`authenticate`]: SpotifyClient::authenticate
    pub fn new(credentials: SpotifyCredentials) -> Self {
        SpotifyClient {
            http: Client::new(),
            tokens: TokenManager::new(&credentials),
            api_url: credentials.api_url,
            bad_gateway_delay: BAD_GATEWAY_DELAY,
        }
    }

    /// Overrides the pause before retrying a `502 Bad Gateway` response.
    pub fn with_bad_gateway_delay(mut self, delay: Duration) -> Self {
        self.bad_gateway_delay = delay;
        self
    }

    /// Requests a token right away so bad credentials surface early.
    ///
    /// # Returns
    ///
    /// - `Ok(())` - A valid token is cached
    /// - `Err(SpotifyError::Auth)` - The token endpoint rejected the credentials
    /// - `Err(SpotifyError::Http)` - The token endpoint could not be reached
    pub async fn authenticate(&self) -> Result<(), SpotifyError> {
        self.tokens.get_valid_token(&self.http).await.map(|_| ())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url, path.trim_start_matches('/'))
    }

    /// Sends an authenticated GET request and decodes the JSON body.
    ///
    /// # Arguments
    ///
    /// * `url` - Absolute URL, either built with `endpoint` or a `next` link
    /// * `query` - Query string pairs appended to the URL
    ///
    /// # Returns
    ///
    /// - `Ok(T)` - The decoded response body
    /// - `Err(SpotifyError::Api)` - Any other non-success status, carrying
    ///   Spotify's error message
    /// - `Err(SpotifyError::RateLimited)` - See below
    /// - `Err(SpotifyError::Http)` - Network or decoding failure
    ///
    /// # Rate Limiting
    ///
    /// - `429 Too Many Requests` waits for the `Retry-After` delay and retries
    /// - A delay above 120 seconds is not waited for and yields `RateLimited`
    /// - After 5 rate-limited retries the request gives up with `RateLimited`
    ///
    /// # Retries
    ///
    /// - `502 Bad Gateway` is retried at most 3 times, pausing in between
    /// - `401 Unauthorized` drops the cached token and retries once
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T, SpotifyError> {
        let mut rate_limit_retries = 0;
        let mut bad_gateway_retries = 0;
        let mut token_refreshed = false;

        loop {
            let token = self.tokens.get_valid_token(&self.http).await?;
            let response = self
                .http
                .get(url)
                .query(query)
                .bearer_auth(token)
                .send()
                .await?;

            match response.status() {
                status if status.is_success() => return Ok(response.json::<T>().await?),
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = retry_after_secs(&response);
                    if retry_after > MAX_RETRY_AFTER {
                        warning!(
                            "Retry after has reached an abnormal high of {} seconds.",
                            retry_after
                        );
                        return Err(SpotifyError::RateLimited { retry_after });
                    }
                    if rate_limit_retries >= MAX_RATE_LIMIT_RETRIES {
                        warning!(
                            "Still rate limited after {} retries, giving up.",
                            rate_limit_retries
                        );
                        return Err(SpotifyError::RateLimited { retry_after });
                    }
                    rate_limit_retries += 1;

                    debug!("Rate limited, retrying in {} seconds", retry_after);
                    sleep(Duration::from_secs(retry_after)).await;
                }
                StatusCode::BAD_GATEWAY if bad_gateway_retries < MAX_BAD_GATEWAY_RETRIES => {
                    bad_gateway_retries += 1;
                    debug!("Bad gateway, retry {}/{}", bad_gateway_retries, MAX_BAD_GATEWAY_RETRIES);
                    sleep(self.bad_gateway_delay).await;
                }
                StatusCode::UNAUTHORIZED if !token_refreshed => {
                    token_refreshed = true;
                    self.tokens.invalidate().await;
                }
                _ => return Err(api_error(response).await),
            }
        }
    }

    /// Follows `next` links until every page has been collected.
    async fn collect_pages<T: DeserializeOwned>(
        &self,
        first: Paging<T>,
    ) -> Result<Vec<T>, SpotifyError> {
        let mut items = first.items;
        let mut next = first.next;

        while let Some(url) = next {
            let page = self.get_json::<Paging<T>>(&url, &[]).await?;
            items.extend(page.items);
            next = page.next;
        }

        Ok(items)
    }
}

impl SpotifyApi for SpotifyClient {
    /// `GET /recommendations` with the query built by
    /// [`RecommendationParams::to_query`].
    async fn recommendations(
        &self,
        params: &RecommendationParams,
    ) -> Result<RecommendationsResponse, SpotifyError> {
        self.get_json(&self.endpoint("recommendations"), &params.to_query())
            .await
    }

    /// `GET /search?type=track`; `limit` is clamped to Spotify's 1..=50.
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<Track>, SpotifyError> {
        let query = vec![
            ("q".to_string(), query.to_string()),
            ("type".to_string(), "track".to_string()),
            (
                "limit".to_string(),
                limit.clamp(1, MAX_SEARCH_LIMIT).to_string(),
            ),
        ];

        let res = self
            .get_json::<SearchResponse>(&self.endpoint("search"), &query)
            .await?;

        Ok(res.tracks.items)
    }

    /// Every public playlist of `user_id`, following `next` links.
    async fn user_playlists(&self, user_id: &str) -> Result<Vec<PlaylistSummary>, SpotifyError> {
        let url = self.endpoint(&format!("users/{}/playlists", user_id));
        let query = vec![("limit".to_string(), PLAYLIST_PAGE_SIZE.to_string())];

        let first = self.get_json::<Paging<PlaylistSummary>>(&url, &query).await?;
        self.collect_pages(first).await
    }

    /// A playlist with all of its items; item pages beyond the first are
    /// fetched through `next` links and merged.
    async fn playlist(&self, playlist_id: &str) -> Result<PlaylistDetails, SpotifyError> {
        let url = self.endpoint(&format!("playlists/{}", playlist_id));
        let mut details = self.get_json::<PlaylistDetails>(&url, &[]).await?;

        if details.tracks.next.is_some() {
            let first = Paging::<PlaylistItem> {
                items: std::mem::take(&mut details.tracks.items),
                next: details.tracks.next.take(),
                total: details.tracks.total,
                limit: details.tracks.limit,
                offset: details.tracks.offset,
            };
            details.tracks.items = self.collect_pages(first).await?;
        }

        Ok(details)
    }
}

fn retry_after_secs(response: &Response) -> u64 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(1)
}

async fn api_error(response: Response) -> SpotifyError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<SpotifyErrorResponse>(&body) {
        Ok(err) if !err.error.message.is_empty() => err.error.message,
        _ if body.is_empty() => "no details provided".to_string(),
        _ => body,
    };

    SpotifyError::Api { status, message }
}
