use std::{collections::VecDeque, sync::Mutex};

use serde_json::{Map, Value, json};
use spotai::ai::{
    MAX_PADDING_ATTEMPTS, SearchError, SpotifyAi, dedup_tracks, generate_genre_seeds,
    similar_tracks,
};
use spotai::genres::GENRE_SEEDS;
use spotai::llm::{CompletionModel, LlmError, MUSIC_ANALYST_PROMPT, ObjectRequest};
use spotai::params::{RecommendationParams, schema::AUDIO_FEATURES};
use spotai::spotify::{SpotifyApi, SpotifyError};
use spotai::types::{PlaylistDetails, PlaylistSummary, RecommendationsResponse, Track};

fn track(id: &str) -> Track {
    serde_json::from_value(json!({
        "id": id,
        "name": format!("Song {}", id),
        "artists": [{ "name": "Artist" }],
    }))
    .unwrap()
}

fn tracks(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| track(id)).collect()
}

fn ids(tracks: &[Track]) -> Vec<&str> {
    tracks.iter().map(|t| t.id.as_str()).collect()
}

fn valid_params() -> Value {
    let mut map = Map::new();
    map.insert("seed_genres".into(), json!(["pop", "dance"]));
    map.insert("market".into(), json!("US"));
    for feature in AUDIO_FEATURES {
        let lower = feature.lower.unwrap_or(-20.0);
        let upper = feature.upper.unwrap_or(lower + 200.0);
        map.insert(feature.field("min"), json!(lower));
        map.insert(feature.field("max"), json!(upper));
        map.insert(feature.field("target"), json!(upper));
    }
    Value::Object(map)
}

// Answers queued responses first, then valid recommendation parameters
#[derive(Default)]
struct FakeLlm {
    responses: Mutex<VecDeque<Result<Value, LlmError>>>,
    requests: Mutex<Vec<(String, String, String)>>,
}

impl FakeLlm {
    fn with(responses: Vec<Result<Value, LlmError>>) -> Self {
        FakeLlm {
            responses: Mutex::new(responses.into()),
            ..Default::default()
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl CompletionModel for FakeLlm {
    async fn generate_object(&self, request: ObjectRequest<'_>) -> Result<Value, LlmError> {
        self.requests.lock().unwrap().push((
            request.schema_name.to_string(),
            request.system.to_string(),
            request.prompt.clone(),
        ));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(valid_params()))
    }
}

// Answers queued recommendation rounds, then empty rounds
#[derive(Default)]
struct FakeSpotify {
    rounds: Mutex<VecDeque<Result<Vec<Track>, SpotifyError>>>,
    requests: Mutex<Vec<RecommendationParams>>,
}

impl FakeSpotify {
    fn with(rounds: Vec<Result<Vec<Track>, SpotifyError>>) -> Self {
        FakeSpotify {
            rounds: Mutex::new(rounds.into()),
            ..Default::default()
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn limits(&self) -> Vec<Option<u32>> {
        self.requests.lock().unwrap().iter().map(|p| p.limit).collect()
    }
}

impl SpotifyApi for FakeSpotify {
    async fn recommendations(
        &self,
        params: &RecommendationParams,
    ) -> Result<RecommendationsResponse, SpotifyError> {
        self.requests.lock().unwrap().push(params.clone());
        let tracks = self
            .rounds
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))?;
        Ok(RecommendationsResponse {
            seeds: Vec::new(),
            tracks,
        })
    }

    async fn search_tracks(&self, _query: &str, _limit: u32) -> Result<Vec<Track>, SpotifyError> {
        unimplemented!()
    }

    async fn user_playlists(&self, _user_id: &str) -> Result<Vec<PlaylistSummary>, SpotifyError> {
        unimplemented!()
    }

    async fn playlist(&self, _playlist_id: &str) -> Result<PlaylistDetails, SpotifyError> {
        unimplemented!()
    }
}

fn api_error() -> SpotifyError {
    SpotifyError::Api {
        status: 500,
        message: "Server error".to_string(),
    }
}

#[tokio::test]
async fn test_search_returns_requested_count() {
    let spotify = FakeSpotify::with(vec![Ok(tracks(&["a", "b", "c", "d", "e"]))]);
    let ai = SpotifyAi::new(spotify, FakeLlm::default());

    let result = ai
        .natural_language_search("upbeat pop with strong bass", 5)
        .await
        .unwrap();

    assert_eq!(ids(&result), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(ai.spotify().calls(), 1);
    assert_eq!(ai.spotify().limits(), vec![Some(5)]);

    let requests = ai.llm().requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].0, "RecommendationsParams");
    assert_eq!(requests[0].1, MUSIC_ANALYST_PROMPT);
    assert_eq!(
        requests[0].2,
        "Generate recommendation parameters for the description \"upbeat pop with strong bass\""
    );
}

#[tokio::test]
async fn test_search_passes_generated_params_to_spotify() {
    let spotify = FakeSpotify::with(vec![Ok(tracks(&["a"]))]);
    let ai = SpotifyAi::new(spotify, FakeLlm::default());

    ai.natural_language_search("dance", 1).await.unwrap();

    let requests = ai.spotify().requests.lock().unwrap();
    assert_eq!(requests[0].seed_genres, vec!["pop", "dance"]);
    assert_eq!(requests[0].market.as_deref(), Some("US"));
    assert!(requests[0].is_complete());
}

#[tokio::test]
async fn test_search_pads_with_further_rounds() {
    let spotify = FakeSpotify::with(vec![
        Ok(tracks(&["a", "b", "c"])),
        Ok(tracks(&["c", "d", "e"])),
    ]);
    let ai = SpotifyAi::new(spotify, FakeLlm::default());

    let result = ai.natural_language_search("late night jazz", 5).await.unwrap();

    assert_eq!(ids(&result), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(ai.spotify().calls(), 2);
    assert_eq!(ai.llm().calls(), 2);
}

#[tokio::test]
async fn test_search_truncates_to_requested_count() {
    let spotify = FakeSpotify::with(vec![
        Ok(tracks(&["a", "b", "c"])),
        Ok(tracks(&["d", "e", "f", "g"])),
    ]);
    let ai = SpotifyAi::new(spotify, FakeLlm::default());

    let result = ai.natural_language_search("summer", 5).await.unwrap();

    assert_eq!(ids(&result), vec!["a", "b", "c", "d", "e"]);
}

#[tokio::test]
async fn test_search_dedups_within_a_round() {
    let spotify = FakeSpotify::with(vec![
        Ok(tracks(&["a", "a", "b", "c", "b", "d"])),
        Ok(tracks(&["e"])),
    ]);
    let ai = SpotifyAi::new(spotify, FakeLlm::default());

    let result = ai.natural_language_search("rainy day", 5).await.unwrap();

    assert_eq!(ids(&result), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(ai.spotify().calls(), 2);
}

#[tokio::test]
async fn test_search_gives_up_after_bounded_attempts() {
    let rounds = (0..10).map(|_| Ok(tracks(&["a", "b"]))).collect();
    let ai = SpotifyAi::new(FakeSpotify::with(rounds), FakeLlm::default())
        .with_max_padding_attempts(3);

    let err = ai.natural_language_search("obscure", 5).await.unwrap_err();

    assert!(matches!(
        err,
        SearchError::InsufficientResults {
            found: 2,
            requested: 5,
            attempts: 3
        }
    ));
    assert_eq!(ai.spotify().calls(), 4);
}

#[tokio::test]
async fn test_search_default_bound_terminates() {
    let ai = SpotifyAi::new(FakeSpotify::default(), FakeLlm::default());

    let err = ai.natural_language_search("silence", 3).await.unwrap_err();

    assert!(matches!(
        err,
        SearchError::InsufficientResults { found: 0, requested: 3, .. }
    ));
    assert_eq!(ai.spotify().calls(), 1 + MAX_PADDING_ATTEMPTS as usize);
}

#[tokio::test]
async fn test_search_survives_failed_padding_round() {
    let spotify = FakeSpotify::with(vec![
        Ok(tracks(&["a", "b"])),
        Err(api_error()),
        Ok(tracks(&["c", "d", "e"])),
    ]);
    let ai = SpotifyAi::new(spotify, FakeLlm::default());

    let result = ai.natural_language_search("road trip", 5).await.unwrap();

    assert_eq!(ids(&result), vec!["a", "b", "c", "d", "e"]);
    assert_eq!(ai.spotify().calls(), 3);
}

#[tokio::test]
async fn test_search_survives_failed_param_generation() {
    let llm = FakeLlm::with(vec![
        Ok(valid_params()),
        Err(LlmError::EmptyResponse),
        Ok(json!({ "seed_genres": ["pop"] })),
    ]);
    let spotify = FakeSpotify::with(vec![Ok(tracks(&["a", "b"])), Ok(tracks(&["c", "d", "e"]))]);
    let ai = SpotifyAi::new(spotify, llm);

    let result = ai.natural_language_search("workout", 5).await.unwrap();

    assert_eq!(result.len(), 5);
    assert_eq!(ai.llm().calls(), 4);
    assert_eq!(ai.spotify().calls(), 2);
}

#[tokio::test]
async fn test_search_without_params_fails() {
    let llm = FakeLlm::with(vec![Err(LlmError::Refusal("no".to_string()))]);
    let ai = SpotifyAi::new(FakeSpotify::default(), llm);

    let err = ai.natural_language_search("anything", 5).await.unwrap_err();

    assert!(matches!(err, SearchError::ParamsUnavailable));
    assert_eq!(ai.spotify().calls(), 0);
}

#[tokio::test]
async fn test_search_rejects_params_outside_schema() {
    let mut params = valid_params();
    params["max_valence"] = json!(3.0);
    let ai = SpotifyAi::new(FakeSpotify::default(), FakeLlm::with(vec![Ok(params)]));

    let err = ai.natural_language_search("sad songs", 5).await.unwrap_err();

    assert!(matches!(err, SearchError::ParamsUnavailable));
    assert_eq!(ai.spotify().calls(), 0);
}

#[tokio::test]
async fn test_search_fails_when_first_request_fails() {
    let spotify = FakeSpotify::with(vec![Err(api_error())]);
    let ai = SpotifyAi::new(spotify, FakeLlm::default());

    let err = ai.natural_language_search("metal", 5).await.unwrap_err();

    assert!(matches!(
        err,
        SearchError::Spotify(SpotifyError::Api { status: 500, .. })
    ));
    assert_eq!(ai.spotify().calls(), 1);
}

#[tokio::test]
async fn test_search_limits_above_endpoint_maximum() {
    let first: Vec<String> = (0..100).map(|i| format!("a{}", i)).collect();
    let second: Vec<String> = (0..100).map(|i| format!("b{}", i)).collect();
    let as_tracks = |ids: &[String]| ids.iter().map(|id| track(id)).collect::<Vec<_>>();

    let spotify = FakeSpotify::with(vec![Ok(as_tracks(&first)), Ok(as_tracks(&second))]);
    let ai = SpotifyAi::new(spotify, FakeLlm::default());

    let result = ai.natural_language_search("everything", 150).await.unwrap();

    assert_eq!(result.len(), 150);
    assert_eq!(ai.spotify().limits(), vec![Some(100), Some(100)]);
}

#[tokio::test]
async fn test_empty_description_skips_model() {
    let ai = SpotifyAi::new(FakeSpotify::default(), FakeLlm::default());

    assert!(ai.generate_recommendation_params("   ").await.is_none());
    assert_eq!(ai.llm().calls(), 0);
}

#[tokio::test]
async fn test_generated_params_are_complete() {
    let ai = SpotifyAi::new(FakeSpotify::default(), FakeLlm::default());

    let params = ai
        .generate_recommendation_params("upbeat pop with strong bass")
        .await
        .unwrap();

    assert!(params.is_complete());
    assert!(params.seed_genres.iter().all(|g| GENRE_SEEDS.contains(&g.as_str())));
}

#[tokio::test]
async fn test_genre_seeds_are_catalog_subset() {
    let llm = FakeLlm::with(vec![Ok(json!({
        "genres": ["Pop", "synthwave", "dance", "pop", "chillwave"]
    }))]);

    let genres = generate_genre_seeds(&llm, "80s neon summer").await;

    assert_eq!(genres, vec!["pop", "dance"]);
    let requests = llm.requests.lock().unwrap();
    assert_eq!(requests[0].0, "GenreSeeds");
    assert!(requests[0].2.contains("\"80s neon summer\""));
}

#[tokio::test]
async fn test_genre_seeds_failures_yield_nothing() {
    let llm = FakeLlm::with(vec![
        Err(LlmError::EmptyResponse),
        Ok(json!({ "styles": ["pop"] })),
    ]);

    assert!(generate_genre_seeds(&llm, "folk").await.is_empty());
    assert!(generate_genre_seeds(&llm, "folk").await.is_empty());
    assert!(generate_genre_seeds(&llm, "").await.is_empty());
    assert_eq!(llm.calls(), 2);
}

#[tokio::test]
async fn test_similar_tracks_seeds_with_track() {
    let spotify = FakeSpotify::with(vec![Ok(tracks(&["x", "y", "x"]))]);

    let result = similar_tracks(&spotify, "seed123", 10).await.unwrap();

    assert_eq!(ids(&result), vec!["x", "y"]);
    let requests = spotify.requests.lock().unwrap();
    assert_eq!(requests[0].seed_tracks, vec!["seed123"]);
    assert_eq!(requests[0].limit, Some(10));
    assert!(requests[0].seed_genres.is_empty());
}

#[test]
fn test_dedup_keeps_first_occurrence() {
    let mut renamed = track("a");
    renamed.name = "Song a (Live)".to_string();
    let mut first = track("b");
    first.popularity = Some(10);

    let result = dedup_tracks(vec![
        track("a"),
        first.clone(),
        track("a"),
        renamed.clone(),
        track("b"),
    ]);

    assert_eq!(result, vec![track("a"), first, renamed]);
}

#[test]
fn test_dedup_is_idempotent() {
    let once = dedup_tracks(tracks(&["a", "b", "a", "c", "b"]));
    let twice = dedup_tracks(once.clone());

    assert_eq!(once, twice);
    assert_eq!(ids(&once), vec!["a", "b", "c"]);
}
