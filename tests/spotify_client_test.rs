use std::time::Duration;

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::json;
use spotai::config::SpotifyCredentials;
use spotai::params::RecommendationParams;
use spotai::spotify::{SpotifyApi, SpotifyClient, SpotifyError};

fn client(server: &ServerGuard) -> SpotifyClient {
    SpotifyClient::new(SpotifyCredentials {
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
        api_url: server.url(),
        token_url: format!("{}/api/token", server.url()),
    })
    .with_bad_gateway_delay(Duration::ZERO)
}

async fn token_mock(server: &mut ServerGuard, token: &str, expires_in: u64, hits: usize) -> Mock {
    server
        .mock("POST", "/api/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({ "access_token": token, "token_type": "Bearer", "expires_in": expires_in })
                .to_string(),
        )
        .expect(hits)
        .create_async()
        .await
}

fn search_body(ids: &[&str]) -> String {
    let items: Vec<_> = ids.iter().map(|id| json!({ "id": id, "name": id })).collect();
    json!({ "tracks": { "items": items, "next": null, "total": ids.len() } }).to_string()
}

async fn search_mock(server: &mut ServerGuard, status: usize, hits: usize) -> Mock {
    server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(search_body(&["t1"]))
        .expect(hits)
        .create_async()
        .await
}

#[tokio::test]
async fn test_token_request_uses_basic_auth() {
    let mut server = Server::new_async().await;
    let token = server
        .mock("POST", "/api/token")
        .match_header("authorization", "Basic aWQ6c2VjcmV0")
        .match_body(Matcher::UrlEncoded(
            "grant_type".into(),
            "client_credentials".into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"t1","token_type":"Bearer","expires_in":3600}"#)
        .create_async()
        .await;

    client(&server).authenticate().await.unwrap();

    token.assert_async().await;
}

#[tokio::test]
async fn test_rejected_credentials() {
    let mut server = Server::new_async().await;
    let _token = server
        .mock("POST", "/api/token")
        .with_status(400)
        .with_body(r#"{"error":"invalid_client"}"#)
        .create_async()
        .await;

    let err = client(&server).authenticate().await.unwrap_err();

    assert!(matches!(err, SpotifyError::Auth(msg) if msg.contains("invalid_client")));
}

#[tokio::test]
async fn test_cached_token_is_reused() {
    let mut server = Server::new_async().await;
    let token = token_mock(&mut server, "t1", 3600, 1).await;
    let search = search_mock(&mut server, 200, 2).await;

    let spotify = client(&server);
    spotify.search_tracks("a", 5).await.unwrap();
    spotify.search_tracks("b", 5).await.unwrap();

    token.assert_async().await;
    search.assert_async().await;
}

#[tokio::test]
async fn test_expiring_token_is_renewed() {
    let mut server = Server::new_async().await;
    // shorter than the renewal margin, so every request needs a new token
    let token = token_mock(&mut server, "t1", 30, 2).await;
    let _search = search_mock(&mut server, 200, 2).await;

    let spotify = client(&server);
    spotify.search_tracks("a", 5).await.unwrap();
    spotify.search_tracks("b", 5).await.unwrap();

    token.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_waits_and_retries() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server, "t1", 3600, 1).await;
    let limited = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(429)
        .with_header("retry-after", "0")
        .expect(1)
        .create_async()
        .await;
    let ok = search_mock(&mut server, 200, 1).await;

    let tracks = client(&server).search_tracks("a", 5).await.unwrap();

    assert_eq!(tracks.len(), 1);
    limited.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn test_long_retry_after_is_not_waited_for() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server, "t1", 3600, 1).await;
    let limited = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(429)
        .with_header("retry-after", "300")
        .expect(1)
        .create_async()
        .await;

    let err = client(&server).search_tracks("a", 5).await.unwrap_err();

    assert!(matches!(err, SpotifyError::RateLimited { retry_after: 300 }));
    limited.assert_async().await;
}

#[tokio::test]
async fn test_rate_limit_retries_are_bounded() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server, "t1", 3600, 1).await;
    let limited = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(429)
        .with_header("retry-after", "0")
        .expect(6)
        .create_async()
        .await;

    let err = client(&server).search_tracks("a", 5).await.unwrap_err();

    assert!(matches!(err, SpotifyError::RateLimited { retry_after: 0 }));
    limited.assert_async().await;
}

#[tokio::test]
async fn test_bad_gateway_is_retried() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server, "t1", 3600, 1).await;
    let failing = search_mock(&mut server, 502, 2).await;
    let ok = search_mock(&mut server, 200, 1).await;

    let tracks = client(&server).search_tracks("a", 5).await.unwrap();

    assert_eq!(tracks.len(), 1);
    failing.assert_async().await;
    ok.assert_async().await;
}

#[tokio::test]
async fn test_bad_gateway_retries_are_bounded() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server, "t1", 3600, 1).await;
    let failing = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(502)
        .expect(4)
        .create_async()
        .await;

    let err = client(&server).search_tracks("a", 5).await.unwrap_err();

    assert!(matches!(err, SpotifyError::Api { status: 502, .. }));
    failing.assert_async().await;
}

#[tokio::test]
async fn test_unauthorized_refreshes_token_once() {
    let mut server = Server::new_async().await;
    let first = token_mock(&mut server, "t1", 3600, 1).await;
    let second = token_mock(&mut server, "t2", 3600, 1).await;
    let rejected = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer t1")
        .with_status(401)
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer t2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(search_body(&["t1", "t2"]))
        .expect(1)
        .create_async()
        .await;

    let tracks = client(&server).search_tracks("a", 5).await.unwrap();

    assert_eq!(tracks.len(), 2);
    first.assert_async().await;
    second.assert_async().await;
    rejected.assert_async().await;
    accepted.assert_async().await;
}

#[tokio::test]
async fn test_repeated_unauthorized_is_an_error() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server, "t1", 3600, 2).await;
    let rejected = server
        .mock("GET", "/search")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"status":401,"message":"Invalid access token"}}"#)
        .expect(2)
        .create_async()
        .await;

    let err = client(&server).search_tracks("a", 5).await.unwrap_err();

    assert!(matches!(
        err,
        SpotifyError::Api { status: 401, ref message } if message == "Invalid access token"
    ));
    rejected.assert_async().await;
}

#[tokio::test]
async fn test_api_error_message() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server, "t1", 3600, 1).await;
    let _playlist = server
        .mock("GET", "/playlists/missing")
        .with_status(404)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"status":404,"message":"Resource not found"}}"#)
        .create_async()
        .await;

    let err = client(&server).playlist("missing").await.unwrap_err();

    assert!(matches!(
        err,
        SpotifyError::Api { status: 404, ref message } if message == "Resource not found"
    ));
}

#[tokio::test]
async fn test_search_query_and_limit_clamp() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server, "t1", 3600, 1).await;
    let search = server
        .mock("GET", "/search")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("q".into(), "Bohemian Rhapsody".into()),
            Matcher::UrlEncoded("type".into(), "track".into()),
            Matcher::UrlEncoded("limit".into(), "50".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(search_body(&["t1"]))
        .create_async()
        .await;

    client(&server)
        .search_tracks("Bohemian Rhapsody", 80)
        .await
        .unwrap();

    search.assert_async().await;
}

#[tokio::test]
async fn test_recommendations_query() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server, "t1", 3600, 1).await;
    let recommendations = server
        .mock("GET", "/recommendations")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("seed_tracks".into(), "abc".into()),
            Matcher::UrlEncoded("limit".into(), "10".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"seeds":[],"tracks":[{"id":"t9","name":"Similar"}]}"#)
        .create_async()
        .await;

    let mut params = RecommendationParams::for_track("abc");
    params.set_limit(10);
    let res = client(&server).recommendations(&params).await.unwrap();

    assert_eq!(res.tracks[0].id, "t9");
    recommendations.assert_async().await;
}

#[tokio::test]
async fn test_user_playlists_follow_next_links() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server, "t1", 3600, 1).await;
    let first = server
        .mock("GET", "/users/u1/playlists")
        .match_query(Matcher::UrlEncoded("limit".into(), "50".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "items": [{ "id": "p1", "name": "One", "owner": { "id": "u1" } }],
                "next": format!("{}/users/u1/playlists-page-2", server.url()),
                "total": 2
            })
            .to_string(),
        )
        .create_async()
        .await;
    let second = server
        .mock("GET", "/users/u1/playlists-page-2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "items": [{ "id": "p2", "name": "Two", "owner": { "id": "u1" } }],
                "next": null,
                "total": 2
            })
            .to_string(),
        )
        .create_async()
        .await;

    let playlists = client(&server).user_playlists("u1").await.unwrap();

    let ids: Vec<&str> = playlists.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p2"]);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_playlist_items_follow_next_links() {
    let mut server = Server::new_async().await;
    let _token = token_mock(&mut server, "t1", 3600, 1).await;
    let _first = server
        .mock("GET", "/playlists/p1")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": "p1",
                "name": "Long",
                "owner": { "id": "u1" },
                "tracks": {
                    "items": [{ "track": { "id": "t1", "name": "First" } }],
                    "next": format!("{}/playlists/p1/items-page-2", server.url()),
                    "total": 2
                }
            })
            .to_string(),
        )
        .create_async()
        .await;
    let second = server
        .mock("GET", "/playlists/p1/items-page-2")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "items": [{ "track": { "id": null, "name": "Local", "is_local": true } }],
                "next": null,
                "total": 2
            })
            .to_string(),
        )
        .create_async()
        .await;

    let details = client(&server).playlist("p1").await.unwrap();

    assert_eq!(details.tracks.items.len(), 2);
    assert!(details.tracks.next.is_none());
    second.assert_async().await;
}
