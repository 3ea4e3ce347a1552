use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{
    config::SpotifyCredentials,
    debug,
    spotify::SpotifyError,
    types::AccessTokenResponse,
};

/// Seconds before expiry at which a token is considered stale.
const EXPIRY_MARGIN: u64 = 60;

#[derive(Debug, Clone)]
pub struct Token {
    pub access_token: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

impl Token {
    pub fn is_expired(&self, now: u64) -> bool {
        now + EXPIRY_MARGIN >= self.obtained_at + self.expires_in
    }
}

/// Obtains and caches client-credentials access tokens.
///
/// The token lives in memory for the lifetime of the process. A new token is
/// requested on first use and whenever the cached one is about to expire.
pub struct TokenManager {
    client_id: String,
    client_secret: String,
    token_url: String,
    token: Mutex<Option<Token>>,
}

impl TokenManager {
    pub fn new(credentials: &SpotifyCredentials) -> Self {
        TokenManager {
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            token_url: credentials.token_url.clone(),
            token: Mutex::new(None),
        }
    }

    pub async fn get_valid_token(&self, http: &Client) -> Result<String, SpotifyError> {
        let mut lock = self.token.lock().await;
        let now = Utc::now().timestamp() as u64;

        if let Some(token) = lock.as_ref() {
            if !token.is_expired(now) {
                return Ok(token.access_token.clone());
            }
            debug!("Spotify access token expired, requesting a new one");
        }

        let token = self.request_token(http).await?;
        let access_token = token.access_token.clone();
        *lock = Some(token);

        Ok(access_token)
    }

    /// Forgets the cached token, e.g. after Spotify rejected it.
    pub async fn invalidate(&self) {
        *self.token.lock().await = None;
    }

    async fn request_token(&self, http: &Client) -> Result<Token, SpotifyError> {
        let res = http
            .post(&self.token_url)
            .header("Authorization", format!("Basic {}", self.basic_auth()))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(SpotifyError::Auth(format!("{} - {}", status, body)));
        }

        let json = res.json::<AccessTokenResponse>().await?;

        Ok(Token {
            access_token: json.access_token,
            expires_in: json.expires_in,
            obtained_at: Utc::now().timestamp() as u64,
        })
    }

    fn basic_auth(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret))
    }
}
