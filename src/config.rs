//! Configuration management for the Spotify AI CLI.
//!
//! This module handles loading configuration values from environment
//! variables and `.env` files into an explicit [`Config`] struct. Clients are
//! built from the settings it hands out, so nothing below the CLI layer reads
//! the process environment.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory (or `SPOTAI_ENV_FILE`)
//! 3. `.env` file in the current directory
//! 4. Application defaults (where applicable)

use std::{env, fmt, path::PathBuf};

pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o";

pub const ENV_SPOTIFY_CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";
pub const ENV_SPOTIFY_CLIENT_SECRET: &str = "SPOTIFY_CLIENT_SECRET";
pub const ENV_SPOTIFY_USER_ID: &str = "SPOTIFY_USER_ID";
pub const ENV_SPOTIFY_API_URL: &str = "SPOTIFY_API_URL";
pub const ENV_SPOTIFY_TOKEN_URL: &str = "SPOTIFY_TOKEN_URL";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_LLM_MODEL: &str = "SPOTAI_LLM_MODEL";
pub const ENV_FILE_OVERRIDE: &str = "SPOTAI_ENV_FILE";

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Io(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(var) => write!(
                f,
                "{} must be set in your environment or .env file",
                var
            ),
            ConfigError::Io(e) => write!(f, "cannot prepare configuration directory: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Credentials and endpoints for the Spotify Web API.
#[derive(Debug, Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub api_url: String,
    pub token_url: String,
}

/// Settings for the chat-completion API.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Snapshot of every configuration value the CLI may need.
///
/// Values are optional at this level; each command asks for the group it
/// needs through `spotify_credentials`, `llm_settings` or `spotify_user_id`
/// and fails with a [`ConfigError`] naming the missing variable.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub spotify_client_id: Option<String>,
    pub spotify_client_secret: Option<String>,
    pub spotify_user_id: Option<String>,
    pub spotify_api_url: Option<String>,
    pub spotify_token_url: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub llm_model: Option<String>,
}

impl Config {
    /// Builds the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            spotify_client_id: get(ENV_SPOTIFY_CLIENT_ID),
            spotify_client_secret: get(ENV_SPOTIFY_CLIENT_SECRET),
            spotify_user_id: get(ENV_SPOTIFY_USER_ID),
            spotify_api_url: get(ENV_SPOTIFY_API_URL),
            spotify_token_url: get(ENV_SPOTIFY_TOKEN_URL),
            openai_api_key: get(ENV_OPENAI_API_KEY),
            openai_base_url: get(ENV_OPENAI_BASE_URL),
            llm_model: get(ENV_LLM_MODEL),
        }
    }

    pub fn spotify_credentials(&self) -> Result<SpotifyCredentials, ConfigError> {
        let client_id = self
            .spotify_client_id
            .clone()
            .ok_or(ConfigError::Missing(ENV_SPOTIFY_CLIENT_ID))?;
        let client_secret = self
            .spotify_client_secret
            .clone()
            .ok_or(ConfigError::Missing(ENV_SPOTIFY_CLIENT_SECRET))?;

        Ok(SpotifyCredentials {
            client_id,
            client_secret,
            api_url: trim_url(
                self.spotify_api_url
                    .as_deref()
                    .unwrap_or(DEFAULT_SPOTIFY_API_URL),
            ),
            token_url: self
                .spotify_token_url
                .clone()
                .unwrap_or_else(|| DEFAULT_SPOTIFY_TOKEN_URL.to_string()),
        })
    }

    pub fn llm_settings(&self) -> Result<LlmSettings, ConfigError> {
        let api_key = self
            .openai_api_key
            .clone()
            .ok_or(ConfigError::Missing(ENV_OPENAI_API_KEY))?;

        Ok(LlmSettings {
            api_key,
            base_url: trim_url(
                self.openai_base_url
                    .as_deref()
                    .unwrap_or(DEFAULT_LLM_BASE_URL),
            ),
            model: self
                .llm_model
                .clone()
                .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
        })
    }

    pub fn spotify_user_id(&self) -> Result<String, ConfigError> {
        self.spotify_user_id
            .clone()
            .ok_or(ConfigError::Missing(ENV_SPOTIFY_USER_ID))
    }
}

fn trim_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Loads environment variables from `.env` files.
///
/// Looks in the platform-specific local data directory under `spotai/.env`
/// (creating the directory if needed), or at the path given by
/// `SPOTAI_ENV_FILE`, and then in the current directory. Missing files are
/// not an error; variables already present in the environment are never
/// overwritten.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/spotai/.env`
/// - macOS: `~/Library/Application Support/spotai/.env`
/// - Windows: `%LOCALAPPDATA%/spotai/.env`
pub async fn load_env() -> Result<(), ConfigError> {
    let path = match env::var(ENV_FILE_OVERRIDE) {
        Ok(path) if !path.is_empty() => PathBuf::from(path),
        _ => {
            let path = env_file_path();
            if let Some(parent) = path.parent() {
                async_fs::create_dir_all(parent)
                    .await
                    .map_err(|e| ConfigError::Io(e.to_string()))?;
            }
            path
        }
    };

    if path.is_file() {
        dotenv::from_path(&path).ok();
    }

    if env::var(ENV_FILE_OVERRIDE).is_err() {
        dotenv::dotenv().ok();
    }

    Ok(())
}

/// Returns the default location of the `.env` file.
pub fn env_file_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotai/.env");
    path
}

