//! Spotify AI CLI Library
//!
//! This library provides functionality for querying the Spotify Web API for
//! tracks, playlists and recommendations, optionally turning a free-text
//! description into structured recommendation parameters with a language
//! model.
//!
//! # Modules
//!
//! - `ai` - Natural-language search, parameter synthesis and genre seeds
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `genres` - The static catalog of Spotify genre seeds
//! - `llm` - Chat-completion client producing structured JSON objects
//! - `management` - Local genre metadata cache
//! - `params` - Recommendation parameters and their shared JSON schema
//! - `render` - Projection of API results into printable table rows
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```rust,ignore
//! use spotai::{ai::SpotifyAi, config::Config, llm::OpenAiClient, spotify::SpotifyClient};
//!
//! #[tokio::main]
//! async fn main() -> spotai::Res<()> {
//!     let config = Config::from_env();
//!     let spotify = SpotifyClient::new(config.spotify_credentials()?);
//!     let llm = OpenAiClient::new(config.llm_settings()?);
//!     let ai = SpotifyAi::new(spotify, llm);
//!     let tracks = ai.natural_language_search("upbeat pop", 5).await?;
//!     Ok(())
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};

pub mod ai;
pub mod cli;
pub mod config;
pub mod genres;
pub mod llm;
pub mod management;
pub mod params;
pub mod render;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Provides a standard error handling pattern for binary-level glue code
/// using a boxed dynamic error trait object. Library layers return their own
/// error enums, which convert into this alias through `?`.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Enables or disables output of the [`debug!`] macro.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

/// Returns whether verbose output is enabled.
pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Example
///
/// ```rust,ignore
/// info!("Natural search with description: {}", description);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// The message goes to standard error and the program terminates with exit
/// code 1. Used for unrecoverable errors such as missing arguments or
/// credentials.
///
/// # Example
///
/// ```rust,ignore
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Used for recoverable issues, e.g. a language model response that did not
/// match the expected schema.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a dimmed diagnostic message when verbose output is enabled.
#[macro_export]
macro_rules! debug {
  ($($arg:tt)*) => ({
    if $crate::is_verbose() {
      use colored::Colorize;
      println!("[{}] {}", "·".dimmed(), std::format_args!($($arg)*));
    }
  })
}
