//! Spotify Podcast CLI Library
//!
//! This library provides functionality for browsing saved podcast episodes and
//! shows on Spotify. Its core is the OAuth token lifecycle: acquiring tokens via
//! the authorization code flow, persisting them locally and refreshing them
//! transparently before every API call.
//!
//! # Modules
//!
//! - `api` - HTTP handlers for the local callback listener
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - The error taxonomy shared by all operations
//! - `management` - Token persistence and the token lifecycle manager
//! - `server` - One-shot local HTTP listener for the OAuth redirect
//! - `spotify` - Spotify Web API client and authorization protocol
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use spodcli::{config, management::{FileTokenStore, TokenManager}, spotify::SpotifyClient};
//!
//! #[tokio::main]
//! async fn main() -> spodcli::Res<()> {
//!     config::load_env().await?;
//!     let settings = config::OAuthSettings::from_env()?;
//!     let store = FileTokenStore::new(config::token_path(None));
//!     let tokens = TokenManager::load(settings, Box::new(store)).await;
//!     let mut client = SpotifyClient::new(tokens);
//!     let show = client.show("4rOoJ6Egrf8K2IrywzwOMk").await?;
//!     println!("{}", show.name);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Used at the outer edges of the application (environment loading, the
/// binary) where any error is reported and ends the process. Library
/// operations return [`error::SpotifyError`] instead.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational message with a blue bullet point.
///
/// Output goes to stderr so that stdout only carries command results
/// (markdown or JSON).
///
/// # Example
///
/// ```
/// info!("Waiting for authentication...");
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// # Example
///
/// ```
/// success!("Token refreshed successfully");
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Terminates the process with exit code 1 right after printing. Only meant
/// for command entry points where the error is unrecoverable.
///
/// # Example
///
/// ```
/// error!("SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET must be set");
/// // Program exits here
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
/// Used for recoverable issues, e.g. a token file that could not be written.
///
/// # Example
///
/// ```
/// warning!("Failed to save tokens: {}", err);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
