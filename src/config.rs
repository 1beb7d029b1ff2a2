//! Configuration management for the Spotify Podcast CLI.
//!
//! This module handles loading and accessing configuration values from
//! environment variables and `.env` files. The OAuth endpoints, redirect URI
//! and scope set are fixed constants; only the application credentials and a
//! few local knobs come from the environment.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Command line flags (where applicable)
//! 2. Environment variables
//! 3. `.env` file in the local data directory
//! 4. Application defaults

use std::{env, net::SocketAddr, path::PathBuf, time::Duration};

use crate::error::SpotifyError;

/// Spotify OAuth authorization endpoint (browser redirect target).
pub const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";

/// Spotify OAuth token endpoint used for code exchange and refresh.
pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Spotify Web API base URL.
pub const SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";

/// Redirect URI registered with the Spotify application.
pub const REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";

/// Loopback address the callback listener binds to. Must agree with
/// [`REDIRECT_URI`].
pub const CALLBACK_ADDRESS: &str = "127.0.0.1:8888";

/// Path component of [`REDIRECT_URI`].
pub const CALLBACK_PATH: &str = "/callback";

/// Permissions requested during authorization.
pub const SCOPES: &str = "user-library-read user-read-private user-read-email";

/// Timeout applied to every outbound token and API request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A token is only handed out while it stays valid for at least this long.
pub const EXPIRY_BUFFER_MS: i64 = 60_000;

/// Default upper bound on the wait for the browser redirect.
pub const DEFAULT_CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

const TOKEN_FILE_NAME: &str = ".spotify-mcp-tokens.json";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Looks for the file in the platform-specific local data directory under
/// `spodcli/.env`:
/// - Linux: `~/.local/share/spodcli/.env`
/// - macOS: `~/Library/Application Support/spodcli/.env`
/// - Windows: `%LOCALAPPDATA%/spodcli/.env`
///
/// A missing file is fine; variables already present in the process
/// environment always win over the file.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the `.env` file
/// exists but cannot be parsed.
pub async fn load_env() -> crate::Res<()> {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spodcli/.env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path)?;
    }
    Ok(())
}

/// Application credentials plus the OAuth endpoints they are used against.
///
/// Everything the token lifecycle manager needs to talk to the accounts
/// service. Tests substitute the endpoints; the binary uses
/// [`OAuthSettings::from_env`].
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub redirect_uri: String,
    pub scope: String,
}

impl OAuthSettings {
    /// Builds settings with the fixed Spotify endpoints.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: SPOTIFY_AUTH_URL.to_string(),
            token_url: SPOTIFY_TOKEN_URL.to_string(),
            redirect_uri: REDIRECT_URI.to_string(),
            scope: SCOPES.to_string(),
        }
    }

    /// Reads `SPOTIFY_CLIENT_ID` and `SPOTIFY_CLIENT_SECRET` from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`SpotifyError::Config`] when either variable is unset or
    /// empty. Every command treats this as a hard startup failure.
    pub fn from_env() -> Result<Self, SpotifyError> {
        match (spotify_client_id(), spotify_client_secret()) {
            (Some(id), Some(secret)) => Ok(Self::new(id, secret)),
            _ => Err(SpotifyError::Config(
                "SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET must be set\n\n\
                 Get credentials from: https://developer.spotify.com/dashboard\n\n\
                 Set them with:\n  \
                 export SPOTIFY_CLIENT_ID='your_client_id'\n  \
                 export SPOTIFY_CLIENT_SECRET='your_client_secret'"
                    .to_string(),
            )),
        }
    }
}

/// Returns the Spotify API client ID, if set and non-empty.
pub fn spotify_client_id() -> Option<String> {
    non_empty_var("SPOTIFY_CLIENT_ID")
}

/// Returns the Spotify API client secret, if set and non-empty.
///
/// The client secret should be kept confidential and never exposed in logs.
pub fn spotify_client_secret() -> Option<String> {
    non_empty_var("SPOTIFY_CLIENT_SECRET")
}

/// Resolves the token file location.
///
/// Precedence: the explicit override (from `--token-path`), then
/// `SPOTIFY_TOKEN_PATH`, then `~/.spotify-mcp-tokens.json`.
pub fn token_path(override_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = override_path {
        return path;
    }
    if let Some(path) = non_empty_var("SPOTIFY_TOKEN_PATH") {
        return PathBuf::from(path);
    }

    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(TOKEN_FILE_NAME);
    path
}

/// Returns the address the callback listener binds to.
pub fn callback_addr() -> Result<SocketAddr, SpotifyError> {
    CALLBACK_ADDRESS
        .parse()
        .map_err(|e| SpotifyError::Config(format!("Invalid callback address: {}", e)))
}

/// Returns how long to wait for the browser redirect.
///
/// Read from `SPODCLI_CALLBACK_TIMEOUT` (whole seconds); unparsable or zero
/// values fall back to [`DEFAULT_CALLBACK_TIMEOUT`].
pub fn callback_timeout() -> Duration {
    non_empty_var("SPODCLI_CALLBACK_TIMEOUT")
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_CALLBACK_TIMEOUT)
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_uri_matches_listener() {
        let expected = format!("http://{}{}", CALLBACK_ADDRESS, CALLBACK_PATH);
        assert_eq!(REDIRECT_URI, expected);
        assert!(callback_addr().is_ok());
    }

    #[test]
    fn explicit_token_path_wins() {
        let path = token_path(Some(PathBuf::from("/tmp/tokens.json")));
        assert_eq!(path, PathBuf::from("/tmp/tokens.json"));
    }

    #[test]
    fn settings_use_fixed_endpoints() {
        let settings = OAuthSettings::new("id", "secret");
        assert_eq!(settings.token_url, SPOTIFY_TOKEN_URL);
        assert_eq!(settings.redirect_uri, REDIRECT_URI);
        assert!(settings.scope.contains("user-library-read"));
    }
}
