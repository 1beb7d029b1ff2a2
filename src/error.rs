//! Error types for the Spotify Podcast CLI

use thiserror::Error;

/// Every failure a token or API operation can surface to its caller.
///
/// The display strings are what the command line prints, so each one says
/// what to do next.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpotifyError {
    /// No token record exists at all
    #[error("Not authenticated. Run `spodcli auth` first.")]
    NotAuthenticated,

    /// First-time authorization flow failed (denied, CSRF mismatch, missing
    /// code, exchange failure, timeout)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Refresh exchange failed or no refresh token is available
    #[error("Failed to refresh access token: {0}")]
    RefreshFailed(String),

    /// HTTP 401 from the API
    #[error(
        "Unauthorized: Invalid or expired Spotify access token. Run `spodcli auth` to re-authenticate."
    )]
    Unauthorized,

    /// HTTP 403 from the API
    #[error(
        "Forbidden: Insufficient permissions. Run `spodcli auth logout` and `spodcli auth` to authenticate with correct scopes."
    )]
    Forbidden,

    /// HTTP 404 from the API, carrying the upstream message
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP 429 from the API
    #[error("Rate limited: Too many requests. Please wait before retrying.")]
    RateLimited,

    /// HTTP 5xx from the API
    #[error("Spotify API error: Server error. Please try again later.")]
    UpstreamServerError,

    /// The request did not complete within the request timeout
    #[error("Request timeout: Spotify API took too long to respond")]
    Timeout,

    /// Any other transport or HTTP failure
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Missing or invalid local configuration
    #[error("{0}")]
    Config(String),
}

/// Failures reading or writing the token file.
///
/// These never leave the token manager: they are logged and the manager
/// carries on as unauthenticated, or without persistence.
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O error during storage operations
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
