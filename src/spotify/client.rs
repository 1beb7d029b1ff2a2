use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    config,
    error::SpotifyError,
    management::TokenManager,
    spotify::transport::{Transport, TransportError},
    types::{Episode, SavedEpisodesPage, SearchResult, Show},
};

/// Authenticated GETs against the Spotify Web API.
///
/// Each call asks the token manager for a token (possibly refreshing it),
/// issues exactly one request and maps every failure onto
/// [`SpotifyError`]. Nothing is retried.
pub struct SpotifyClient {
    tokens: TokenManager,
    transport: Arc<dyn Transport>,
    base_url: String,
}

impl SpotifyClient {
    pub fn new(tokens: TokenManager) -> Self {
        let transport = tokens.transport();
        Self {
            tokens,
            transport,
            base_url: config::SPOTIFY_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn into_tokens(self) -> TokenManager {
        self.tokens
    }

    /// Fetches `endpoint` (e.g. `/me/episodes`) and decodes the 2xx body.
    pub async fn get<T: DeserializeOwned>(
        &mut self,
        endpoint: &str,
        query: &[(String, String)],
    ) -> Result<T, SpotifyError> {
        let token = self.tokens.access_token().await?;
        let url = format!("{}{}", self.base_url, endpoint);

        let reply = self
            .transport
            .get(&url, &token, query)
            .await
            .map_err(|e| match e {
                TransportError::Timeout => SpotifyError::Timeout,
                TransportError::Failed(msg) => SpotifyError::RequestFailed(msg),
            })?;

        if !reply.is_success() {
            tracing::debug!(status = reply.status, endpoint, "api request failed");
            return Err(classify_status(reply.status, &reply.body));
        }

        serde_json::from_str(&reply.body)
            .map_err(|e| SpotifyError::RequestFailed(format!("invalid response body: {}", e)))
    }

    /// `GET /me/episodes`; needs the `user-library-read` scope.
    pub async fn saved_episodes(
        &mut self,
        limit: u32,
        offset: u32,
        market: Option<&str>,
    ) -> Result<SavedEpisodesPage, SpotifyError> {
        let mut query = vec![
            ("limit".to_string(), limit.to_string()),
            ("offset".to_string(), offset.to_string()),
        ];
        push_market(&mut query, market);
        self.get("/me/episodes", &query).await
    }

    /// `GET /episodes/{id}`
    pub async fn episode(
        &mut self,
        episode_id: &str,
        market: Option<&str>,
    ) -> Result<Episode, SpotifyError> {
        let mut query = Vec::new();
        push_market(&mut query, market);
        self.get(&format!("/episodes/{}", episode_id.trim()), &query)
            .await
    }

    /// `GET /shows/{id}`
    pub async fn show(&mut self, show_id: &str) -> Result<Show, SpotifyError> {
        self.get(&format!("/shows/{}", show_id.trim()), &[]).await
    }

    /// `GET /search`; `types` is a comma separated list such as
    /// `episode,show`.
    pub async fn search(
        &mut self,
        query: &str,
        types: &str,
        limit: u32,
        offset: u32,
        market: Option<&str>,
    ) -> Result<SearchResult, SpotifyError> {
        let mut params = vec![
            ("q".to_string(), query.to_string()),
            ("type".to_string(), types.to_string()),
            ("limit".to_string(), limit.to_string()),
            ("offset".to_string(), offset.to_string()),
        ];
        push_market(&mut params, market);
        self.get("/search", &params).await
    }
}

fn push_market(query: &mut Vec<(String, String)>, market: Option<&str>) {
    if let Some(market) = market.filter(|m| !m.is_empty()) {
        query.push(("market".to_string(), market.to_string()));
    }
}

/// Maps a non-2xx API status onto its error kind.
pub fn classify_status(status: u16, body: &str) -> SpotifyError {
    match status {
        401 => SpotifyError::Unauthorized,
        403 => SpotifyError::Forbidden,
        404 => SpotifyError::NotFound(
            upstream_message(body).unwrap_or_else(|| "Resource not found".to_string()),
        ),
        429 => SpotifyError::RateLimited,
        s if s >= 500 => SpotifyError::UpstreamServerError,
        s => SpotifyError::RequestFailed(
            upstream_message(body).unwrap_or_else(|| format!("HTTP {}", s)),
        ),
    }
}

/// The Web API reports errors as `{"error": {"status": .., "message": ..}}`.
fn upstream_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json["error"]["message"].as_str().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_uses_upstream_message() {
        let body = r#"{"error":{"status":404,"message":"Non existing id"}}"#;
        assert_eq!(
            classify_status(404, body),
            SpotifyError::NotFound("Non existing id".to_string())
        );
        assert_eq!(
            classify_status(404, ""),
            SpotifyError::NotFound("Resource not found".to_string())
        );
    }

    #[test]
    fn other_client_errors_are_request_failures() {
        let body = r#"{"error":{"status":400,"message":"Invalid limit"}}"#;
        assert_eq!(
            classify_status(400, body),
            SpotifyError::RequestFailed("Invalid limit".to_string())
        );
        assert_eq!(
            classify_status(418, "teapot"),
            SpotifyError::RequestFailed("HTTP 418".to_string())
        );
    }

    #[test]
    fn server_errors_collapse() {
        for status in [500, 502, 503, 504] {
            assert_eq!(classify_status(status, ""), SpotifyError::UpstreamServerError);
        }
    }
}
