use std::{net::SocketAddr, time::Duration};

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::Value;

use crate::{
    config::{self, OAuthSettings},
    error::SpotifyError,
    info,
    server::CallbackServer,
    spotify::transport::{Transport, TransportError},
    types::{CallbackParams, TokenRecord, TokenResponse},
    utils, warning,
};

/// Phases of one authorization code attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPhase {
    Idle,
    AwaitingCallback,
    Exchanging,
    Authenticated,
    Failed,
}

/// One in-flight authorization attempt and its CSRF `state` value.
///
/// Never persisted; dropped once the attempt completes or fails.
#[derive(Debug)]
pub struct AuthSession {
    state: String,
    phase: AuthPhase,
}

impl AuthSession {
    pub fn new() -> Self {
        Self {
            state: utils::generate_state(),
            phase: AuthPhase::Idle,
        }
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn phase(&self) -> AuthPhase {
        self.phase
    }

    pub fn transition(&mut self, next: AuthPhase) {
        tracing::debug!(from = ?self.phase, to = ?next, "authorization phase");
        self.phase = next;
    }

    /// Checks the redirect against this session and yields the code.
    ///
    /// Moves to `Exchanging` on success and to `Failed` otherwise.
    pub fn accept_callback(&mut self, params: &CallbackParams) -> Result<String, SpotifyError> {
        match validate_callback(params, &self.state) {
            Ok(code) => {
                self.transition(AuthPhase::Exchanging);
                Ok(code)
            }
            Err(e) => {
                self.transition(AuthPhase::Failed);
                Err(e)
            }
        }
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Decides whether a redirect is acceptable.
///
/// Order matters: a provider error wins, then the state must match exactly,
/// and only then is the code looked at.
pub fn validate_callback(
    params: &CallbackParams,
    expected_state: &str,
) -> Result<String, SpotifyError> {
    if let Some(error) = &params.error {
        return Err(SpotifyError::AuthenticationFailed(format!(
            "authorization denied by provider: {}",
            error
        )));
    }

    if params.state.as_deref() != Some(expected_state) {
        return Err(SpotifyError::AuthenticationFailed(
            "State mismatch - possible CSRF attack".to_string(),
        ));
    }

    match params.code.as_deref() {
        Some(code) if !code.is_empty() => Ok(code.to_string()),
        _ => Err(SpotifyError::AuthenticationFailed(
            "No authorization code received".to_string(),
        )),
    }
}

/// Builds the URL the user opens to grant access.
pub fn authorize_url(settings: &OAuthSettings, state: &str) -> Result<String, SpotifyError> {
    let url = url::Url::parse_with_params(
        &settings.auth_url,
        &[
            ("client_id", settings.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("state", state),
            ("scope", settings.scope.as_str()),
        ],
    )
    .map_err(|e| SpotifyError::Config(format!("Invalid authorization URL: {}", e)))?;
    Ok(url.into())
}

/// `Authorization` header value for the token endpoint:
/// `Basic base64(client_id:client_secret)`.
pub fn basic_auth_header(settings: &OAuthSettings) -> String {
    let credentials = format!("{}:{}", settings.client_id, settings.client_secret);
    format!("Basic {}", STANDARD.encode(credentials))
}

/// Exchanges an authorization code for a complete token record.
///
/// A response without a `refresh_token` is rejected. `expires_at` is
/// `now_ms + expires_in * 1000`.
pub async fn exchange_code(
    transport: &dyn Transport,
    settings: &OAuthSettings,
    code: &str,
    now_ms: i64,
) -> Result<TokenRecord, SpotifyError> {
    let form = [
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", settings.redirect_uri.as_str()),
    ];

    let response = request_token(transport, settings, &form).await.map_err(|e| {
        SpotifyError::AuthenticationFailed(format!(
            "Failed to exchange authorization code for tokens: {}",
            e
        ))
    })?;

    let Some(refresh_token) = response.refresh_token.filter(|t| !t.is_empty()) else {
        return Err(SpotifyError::AuthenticationFailed(
            "Token response did not include a refresh token".to_string(),
        ));
    };

    Ok(TokenRecord {
        access_token: response.access_token,
        refresh_token,
        expires_at: expires_at(now_ms, response.expires_in),
        token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
        scope: response.scope.unwrap_or_else(|| settings.scope.clone()),
    })
}

/// Mints a new access token from `previous.refresh_token`.
///
/// The previous refresh token, token type and scope are kept whenever the
/// server omits them.
pub async fn refresh_grant(
    transport: &dyn Transport,
    settings: &OAuthSettings,
    previous: &TokenRecord,
    now_ms: i64,
) -> Result<TokenRecord, SpotifyError> {
    if previous.refresh_token.is_empty() {
        return Err(SpotifyError::RefreshFailed(
            "No refresh token available. Run `spodcli auth` first.".to_string(),
        ));
    }

    let form = [
        ("grant_type", "refresh_token"),
        ("refresh_token", previous.refresh_token.as_str()),
    ];

    let response = request_token(transport, settings, &form)
        .await
        .map_err(SpotifyError::RefreshFailed)?;

    Ok(TokenRecord {
        access_token: response.access_token,
        refresh_token: response
            .refresh_token
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| previous.refresh_token.clone()),
        expires_at: expires_at(now_ms, response.expires_in),
        token_type: response
            .token_type
            .unwrap_or_else(|| previous.token_type.clone()),
        scope: response.scope.unwrap_or_else(|| previous.scope.clone()),
    })
}

/// `now_ms + expires_in` seconds, saturating on absurd server values.
fn expires_at(now_ms: i64, expires_in: i64) -> i64 {
    now_ms.saturating_add(expires_in.saturating_mul(1000))
}

async fn request_token(
    transport: &dyn Transport,
    settings: &OAuthSettings,
    form: &[(&str, &str)],
) -> Result<TokenResponse, String> {
    let reply = transport
        .post_form(&settings.token_url, &basic_auth_header(settings), form)
        .await
        .map_err(|e| match e {
            TransportError::Timeout => "token endpoint timed out".to_string(),
            TransportError::Failed(msg) => msg,
        })?;

    if !reply.is_success() {
        return Err(token_error_detail(reply.status, &reply.body));
    }

    serde_json::from_str::<TokenResponse>(&reply.body)
        .map_err(|e| format!("invalid token response: {}", e))
}

/// Renders the token endpoint's `{"error": .., "error_description": ..}`.
fn token_error_detail(status: u16, body: &str) -> String {
    let json: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let error = json["error"].as_str();
    let description = json["error_description"].as_str();
    match (error, description) {
        (Some(e), Some(d)) => format!("HTTP {}: {} ({})", status, e, d),
        (Some(e), None) => format!("HTTP {}: {}", status, e),
        _ => format!("HTTP {}", status),
    }
}

/// Delivers the browser redirect for an authorization attempt.
#[async_trait]
pub trait CallbackReceiver: Send + Sync {
    /// Presents `authorize_url` to the user and waits for the redirect.
    async fn receive(
        &self,
        authorize_url: &str,
        expected_state: &str,
    ) -> Result<CallbackParams, SpotifyError>;
}

/// The real receiver: loopback listener plus best-effort browser launch.
pub struct LoopbackCallback {
    addr: SocketAddr,
    timeout: Duration,
}

impl LoopbackCallback {
    pub fn new(addr: SocketAddr, timeout: Duration) -> Self {
        Self {
            addr,
            timeout,
        }
    }

    /// Fixed callback address with the timeout from the environment.
    pub fn from_env() -> Result<Self, SpotifyError> {
        Ok(Self::new(config::callback_addr()?, config::callback_timeout()))
    }
}

#[async_trait]
impl CallbackReceiver for LoopbackCallback {
    async fn receive(
        &self,
        authorize_url: &str,
        expected_state: &str,
    ) -> Result<CallbackParams, SpotifyError> {
        // bind before the browser opens so the redirect cannot race the listener
        let server = CallbackServer::bind(self.addr).await?;

        info!(
            "Please open this URL in your browser to authenticate:\n\n{}\n",
            authorize_url
        );

        if webbrowser::open(authorize_url).is_err() {
            warning!("Failed to open browser. Please navigate to the URL above manually.");
        }

        info!(
            "Waiting for authentication on http://{}{} ...",
            self.addr,
            config::CALLBACK_PATH
        );
        server.serve_once(expected_state, self.timeout).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(code: Option<&str>, state: Option<&str>, error: Option<&str>) -> CallbackParams {
        CallbackParams {
            code: code.map(String::from),
            state: state.map(String::from),
            error: error.map(String::from),
        }
    }

    #[test]
    fn session_starts_idle_with_hex_state() {
        let session = AuthSession::new();
        assert_eq!(session.phase(), AuthPhase::Idle);
        assert_eq!(session.state().len(), 32);
        assert!(session.state().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn accepted_callback_moves_to_exchanging() {
        let mut session = AuthSession::new();
        session.transition(AuthPhase::AwaitingCallback);
        let state = session.state().to_string();

        let code = session
            .accept_callback(&params(Some("abc"), Some(&state), None))
            .unwrap();
        assert_eq!(code, "abc");
        assert_eq!(session.phase(), AuthPhase::Exchanging);
    }

    #[test]
    fn state_is_checked_before_code() {
        let err = validate_callback(&params(None, Some("other"), None), "expected").unwrap_err();
        assert!(err.to_string().contains("State mismatch"));

        let err = validate_callback(&params(None, Some("expected"), None), "expected").unwrap_err();
        assert!(err.to_string().contains("No authorization code"));
    }

    #[test]
    fn provider_error_wins() {
        let mut session = AuthSession::new();
        let state = session.state().to_string();
        let err = session
            .accept_callback(&params(Some("abc"), Some(&state), Some("access_denied")))
            .unwrap_err();
        assert!(err.to_string().contains("access_denied"));
        assert_eq!(session.phase(), AuthPhase::Failed);
    }

    #[test]
    fn authorize_url_carries_all_parameters() {
        let settings = OAuthSettings::new("my-client", "secret");
        let url = authorize_url(&settings, "deadbeef").unwrap();
        let parsed = url::Url::parse(&url).unwrap();
        let pairs: std::collections::HashMap<_, _> = parsed.query_pairs().into_owned().collect();

        assert_eq!(pairs["client_id"], "my-client");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["redirect_uri"], config::REDIRECT_URI);
        assert_eq!(pairs["state"], "deadbeef");
        assert_eq!(pairs["scope"], config::SCOPES);
    }

    #[test]
    fn basic_header_encodes_client_credentials() {
        let settings = OAuthSettings::new("id", "secret");
        assert_eq!(basic_auth_header(&settings), "Basic aWQ6c2VjcmV0");
    }

    #[test]
    fn huge_expires_in_saturates() {
        assert_eq!(expires_at(1_000, 3600), 3_601_000);
        assert_eq!(expires_at(1_000, i64::MAX), i64::MAX);
    }

    #[test]
    fn token_error_detail_uses_description() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid refresh token"}"#;
        assert_eq!(
            token_error_detail(400, body),
            "HTTP 400: invalid_grant (Invalid refresh token)"
        );
        assert_eq!(token_error_detail(502, "<html>"), "HTTP 502");
    }
}
