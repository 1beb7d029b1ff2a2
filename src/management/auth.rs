use std::sync::Arc;

use crate::{
    config::{self, OAuthSettings},
    error::SpotifyError,
    management::TokenStore,
    spotify::{
        Clock, ReqwestTransport, SystemClock, Transport,
        auth::{self, AuthPhase, AuthSession, CallbackReceiver, LoopbackCallback},
    },
    types::TokenRecord,
    warning,
};

/// Owns the token record and decides whether a usable bearer token exists.
///
/// The only component that performs the code exchange or a refresh, and the
/// only writer of the token store. One instance per process, passed
/// explicitly to whatever needs a token.
pub struct TokenManager {
    settings: OAuthSettings,
    store: Box<dyn TokenStore>,
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    token: Option<TokenRecord>,
}

impl TokenManager {
    /// Creates a manager with the reqwest transport and the system clock,
    /// loading whatever the store holds.
    pub async fn load(settings: OAuthSettings, store: Box<dyn TokenStore>) -> Self {
        Self::load_with(
            settings,
            store,
            Arc::new(ReqwestTransport::new()),
            Arc::new(SystemClock),
        )
        .await
    }

    /// Like [`TokenManager::load`] with explicit collaborators.
    ///
    /// A missing or unreadable store leaves the manager unauthenticated; it
    /// is never a failure.
    pub async fn load_with(
        settings: OAuthSettings,
        store: Box<dyn TokenStore>,
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let token = match store.load().await {
            Ok(token) => token,
            Err(e) => {
                warning!("Failed to load tokens from {}: {}", store.location(), e);
                None
            }
        };

        Self {
            settings,
            store,
            transport,
            clock,
            token,
        }
    }

    /// True iff a record exists and stays valid for more than the 60 second
    /// buffer.
    pub fn has_valid_token(&self) -> bool {
        match &self.token {
            Some(record) => record.expires_at > self.clock.now_ms() + config::EXPIRY_BUFFER_MS,
            None => false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn record(&self) -> Option<&TokenRecord> {
        self.token.as_ref()
    }

    /// Milliseconds until the access token expires (negative once expired).
    pub fn expires_in_ms(&self) -> Option<i64> {
        self.token
            .as_ref()
            .map(|record| record.expires_at - self.clock.now_ms())
    }

    pub fn token_location(&self) -> String {
        self.store.location()
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Returns a usable access token, refreshing first when the buffer check
    /// fails.
    pub async fn access_token(&mut self) -> Result<String, SpotifyError> {
        if self.token.is_none() {
            return Err(SpotifyError::NotAuthenticated);
        }

        if !self.has_valid_token() {
            self.refresh().await?;
        }

        self.token
            .as_ref()
            .map(|record| record.access_token.clone())
            .ok_or(SpotifyError::NotAuthenticated)
    }

    /// Trades the stored refresh token for a new access token.
    ///
    /// Never retried; on failure the caller has to authenticate again.
    pub async fn refresh(&mut self) -> Result<(), SpotifyError> {
        let Some(previous) = self.token.as_ref() else {
            return Err(SpotifyError::RefreshFailed(
                "No refresh token available. Run `spodcli auth` first.".to_string(),
            ));
        };

        let now = self.clock.now_ms();
        let record =
            auth::refresh_grant(self.transport.as_ref(), &self.settings, previous, now).await?;
        tracing::debug!(expires_at = record.expires_at, "access token refreshed");
        self.install(record).await;
        Ok(())
    }

    /// Runs the full first-time flow with the loopback listener and the
    /// browser.
    pub async fn authenticate(&mut self) -> Result<(), SpotifyError> {
        let receiver = LoopbackCallback::from_env()?;
        self.authenticate_with(&receiver).await
    }

    /// Runs the authorization code flow against `receiver`.
    ///
    /// The callback's `state` is checked before anything else is done with
    /// it; a mismatch fails without contacting the token endpoint. No retry
    /// happens within one call.
    pub async fn authenticate_with(
        &mut self,
        receiver: &dyn CallbackReceiver,
    ) -> Result<(), SpotifyError> {
        let mut session = AuthSession::new();
        let authorize_url = match auth::authorize_url(&self.settings, session.state()) {
            Ok(url) => url,
            Err(e) => {
                session.transition(AuthPhase::Failed);
                return Err(e);
            }
        };

        session.transition(AuthPhase::AwaitingCallback);
        let params = match receiver.receive(&authorize_url, session.state()).await {
            Ok(params) => params,
            Err(e) => {
                session.transition(AuthPhase::Failed);
                return Err(e);
            }
        };

        let code = session.accept_callback(&params)?;

        let now = self.clock.now_ms();
        match auth::exchange_code(self.transport.as_ref(), &self.settings, &code, now).await {
            Ok(record) => {
                self.install(record).await;
                session.transition(AuthPhase::Authenticated);
                Ok(())
            }
            Err(e) => {
                session.transition(AuthPhase::Failed);
                Err(e)
            }
        }
    }

    /// Forgets the tokens in memory and on disk. Calling it while
    /// unauthenticated does nothing.
    pub async fn clear_tokens(&mut self) {
        self.token = None;
        if let Err(e) = self.store.clear().await {
            warning!("Failed to clear tokens at {}: {}", self.store.location(), e);
        }
    }

    /// Persists `record` and adopts it in memory. A failed write is reported
    /// but the token stays usable for this process.
    async fn install(&mut self, record: TokenRecord) {
        let result = self.store.save(&record).await;
        self.token = Some(record);
        if let Err(e) = result {
            warning!("Failed to save tokens to {}: {}", self.store.location(), e);
        }
    }
}
