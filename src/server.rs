use std::{net::SocketAddr, time::Duration};

use axum::{Extension, Router, routing::any};
use tokio::{net::TcpListener, sync::oneshot};

use crate::{
    api::{self, CallbackState},
    config,
    error::SpotifyError,
    types::CallbackParams,
};

/// How long the listener may take to flush its last response and stop.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Loopback listener that serves exactly one request, then stops.
pub struct CallbackServer {
    listener: TcpListener,
}

impl CallbackServer {
    pub async fn bind(addr: SocketAddr) -> Result<Self, SpotifyError> {
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            SpotifyError::AuthenticationFailed(format!(
                "Failed to start callback listener on {}: {}",
                addr, e
            ))
        })?;
        tracing::debug!(%addr, "callback listener bound");
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, SpotifyError> {
        self.listener
            .local_addr()
            .map_err(|e| SpotifyError::AuthenticationFailed(e.to_string()))
    }

    /// Waits for the redirect and returns its query parameters.
    ///
    /// The listener is torn down whatever happens: after the first request
    /// (well-formed or not), on timeout, or on Ctrl-C.
    pub async fn serve_once(
        self,
        expected_state: &str,
        timeout: Duration,
    ) -> Result<CallbackParams, SpotifyError> {
        let (result_tx, result_rx) = oneshot::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = Router::new()
            .route(config::CALLBACK_PATH, any(api::callback))
            .fallback(api::unexpected_path)
            .layer(Extension(CallbackState::new(expected_state, result_tx)));

        let server = tokio::spawn(async move {
            axum::serve(self.listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        let outcome = tokio::select! {
            received = tokio::time::timeout(timeout, result_rx) => match received {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => Err(SpotifyError::AuthenticationFailed(
                    "callback listener stopped unexpectedly".to_string(),
                )),
                Err(_) => Err(SpotifyError::AuthenticationFailed(format!(
                    "timed out after {}s waiting for the browser redirect",
                    timeout.as_secs()
                ))),
            },
            // the SIGINT handler stays installed for the rest of the process, so a
            // later Ctrl-C during the code exchange waits out the request timeout
            Ok(()) = tokio::signal::ctrl_c() => Err(SpotifyError::AuthenticationFailed(
                "cancelled while waiting for the browser redirect".to_string(),
            )),
        };

        let _ = shutdown_tx.send(());
        match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
            Ok(Ok(Ok(()))) => tracing::debug!("callback listener stopped"),
            Ok(Ok(Err(e))) => tracing::debug!(error = %e, "callback listener ended with error"),
            Ok(Err(e)) => tracing::debug!(error = %e, "callback listener task failed"),
            Err(_) => tracing::debug!("callback listener did not stop in time"),
        }

        outcome
    }
}
