use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;

use crate::config;

/// Status code and raw body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Why an exchange produced no HTTP reply at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Timeout,
    Failed(String),
}

/// The two HTTP shapes this crate needs: a form POST to the token endpoint
/// and an authenticated GET against the Web API.
///
/// Implementations never retry and never interpret status codes.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POSTs `form` url-encoded with the given `Authorization` header value.
    async fn post_form(
        &self,
        url: &str,
        authorization: &str,
        form: &[(&str, &str)],
    ) -> Result<HttpReply, TransportError>;

    /// GETs `url` with `query` appended and `bearer` as the credential.
    async fn get(
        &self,
        url: &str,
        bearer: &str,
        query: &[(String, String)],
    ) -> Result<HttpReply, TransportError>;
}

/// [`Transport`] backed by reqwest with a fixed per-request timeout.
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::with_timeout(config::REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }

    async fn finish(
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<HttpReply, TransportError> {
        let response = response.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_reqwest_error)?;
        Ok(HttpReply { status, body })
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_form(
        &self,
        url: &str,
        authorization: &str,
        form: &[(&str, &str)],
    ) -> Result<HttpReply, TransportError> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .form(form)
            .timeout(self.timeout)
            .send()
            .await;
        Self::finish(response).await
    }

    async fn get(
        &self,
        url: &str,
        bearer: &str,
        query: &[(String, String)],
    ) -> Result<HttpReply, TransportError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(bearer)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await;
        Self::finish(response).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Failed(err.to_string())
    }
}

/// Source of "now" in milliseconds since the epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
