#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{
        Arc, Mutex,
        atomic::{AtomicI64, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use serde_json::json;
use spodcli::{
    config::OAuthSettings,
    error::{SpotifyError, StoreError},
    management::{TokenManager, TokenStore},
    spotify::{Clock, HttpReply, Transport, TransportError, auth::CallbackReceiver},
    types::{CallbackParams, TokenRecord},
};

pub const TOKEN_URL: &str = "https://accounts.test/api/token";
pub const API_URL: &str = "https://api.test/v1";

/// Fixed starting point for the manual clock (2024-01-15T10:00:00Z).
pub const NOW: i64 = 1_705_312_800_000;

pub fn settings() -> OAuthSettings {
    let mut settings = OAuthSettings::new("id", "secret");
    settings.token_url = TOKEN_URL.to_string();
    settings
}

pub fn record(access: &str, refresh: &str, expires_at: i64) -> TokenRecord {
    TokenRecord {
        access_token: access.to_string(),
        refresh_token: refresh.to_string(),
        expires_at,
        token_type: "Bearer".to_string(),
        scope: "user-library-read".to_string(),
    }
}

pub fn ok(body: serde_json::Value) -> Result<HttpReply, TransportError> {
    Ok(HttpReply {
        status: 200,
        body: body.to_string(),
    })
}

pub fn status(code: u16, body: &str) -> Result<HttpReply, TransportError> {
    Ok(HttpReply {
        status: code,
        body: body.to_string(),
    })
}

/// Token endpoint reply; `refresh` is left out of the body when `None`.
pub fn token_reply(
    access: &str,
    refresh: Option<&str>,
    expires_in: i64,
) -> Result<HttpReply, TransportError> {
    let mut body = json!({
        "access_token": access,
        "token_type": "Bearer",
        "expires_in": expires_in,
        "scope": "user-library-read user-read-private user-read-email",
    });
    if let Some(refresh) = refresh {
        body["refresh_token"] = json!(refresh);
    }
    ok(body)
}

/// In-memory store whose contents stay visible to the test after the
/// manager takes ownership of a clone.
#[derive(Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<TokenRecord>>>,
    saves: Arc<AtomicUsize>,
    clears: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn with(record: TokenRecord) -> Self {
        let store = Self::default();
        *store.slot.lock().unwrap() = Some(record);
        store
    }

    pub fn stored(&self) -> Option<TokenRecord> {
        self.slot.lock().unwrap().clone()
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    async fn load(&self) -> Result<Option<TokenRecord>, StoreError> {
        Ok(self.stored())
    }

    async fn save(&self, record: &TokenRecord) -> Result<(), StoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.slot.lock().unwrap() = Some(record.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        *self.slot.lock().unwrap() = None;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

/// Loads `initial` but rejects every write.
pub struct FailingStore {
    initial: Option<TokenRecord>,
}

impl FailingStore {
    pub fn new(initial: Option<TokenRecord>) -> Self {
        Self { initial }
    }
}

#[async_trait]
impl TokenStore for FailingStore {
    async fn load(&self) -> Result<Option<TokenRecord>, StoreError> {
        Ok(self.initial.clone())
    }

    async fn save(&self, _record: &TokenRecord) -> Result<(), StoreError> {
        Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only file system",
        )))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn location(&self) -> String {
        "read-only".to_string()
    }
}

#[derive(Debug, Clone)]
pub struct PostCall {
    pub url: String,
    pub authorization: String,
    pub form: Vec<(String, String)>,
}

impl PostCall {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct GetCall {
    pub url: String,
    pub bearer: String,
    pub query: Vec<(String, String)>,
}

/// Replays queued replies and records every request it sees.
#[derive(Default)]
pub struct ScriptedTransport {
    post_replies: Mutex<VecDeque<Result<HttpReply, TransportError>>>,
    get_replies: Mutex<VecDeque<Result<HttpReply, TransportError>>>,
    posts: Mutex<Vec<PostCall>>,
    gets: Mutex<Vec<GetCall>>,
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_post(&self, reply: Result<HttpReply, TransportError>) {
        self.post_replies.lock().unwrap().push_back(reply);
    }

    pub fn push_get(&self, reply: Result<HttpReply, TransportError>) {
        self.get_replies.lock().unwrap().push_back(reply);
    }

    pub fn posts(&self) -> Vec<PostCall> {
        self.posts.lock().unwrap().clone()
    }

    pub fn gets(&self) -> Vec<GetCall> {
        self.gets.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post_form(
        &self,
        url: &str,
        authorization: &str,
        form: &[(&str, &str)],
    ) -> Result<HttpReply, TransportError> {
        self.posts.lock().unwrap().push(PostCall {
            url: url.to_string(),
            authorization: authorization.to_string(),
            form: form
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        self.post_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Failed("no scripted POST reply".to_string())))
    }

    async fn get(
        &self,
        url: &str,
        bearer: &str,
        query: &[(String, String)],
    ) -> Result<HttpReply, TransportError> {
        self.gets.lock().unwrap().push(GetCall {
            url: url.to_string(),
            bearer: bearer.to_string(),
            query: query.to_vec(),
        });
        self.get_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Failed("no scripted GET reply".to_string())))
    }
}

pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn at(now: i64) -> Arc<Self> {
        Arc::new(Self {
            now: AtomicI64::new(now),
        })
    }

    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// What the fake browser redirect carries back.
pub enum Redirect {
    /// `code` with the state the flow generated
    Approve(&'static str),
    /// `code` with some other state
    ForgedState(&'static str),
    /// `error=<reason>` with the right state
    Deny(&'static str),
    /// The listener itself failed
    Fail(SpotifyError),
}

pub struct ScriptedReceiver {
    redirect: Redirect,
    seen_url: Mutex<Option<String>>,
}

impl ScriptedReceiver {
    pub fn new(redirect: Redirect) -> Self {
        Self {
            redirect,
            seen_url: Mutex::new(None),
        }
    }

    pub fn seen_url(&self) -> Option<String> {
        self.seen_url.lock().unwrap().clone()
    }
}

#[async_trait]
impl CallbackReceiver for ScriptedReceiver {
    async fn receive(
        &self,
        authorize_url: &str,
        expected_state: &str,
    ) -> Result<CallbackParams, SpotifyError> {
        *self.seen_url.lock().unwrap() = Some(authorize_url.to_string());
        match &self.redirect {
            Redirect::Approve(code) => Ok(CallbackParams {
                code: Some(code.to_string()),
                state: Some(expected_state.to_string()),
                error: None,
            }),
            Redirect::ForgedState(code) => Ok(CallbackParams {
                code: Some(code.to_string()),
                state: Some("forged-state".to_string()),
                error: None,
            }),
            Redirect::Deny(reason) => Ok(CallbackParams {
                code: None,
                state: Some(expected_state.to_string()),
                error: Some(reason.to_string()),
            }),
            Redirect::Fail(err) => Err(err.clone()),
        }
    }
}

pub async fn manager(
    store: &MemoryStore,
    transport: &Arc<ScriptedTransport>,
    clock: &Arc<ManualClock>,
) -> TokenManager {
    TokenManager::load_with(
        settings(),
        Box::new(store.clone()),
        transport.clone(),
        clock.clone(),
    )
    .await
}
