use std::sync::Arc;

use axum::{
    Extension,
    extract::RawQuery,
    http::{StatusCode, Uri},
    response::Html,
};
use tokio::sync::{Mutex, oneshot};

use crate::{
    error::SpotifyError, spotify::auth::validate_callback, types::CallbackParams, utils,
};

/// Outcome of the single request the listener serves.
pub type CallbackOutcome = Result<CallbackParams, SpotifyError>;

/// Shared between the handlers of one listener.
///
/// The sender is taken by whichever request arrives first; later requests
/// find it gone.
#[derive(Clone)]
pub struct CallbackState {
    pub expected_state: Arc<String>,
    pub result: Arc<Mutex<Option<oneshot::Sender<CallbackOutcome>>>>,
}

impl CallbackState {
    pub fn new(expected_state: &str, sender: oneshot::Sender<CallbackOutcome>) -> Self {
        Self {
            expected_state: Arc::new(expected_state.to_string()),
            result: Arc::new(Mutex::new(Some(sender))),
        }
    }
}

pub async fn callback(
    RawQuery(query): RawQuery,
    Extension(state): Extension<CallbackState>,
) -> (StatusCode, Html<String>) {
    let params = parse_callback_query(query.as_deref().unwrap_or_default());

    let Some(sender) = state.result.lock().await.take() else {
        return (
            StatusCode::GONE,
            Html(page("Already handled", "This login attempt is already finished.")),
        );
    };

    let response = match validate_callback(&params, &state.expected_state) {
        Ok(_) => (
            StatusCode::OK,
            Html(page(
                "Authentication Successful!",
                "You can close this window and return to the terminal.",
            )),
        ),
        Err(e) => (
            StatusCode::BAD_REQUEST,
            Html(page("Authentication Failed", &utils::escape_html(&e.to_string()))),
        ),
    };

    // the token manager re-validates; the page only mirrors that decision
    let _ = sender.send(Ok(params));
    response
}

pub async fn unexpected_path(
    uri: Uri,
    Extension(state): Extension<CallbackState>,
) -> (StatusCode, Html<String>) {
    if let Some(sender) = state.result.lock().await.take() {
        let _ = sender.send(Err(SpotifyError::AuthenticationFailed(format!(
            "callback received on unexpected path {}",
            uri.path()
        ))));
    }

    (
        StatusCode::NOT_FOUND,
        Html(page("Not Found", "This address only serves the login callback.")),
    )
}

/// Extracts `code`, `state` and `error`; the first occurrence of each wins.
pub fn parse_callback_query(query: &str) -> CallbackParams {
    let mut params = CallbackParams::default();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let slot = match &*key {
            "code" => &mut params.code,
            "state" => &mut params.state,
            "error" => &mut params.error,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value.into_owned());
        }
    }
    params
}

fn page(title: &str, message: &str) -> String {
    format!(
        r#"<html>
  <body style="font-family: sans-serif; text-align: center; padding: 50px;">
    <h1>{title}</h1>
    <p>{message}</p>
  </body>
</html>"#
    )
}
