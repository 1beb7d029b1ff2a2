use std::{net::SocketAddr, time::Duration};

use spodcli::{
    error::SpotifyError, server::CallbackServer, spotify::auth::validate_callback,
    types::CallbackParams,
};
use tokio::task::JoinHandle;

const STATE: &str = "0123456789abcdef0123456789abcdef";

async fn start(timeout: Duration) -> (SocketAddr, JoinHandle<Result<CallbackParams, SpotifyError>>) {
    let server = CallbackServer::bind("127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    let addr = server.local_addr().unwrap();
    let handle = tokio::spawn(async move { server.serve_once(STATE, timeout).await });
    (addr, handle)
}

fn http() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_redirect_with_code_is_delivered() {
    let (addr, handle) = start(Duration::from_secs(5)).await;

    let response = http()
        .get(format!("http://{}/callback?code=auth-code&state={}", addr, STATE))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("Authentication Successful"));

    let params = handle.await.unwrap().unwrap();
    assert_eq!(params.code.as_deref(), Some("auth-code"));
    assert_eq!(params.state.as_deref(), Some(STATE));
    assert_eq!(validate_callback(&params, STATE).unwrap(), "auth-code");
}

#[tokio::test]
async fn test_state_mismatch_shows_error_page() {
    let (addr, handle) = start(Duration::from_secs(5)).await;

    let response = http()
        .get(format!("http://{}/callback?code=auth-code&state=forged", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    assert!(response.text().await.unwrap().contains("State mismatch"));

    // the raw parameters still reach the flow, which rejects them itself
    let params = handle.await.unwrap().unwrap();
    assert!(validate_callback(&params, STATE).is_err());
}

#[tokio::test]
async fn test_denied_authorization_shows_error_page() {
    let (addr, handle) = start(Duration::from_secs(5)).await;

    let response = http()
        .get(format!(
            "http://{}/callback?error=access_denied&state={}",
            addr, STATE
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    assert!(response.text().await.unwrap().contains("access_denied"));

    let params = handle.await.unwrap().unwrap();
    assert_eq!(params.error.as_deref(), Some("access_denied"));
}

#[tokio::test]
async fn test_unexpected_path_ends_the_attempt() {
    let (addr, handle) = start(Duration::from_secs(5)).await;

    let response = http()
        .get(format!("http://{}/favicon.ico", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    match handle.await.unwrap() {
        Err(SpotifyError::AuthenticationFailed(detail)) => {
            assert!(detail.contains("/favicon.ico"))
        }
        other => panic!("expected AuthenticationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_listener_times_out() {
    let (_, handle) = start(Duration::from_millis(200)).await;

    match handle.await.unwrap() {
        Err(SpotifyError::AuthenticationFailed(detail)) => assert!(detail.contains("timed out")),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_listener_stops_after_one_request() {
    let (addr, handle) = start(Duration::from_secs(5)).await;

    http()
        .get(format!("http://{}/callback?code=c&state={}", addr, STATE))
        .send()
        .await
        .unwrap();
    handle.await.unwrap().unwrap();

    let second = http()
        .get(format!("http://{}/callback?code=c&state={}", addr, STATE))
        .timeout(Duration::from_secs(2))
        .send()
        .await;
    assert!(second.is_err());
}

#[tokio::test]
async fn test_port_in_use_is_reported() {
    let first = CallbackServer::bind("127.0.0.1:0".parse().unwrap())
        .await
        .unwrap();
    let addr = first.local_addr().unwrap();

    match CallbackServer::bind(addr).await {
        Err(SpotifyError::AuthenticationFailed(detail)) => {
            assert!(detail.contains("Failed to start callback listener"))
        }
        Err(other) => panic!("unexpected error {:?}", other),
        Ok(_) => panic!("second bind on {} succeeded", addr),
    }
}

#[tokio::test]
async fn test_non_get_request_still_ends_the_listener() {
    let (addr, handle) = start(Duration::from_secs(30)).await;

    let response = http()
        .post(format!("http://{}/callback?code=auth-code&state={}", addr, STATE))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let outcome = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("listener kept running after its request")
        .unwrap();
    assert_eq!(outcome.unwrap().code.as_deref(), Some("auth-code"));
}
