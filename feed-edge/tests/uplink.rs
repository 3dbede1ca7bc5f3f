//! Uplink retry contract, exercised against a mock collector.

use std::time::Duration;

use feed_edge::uplink::{PushOutcome, UplinkClient, UplinkConfig, UplinkError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server_uri: &str) -> UplinkClient {
    UplinkClient::new(UplinkConfig {
        login_url: format!("{server_uri}/login"),
        ingest_url: format!("{server_uri}/ingest"),
        username: "testUser".into(),
        password: "testPass".into(),
        send_interval: Duration::from_millis(10),
    })
}

async fn mount_login(server: &MockServer, token: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": token })),
        )
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn refreshes_token_once_and_retries_on_unauthenticated() {
    let server = MockServer::start().await;
    // Initial login plus exactly one refresh.
    mount_login(&server, "fresh", 2).await;

    // First upload rejected as unauthenticated, the retry accepted.
    Mock::given(method("POST"))
        .and(path("/ingest"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ingest"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let outcome = tokio::task::spawn_blocking(move || {
        let mut client = client_for(&uri);
        client.login()?;
        client.push(b"\xff\xd8frame")
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(outcome, PushOutcome::Delivered);
}

#[tokio::test(flavor = "multi_thread")]
async fn does_not_retry_non_auth_failures() {
    let server = MockServer::start().await;
    // Only the initial login; a 500 must not trigger a refresh.
    mount_login(&server, "fresh", 1).await;

    Mock::given(method("POST"))
        .and(path("/ingest"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let outcome = tokio::task::spawn_blocking(move || {
        let mut client = client_for(&uri);
        client.login()?;
        client.push(b"\xff\xd8frame")
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(outcome, PushOutcome::Failed(500));
}

#[tokio::test(flavor = "multi_thread")]
async fn sends_bearer_token_with_frames() {
    let server = MockServer::start().await;
    mount_login(&server, "tok123", 1).await;

    Mock::given(method("POST"))
        .and(path("/ingest"))
        .and(header("authorization", "Bearer tok123"))
        .and(header("content-type", "image/jpeg"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let outcome = tokio::task::spawn_blocking(move || {
        let mut client = client_for(&uri);
        client.login()?;
        client.push(b"\xff\xd8frame")
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(outcome, PushOutcome::Delivered);
}

#[tokio::test(flavor = "multi_thread")]
async fn login_rejection_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let uri = server.uri();
    let result = tokio::task::spawn_blocking(move || {
        let mut client = client_for(&uri);
        client.login()
    })
    .await
    .unwrap();

    assert!(matches!(result, Err(UplinkError::LoginRejected(401))));
}
