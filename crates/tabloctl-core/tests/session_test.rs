#![allow(clippy::unwrap_used)]
// Session manager integration tests: handshake, caching, and the
// renew-and-retry-once policy, all against wiremock.

use std::sync::Arc;

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tabloctl_api::TransportConfig;
use tabloctl_core::{AccountCredentials, CoreError, RecorderConfig, Session, SessionManager};

const DEVICE_ID: &str = "11111111-2222-3333-4444-555555555555";
const GUIDE_PATH: &str = "/api/v2/account/lh-token/guide/channels/";

fn credentials() -> AccountCredentials {
    AccountCredentials {
        email: "user@example.com".into(),
        password: SecretString::from("hunter2".to_string()),
    }
}

fn manager_for(server: &MockServer) -> Arc<SessionManager> {
    let cloud_url = Url::parse(&server.uri()).unwrap();
    let config = RecorderConfig::new(cloud_url, DEVICE_ID.into()).with_account(credentials());
    Arc::new(SessionManager::new(config, TransportConfig::default()).unwrap())
}

/// Mount the full happy-path handshake. The account response points the
/// device URL back at the mock server so `/server/info` lands there too.
async fn mount_handshake(server: &MockServer, expected_logins: u64) {
    Mock::given(method("POST"))
        .and(path("/api/v2/login/"))
        .and(body_json(json!({
            "email": "user@example.com",
            "password": "hunter2",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": "fresh-token",
        })))
        .expect(expected_logins)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v2/account/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "identifier": "acct-1",
            "profiles": [{ "identifier": "prof-1", "name": "Default" }],
            "devices": [{
                "serverId": "SID_12345",
                "url": server.uri(),
                "name": "Living Room Tablo",
            }],
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/v2/account/select/"))
        .and(body_json(json!({ "pid": "prof-1", "sid": "SID_12345" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "lh-token",
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/server/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "server_id": "SID_12345",
            "model": { "name": "Tablo 4th Gen", "tuners": 4 },
        })))
        .mount(server)
        .await;
}

fn stale_session(server: &MockServer) -> Session {
    Session::new(
        SecretString::from("Bearer stale-token".to_string()),
        "lh-token".into(),
        "acct-1".into(),
        "prof-1".into(),
        "SID_12345".into(),
        None,
        Url::parse(&server.uri()).unwrap(),
        2,
    )
}

#[tokio::test]
async fn handshake_logs_in_selects_device_and_probes_it() {
    let server = MockServer::start().await;
    mount_handshake(&server, 1).await;
    let manager = manager_for(&server);

    let session = manager.acquire().await.unwrap();

    assert_eq!(session.lighthouse, "lh-token");
    assert_eq!(session.account_id, "acct-1");
    assert_eq!(session.profile_id, "prof-1");
    assert_eq!(session.server_id, "SID_12345");
    assert_eq!(session.device_name.as_deref(), Some("Living Room Tablo"));
    assert_eq!(session.tuners, 4);
}

#[tokio::test]
async fn concurrent_acquires_share_one_login() {
    let server = MockServer::start().await;
    // `.expect(1)` on the login mock is the assertion here.
    mount_handshake(&server, 1).await;
    let manager = manager_for(&server);

    let (a, b) = tokio::join!(manager.acquire(), manager.acquire());
    let (a, b) = (a.unwrap(), b.unwrap());
    assert!(Arc::ptr_eq(&a, &b));

    // Still cached for later callers.
    manager.acquire().await.unwrap();
}

#[tokio::test]
async fn with_session_renews_and_retries_once_on_auth_failure() {
    let server = MockServer::start().await;

    // First guide fetch rejects the seeded token; the retry succeeds.
    Mock::given(method("GET"))
        .and(path(GUIDE_PATH))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(GUIDE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    mount_handshake(&server, 1).await;

    let manager = manager_for(&server);
    manager.seed(stale_session(&server)).await;

    let cloud = manager.cloud().clone();
    let channels = manager
        .with_session(move |session| {
            let cloud = cloud.clone();
            async move {
                cloud
                    .guide_channels(&session.authorization, &session.lighthouse)
                    .await
            }
        })
        .await
        .unwrap();

    assert!(channels.is_empty());
}

#[tokio::test]
async fn with_session_gives_up_after_second_auth_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(GUIDE_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    // Exactly one re-login between the two failures.
    mount_handshake(&server, 1).await;

    let manager = manager_for(&server);
    manager.seed(stale_session(&server)).await;

    let cloud = manager.cloud().clone();
    let result = manager
        .with_session(move |session| {
            let cloud = cloud.clone();
            async move {
                cloud
                    .guide_channels(&session.authorization, &session.lighthouse)
                    .await
            }
        })
        .await;

    assert!(matches!(result, Err(CoreError::AuthFailure { .. })));
}

#[tokio::test]
async fn acquire_without_credentials_fails() {
    let server = MockServer::start().await;
    let cloud_url = Url::parse(&server.uri()).unwrap();
    let config = RecorderConfig::new(cloud_url, DEVICE_ID.into());
    let manager = SessionManager::new(config, TransportConfig::default()).unwrap();

    let result = manager.acquire().await;
    assert!(matches!(result, Err(CoreError::AuthFailure { .. })));
    // Nothing was even attempted on the wire.
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn handshake_with_no_registered_recorders_fails() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": "fresh-token",
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/account/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "identifier": "acct-1",
            "profiles": [{ "identifier": "prof-1" }],
            "devices": [],
        })))
        .mount(&server)
        .await;

    let manager = manager_for(&server);
    let result = manager.acquire().await;

    match result {
        Err(CoreError::Api { message, .. }) => {
            assert!(message.contains("no registered recorders"), "got: {message}");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn bad_credentials_surface_as_auth_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1001,
            "message": "Invalid email or password",
        })))
        .mount(&server)
        .await;

    let manager = manager_for(&server);
    let result = manager.acquire().await;

    match result {
        Err(CoreError::AuthFailure { message }) => {
            assert_eq!(message, "Invalid email or password");
        }
        other => panic!("expected AuthFailure, got: {other:?}"),
    }
}
