#![allow(clippy::unwrap_used)]
// Integration tests for `CloudClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tabloctl_api::{CloudClient, Error, TransportConfig};

async fn setup() -> (MockServer, CloudClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = CloudClient::new(base_url, &TransportConfig::default()).unwrap();
    (server, client)
}

fn bearer() -> SecretString {
    SecretString::from("Bearer test-token".to_string())
}

// ── Login ───────────────────────────────────────────────────────────

#[tokio::test]
async fn login_success_returns_tokens() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/login/"))
        .and(body_json(json!({
            "email": "user@example.com",
            "password": "hunter2",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_type": "Bearer",
            "access_token": "abc123",
        })))
        .mount(&server)
        .await;

    let password = SecretString::from("hunter2".to_string());
    let resp = client.login("user@example.com", &password).await.unwrap();

    assert_eq!(resp.token_type.as_deref(), Some("Bearer"));
    assert_eq!(resp.access_token.as_deref(), Some("abc123"));
}

#[tokio::test]
async fn login_with_inband_error_code_is_auth_failure() {
    let (server, client) = setup().await;

    // The cloud API reports bad credentials with HTTP 200 + code field.
    Mock::given(method("POST"))
        .and(path("/api/v2/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1001,
            "message": "Invalid email or password",
        })))
        .mount(&server)
        .await;

    let password = SecretString::from("wrong".to_string());
    let result = client.login("user@example.com", &password).await;

    match result {
        Err(Error::Authentication { message }) => {
            assert_eq!(message, "Invalid email or password");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn login_missing_token_is_auth_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/login/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let password = SecretString::from("hunter2".to_string());
    let result = client.login("user@example.com", &password).await;
    assert!(matches!(result, Err(Error::Authentication { .. })));
}

// ── Account / select ────────────────────────────────────────────────

#[tokio::test]
async fn account_lists_profiles_and_devices() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/account/"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "identifier": "acct-1",
            "profiles": [{ "identifier": "prof-1", "name": "Living Room" }],
            "devices": [{
                "serverId": "SID_12345",
                "url": "https://192.168.1.50:8887",
                "name": "Tablo",
            }],
        })))
        .mount(&server)
        .await;

    let resp = client.account(&bearer()).await.unwrap();

    assert_eq!(resp.identifier.as_deref(), Some("acct-1"));
    assert_eq!(resp.profiles.len(), 1);
    assert_eq!(resp.devices.len(), 1);
    assert_eq!(resp.devices[0].server_id, "SID_12345");
    assert_eq!(resp.devices[0].url.as_deref(), Some("https://192.168.1.50:8887"));
}

#[tokio::test]
async fn select_device_returns_lighthouse_token() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/account/select/"))
        .and(body_json(json!({ "pid": "prof-1", "sid": "SID_12345" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "lh-token",
        })))
        .mount(&server)
        .await;

    let resp = client
        .select_device(&bearer(), "prof-1", "SID_12345")
        .await
        .unwrap();
    assert_eq!(resp.token.as_deref(), Some("lh-token"));
}

#[tokio::test]
async fn select_device_without_token_is_auth_failure() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/v2/account/select/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let result = client.select_device(&bearer(), "prof-1", "SID_12345").await;
    assert!(matches!(result, Err(Error::Authentication { .. })));
}

// ── Guide channels ──────────────────────────────────────────────────

#[tokio::test]
async fn guide_channels_parses_ota_and_ott() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/account/lh-token/guide/channels/"))
        .and(header("Lighthouse", "lh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "identifier": "S122912_503_01",
                "name": "KTVU",
                "kind": "ota",
                "ota": { "major": 2, "minor": 1, "callSign": "KTVU" },
            },
            {
                "identifier": "OTT_99",
                "name": "FAST Stream",
                "kind": "ott",
                "ott": { "major": 900, "minor": 1, "callSign": "FAST" },
            },
            {
                "identifier": "X_1",
                "name": "Mystery",
                "kind": "vod",
            },
        ])))
        .mount(&server)
        .await;

    let channels = client.guide_channels(&bearer(), "lh-token").await.unwrap();

    assert_eq!(channels.len(), 3);
    assert_eq!(channels[0].numbers().unwrap().display(), "2.1");
    assert_eq!(channels[0].numbers().unwrap().call_sign.as_deref(), Some("KTVU"));
    assert_eq!(channels[1].numbers().unwrap().display(), "900.1");
    // Unknown kinds carry no numbers; upstream filters them out.
    assert!(channels[2].numbers().is_none());
}

#[tokio::test]
async fn expired_cloud_token_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/account/lh-token/guide/channels/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.guide_channels(&bearer(), "lh-token").await;
    match result {
        Err(ref e @ Error::Authentication { .. }) => assert!(e.is_auth()),
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn server_error_maps_to_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/v2/account/"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let result = client.account(&bearer()).await;
    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 502);
            assert_eq!(message, "bad gateway");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}
