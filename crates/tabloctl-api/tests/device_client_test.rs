#![allow(clippy::unwrap_used)]
// Integration tests for `DeviceClient` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tabloctl_api::{DeviceClient, Error, TransportConfig};

async fn setup() -> (MockServer, DeviceClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = DeviceClient::new(
        base_url,
        "11111111-2222-3333-4444-555555555555".into(),
        &TransportConfig::default(),
    )
    .unwrap();
    (server, client)
}

#[tokio::test]
async fn server_info_parses_model_and_tuners() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/server/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "server_id": "SID_12345",
            "name": "Tablo",
            "version": "2.2.50",
            "model": { "name": "Tablo 4th Gen", "tuners": 4 },
        })))
        .mount(&server)
        .await;

    let info = client.server_info().await.unwrap();
    assert_eq!(info.server_id.as_deref(), Some("SID_12345"));
    assert_eq!(info.tuners(), 4);
}

#[tokio::test]
async fn server_info_defaults_tuner_count() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/server/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "server_id": "SID_12345",
        })))
        .mount(&server)
        .await;

    let info = client.server_info().await.unwrap();
    assert_eq!(info.tuners(), 2);
}

#[tokio::test]
async fn requests_carry_signed_authorization_and_date() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/server/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    client.server_info().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let auth = requests[0]
        .headers
        .get("authorization")
        .expect("authorization header")
        .to_str()
        .unwrap();
    assert!(auth.starts_with("tablo:"), "unexpected auth header: {auth}");
    assert_eq!(auth.split(':').count(), 3);

    let date = requests[0]
        .headers
        .get("date")
        .expect("date header")
        .to_str()
        .unwrap();
    assert!(date.ends_with("GMT"));
}

#[tokio::test]
async fn watch_channel_posts_player_envelope() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/guide/channels/S122912_503_01/watch"))
        .and(body_partial_json(json!({
            "platform": "ios",
            "device_id": "11111111-2222-3333-4444-555555555555",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "watch-token",
        })))
        .mount(&server)
        .await;

    let resp = client.watch_channel("S122912_503_01").await.unwrap();
    assert_eq!(resp.token.as_deref(), Some("watch-token"));
}

#[tokio::test]
async fn device_401_maps_to_authentication() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/guide/channels/A1/watch"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.watch_channel("A1").await;
    match result {
        Err(ref e @ Error::Authentication { .. }) => assert!(e.is_auth()),
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn device_rejection_maps_to_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/guide/channels/A1/watch"))
        .respond_with(ResponseTemplate::new(503).set_body_string("no tuner available"))
        .mount(&server)
        .await;

    let result = client.watch_channel("A1").await;
    match result {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "no tuner available");
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}
