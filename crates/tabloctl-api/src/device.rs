// Local device API HTTP client
//
// The recorder authenticates every request individually: an
// `Authorization: tablo:{device_key}:{signature}` header where the
// signature is HMAC-MD5 over "METHOD\npath\nmd5(body)\ndate". There is
// no session to establish — clock-skewed or malformed signatures come
// back as 401 like any other auth failure.

use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{ServerInfo, WatchResponse};
use crate::transport::TransportConfig;

type HmacMd5 = Hmac<Md5>;

// Shared-secret pair baked into the official Tablo clients.
const DEVICE_KEY: &str = "ljpg6ZkwShVv8aI12E2LP55Ep8vq1uYDPvX0DdTB";
const HASH_KEY: &str = "6l8jU5N43cEilqItmT3U2M2PFM3qPziilXqau9ys";

const SERVER_INFO_PATH: &str = "/server/info";

/// Raw HTTP client for the recorder's local API.
///
/// Carries the per-install device id that the watch envelope reports.
/// Cheap to clone; the underlying `reqwest::Client` is shared.
#[derive(Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    base_url: Url,
    device_id: String,
    timeout_secs: u64,
}

impl DeviceClient {
    /// Create a device client against the recorder's local base URL.
    pub fn new(base_url: Url, device_id: String, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url,
            device_id,
            timeout_secs: transport.timeout_secs(),
        })
    }

    /// The recorder's local base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET /server/info` — identity and tuner count. Doubles as the
    /// reachability probe: it is the cheapest authenticated call the
    /// device answers.
    pub async fn server_info(&self) -> Result<ServerInfo, Error> {
        self.request("GET", SERVER_INFO_PATH, None).await
    }

    /// `POST /guide/channels/{id}/watch` — tune the recorder to the
    /// channel with the given canonical identifier. The device starts
    /// streaming as a side effect; a 2xx status is acceptance.
    pub async fn watch_channel(&self, channel_id: &str) -> Result<WatchResponse, Error> {
        let path = format!("/guide/channels/{channel_id}/watch");
        self.request("POST", &path, Some(self.watch_envelope())).await
    }

    // ── Request plumbing ─────────────────────────────────────────────

    /// The fixed player envelope the device expects on POST bodies.
    fn watch_envelope(&self) -> serde_json::Value {
        json!({
            "bandwidth": null,
            "extra": {
                "limitedAdTracking": 1,
                "deviceOSVersion": "16.6",
                "lang": "en_US",
                "height": 1080,
                "deviceId": "00000000-0000-0000-0000-000000000000",
                "width": 1920,
                "deviceModel": "iPhone10,1",
                "deviceMake": "Apple",
                "deviceOS": "iOS",
            },
            "device_id": self.device_id,
            "platform": "ios",
        })
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, Error> {
        let url = self.base_url.join(path).map_err(Error::InvalidUrl)?;
        let date = http_date();

        // The signature covers the exact body bytes, so serialize once
        // and send that string verbatim.
        let body_str = match &body {
            Some(v) => serde_json::to_string(v).map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: String::new(),
            })?,
            None => String::new(),
        };

        let auth = sign_request(method, path, &body_str, &date)?;

        debug!("{} {}", method, url);

        let mut req = match method {
            "POST" => self.http.post(url),
            _ => self.http.get(url),
        };
        req = req
            .header("Connection", "keep-alive")
            .header("Date", date)
            .header("Accept", "*/*")
            .header("Authorization", auth);

        if !body_str.is_empty() {
            req = req
                .header("Content-Type", "application/json")
                .header("Content-Length", body_str.len().to_string())
                .body(body_str);
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::Timeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                Error::Transport(e)
            }
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "device rejected request signature".into(),
            });
        }

        let text = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Api {
                message: text,
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&text).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body: text,
        })
    }
}

/// RFC 1123 date the device expects in the `Date` header (and signs).
fn http_date() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Build the `Authorization` header value for one device request.
///
/// `tablo:{device_key}:{hmac}` where the hmac is HMAC-MD5 over
/// `"METHOD\npath\nmd5hex(body)\ndate"`, body hash empty for GET.
fn sign_request(method: &str, path: &str, body: &str, date: &str) -> Result<String, Error> {
    let body_hash = if body.is_empty() {
        String::new()
    } else {
        format!("{:x}", Md5::digest(body.as_bytes()))
    };

    let payload = format!("{method}\n{path}\n{body_hash}\n{date}");

    let mut mac = HmacMd5::new_from_slice(HASH_KEY.as_bytes()).map_err(|_| Error::Authentication {
        message: "invalid device signing key".into(),
    })?;
    mac.update(payload.as_bytes());
    let signature = format!("{:x}", mac.finalize().into_bytes());

    Ok(format!("tablo:{DEVICE_KEY}:{signature}"))
}
