// Wire models for the Tablo cloud and device APIs.
//
// Cloud responses report failures in-band: a present `code` field
// means the request was rejected even when HTTP said 200. The clients
// check that before handing models to callers.

use serde::Deserialize;

/// Response to `POST /api/v2/login/`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token_type: Option<String>,
    pub access_token: Option<String>,
    pub code: Option<i64>,
    pub message: Option<String>,
}

/// Response to `GET /api/v2/account/`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
    /// Account identifier.
    pub identifier: Option<String>,
    #[serde(default)]
    pub profiles: Vec<AccountProfile>,
    #[serde(default)]
    pub devices: Vec<AccountDevice>,
    pub code: Option<i64>,
    pub message: Option<String>,
}

/// A viewing profile on the account.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountProfile {
    pub identifier: String,
    pub name: Option<String>,
}

/// A recorder registered to the account.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountDevice {
    #[serde(rename = "serverId")]
    pub server_id: String,
    /// Local base URL of the recorder (e.g. `https://192.168.1.50:8887`).
    pub url: Option<String>,
    pub name: Option<String>,
}

/// Response to `POST /api/v2/account/select/`.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectResponse {
    /// The device-scoped "lighthouse" token.
    pub token: Option<String>,
    pub code: Option<i64>,
    pub message: Option<String>,
}

/// One channel in the guide lineup.
///
/// `kind` discriminates the sub-object carrying the numbers:
/// `"ota"` for over-the-air broadcasts, `"ott"` for streamed services.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelRecord {
    pub identifier: String,
    #[serde(default)]
    pub name: Option<String>,
    pub kind: String,
    pub ota: Option<ChannelNumbers>,
    pub ott: Option<ChannelNumbers>,
}

impl ChannelRecord {
    /// The numbers sub-object matching `kind`, if present and known.
    pub fn numbers(&self) -> Option<&ChannelNumbers> {
        match self.kind.as_str() {
            "ota" => self.ota.as_ref(),
            "ott" => self.ott.as_ref(),
            _ => None,
        }
    }
}

/// Major/minor broadcast numbers plus call sign.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelNumbers {
    pub major: u32,
    pub minor: u32,
    #[serde(rename = "callSign", default)]
    pub call_sign: Option<String>,
}

impl ChannelNumbers {
    /// Human-facing display number, `"major.minor"`.
    pub fn display(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

/// Response to `GET /server/info` on the device.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    pub server_id: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub model: Option<ServerModel>,
}

/// Hardware model block inside [`ServerInfo`].
#[derive(Debug, Clone, Deserialize)]
pub struct ServerModel {
    pub name: Option<String>,
    pub tuners: Option<u32>,
}

impl ServerInfo {
    /// Tuner count, defaulting to 2 when the device omits it.
    pub fn tuners(&self) -> u32 {
        self.model.as_ref().and_then(|m| m.tuners).unwrap_or(2)
    }
}

/// Response to `POST /guide/channels/{id}/watch`.
///
/// Acceptance is signalled by the HTTP status; the body describes the
/// stream the device started and is informational here.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchResponse {
    pub token: Option<String>,
    pub expires: Option<String>,
    pub playlist_url: Option<String>,
}
