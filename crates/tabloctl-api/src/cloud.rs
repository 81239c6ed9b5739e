// Cloud API HTTP client
//
// Wraps `reqwest::Client` with Tablo cloud URL construction and the
// in-band error-code convention (`{ code, message }` on rejection).
// The login handshake itself (sequencing, device verification) lives
// in `tabloctl-core::session` — this client only speaks the wire.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{AccountResponse, ChannelRecord, LoginResponse, SelectResponse};
use crate::transport::TransportConfig;

const LOGIN_PATH: &str = "/api/v2/login/";
const ACCOUNT_PATH: &str = "/api/v2/account/";
const ACCOUNT_SELECT_PATH: &str = "/api/v2/account/select/";

/// Raw HTTP client for the Tablo cloud API.
///
/// All methods return typed wire models with the in-band `code`
/// convention already checked: a response carrying `code` surfaces as
/// [`Error::Authentication`] rather than a model the caller must
/// inspect.
#[derive(Clone)]
pub struct CloudClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl CloudClient {
    /// Create a cloud client against the given base URL.
    ///
    /// Use [`crate::DEFAULT_CLOUD_URL`] in production; tests point this
    /// at a mock server.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            base_url,
            timeout_secs: transport.timeout_secs(),
        })
    }

    /// The cloud base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `POST /api/v2/login/` — exchange account email/password for a
    /// bearer token.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<LoginResponse, Error> {
        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let resp: LoginResponse = self.post(LOGIN_PATH, None, &body).await?;

        if resp.code.is_some() {
            return Err(Error::Authentication {
                message: resp
                    .message
                    .unwrap_or_else(|| "invalid credentials".into()),
            });
        }
        if resp.access_token.is_none() || resp.token_type.is_none() {
            return Err(Error::Authentication {
                message: "login response missing access token".into(),
            });
        }
        Ok(resp)
    }

    /// `GET /api/v2/account/` — profiles and registered recorders.
    pub async fn account(&self, authorization: &SecretString) -> Result<AccountResponse, Error> {
        let resp: AccountResponse = self.get(ACCOUNT_PATH, Some(authorization), None).await?;

        if resp.code.is_some() {
            return Err(Error::Authentication {
                message: resp
                    .message
                    .unwrap_or_else(|| "account fetch rejected".into()),
            });
        }
        Ok(resp)
    }

    /// `POST /api/v2/account/select/` — bind a profile + recorder pair,
    /// yielding the device-scoped lighthouse token.
    pub async fn select_device(
        &self,
        authorization: &SecretString,
        profile_id: &str,
        server_id: &str,
    ) -> Result<SelectResponse, Error> {
        let body = json!({ "pid": profile_id, "sid": server_id });
        let resp: SelectResponse = self
            .post(ACCOUNT_SELECT_PATH, Some(authorization), &body)
            .await?;

        if resp.code.is_some() || resp.token.is_none() {
            return Err(Error::Authentication {
                message: resp
                    .message
                    .unwrap_or_else(|| "device selection rejected".into()),
            });
        }
        Ok(resp)
    }

    /// `GET /api/v2/account/{lighthouse}/guide/channels/` — full
    /// channel lineup for the selected recorder.
    pub async fn guide_channels(
        &self,
        authorization: &SecretString,
        lighthouse: &str,
    ) -> Result<Vec<ChannelRecord>, Error> {
        let path = format!("/api/v2/account/{lighthouse}/guide/channels/");
        self.get(&path, Some(authorization), Some(lighthouse)).await
    }

    // ── Request helpers ──────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        authorization: Option<&SecretString>,
        lighthouse: Option<&str>,
    ) -> Result<T, Error> {
        let url = self.base_url.join(path).map_err(Error::InvalidUrl)?;
        debug!("GET {}", url);

        let mut req = self.http.get(url);
        if let Some(auth) = authorization {
            req = req.header("Authorization", auth.expose_secret());
        }
        if let Some(token) = lighthouse {
            req = req.header("Lighthouse", token);
        }

        let resp = req.send().await.map_err(|e| self.map_send_error(e))?;
        self.parse_response(resp).await
    }

    async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        authorization: Option<&SecretString>,
        body: &serde_json::Value,
    ) -> Result<T, Error> {
        let url = self.base_url.join(path).map_err(Error::InvalidUrl)?;
        debug!("POST {}", url);

        let mut req = self.http.post(url).json(body);
        if let Some(auth) = authorization {
            req = req.header("Authorization", auth.expose_secret());
        }

        let resp = req.send().await.map_err(|e| self.map_send_error(e))?;
        self.parse_response(resp).await
    }

    fn map_send_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(e)
        }
    }

    async fn parse_response<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(Error::Authentication {
                message: "cloud token expired or invalid".into(),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;

        if !status.is_success() {
            return Err(Error::Api {
                message: body,
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: e.to_string(),
            body,
        })
    }
}
