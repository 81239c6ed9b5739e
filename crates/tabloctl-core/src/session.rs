// Session acquisition and renewal.
//
// One async mutex around the cached session gives single-flight login:
// concurrent callers needing a session queue on the lock and all but
// the first find it freshly populated. `with_session` wraps an API
// call with the renew-and-retry-once policy for expired credentials.

use std::sync::Arc;
use std::time::{Duration, Instant};

use secrecy::SecretString;
use tabloctl_api::{CloudClient, DeviceClient, TransportConfig};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::RecorderConfig;
use crate::error::CoreError;

/// An authenticated cloud session bound to one recorder.
#[derive(Debug, Clone)]
pub struct Session {
    /// Full `Authorization` header value (`"Bearer …"`).
    pub authorization: SecretString,
    /// Device-scoped lighthouse token for guide endpoints.
    pub lighthouse: String,
    pub account_id: String,
    pub profile_id: String,
    pub server_id: String,
    pub device_name: Option<String>,
    /// Local base URL of the selected recorder.
    pub device_url: Url,
    pub tuners: u32,
    acquired_at: Instant,
}

impl Session {
    /// Build a session, stamping it as acquired now. Used both by the
    /// handshake and by callers seeding from persisted tokens.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        authorization: SecretString,
        lighthouse: String,
        account_id: String,
        profile_id: String,
        server_id: String,
        device_name: Option<String>,
        device_url: Url,
        tuners: u32,
    ) -> Self {
        Self {
            authorization,
            lighthouse,
            account_id,
            profile_id,
            server_id,
            device_name,
            device_url,
            tuners,
            acquired_at: Instant::now(),
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        self.acquired_at.elapsed() >= ttl
    }
}

/// Owns the cached session and the login handshake.
pub struct SessionManager {
    cloud: CloudClient,
    transport: TransportConfig,
    config: RecorderConfig,
    state: Mutex<Option<Arc<Session>>>,
}

impl SessionManager {
    pub fn new(config: RecorderConfig, transport: TransportConfig) -> Result<Self, CoreError> {
        let cloud = CloudClient::new(config.cloud_url.clone(), &transport)?;
        Ok(Self {
            cloud,
            transport,
            config,
            state: Mutex::new(None),
        })
    }

    /// The cloud client this manager authenticates against.
    #[must_use]
    pub fn cloud(&self) -> &CloudClient {
        &self.cloud
    }

    /// A device client bound to the session's recorder.
    pub fn device_client(&self, session: &Session) -> Result<DeviceClient, CoreError> {
        Ok(DeviceClient::new(
            session.device_url.clone(),
            self.config.device_id.clone(),
            &self.transport,
        )?)
    }

    /// Install a session from persisted tokens. It is trusted until it
    /// ages out or an API call rejects it.
    pub async fn seed(&self, session: Session) {
        let mut state = self.state.lock().await;
        *state = Some(Arc::new(session));
    }

    /// Return the cached session, running the login handshake if none
    /// is cached or the cached one has aged out.
    pub async fn acquire(&self) -> Result<Arc<Session>, CoreError> {
        let mut state = self.state.lock().await;
        if let Some(session) = state.as_ref() {
            if !session.is_expired(self.config.session_ttl) {
                return Ok(Arc::clone(session));
            }
            debug!("cached session aged out");
        }

        let session = Arc::new(self.handshake().await?);
        *state = Some(Arc::clone(&session));
        Ok(session)
    }

    /// Drop the cached session so the next acquire re-authenticates.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        if state.take().is_some() {
            debug!("session invalidated");
        }
    }

    /// Run `op` with a session, renewing and retrying exactly once if
    /// it fails with an authentication error. A second auth failure
    /// surfaces as [`CoreError::AuthFailure`].
    pub async fn with_session<T, F, Fut>(&self, op: F) -> Result<T, CoreError>
    where
        F: Fn(Arc<Session>) -> Fut,
        Fut: Future<Output = Result<T, tabloctl_api::Error>>,
    {
        let session = self.acquire().await?;
        match op(Arc::clone(&session)).await {
            Ok(value) => Ok(value),
            Err(e) if e.is_auth() => {
                warn!("session rejected, re-authenticating once");
                self.invalidate().await;
                let fresh = self.acquire().await?;
                op(fresh).await.map_err(CoreError::from)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The full cloud handshake: login, pick a profile and recorder,
    /// bind them for a lighthouse token, then verify the recorder
    /// answers on its local URL.
    async fn handshake(&self) -> Result<Session, CoreError> {
        let Some(account) = &self.config.account else {
            return Err(CoreError::AuthFailure {
                message: "no stored credentials; log in first".into(),
            });
        };

        let login = self.cloud.login(&account.email, &account.password).await?;
        let (token_type, access_token) = match (login.token_type, login.access_token) {
            (Some(t), Some(a)) => (t, a),
            _ => {
                return Err(CoreError::AuthFailure {
                    message: "login response missing access token".into(),
                });
            }
        };
        let authorization = SecretString::from(format!("{token_type} {access_token}"));

        let account_resp = self.cloud.account(&authorization).await?;
        let account_id = account_resp.identifier.clone().unwrap_or_default();

        let profile = account_resp.profiles.first().ok_or_else(|| CoreError::Api {
            message: "account has no profiles".into(),
            status: None,
        })?;

        // Prefer the recorder we were configured against; otherwise the
        // account's first registered device.
        let device = self
            .config
            .device_url
            .as_ref()
            .and_then(|url| {
                account_resp
                    .devices
                    .iter()
                    .find(|d| d.url.as_deref() == Some(url.as_str().trim_end_matches('/')))
            })
            .or_else(|| account_resp.devices.first())
            .ok_or_else(|| CoreError::Api {
                message: "account has no registered recorders".into(),
                status: None,
            })?;

        let device_url_str = device.url.as_deref().ok_or_else(|| CoreError::Api {
            message: format!("recorder {} reports no local URL", device.server_id),
            status: None,
        })?;
        let device_url = Url::parse(device_url_str)
            .map_err(|e| CoreError::Internal(format!("bad recorder URL {device_url_str}: {e}")))?;

        let select = self
            .cloud
            .select_device(&authorization, &profile.identifier, &device.server_id)
            .await?;
        let lighthouse = select.token.ok_or_else(|| CoreError::AuthFailure {
            message: "device selection returned no lighthouse token".into(),
        })?;

        // Confirm the recorder actually answers locally before handing
        // the session out.
        let probe = DeviceClient::new(
            device_url.clone(),
            self.config.device_id.clone(),
            &self.transport,
        )?;
        let info = probe.server_info().await?;

        info!(
            server_id = %device.server_id,
            device = device.name.as_deref().unwrap_or("recorder"),
            tuners = info.tuners(),
            "session established"
        );

        Ok(Session::new(
            authorization,
            lighthouse,
            account_id,
            profile.identifier.clone(),
            device.server_id.clone(),
            device.name.clone(),
            device_url,
            info.tuners(),
        ))
    }
}
