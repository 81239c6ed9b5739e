// Runtime wiring for the coordination layer.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Default lifetime of a cloud session before a fresh login.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Account credentials used for the cloud login handshake.
#[derive(Clone)]
pub struct AccountCredentials {
    pub email: String,
    pub password: SecretString,
}

impl std::fmt::Debug for AccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything the session manager needs to reach one recorder.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Cloud API base, normally [`tabloctl_api::DEFAULT_CLOUD_URL`].
    pub cloud_url: Url,
    /// Local device base URL, when already known from a prior login.
    /// The handshake discovers it from the account otherwise.
    pub device_url: Option<Url>,
    /// Stable per-install id reported in watch envelopes.
    pub device_id: String,
    /// Credentials for (re-)login; absent means sessions can only be
    /// seeded from persisted tokens and never re-acquired.
    pub account: Option<AccountCredentials>,
    /// How long an acquired session stays trusted.
    pub session_ttl: Duration,
}

impl RecorderConfig {
    #[must_use]
    pub fn new(cloud_url: Url, device_id: String) -> Self {
        Self {
            cloud_url,
            device_url: None,
            device_id,
            account: None,
            session_ttl: DEFAULT_SESSION_TTL,
        }
    }

    #[must_use]
    pub fn with_account(mut self, account: AccountCredentials) -> Self {
        self.account = Some(account);
        self
    }

    #[must_use]
    pub fn with_device_url(mut self, device_url: Url) -> Self {
        self.device_url = Some(device_url);
        self
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }
}
