//! Shared configuration for the Tablo CLI.
//!
//! TOML profiles, credential resolution (keyring + env + plaintext),
//! and translation to `tabloctl_core::RecorderConfig`. Profiles also
//! carry the tokens from the last login so commands can reuse a
//! session without re-authenticating.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use tabloctl_core::{AccountCredentials, RecorderConfig, Session};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("unknown profile '{profile}'")]
    UnknownProfile { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named recorder profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, falling back to the default profile name.
    pub fn profile<'a>(&'a self, name: Option<&'a str>) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        let profile = self
            .profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })?;
        Ok((name, profile))
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    10
}

/// A named recorder profile.
///
/// The `authorization`/`lighthouse`/`device_url` trio is written by
/// `tabloctl login` and seeds a session on later commands; everything
/// else is user-editable.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Account email for (re-)login.
    pub email: Option<String>,

    /// Account password (plaintext — prefer keyring or env var).
    pub password: Option<String>,

    /// Cloud API base URL override; the public cloud when absent.
    pub cloud_url: Option<String>,

    /// Stable per-install device id, generated at first login.
    pub device_id: Option<String>,

    /// Tokens and device binding persisted by the last login.
    pub authorization: Option<String>,
    pub lighthouse: Option<String>,
    pub account_id: Option<String>,
    pub profile_id: Option<String>,
    pub server_id: Option<String>,
    pub device_name: Option<String>,
    pub device_url: Option<String>,
    pub tuners: Option<u32>,

    /// Default player to deep-link after tuning (host or host:port).
    pub roku: Option<String>,

    /// Override request timeout (seconds).
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "tabloctl", "tabloctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("tabloctl");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("TABLO_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the account password from the credential chain.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Env var
    if let Ok(pw) = std::env::var("TABLO_PASSWORD") {
        return Ok(SecretString::from(pw));
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new("tabloctl", &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store the account password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new("tabloctl", &format!("{profile_name}/password")).map_err(
        |e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        },
    )?;
    entry.set_password(password).map_err(|e| ConfigError::Validation {
        field: "keyring".into(),
        reason: e.to_string(),
    })
}

/// Resolve account credentials (email + password), if the profile has
/// an email at all. Token-only profiles legitimately have none.
pub fn resolve_account(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<AccountCredentials>, ConfigError> {
    let Some(email) = profile.email.clone() else {
        return Ok(None);
    };
    let password = resolve_password(profile, profile_name)?;
    Ok(Some(AccountCredentials { email, password }))
}

// ── Translation to core types ───────────────────────────────────────

/// Build a `RecorderConfig` from a profile.
pub fn profile_to_recorder_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<RecorderConfig, ConfigError> {
    let cloud_url: Url = profile
        .cloud_url
        .as_deref()
        .unwrap_or(tabloctl_api::DEFAULT_CLOUD_URL)
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "cloud_url".into(),
            reason: format!("invalid URL: {:?}", profile.cloud_url),
        })?;

    let device_id = profile
        .device_id
        .clone()
        .ok_or_else(|| ConfigError::Validation {
            field: "device_id".into(),
            reason: "missing; run `tabloctl login` first".into(),
        })?;

    let mut config = RecorderConfig::new(cloud_url, device_id);

    if let Some(ref device_url) = profile.device_url {
        let url = device_url.parse().map_err(|_| ConfigError::Validation {
            field: "device_url".into(),
            reason: format!("invalid URL: {device_url}"),
        })?;
        config = config.with_device_url(url);
    }

    if let Some(account) = resolve_account(profile, profile_name)? {
        config = config.with_account(account);
    }

    Ok(config)
}

/// Rebuild a seedable session from the tokens a login persisted.
/// Returns `None` when the profile has never completed a login.
pub fn profile_to_session(profile: &Profile) -> Option<Session> {
    let authorization = profile.authorization.as_ref()?;
    let lighthouse = profile.lighthouse.as_ref()?;
    let device_url: Url = profile.device_url.as_ref()?.parse().ok()?;

    Some(Session::new(
        SecretString::from(authorization.clone()),
        lighthouse.clone(),
        profile.account_id.clone().unwrap_or_default(),
        profile.profile_id.clone().unwrap_or_default(),
        profile.server_id.clone().unwrap_or_default(),
        profile.device_name.clone(),
        device_url,
        profile.tuners.unwrap_or(2),
    ))
}

/// Request timeout for a profile, falling back to global defaults.
#[must_use]
pub fn profile_timeout(profile: &Profile, defaults: &Defaults) -> Duration {
    Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout))
}
