//! Login command handler.
//!
//! Runs the full cloud handshake, then persists the tokens and device
//! binding into the active profile so later commands can seed a
//! session without re-authenticating.

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use tabloctl_api::TransportConfig;
use tabloctl_core::{AccountCredentials, RecorderConfig, SessionManager};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config::active_profile_name;
use crate::error::CliError;

pub async fn handle(args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let mut cfg = tabloctl_config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let password = match std::env::var("TABLO_PASSWORD") {
        Ok(pw) => pw,
        Err(_) => rpassword::prompt_password(format!("Password for {}: ", args.email))?,
    };
    if args.keyring {
        tabloctl_config::store_password(&profile_name, &password)?;
    }

    let profile = cfg.profiles.entry(profile_name.clone()).or_default();

    let device_id = profile
        .device_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let cloud_url: Url = profile
        .cloud_url
        .as_deref()
        .unwrap_or(tabloctl_api::DEFAULT_CLOUD_URL)
        .parse()
        .map_err(|_| CliError::Validation {
            field: "cloud_url".into(),
            reason: format!("invalid URL: {:?}", profile.cloud_url),
        })?;

    let transport = TransportConfig {
        timeout: global
            .timeout
            .map_or_else(|| TransportConfig::default().timeout, std::time::Duration::from_secs),
    };

    let recorder = RecorderConfig::new(cloud_url, device_id.clone()).with_account(
        AccountCredentials {
            email: args.email.clone(),
            password: SecretString::from(password),
        },
    );

    let manager = SessionManager::new(recorder, transport).map_err(CliError::from)?;
    let session = manager.acquire().await?;

    profile.email = Some(args.email);
    profile.device_id = Some(device_id);
    profile.authorization = Some(session.authorization.expose_secret().to_owned());
    profile.lighthouse = Some(session.lighthouse.clone());
    profile.account_id = Some(session.account_id.clone());
    profile.profile_id = Some(session.profile_id.clone());
    profile.server_id = Some(session.server_id.clone());
    profile.device_name = session.device_name.clone();
    profile.device_url = Some(session.device_url.to_string());
    profile.tuners = Some(session.tuners);

    if cfg.default_profile.is_none() {
        cfg.default_profile = Some(profile_name.clone());
    }
    tabloctl_config::save_config(&cfg)?;

    if !global.quiet {
        eprintln!(
            "Logged in: {} ({} tuners), profile '{profile_name}'",
            session.device_name.as_deref().unwrap_or(&session.server_id),
            session.tuners,
        );
    }
    Ok(())
}
