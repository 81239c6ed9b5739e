//! `GlobalOpts`-aware wrappers around `tabloctl-config`.
//!
//! Resolves the active profile, applies CLI flag overrides, and builds
//! the session manager every recorder-touching command starts from.

use std::sync::Arc;
use std::time::Duration;

use tabloctl_api::TransportConfig;
use tabloctl_config::{
    Config, config_path, profile_timeout, profile_to_recorder_config, profile_to_session,
};
use tabloctl_core::{PlayerTarget, SessionManager};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Everything a command needs to talk to the active recorder.
pub struct RecorderStack {
    pub manager: Arc<SessionManager>,
    pub transport: TransportConfig,
    /// Default player from the profile, overridable per command.
    pub roku: Option<PlayerTarget>,
    pub profile_name: String,
}

/// The profile name the command should act on.
pub fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a [`RecorderStack`] from config + CLI overrides, seeding the
/// session from persisted tokens when the profile has them.
pub async fn connect(global: &GlobalOpts) -> Result<RecorderStack, CliError> {
    let cfg = tabloctl_config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let Some(profile) = cfg.profiles.get(&profile_name) else {
        return Err(CliError::NoConfig {
            path: config_path().display().to_string(),
        });
    };

    let transport = TransportConfig {
        timeout: global
            .timeout
            .map_or_else(|| profile_timeout(profile, &cfg.defaults), Duration::from_secs),
    };

    let recorder = profile_to_recorder_config(profile, &profile_name)?;
    let manager = Arc::new(SessionManager::new(recorder, transport.clone())?);

    if let Some(session) = profile_to_session(profile) {
        manager.seed(session).await;
    }

    Ok(RecorderStack {
        manager,
        transport,
        roku: profile.roku.clone().map(PlayerTarget::new),
        profile_name,
    })
}
