// Player hand-off after a successful tune.
//
// The launch step is isolated by contract: the pipeline treats a
// failure here as a warning, never as a tune failure, because the
// recorder is already streaming by the time a launcher runs.

use std::fmt;

use serde::Serialize;
use tabloctl_api::TransportConfig;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::model::{ChannelEntry, PlayerTarget};

/// Roku channel-store id of the Tablo app.
const ROKU_APP_ID: &str = "41972";
/// Roku External Control Protocol port.
const ECP_PORT: u16 = 8060;

/// Deep link instructing a player app to open live playback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeepLink {
    pub app_id: String,
    pub content_id: String,
    pub media_type: String,
}

impl DeepLink {
    /// Deep link for live playback of one channel in the Tablo app.
    #[must_use]
    pub fn live_channel(entry: &ChannelEntry) -> Self {
        Self {
            app_id: ROKU_APP_ID.into(),
            content_id: entry.identifier.clone(),
            media_type: "live".into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("player target is invalid: {message}")]
    InvalidTarget { message: String },
    #[error("player request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("player rejected launch with status {status}")]
    Rejected { status: u16 },
}

/// Anything that can point a player at a deep link.
///
/// Implementations must be infallible to construct per-launch state;
/// the pipeline calls `launch` at most once per tune.
pub trait PlayerLauncher: Send + Sync {
    fn launch(
        &self,
        target: &PlayerTarget,
        link: &DeepLink,
    ) -> impl Future<Output = Result<(), LaunchError>> + Send;
}

/// Launches the Tablo app on a Roku over ECP.
///
/// Fire-and-forget: one POST, no retry, no device discovery. ECP
/// answers on the LAN only, so failures are common and benign (player
/// powered off, wrong input) and the caller downgrades them anyway.
#[derive(Clone)]
pub struct RokuLauncher {
    http: reqwest::Client,
}

impl RokuLauncher {
    pub fn new(transport: &TransportConfig) -> Result<Self, LaunchError> {
        Ok(Self {
            http: transport.build_client().map_err(|e| LaunchError::InvalidTarget {
                message: e.to_string(),
            })?,
        })
    }

    fn launch_url(target: &PlayerTarget, link: &DeepLink) -> Result<Url, LaunchError> {
        let authority = if target.host.contains(':') {
            target.host.clone()
        } else {
            format!("{}:{ECP_PORT}", target.host)
        };
        let mut url = Url::parse(&format!("http://{authority}/launch/{}", link.app_id)).map_err(
            |e| LaunchError::InvalidTarget {
                message: format!("{}: {e}", target.host),
            },
        )?;
        url.query_pairs_mut()
            .append_pair("contentId", &link.content_id)
            .append_pair("mediaType", &link.media_type);
        Ok(url)
    }
}

impl PlayerLauncher for RokuLauncher {
    fn launch(
        &self,
        target: &PlayerTarget,
        link: &DeepLink,
    ) -> impl Future<Output = Result<(), LaunchError>> + Send {
        let http = self.http.clone();
        let url = Self::launch_url(target, link);
        async move {
            let url = url?;
            debug!(%url, "launching player app");
            let resp = http.post(url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(LaunchError::Rejected {
                    status: status.as_u16(),
                });
            }
            Ok(())
        }
    }
}

impl fmt::Debug for RokuLauncher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RokuLauncher").finish_non_exhaustive()
    }
}
