// Tune command issuer.
//
// Separates "the recorder said no" from "something broke": rejection
// and timeout come back as a non-accepted `TuneResult`, while auth
// failures (after the session manager's single retry) and transport
// faults propagate as errors.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{ChannelEntry, TuneResult};
use crate::session::SessionManager;

pub struct TuneIssuer {
    session: Arc<SessionManager>,
}

impl TuneIssuer {
    #[must_use]
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self { session }
    }

    /// Ask the recorder to tune to `entry`'s channel.
    pub async fn tune(&self, entry: &ChannelEntry) -> Result<TuneResult, CoreError> {
        debug!(channel = %entry.identifier, number = %entry.number, "issuing tune");

        let session_mgr = Arc::clone(&self.session);
        let target = entry.clone();
        self.session
            .with_session(move |session| {
                let session_mgr = Arc::clone(&session_mgr);
                let target = target.clone();
                async move {
                    let device = match session_mgr.device_client(&session) {
                        Ok(device) => device,
                        Err(e) => {
                            return Ok(TuneResult::rejected(target, e.to_string()));
                        }
                    };
                    match device.watch_channel(&target.identifier).await {
                        Ok(_) => Ok(TuneResult::accepted(target)),
                        // Let the session manager renew and retry once.
                        Err(e) if e.is_auth() => Err(e),
                        Err(e) if e.is_timeout() => {
                            warn!(channel = %target.identifier, "tune request timed out");
                            Ok(TuneResult::rejected(
                                target,
                                format!("request timed out; the recorder may still be tuning: {e}"),
                            ))
                        }
                        Err(tabloctl_api::Error::Api { message, status }) => {
                            Ok(TuneResult::rejected(
                                target,
                                format!("recorder declined ({status}): {message}"),
                            ))
                        }
                        Err(e) => Err(e),
                    }
                }
            })
            .await
    }
}
