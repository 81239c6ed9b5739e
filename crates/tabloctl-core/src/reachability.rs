// Device reachability monitor.
//
// Probes the recorder's `/server/info` endpoint on an interval and
// publishes availability over a watch channel. Transitions are
// asymmetric: one successful probe restores availability immediately,
// while it takes `FAILURE_THRESHOLD` consecutive failures to mark the
// device down, so a single dropped probe never flaps the state.

use std::time::Duration;

use chrono::Utc;
use tabloctl_api::DeviceClient;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::model::ReachabilityState;

/// Consecutive probe failures before the device is marked unreachable.
pub const FAILURE_THRESHOLD: u32 = 3;

/// Default spacing between probes.
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(30);

pub struct ReachabilityMonitor {
    device: DeviceClient,
    state_tx: watch::Sender<ReachabilityState>,
    consecutive_failures: u32,
}

impl ReachabilityMonitor {
    /// Create a monitor for the given recorder.
    ///
    /// The device starts out assumed reachable; the first probes will
    /// correct that if it is not.
    #[must_use]
    pub fn new(device: DeviceClient) -> (Self, watch::Receiver<ReachabilityState>) {
        let (state_tx, state_rx) = watch::channel(ReachabilityState {
            reachable: true,
            checked_at: Utc::now(),
        });
        (
            Self {
                device,
                state_tx,
                consecutive_failures: 0,
            },
            state_rx,
        )
    }

    /// Run one probe and fold the result into the published state.
    pub async fn tick(&mut self) {
        match self.device.server_info().await {
            Ok(_) => self.apply_probe(true),
            Err(e) => {
                debug!(error = %e, "reachability probe failed");
                self.apply_probe(false);
            }
        }
    }

    /// Probe loop. Runs until cancelled; typically spawned.
    pub async fn run(mut self, interval: Duration, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = ticker.tick() => self.tick().await,
            }
        }
        debug!("reachability monitor stopped");
    }

    fn apply_probe(&mut self, success: bool) {
        let was_reachable = self.state_tx.borrow().reachable;

        let reachable = if success {
            self.consecutive_failures = 0;
            true
        } else {
            self.consecutive_failures = self.consecutive_failures.saturating_add(1);
            if self.consecutive_failures >= FAILURE_THRESHOLD {
                false
            } else {
                // Below the threshold the published verdict holds.
                was_reachable
            }
        };

        if reachable != was_reachable {
            if reachable {
                info!("recorder reachable again");
            } else {
                warn!(
                    failures = self.consecutive_failures,
                    "recorder marked unreachable"
                );
            }
        }

        self.state_tx.send_replace(ReachabilityState {
            reachable,
            checked_at: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use tabloctl_api::TransportConfig;

    use super::*;

    fn monitor() -> (ReachabilityMonitor, watch::Receiver<ReachabilityState>) {
        let device = DeviceClient::new(
            Url::parse("http://127.0.0.1:1").expect("static url"),
            "11111111-2222-3333-4444-555555555555".into(),
            &TransportConfig::default(),
        )
        .expect("client builds");
        ReachabilityMonitor::new(device)
    }

    #[test]
    fn stays_reachable_below_failure_threshold() {
        let (mut mon, rx) = monitor();

        mon.apply_probe(false);
        mon.apply_probe(false);
        assert!(rx.borrow().reachable);
    }

    #[test]
    fn three_consecutive_failures_mark_unreachable() {
        let (mut mon, rx) = monitor();

        mon.apply_probe(false);
        mon.apply_probe(false);
        mon.apply_probe(false);
        assert!(!rx.borrow().reachable);
    }

    #[test]
    fn single_success_restores_reachability() {
        let (mut mon, rx) = monitor();

        for _ in 0..5 {
            mon.apply_probe(false);
        }
        assert!(!rx.borrow().reachable);

        mon.apply_probe(true);
        assert!(rx.borrow().reachable);
    }

    #[test]
    fn success_resets_failure_streak() {
        let (mut mon, rx) = monitor();

        mon.apply_probe(false);
        mon.apply_probe(false);
        mon.apply_probe(true);
        // The streak restarts: two more failures are not enough.
        mon.apply_probe(false);
        mon.apply_probe(false);
        assert!(rx.borrow().reachable);

        mon.apply_probe(false);
        assert!(!rx.borrow().reachable);
    }
}
