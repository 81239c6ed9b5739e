// Channel catalog: cached lineup snapshots and selector resolution.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tracing::{debug, info};

use crate::convert;
use crate::error::CoreError;
use crate::model::{CatalogSnapshot, ChannelEntry, ChannelSelector, SnapshotRef};
use crate::session::SessionManager;

/// Holds the most recent lineup snapshot and fetches new ones.
///
/// Snapshots are swapped in atomically; `current` never blocks and
/// `resolve` never touches the network while a snapshot is cached.
pub struct ChannelCatalog {
    session: Arc<SessionManager>,
    snapshot: ArcSwapOption<CatalogSnapshot>,
}

impl ChannelCatalog {
    #[must_use]
    pub fn new(session: Arc<SessionManager>) -> Self {
        Self {
            session,
            snapshot: ArcSwapOption::empty(),
        }
    }

    /// The cached snapshot, if any lineup fetch has succeeded yet.
    #[must_use]
    pub fn current(&self) -> Option<SnapshotRef> {
        self.snapshot.load_full()
    }

    /// Fetch the lineup from the cloud guide and publish a fresh
    /// snapshot. On failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<SnapshotRef, CoreError> {
        let cloud = self.session.cloud().clone();
        let records = self
            .session
            .with_session(move |session| {
                let cloud = cloud.clone();
                async move {
                    cloud
                        .guide_channels(&session.authorization, &session.lighthouse)
                        .await
                }
            })
            .await?;

        let total = records.len();
        let entries: Vec<ChannelEntry> = records.iter().filter_map(convert::channel_entry).collect();
        let snapshot = Arc::new(CatalogSnapshot::new(entries));

        info!(
            channels = snapshot.len(),
            skipped = total - snapshot.len(),
            "channel lineup refreshed"
        );
        self.snapshot.store(Some(Arc::clone(&snapshot)));
        Ok(snapshot)
    }

    /// Resolve a selector against the cached snapshot, fetching one
    /// only when none is cached yet. A miss against a valid snapshot
    /// is a miss; refreshing on miss is the caller's policy.
    pub async fn resolve(&self, selector: &ChannelSelector) -> Result<ChannelEntry, CoreError> {
        let snapshot = match self.current() {
            Some(snapshot) => snapshot,
            None => {
                debug!("no cached lineup, fetching");
                self.refresh().await?
            }
        };

        snapshot
            .resolve(selector)
            .cloned()
            .ok_or_else(|| CoreError::ChannelNotFound {
                selector: selector.to_string(),
            })
    }
}
