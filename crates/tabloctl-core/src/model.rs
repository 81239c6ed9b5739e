// Domain model for the coordination layer.
//
// `CatalogSnapshot` is the immutable unit the catalog publishes: lookup
// indexes are built once at construction and never mutated, so readers
// can resolve against a snapshot without locks.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Transport class of a channel: over-the-air antenna or streamed FAST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Ota,
    Ott,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ota => write!(f, "ota"),
            Self::Ott => write!(f, "ott"),
        }
    }
}

/// One tunable channel from the recorder's lineup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelEntry {
    /// Canonical identifier, unique within a lineup.
    pub identifier: String,
    /// Human-facing number in `major.minor` form, e.g. `"2.1"`.
    pub number: String,
    pub name: String,
    pub call_sign: String,
    pub kind: ChannelKind,
}

/// How a caller names the channel it wants.
///
/// An identifier always wins over a number when both are supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSelector {
    Identifier(String),
    Number(String),
}

impl fmt::Display for ChannelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(id) => write!(f, "id {id}"),
            Self::Number(n) => write!(f, "number {n}"),
        }
    }
}

/// Immutable view of one lineup fetch with lookup indexes.
#[derive(Debug)]
pub struct CatalogSnapshot {
    entries: Vec<ChannelEntry>,
    by_identifier: HashMap<String, usize>,
    by_number: HashMap<String, usize>,
    fetched_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    /// Build a snapshot from lineup entries in source order.
    ///
    /// Lineups occasionally repeat a display number (an OTT channel
    /// shadowing an OTA one); the first entry in source order claims
    /// the number and later duplicates stay reachable by identifier.
    #[must_use]
    pub fn new(entries: Vec<ChannelEntry>) -> Self {
        let mut by_identifier = HashMap::with_capacity(entries.len());
        let mut by_number = HashMap::with_capacity(entries.len());
        for (idx, entry) in entries.iter().enumerate() {
            by_identifier.entry(entry.identifier.clone()).or_insert(idx);
            by_number.entry(entry.number.clone()).or_insert(idx);
        }
        Self {
            entries,
            by_identifier,
            by_number,
            fetched_at: Utc::now(),
        }
    }

    /// All channels in lineup order.
    #[must_use]
    pub fn entries(&self) -> &[ChannelEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// When this snapshot was fetched from the cloud guide.
    #[must_use]
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    #[must_use]
    pub fn by_identifier(&self, id: &str) -> Option<&ChannelEntry> {
        self.by_identifier.get(id).map(|&i| &self.entries[i])
    }

    #[must_use]
    pub fn by_number(&self, number: &str) -> Option<&ChannelEntry> {
        self.by_number.get(number).map(|&i| &self.entries[i])
    }

    /// Resolve a selector against this snapshot only (no fetching).
    #[must_use]
    pub fn resolve(&self, selector: &ChannelSelector) -> Option<&ChannelEntry> {
        match selector {
            ChannelSelector::Identifier(id) => self.by_identifier(id),
            ChannelSelector::Number(n) => self.by_number(n),
        }
    }
}

/// The player device a tune should hand off to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerTarget {
    /// Host (optionally `host:port`) of the player on the local network.
    pub host: String,
}

impl PlayerTarget {
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self { host: host.into() }
    }
}

impl fmt::Display for PlayerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.host)
    }
}

/// A caller's request to tune the recorder.
#[derive(Debug, Clone, Default)]
pub struct TuneRequest {
    pub channel_id: Option<String>,
    pub channel_number: Option<String>,
    /// Optional player to deep-link after a successful tune.
    pub player: Option<PlayerTarget>,
}

impl TuneRequest {
    /// The selector this request names, identifier taking precedence.
    /// `None` when the request names no channel at all.
    #[must_use]
    pub fn selector(&self) -> Option<ChannelSelector> {
        if let Some(id) = &self.channel_id {
            return Some(ChannelSelector::Identifier(id.clone()));
        }
        self.channel_number
            .as_ref()
            .map(|n| ChannelSelector::Number(n.clone()))
    }
}

/// Verdict from the recorder on one tune attempt.
#[derive(Debug, Clone)]
pub struct TuneResult {
    pub accepted: bool,
    pub entry: ChannelEntry,
    /// Populated when `accepted` is false.
    pub reason: Option<String>,
}

impl TuneResult {
    #[must_use]
    pub fn accepted(entry: ChannelEntry) -> Self {
        Self {
            accepted: true,
            entry,
            reason: None,
        }
    }

    #[must_use]
    pub fn rejected(entry: ChannelEntry, reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            entry,
            reason: Some(reason.into()),
        }
    }
}

/// Successful end of the tune pipeline.
///
/// A failed player launch does not fail the tune; it lands here as a
/// warning because the recorder is already streaming.
#[derive(Debug, Clone)]
pub struct TuneOutcome {
    pub entry: ChannelEntry,
    pub warning: Option<String>,
}

/// Published reachability of the recorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReachabilityState {
    pub reachable: bool,
    pub checked_at: DateTime<Utc>,
}

/// Shared snapshot handle, as stored by the catalog.
pub type SnapshotRef = Arc<CatalogSnapshot>;
