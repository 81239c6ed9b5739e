//! Device-coordination layer bridging the Tablo cloud/device APIs to a
//! local player.
//!
//! The pieces compose in one direction: a [`SessionManager`] owns
//! authentication, a [`ChannelCatalog`] caches the lineup, a
//! [`TuneIssuer`] talks to the recorder, and a [`PlaybackCoordinator`]
//! serializes the whole tune pipeline behind a command queue. A
//! [`ReachabilityMonitor`] watches the recorder independently of any
//! in-flight commands.

pub mod catalog;
pub mod config;
mod convert;
pub mod coordinator;
pub mod error;
pub mod launcher;
pub mod model;
pub mod reachability;
pub mod session;
pub mod tuner;

pub use catalog::ChannelCatalog;
pub use config::{AccountCredentials, RecorderConfig, DEFAULT_SESSION_TTL};
pub use coordinator::PlaybackCoordinator;
pub use error::CoreError;
pub use launcher::{DeepLink, LaunchError, PlayerLauncher, RokuLauncher};
pub use model::{
    CatalogSnapshot, ChannelEntry, ChannelKind, ChannelSelector, PlayerTarget, ReachabilityState,
    SnapshotRef, TuneOutcome, TuneRequest, TuneResult,
};
pub use reachability::{ReachabilityMonitor, DEFAULT_PROBE_INTERVAL, FAILURE_THRESHOLD};
pub use session::{Session, SessionManager};
pub use tuner::TuneIssuer;
