//! Async client for the Tablo 4th-gen APIs.
//!
//! Two HTTP surfaces, two clients:
//!
//! - [`CloudClient`] — the account-scoped cloud API
//!   (`lighthousetv.ewscloud.com`): login handshake, account/device
//!   selection, and the channel-lineup guide.
//! - [`DeviceClient`] — the recorder's local API, authenticated
//!   per-request with an HMAC-MD5 signature header: server info and
//!   the tune ("watch channel") command.
//!
//! Both clients are thin transports: they return typed wire models and
//! a uniform [`Error`]. Session caching, retry policy, and channel
//! resolution live upstream in `tabloctl-core`.

pub mod cloud;
pub mod device;
pub mod error;
pub mod models;
pub mod transport;

pub use cloud::CloudClient;
pub use device::DeviceClient;
pub use error::Error;
pub use models::{
    AccountDevice, AccountProfile, AccountResponse, ChannelNumbers, ChannelRecord, LoginResponse,
    SelectResponse, ServerInfo, ServerModel, WatchResponse,
};
pub use transport::TransportConfig;

/// User agent the Tablo device and cloud APIs expect.
pub const USER_AGENT: &str = "Tablo-FAST/2.0.0 (Mobile; iPhone; iOS 16.6)";

/// Default base URL of the Tablo cloud API.
pub const DEFAULT_CLOUD_URL: &str = "https://lighthousetv.ewscloud.com";
