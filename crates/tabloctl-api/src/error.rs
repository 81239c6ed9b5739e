use thiserror::Error;

/// Top-level error type for the `tabloctl-api` crate.
///
/// Covers every failure mode across both API surfaces: the cloud
/// account API and the local device API. `tabloctl-core` maps these
/// into its domain error taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected, token expired, or a cloud response carried an
    /// error code where a token was expected.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success HTTP status from either API, with the body where
    /// one was readable.
    #[error("API error (HTTP {status}): {message}")]
    Api { message: String, status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error indicates expired or rejected
    /// credentials, i.e. re-authentication might resolve it.
    pub fn is_auth(&self) -> bool {
        match self {
            Self::Authentication { .. } => true,
            Self::Api { status, .. } => *status == 401,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::UNAUTHORIZED),
            _ => false,
        }
    }

    /// Returns `true` for timeouts, where the device may or may not
    /// have acted on the request.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns `true` for connectivity-level failures (the endpoint
    /// did not answer at all).
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect())
    }
}
