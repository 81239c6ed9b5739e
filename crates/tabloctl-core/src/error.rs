use thiserror::Error;

/// Errors surfaced by the coordination layer.
///
/// Wire-level failures from `tabloctl-api` are folded into these
/// variants at the boundary; callers never see raw transport errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The caller's request is malformed (e.g. no channel selector).
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// Credentials were rejected, including after one re-login attempt.
    #[error("authentication failed: {message}")]
    AuthFailure { message: String },

    /// No channel matched the selector, even after a lineup refresh.
    #[error("channel not found: {selector}")]
    ChannelNotFound { selector: String },

    /// The recorder accepted the request but declined to tune.
    #[error("recorder rejected tune: {reason}")]
    TuneRejected { reason: String },

    /// The recorder (or cloud) could not be reached at all.
    #[error("device unreachable: {message}")]
    Unreachable { message: String },

    /// The operation exists on the surface but has no implementation.
    #[error("operation not implemented: {operation}")]
    NotImplemented { operation: &'static str },

    /// The command queue has shut down; no further commands run.
    #[error("coordinator has stopped")]
    CoordinatorStopped,

    /// An upstream API call failed for a non-auth reason.
    #[error("api error: {message}")]
    Api { message: String, status: Option<u16> },

    /// Invariant violation inside the coordination layer itself.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<tabloctl_api::Error> for CoreError {
    fn from(e: tabloctl_api::Error) -> Self {
        match e {
            tabloctl_api::Error::Authentication { message } => Self::AuthFailure { message },
            tabloctl_api::Error::Timeout { timeout_secs } => Self::Unreachable {
                message: format!("request timed out after {timeout_secs}s"),
            },
            tabloctl_api::Error::Transport(inner) => {
                if inner.is_connect() {
                    Self::Unreachable {
                        message: inner.to_string(),
                    }
                } else {
                    Self::Api {
                        message: inner.to_string(),
                        status: inner.status().map(|s| s.as_u16()),
                    }
                }
            }
            tabloctl_api::Error::Api { message, status } => Self::Api {
                message,
                status: Some(status),
            },
            tabloctl_api::Error::InvalidUrl(inner) => Self::Internal(inner.to_string()),
            tabloctl_api::Error::Deserialization { message, .. } => Self::Internal(message),
        }
    }
}
