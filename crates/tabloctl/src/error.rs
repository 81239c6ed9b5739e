//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use tabloctl_config::ConfigError;
use tabloctl_core::CoreError;

/// Exit codes the binary terminates with.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const REJECTED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the recorder")]
    #[diagnostic(
        code(tablo::unreachable),
        help(
            "Check that the Tablo is powered on and on the same network.\n\
             Details: {message}"
        )
    )]
    Unreachable { message: String },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed")]
    #[diagnostic(
        code(tablo::auth_failed),
        help(
            "Verify your account credentials and log in again:\n\
             tabloctl login <email>\n\
             Details: {message}"
        )
    )]
    AuthFailed { message: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(tablo::no_credentials),
        help(
            "Log in with: tabloctl login <email>\n\
             Or set the TABLO_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Channels ─────────────────────────────────────────────────────

    #[error("Channel '{selector}' not found in the lineup")]
    #[diagnostic(
        code(tablo::channel_not_found),
        help("Run: tabloctl channels to see the current lineup")
    )]
    ChannelNotFound { selector: String },

    // ── Tuning ───────────────────────────────────────────────────────

    #[error("The recorder rejected the tune request")]
    #[diagnostic(
        code(tablo::tune_rejected),
        help(
            "All tuners may be busy recording. Reason from the device:\n\
             {reason}"
        )
    )]
    TuneRejected { reason: String },

    // ── Unsupported ──────────────────────────────────────────────────

    #[error("'{operation}' is not supported by the recorder")]
    #[diagnostic(
        code(tablo::not_implemented),
        help(
            "The device API has no endpoint for this. Tune another channel,\n\
             or stop playback from the player itself."
        )
    )]
    NotImplemented { operation: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(tablo::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(tablo::profile_not_found),
        help("List profiles with: tabloctl config profiles")
    )]
    ProfileNotFound { name: String },

    #[error("No recorder configured")]
    #[diagnostic(
        code(tablo::no_config),
        help(
            "Log in first: tabloctl login <email>\n\
             Config expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(tablo::config))]
    Config(Box<figment::Error>),

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out")]
    #[diagnostic(
        code(tablo::timeout),
        help("Increase timeout with --timeout or check the network.")
    )]
    Timeout { message: String },

    // ── API / internal ───────────────────────────────────────────────

    #[error("API error: {message}")]
    #[diagnostic(code(tablo::api_error))]
    ApiError { message: String },

    // ── IO ───────────────────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Unreachable { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::ChannelNotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::TuneRejected { .. } => exit_code::REJECTED,
            Self::NotImplemented { .. } => exit_code::UNSUPPORTED,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidRequest { message } => CliError::Validation {
                field: "request".into(),
                reason: message,
            },

            CoreError::AuthFailure { message } => CliError::AuthFailed { message },

            CoreError::ChannelNotFound { selector } => CliError::ChannelNotFound { selector },

            CoreError::TuneRejected { reason } => CliError::TuneRejected { reason },

            CoreError::Unreachable { message } => {
                if message.contains("timed out") {
                    CliError::Timeout { message }
                } else {
                    CliError::Unreachable { message }
                }
            }

            CoreError::NotImplemented { operation } => CliError::NotImplemented {
                operation: operation.into(),
            },

            CoreError::CoordinatorStopped => CliError::ApiError {
                message: "command queue stopped before the command ran".into(),
            },

            CoreError::Api { message, status } => CliError::ApiError {
                message: match status {
                    Some(status) => format!("{message} (HTTP {status})"),
                    None => message,
                },
            },

            CoreError::Internal(message) => CliError::ApiError { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound { name: profile },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
            ConfigError::Serialization(e) => CliError::ApiError {
                message: e.to_string(),
            },
        }
    }
}
