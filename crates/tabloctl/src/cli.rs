//! Clap derive structures for the `tabloctl` CLI.
//!
//! Defines the command tree, global flags, and shared enums.

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// tabloctl -- control Tablo recorders from the command line
#[derive(Debug, Parser)]
#[command(
    name = "tabloctl",
    version,
    about = "Tune Tablo recorders and hand playback to a Roku",
    long_about = "Tune a Tablo network DVR to live channels from the command line,\n\
        with optional deep-linking into the Tablo app on a Roku player.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Recorder profile to use
    #[arg(long, short = 'p', env = "TABLO_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TABLO_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "TABLO_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in to the Tablo cloud and bind a recorder
    Login(LoginArgs),

    /// List the recorder's channel lineup (always fetches fresh)
    #[command(alias = "ls")]
    Channels,

    /// Tune the recorder to a channel
    Tune(TuneArgs),

    /// Stop the active stream
    Stop,

    /// Recorder identity and reachability
    Status(StatusArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),
}

// ── LOGIN ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (prompted for password)
    pub email: String,

    /// Store the password in the system keyring for re-login
    #[arg(long)]
    pub keyring: bool,
}

// ── TUNE ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("selector")
        .required(true)
        .multiple(true)
        .args(["id", "number"])
))]
pub struct TuneArgs {
    /// Channel identifier (takes precedence over --number)
    #[arg(long)]
    pub id: Option<String>,

    /// Channel number, e.g. "2.1"
    #[arg(long, short = 'n')]
    pub number: Option<String>,

    /// Roku host (or host:port) to deep-link after tuning
    #[arg(long, env = "TABLO_ROKU")]
    pub roku: Option<String>,

    /// Skip the player hand-off even if the profile names a Roku
    #[arg(long, conflicts_with = "roku")]
    pub no_player: bool,
}

// ── STATUS ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Keep probing and report reachability transitions
    #[arg(long, short = 'w')]
    pub watch: bool,

    /// Probe interval in seconds (with --watch)
    #[arg(long, default_value_t = tabloctl_core::DEFAULT_PROBE_INTERVAL.as_secs())]
    pub interval: u64,
}

// ── CONFIG ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current resolved configuration
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },

    /// Print the config file path
    Path,
}
