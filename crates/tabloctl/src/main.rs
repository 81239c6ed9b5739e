mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands never touch the recorder.
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Login(args) => commands::login::handle(args, &cli.global).await,

        // Everything else runs against the active recorder profile.
        cmd => {
            let stack = config::connect(&cli.global).await?;
            tracing::debug!(profile = %stack.profile_name, command = ?cmd, "dispatching command");
            commands::dispatch(cmd, stack, &cli.global).await
        }
    }
}
