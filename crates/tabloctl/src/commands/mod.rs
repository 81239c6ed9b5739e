//! Command dispatch: bridges CLI args -> core coordinator -> output.

pub mod channels;
pub mod config_cmd;
pub mod login;
pub mod status;
pub mod stop;
pub mod tune;

use std::sync::Arc;

use tabloctl_core::{ChannelCatalog, PlaybackCoordinator, PlayerLauncher, TuneIssuer};

use crate::cli::{Command, GlobalOpts};
use crate::config::RecorderStack;
use crate::error::CliError;

/// Dispatch a recorder-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    stack: RecorderStack,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Channels => channels::handle(stack, global).await,
        Command::Tune(args) => tune::handle(stack, args, global).await,
        Command::Stop => stop::handle(stack).await,
        Command::Status(args) => status::handle(stack, args, global).await,
        // Login and Config are handled before dispatch
        Command::Login(_) | Command::Config(_) => unreachable!(),
    }
}

/// Wire a playback coordinator around the stack's session manager.
pub(crate) fn spawn_coordinator<L>(stack: &RecorderStack, launcher: Option<L>) -> PlaybackCoordinator
where
    L: PlayerLauncher + 'static,
{
    let catalog = ChannelCatalog::new(Arc::clone(&stack.manager));
    let tuner = TuneIssuer::new(Arc::clone(&stack.manager));
    PlaybackCoordinator::spawn(catalog, tuner, launcher)
}
