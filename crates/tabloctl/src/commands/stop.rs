//! Stop command handler.
//!
//! The recorder has no stop endpoint; the coordinator reports that
//! explicitly and this handler just surfaces it with the right exit
//! code rather than pretending the stream stopped.

use tabloctl_core::RokuLauncher;

use crate::config::RecorderStack;
use crate::error::CliError;

use super::spawn_coordinator;

pub async fn handle(stack: RecorderStack) -> Result<(), CliError> {
    let coordinator = spawn_coordinator(&stack, None::<RokuLauncher>);
    let result = coordinator.stop_streaming().await;
    coordinator.shutdown().await;
    result.map_err(CliError::from)
}
