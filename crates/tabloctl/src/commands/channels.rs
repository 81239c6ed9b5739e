//! Channel lineup listing.

use tabled::Tabled;
use tabloctl_core::{ChannelEntry, RokuLauncher};

use crate::cli::GlobalOpts;
use crate::config::RecorderStack;
use crate::error::CliError;
use crate::output;

use super::spawn_coordinator;

#[derive(Tabled)]
struct ChannelRow {
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Call Sign")]
    call_sign: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&ChannelEntry> for ChannelRow {
    fn from(e: &ChannelEntry) -> Self {
        Self {
            number: e.number.clone(),
            name: e.name.clone(),
            call_sign: e.call_sign.clone(),
            kind: e.kind.to_string(),
            id: e.identifier.clone(),
        }
    }
}

pub async fn handle(stack: RecorderStack, global: &GlobalOpts) -> Result<(), CliError> {
    let coordinator = spawn_coordinator(&stack, None::<RokuLauncher>);
    let result = coordinator.get_channels().await;
    coordinator.shutdown().await;
    let snapshot = result?;

    let out = output::render_list(
        &global.output,
        snapshot.entries(),
        |e| ChannelRow::from(e),
        |e| e.number.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
