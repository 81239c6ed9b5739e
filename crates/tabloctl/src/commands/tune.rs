//! Tune command handler.

use owo_colors::OwoColorize;
use serde::Serialize;
use tabloctl_core::{PlayerTarget, RokuLauncher, TuneOutcome, TuneRequest};

use crate::cli::{GlobalOpts, TuneArgs};
use crate::config::RecorderStack;
use crate::error::CliError;
use crate::output;

use super::spawn_coordinator;

/// Serializable view of a tune outcome for structured output.
#[derive(Serialize)]
struct TuneReport {
    channel_id: String,
    number: String,
    name: String,
    player: Option<String>,
    warning: Option<String>,
}

impl TuneReport {
    fn new(outcome: &TuneOutcome, player: Option<&PlayerTarget>) -> Self {
        Self {
            channel_id: outcome.entry.identifier.clone(),
            number: outcome.entry.number.clone(),
            name: outcome.entry.name.clone(),
            player: player.map(ToString::to_string),
            warning: outcome.warning.clone(),
        }
    }
}

pub async fn handle(
    stack: RecorderStack,
    args: TuneArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    // --roku beats the profile default; --no-player beats both.
    let player = if args.no_player {
        None
    } else {
        args.roku.map(PlayerTarget::new).or_else(|| stack.roku.clone())
    };

    let launcher = match player {
        Some(_) => Some(RokuLauncher::new(&stack.transport).map_err(|e| CliError::ApiError {
            message: e.to_string(),
        })?),
        None => None,
    };

    let request = TuneRequest {
        channel_id: args.id,
        channel_number: args.number,
        player: player.clone(),
    };

    let coordinator = spawn_coordinator(&stack, launcher);
    let result = coordinator.set_channel(request).await;
    coordinator.shutdown().await;
    let outcome = result?;

    let report = TuneReport::new(&outcome, player.as_ref());
    let out = output::render_single(
        &global.output,
        &report,
        |r| describe(r, output::should_color(&global.color)),
        |r| r.channel_id.clone(),
    );
    output::print_output(&out, global.quiet);

    if let Some(warning) = &outcome.warning {
        eprintln!("warning: {warning}");
    }
    Ok(())
}

fn describe(report: &TuneReport, color: bool) -> String {
    let headline = format!("Tuned to {} {}", report.number, report.name);
    let headline = if color {
        headline.green().to_string()
    } else {
        headline
    };
    match &report.player {
        Some(player) if report.warning.is_none() => {
            format!("{headline}\nPlaying in the Tablo app on {player}")
        }
        _ => headline,
    }
}
