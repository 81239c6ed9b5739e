//! Status command handler: identity probe and reachability watch.

use std::time::Duration;

use owo_colors::OwoColorize;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use tabloctl_core::ReachabilityMonitor;

use crate::cli::{GlobalOpts, StatusArgs};
use crate::config::RecorderStack;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct StatusReport {
    server_id: Option<String>,
    name: Option<String>,
    version: Option<String>,
    tuners: u32,
    device_url: String,
    reachable: bool,
}

pub async fn handle(
    stack: RecorderStack,
    args: StatusArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let session = stack.manager.acquire().await?;
    let device = stack.manager.device_client(&session)?;

    // One direct probe for the point-in-time report.
    let info = device.server_info().await;
    let reachable = info.is_ok();
    let report = match info {
        Ok(info) => StatusReport {
            server_id: info.server_id.clone(),
            name: info.name.clone(),
            version: info.version.clone(),
            tuners: info.tuners(),
            device_url: session.device_url.to_string(),
            reachable,
        },
        Err(_) => StatusReport {
            server_id: Some(session.server_id.clone()),
            name: session.device_name.clone(),
            version: None,
            tuners: session.tuners,
            device_url: session.device_url.to_string(),
            reachable,
        },
    };

    let color = output::should_color(&global.color);
    let out = output::render_single(
        &global.output,
        &report,
        |r| describe(r, color),
        |r| r.server_id.clone().unwrap_or_default(),
    );
    output::print_output(&out, global.quiet);

    if !args.watch {
        return Ok(());
    }

    // Keep probing and report transitions until interrupted.
    let (monitor, mut state_rx) = ReachabilityMonitor::new(device);
    let cancel = CancellationToken::new();
    let task = tokio::spawn(monitor.run(Duration::from_secs(args.interval), cancel.clone()));

    let mut last = state_rx.borrow().reachable;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *state_rx.borrow_and_update();
                if state.reachable != last {
                    last = state.reachable;
                    let verdict = if state.reachable { "reachable" } else { "unreachable" };
                    println!("{} recorder {verdict}", state.checked_at.format("%H:%M:%S"));
                }
            }
        }
    }

    cancel.cancel();
    let _ = task.await;
    Ok(())
}

fn describe(report: &StatusReport, color: bool) -> String {
    let verdict = if report.reachable {
        if color {
            "reachable".green().to_string()
        } else {
            "reachable".to_string()
        }
    } else if color {
        "unreachable".red().to_string()
    } else {
        "unreachable".to_string()
    };

    format!(
        "Recorder:  {} ({})\nVersion:   {}\nTuners:    {}\nAddress:   {}\nStatus:    {verdict}",
        report.name.as_deref().unwrap_or("Tablo"),
        report.server_id.as_deref().unwrap_or("unknown"),
        report.version.as_deref().unwrap_or("unknown"),
        report.tuners,
        report.device_url,
    )
}
