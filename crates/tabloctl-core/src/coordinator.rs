// Playback coordinator: the single execution queue for playback
// commands.
//
// All commands funnel through one mpsc channel into a processor task
// that runs them strictly one at a time, so two tunes can never
// interleave their resolve/tune/launch steps. Callers get replies over
// per-command oneshot channels.

use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::ChannelCatalog;
use crate::error::CoreError;
use crate::launcher::{DeepLink, PlayerLauncher};
use crate::model::{SnapshotRef, TuneOutcome, TuneRequest};
use crate::tuner::TuneIssuer;

const COMMAND_CHANNEL_SIZE: usize = 16;

enum Command {
    SetChannel(TuneRequest),
    GetChannels,
    StopStreaming,
}

enum CommandReply {
    Tuned(TuneOutcome),
    Channels(SnapshotRef),
}

struct CommandEnvelope {
    command: Command,
    respond: oneshot::Sender<Result<CommandReply, CoreError>>,
}

/// Serialized front door for playback operations.
pub struct PlaybackCoordinator {
    command_tx: mpsc::Sender<CommandEnvelope>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PlaybackCoordinator {
    /// Start the processor task and return a handle to it.
    ///
    /// `launcher` is optional: without one, tune requests that name a
    /// player succeed with a warning instead of deep-linking.
    pub fn spawn<L>(catalog: ChannelCatalog, tuner: TuneIssuer, launcher: Option<L>) -> Self
    where
        L: PlayerLauncher + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let pipeline = Pipeline {
            catalog,
            tuner,
            launcher,
        };
        let task = tokio::spawn(command_processor(pipeline, command_rx, cancel.clone()));

        Self {
            command_tx,
            cancel,
            task: Mutex::new(Some(task)),
        }
    }

    /// Tune the recorder to the requested channel, then hand off to the
    /// player if one is named.
    pub async fn set_channel(&self, request: TuneRequest) -> Result<TuneOutcome, CoreError> {
        match self.execute(Command::SetChannel(request)).await? {
            CommandReply::Tuned(outcome) => Ok(outcome),
            CommandReply::Channels(_) => {
                Err(CoreError::Internal("mismatched reply for set_channel".into()))
            }
        }
    }

    /// Fetch a fresh lineup and return it. Always refreshes: callers of
    /// this surface want current guide data, not the cache.
    pub async fn get_channels(&self) -> Result<SnapshotRef, CoreError> {
        match self.execute(Command::GetChannels).await? {
            CommandReply::Channels(snapshot) => Ok(snapshot),
            CommandReply::Tuned(_) => {
                Err(CoreError::Internal("mismatched reply for get_channels".into()))
            }
        }
    }

    /// Stop the active stream. The recorder offers no stop endpoint, so
    /// this fails explicitly rather than pretending to succeed.
    pub async fn stop_streaming(&self) -> Result<(), CoreError> {
        match self.execute(Command::StopStreaming).await {
            Ok(_) => Err(CoreError::Internal("mismatched reply for stop_streaming".into())),
            Err(e) => Err(e),
        }
    }

    /// Stop the processor task. Queued commands that have not started
    /// are dropped and their callers see [`CoreError::CoordinatorStopped`].
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let handle = self.task.lock().await.take();
        if let Some(handle) = handle {
            if handle.await.is_err() {
                warn!("command processor task panicked");
            }
        }
    }

    async fn execute(&self, command: Command) -> Result<CommandReply, CoreError> {
        let (respond, reply_rx) = oneshot::channel();
        self.command_tx
            .send(CommandEnvelope { command, respond })
            .await
            .map_err(|_| CoreError::CoordinatorStopped)?;
        reply_rx.await.map_err(|_| CoreError::CoordinatorStopped)?
    }
}

async fn command_processor<L: PlayerLauncher>(
    pipeline: Pipeline<L>,
    mut command_rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    debug!("command processor started");
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = command_rx.recv() => {
                let Some(CommandEnvelope { command, respond }) = envelope else {
                    break;
                };
                let result = run_command(&pipeline, command).await;
                // Caller may have given up waiting; that is fine.
                let _ = respond.send(result);
            }
        }
    }
    debug!("command processor stopped");
}

async fn run_command<L: PlayerLauncher>(
    pipeline: &Pipeline<L>,
    command: Command,
) -> Result<CommandReply, CoreError> {
    match command {
        Command::SetChannel(request) => {
            pipeline.set_channel(request).await.map(CommandReply::Tuned)
        }
        Command::GetChannels => pipeline.catalog.refresh().await.map(CommandReply::Channels),
        Command::StopStreaming => Err(CoreError::NotImplemented {
            operation: "stop_streaming",
        }),
    }
}

/// The tune pipeline the processor task owns.
struct Pipeline<L> {
    catalog: ChannelCatalog,
    tuner: TuneIssuer,
    launcher: Option<L>,
}

impl<L: PlayerLauncher> Pipeline<L> {
    async fn set_channel(&self, request: TuneRequest) -> Result<TuneOutcome, CoreError> {
        // Validate before any network traffic.
        let Some(selector) = request.selector() else {
            return Err(CoreError::InvalidRequest {
                message: "a channel id or channel number is required".into(),
            });
        };

        // Resolve, allowing one forced lineup refresh on a cache miss:
        // the channel may have been added since the last fetch.
        let entry = match self.catalog.resolve(&selector).await {
            Ok(entry) => entry,
            Err(CoreError::ChannelNotFound { .. }) => {
                debug!(%selector, "not in cached lineup, refreshing once");
                self.catalog.refresh().await?;
                self.catalog.resolve(&selector).await?
            }
            Err(e) => return Err(e),
        };

        let result = self.tuner.tune(&entry).await?;
        if !result.accepted {
            return Err(CoreError::TuneRejected {
                reason: result
                    .reason
                    .unwrap_or_else(|| "recorder declined without detail".into()),
            });
        }
        info!(channel = %entry.identifier, number = %entry.number, "recorder tuned");

        // Player hand-off is isolated: the tune already succeeded, so a
        // launch failure is reported but never unwinds it.
        let mut warning = None;
        if let Some(target) = &request.player {
            if let Some(launcher) = &self.launcher {
                let link = DeepLink::live_channel(&entry);
                if let Err(e) = launcher.launch(target, &link).await {
                    warn!(player = %target, error = %e, "player launch failed after tune");
                    warning = Some(format!("player launch failed: {e}"));
                }
            } else {
                warning = Some(format!("no player launcher configured for {target}"));
            }
        }

        Ok(TuneOutcome { entry, warning })
    }
}
