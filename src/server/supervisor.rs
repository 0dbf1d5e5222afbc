//! Server process supervisor.
//!
//! Holds the child's stdin and the exit watcher that owns the child itself,
//! launches the pipe reader, and exposes start/stop/kill/command plus
//! non-blocking status, output and metrics reads for a caller polling on its
//! own schedule.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::ChildStdin;
use tokio::time::Instant;

use crate::config::SupervisorSettings;

use super::channel::{ConsoleLine, LineChannel, LineSender};
use super::error::{CommandError, KillOutcome, StartError, Started, StopOutcome};
use super::exit::ExitWatcher;
use super::launch::LaunchConfig;
use super::monitor::{PerformanceSample, ResourceMonitor};
use super::reader::PipeReader;
use super::state::{RunState, ServerStatus};
use super::tree;

/// Time allowed for a graceful stop before escalating to a kill.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Console command that asks the server to shut down.
pub const DEFAULT_STOP_COMMAND: &str = "stop";

/// Diagnostic pushed after a forced kill.
pub const SERVER_KILLED: &str = "Server killed.";

/// Supervisor for a single server process.
///
/// `start`, `stop`, `kill` and `send_command` take `&mut self`, so there is
/// exactly one writer to the server's stdin at a time. Must be used from
/// within a tokio runtime.
#[derive(Debug)]
pub struct ServerSupervisor {
    launch: LaunchConfig,
    stop_command: String,
    grace_period: Duration,
    state: Arc<RunState>,
    lines: LineChannel,
    process: Option<ExitWatcher>,
    stdin: Option<ChildStdin>,
    reader: Option<PipeReader>,
    monitor: ResourceMonitor,
}

impl ServerSupervisor {
    /// Create an offline supervisor with default stop settings.
    #[must_use]
    pub fn new(launch: LaunchConfig) -> Self {
        Self {
            launch,
            stop_command: DEFAULT_STOP_COMMAND.to_string(),
            grace_period: DEFAULT_GRACE_PERIOD,
            state: Arc::new(RunState::new()),
            lines: LineChannel::new(),
            process: None,
            stdin: None,
            reader: None,
            monitor: ResourceMonitor::new(),
        }
    }

    /// Create an offline supervisor using configured stop settings.
    #[must_use]
    pub fn with_settings(launch: LaunchConfig, settings: &SupervisorSettings) -> Self {
        Self::new(launch)
            .with_stop_command(settings.stop_command.clone())
            .with_grace_period(settings.grace_period())
    }

    #[must_use]
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    #[must_use]
    pub fn with_stop_command(mut self, command: impl Into<String>) -> Self {
        self.stop_command = command.into();
        self
    }

    #[must_use]
    pub fn launch_config(&self) -> &LaunchConfig {
        &self.launch
    }

    #[must_use]
    pub fn grace_period(&self) -> Duration {
        self.grace_period
    }

    /// Producer handle for injecting lines into the console stream.
    #[must_use]
    pub fn line_sender(&self) -> LineSender {
        self.lines.sender()
    }

    fn diagnostic(&self, text: impl Into<String>) {
        self.lines.sender().push_diagnostic(text);
    }

    /// Launch the server.
    ///
    /// Failures other than [`StartError::AlreadyRunning`] are also pushed to
    /// the console as a diagnostic line and leave the supervisor offline.
    ///
    /// # Errors
    ///
    /// Returns `StartError` if the server is already running, the artifact is
    /// missing, or the process could not be spawned.
    pub fn start(&mut self) -> Result<Started, StartError> {
        let alive = self.process.as_ref().is_some_and(|p| !p.has_exited());
        if self.state.is_running() || alive {
            tracing::warn!(pid = ?self.pid(), "Start requested while server is running");
            return Err(StartError::AlreadyRunning);
        }

        let artifact = self.launch.artifact_name();
        if !self.launch.server_dir.join(&artifact).exists() {
            let err = StartError::ExecutableNotFound {
                artifact,
                dir: self.launch.server_dir.clone(),
            };
            tracing::error!(error = %err, "Server artifact missing");
            self.diagnostic(format!("Error: {err}"));
            return Err(err);
        }

        // The previous process has exited; release its handles.
        self.stdin = None;
        self.process = None;

        let mut child = match self.launch.command().spawn() {
            Ok(child) => child,
            Err(e) => {
                let err = StartError::SpawnFailed(e);
                tracing::error!(java = %self.launch.java_path, error = %err, "Spawn failed");
                self.diagnostic(err.to_string());
                return Err(err);
            }
        };

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            // Unreachable with piped stdio, but never leave an orphan behind.
            if let Err(e) = child.start_kill() {
                tracing::debug!(error = %e, "Failed to kill uncaptured server process");
            }
            let err = StartError::SpawnFailed(std::io::Error::other("server output not captured"));
            self.diagnostic(err.to_string());
            return Err(err);
        };

        let pid = child.id();
        self.stdin = child.stdin.take();

        let generation = self.state.begin();
        let watcher = ExitWatcher::spawn(child, Arc::clone(&self.state), generation);
        self.reader = Some(PipeReader::spawn(
            stdout,
            stderr,
            self.lines.sender(),
            watcher.exit_signal(),
            generation,
        ));
        self.process = Some(watcher);

        tracing::info!(
            pid = ?pid,
            generation,
            dir = %self.launch.server_dir.display(),
            "Server started"
        );
        Ok(Started { pid })
    }

    /// Ask the server to stop, escalating to [`kill`](Self::kill) if it is
    /// still alive after the grace period. Blocks the calling task for up to
    /// the grace period, which also bounds writing the stop command. Always
    /// leaves the supervisor offline.
    pub async fn stop(&mut self) -> StopOutcome {
        if !self.state.is_running() {
            return StopOutcome::NotRunning;
        }
        let deadline = Instant::now() + self.grace_period;

        let command = self.stop_command.clone();
        // A failed write is already reported; the grace wait still applies.
        if tokio::time::timeout_at(deadline, self.send_command(&command))
            .await
            .is_err()
        {
            tracing::warn!("Server stdin is not accepting input");
        }

        let exited = match self.process.as_ref().map(ExitWatcher::exit_signal) {
            Some(mut exit) => {
                if tokio::time::timeout_at(deadline, exit.wait()).await.is_ok() {
                    tracing::info!("Server exited after stop command");
                    true
                } else {
                    tracing::warn!(
                        grace_secs = self.grace_period.as_secs_f64(),
                        "Server ignored stop command, killing"
                    );
                    false
                }
            }
            None => true,
        };

        let outcome = if exited {
            self.stdin = None;
            StopOutcome::Exited
        } else {
            self.kill().await;
            StopOutcome::Killed
        };

        self.state.clear();
        outcome
    }

    /// Forcefully terminate the server and all of its descendants.
    ///
    /// Processes that are already gone are ignored.
    pub async fn kill(&mut self) -> KillOutcome {
        let Some(mut process) = self.process.take() else {
            return KillOutcome::NoProcess;
        };
        self.stdin = None;

        let descendants = process.pid().map_or(0, tree::kill_descendants);
        process.kill().await;

        self.state.clear();
        self.diagnostic(SERVER_KILLED);
        tracing::info!(descendants, "Server killed");
        KillOutcome::Killed { descendants }
    }

    /// Write `command` plus a newline to the server's stdin and flush.
    ///
    /// A write failure is also pushed to the console as a diagnostic line.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::NotRunning` if the server is offline, or
    /// `CommandError::WriteFailed` if the write or flush failed.
    pub async fn send_command(&mut self, command: &str) -> Result<(), CommandError> {
        if !self.state.is_running() {
            return Err(CommandError::NotRunning);
        }
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(CommandError::NotRunning);
        };

        let mut payload = String::with_capacity(command.len() + 1);
        payload.push_str(command);
        payload.push('\n');

        let written = match stdin.write_all(payload.as_bytes()).await {
            Ok(()) => stdin.flush().await,
            Err(e) => Err(e),
        };

        match written {
            Ok(()) => {
                tracing::debug!(command, "Sent server command");
                Ok(())
            }
            Err(e) => {
                let err = CommandError::WriteFailed(e);
                tracing::warn!(command, error = %err, "Server command failed");
                self.diagnostic(err.to_string());
                Err(err)
            }
        }
    }

    #[must_use]
    pub fn status(&self) -> ServerStatus {
        self.state.status()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Pid of the server process until its exit has been observed.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.process.as_ref().and_then(ExitWatcher::pid)
    }

    /// All buffered console text, oldest first. Never blocks.
    #[must_use]
    pub fn drain_output(&self) -> Vec<String> {
        self.lines.drain_text()
    }

    /// All buffered console lines with their metadata, oldest first.
    #[must_use]
    pub fn drain_lines(&self) -> Vec<ConsoleLine> {
        self.lines.drain()
    }

    /// CPU and memory of the server process; zeroed when offline.
    pub fn sample(&mut self) -> PerformanceSample {
        if !self.state.is_running() {
            return PerformanceSample::zero();
        }
        match self.pid() {
            Some(pid) => self.monitor.sample(pid),
            None => PerformanceSample::zero(),
        }
    }

    /// Wait until the current pipe reader has finished: output has closed and
    /// the process exit has been observed.
    ///
    /// Returns immediately if no reader was ever started.
    pub async fn wait_for_output_closed(&mut self) {
        if let Some(reader) = self.reader.take() {
            if let Err(e) = reader.join().await {
                tracing::debug!(error = %e, "Pipe reader ended abnormally");
            }
        }
    }
}

impl Drop for ServerSupervisor {
    fn drop(&mut self) {
        if let Some(reader) = &self.reader {
            reader.abort();
        }
        if let Some(process) = &self.process {
            process.abort();
        }
    }
}
