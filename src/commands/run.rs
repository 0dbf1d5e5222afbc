//! `run` subcommand: start the server and drive an interactive console.
//!
//! The loop polls the supervisor on a fixed interval, the same way a UI
//! render loop would: drain new console lines, watch for status changes and
//! sample resource usage every few polls. Operator input arrives on a
//! separate task reading stdin.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::config::{ConsoleSettings, ManagerConfig};
use crate::console::{ConsoleHistory, StatsHistory};
use crate::display;
use crate::server::{ConsoleLine, PerformanceSample, ServerStatus, ServerSupervisor};

/// Lines replayed by `:history`.
pub const HISTORY_REPLAY: usize = 20;

/// A parsed line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatorInput {
    Start,
    Stop,
    Kill,
    Status,
    Stats,
    History,
    Quit,
    /// Forwarded to the server's console verbatim.
    Command(String),
    Empty,
}

/// Parse operator input. Lines starting with `:` are console keywords; all
/// other non-blank input is a server command.
#[must_use]
pub fn parse_input(line: &str) -> OperatorInput {
    let trimmed = line.trim();
    match trimmed {
        "" => OperatorInput::Empty,
        ":start" => OperatorInput::Start,
        ":stop" => OperatorInput::Stop,
        ":kill" => OperatorInput::Kill,
        ":status" => OperatorInput::Status,
        ":stats" => OperatorInput::Stats,
        ":history" => OperatorInput::History,
        ":quit" | ":exit" => OperatorInput::Quit,
        command => OperatorInput::Command(command.trim_start_matches('/').to_string()),
    }
}

/// Whether the console loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Everything one poll observed.
#[derive(Debug, Default)]
pub struct PollReport {
    pub lines: Vec<ConsoleLine>,
    /// Set when the status differs from the previous poll.
    pub status_change: Option<ServerStatus>,
    pub sample: Option<PerformanceSample>,
}

/// Supervisor plus the console's own retention state.
#[derive(Debug)]
pub struct ConsoleSession {
    supervisor: ServerSupervisor,
    settings: ConsoleSettings,
    history: ConsoleHistory,
    stats: StatsHistory,
    polls: u64,
    last_status: ServerStatus,
}

impl ConsoleSession {
    #[must_use]
    pub fn new(supervisor: ServerSupervisor, settings: ConsoleSettings) -> Self {
        Self {
            history: ConsoleHistory::new(settings.history_lines),
            stats: StatsHistory::new(settings.stats_history),
            last_status: supervisor.status(),
            supervisor,
            settings,
            polls: 0,
        }
    }

    #[must_use]
    pub fn supervisor(&self) -> &ServerSupervisor {
        &self.supervisor
    }

    pub fn supervisor_mut(&mut self) -> &mut ServerSupervisor {
        &mut self.supervisor
    }

    #[must_use]
    pub fn history(&self) -> &ConsoleHistory {
        &self.history
    }

    #[must_use]
    pub fn stats(&self) -> &StatsHistory {
        &self.stats
    }

    /// One tick of the poll loop. Never blocks.
    pub fn poll(&mut self) -> PollReport {
        self.polls += 1;

        let lines = self.supervisor.drain_lines();
        self.history.extend(lines.iter().cloned());

        let status = self.supervisor.status();
        let status_change = (status != self.last_status).then_some(status);
        self.last_status = status;

        let every = u64::from(self.settings.stats_every.max(1));
        let sample = (status.is_online() && self.polls % every == 0).then(|| {
            let sample = self.supervisor.sample();
            self.stats.push(sample);
            sample
        });

        PollReport {
            lines,
            status_change,
            sample,
        }
    }

    /// Act on one line of operator input.
    ///
    /// `Stop` and `Quit` wait out the supervisor's grace period when the
    /// server does not shut down promptly.
    pub async fn handle(&mut self, input: OperatorInput) -> Flow {
        match input {
            OperatorInput::Empty => {}
            OperatorInput::Start => {
                // Failures are already on the console as diagnostics.
                if let Ok(started) = self.supervisor.start() {
                    tracing::debug!(pid = ?started.pid, "Started from console");
                }
            }
            OperatorInput::Stop => {
                display::print_info("Stopping server...");
                display::print_stop_outcome(self.supervisor.stop().await);
            }
            OperatorInput::Kill => {
                display::print_kill_outcome(self.supervisor.kill().await);
            }
            OperatorInput::Status => {
                display::print_status(self.supervisor.status(), self.supervisor.pid());
            }
            OperatorInput::Stats => {
                let sample = self.supervisor.sample();
                self.stats.push(sample);
                display::print_stats(&sample, &self.stats);
            }
            OperatorInput::History => {
                if self.history.is_empty() {
                    display::print_info("No console output yet");
                }
                for line in self.history.tail(HISTORY_REPLAY) {
                    display::print_console_line(line);
                }
            }
            OperatorInput::Quit => {
                if self.supervisor.is_running() {
                    display::print_info("Stopping server before exit...");
                    display::print_stop_outcome(self.supervisor.stop().await);
                }
                return Flow::Exit;
            }
            OperatorInput::Command(command) => {
                if !self.supervisor.is_running() {
                    display::print_info("Server is offline; use :start");
                } else if let Err(e) = self.supervisor.send_command(&command).await {
                    tracing::debug!(error = %e, "Command not delivered");
                }
            }
        }
        Flow::Continue
    }
}

fn render(report: &PollReport, stats: &StatsHistory, pid: Option<u32>) {
    for line in &report.lines {
        display::print_console_line(line);
    }
    if let Some(status) = report.status_change {
        display::print_status(status, pid);
    }
    if let Some(sample) = &report.sample {
        display::print_stats(sample, stats);
    }
}

/// Forward stdin lines to the console loop until stdin closes.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read operator input");
                    break;
                }
            }
        }
    });
    rx
}

/// Start the server and run the interactive console until the operator quits.
pub async fn run_console(config: ManagerConfig) {
    let supervisor = ServerSupervisor::with_settings(config.server, &config.supervisor);
    let mut session = ConsoleSession::new(supervisor, config.console);

    display::print_info(&format!(
        "Managing {} (type :help for console keywords)",
        session.supervisor().launch_config().artifact_path().display()
    ));
    session.handle(OperatorInput::Start).await;

    let mut ticker = tokio::time::interval(session.settings.poll_interval());
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut input = spawn_stdin_reader();
    let mut input_open = true;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = session.poll();
                render(&report, session.stats(), session.supervisor().pid());
            }
            line = input.recv(), if input_open => {
                let Some(line) = line else {
                    tracing::debug!("Operator input closed");
                    input_open = false;
                    continue;
                };
                if line.trim() == ":help" {
                    print_help();
                    continue;
                }
                if session.handle(parse_input(&line)).await == Flow::Exit {
                    break;
                }
            }
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted");
                session.handle(OperatorInput::Quit).await;
                break;
            }
        }
    }

    // Flush whatever arrived during shutdown.
    let report = session.poll();
    render(&report, session.stats(), None);
}

fn print_help() {
    display::print_info(
        ":start  :stop  :kill  :status  :stats  :history  :quit  (anything else is sent to the server)",
    );
}
