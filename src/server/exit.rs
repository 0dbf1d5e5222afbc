//! Exit watcher: the task that owns the server's `Child` and observes its exit.
//!
//! The run state goes offline only here, once `wait` has returned. Closed or
//! redirected stdio says nothing about whether the process is still alive.

use std::sync::Arc;

use tokio::process::Child;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use super::state::RunState;

/// Cloneable view of whether the watched process has exited.
#[derive(Debug, Clone)]
pub struct ExitSignal {
    rx: watch::Receiver<bool>,
}

impl ExitSignal {
    /// A signal plus the sender that fires it.
    pub(crate) fn pair() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self { rx })
    }

    #[must_use]
    pub fn has_exited(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the process has exited.
    ///
    /// Also returns if the watcher went away without reporting, since nothing
    /// can observe the process after that.
    pub async fn wait(&mut self) {
        if self.rx.wait_for(|exited| *exited).await.is_err() {
            tracing::debug!("Exit watcher dropped before reporting");
        }
    }
}

/// Handle to the task that owns a running server process.
#[derive(Debug)]
pub struct ExitWatcher {
    pid: Option<u32>,
    kill_tx: Option<oneshot::Sender<()>>,
    exit: ExitSignal,
    handle: JoinHandle<()>,
}

impl ExitWatcher {
    /// Take ownership of `child` and watch it on the current tokio runtime.
    ///
    /// When the process exits the run state is cleared if it still belongs to
    /// `generation`, then the exit signal fires.
    #[must_use]
    pub fn spawn(mut child: Child, state: Arc<RunState>, generation: u64) -> Self {
        let pid = child.id();
        let (kill_tx, kill_rx) = oneshot::channel::<()>();
        let (exit_tx, exit) = ExitSignal::pair();

        let handle = tokio::spawn(async move {
            let result = tokio::select! {
                result = child.wait() => result,
                Ok(()) = kill_rx => match child.kill().await {
                    Ok(()) => child.wait().await,
                    Err(e) => Err(e),
                },
            };

            match result {
                Ok(status) => tracing::info!(?pid, generation, %status, "Server process exited"),
                Err(e) => tracing::warn!(?pid, generation, error = %e, "Failed to wait for server process"),
            }
            state.clear_if_current(generation);
            exit_tx.send_replace(true);
        });

        Self {
            pid,
            kill_tx: Some(kill_tx),
            exit,
            handle,
        }
    }

    /// Pid of the process while it has not been observed to exit.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        if self.exit.has_exited() {
            None
        } else {
            self.pid
        }
    }

    #[must_use]
    pub fn has_exited(&self) -> bool {
        self.exit.has_exited()
    }

    #[must_use]
    pub fn exit_signal(&self) -> ExitSignal {
        self.exit.clone()
    }

    /// Kill the process and wait until its exit has been observed.
    pub async fn kill(&mut self) {
        if let Some(tx) = self.kill_tx.take() {
            // The watcher is gone only if the process already exited.
            let _ = tx.send(());
        }
        self.exit.wait().await;
    }

    pub fn abort(&self) {
        self.handle.abort();
    }
}
