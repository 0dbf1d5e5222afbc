//! Supervisor error and outcome types.

use std::path::PathBuf;

/// Why a start request did not launch a process.
#[derive(thiserror::Error, Debug)]
pub enum StartError {
    /// A process is already running; nothing was spawned.
    #[error("Server is already running")]
    AlreadyRunning,

    /// The artifact is missing from the server directory.
    #[error("{artifact} not found in {}", dir.display())]
    ExecutableNotFound { artifact: String, dir: PathBuf },

    /// The OS refused to spawn the process.
    #[error("Failed to start server: {0}")]
    SpawnFailed(#[source] std::io::Error),
}

/// Why a command was not delivered.
#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("Server is not running")]
    NotRunning,

    #[error("Error sending command: {0}")]
    WriteFailed(#[source] std::io::Error),
}

/// A successful start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Started {
    pub pid: Option<u32>,
}

/// How a graceful stop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// Nothing was running.
    NotRunning,
    /// The process exited within the grace window.
    Exited,
    /// The grace window elapsed and the process tree was killed.
    Killed,
}

/// How a forced kill ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillOutcome {
    /// There was no process handle to kill.
    NoProcess,
    /// The process was killed along with this many descendants.
    Killed { descendants: usize },
}
