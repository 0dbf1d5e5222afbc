//! Configuration types.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::server::{LaunchConfig, DEFAULT_STOP_COMMAND};

/// How the supervisor shuts the server down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorSettings {
    /// Console command sent for a graceful stop.
    #[serde(default = "default_stop_command")]
    pub stop_command: String,
    /// Seconds to wait after the stop command before killing the process tree.
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: u64,
}

fn default_stop_command() -> String {
    DEFAULT_STOP_COMMAND.to_string()
}

fn default_grace_period_secs() -> u64 {
    5
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            stop_command: default_stop_command(),
            grace_period_secs: default_grace_period_secs(),
        }
    }
}

impl SupervisorSettings {
    #[must_use]
    pub fn grace_period(&self) -> Duration {
        Duration::from_secs(self.grace_period_secs)
    }
}

/// Poll loop and retention settings for the interactive console.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Console lines kept in memory.
    #[serde(default = "default_history_lines")]
    pub history_lines: usize,
    /// Milliseconds between polls.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Sample CPU/memory every this many polls.
    #[serde(default = "default_stats_every")]
    pub stats_every: u32,
    /// Performance samples kept in memory.
    #[serde(default = "default_stats_history")]
    pub stats_history: usize,
}

fn default_history_lines() -> usize {
    1000
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_stats_every() -> u32 {
    4
}

fn default_stats_history() -> usize {
    60
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            history_lines: default_history_lines(),
            poll_interval_ms: default_poll_interval_ms(),
            stats_every: default_stats_every(),
            stats_history: default_stats_history(),
        }
    }
}

impl ConsoleSettings {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    pub server: LaunchConfig,
    pub supervisor: SupervisorSettings,
    pub console: ConsoleSettings,
}
