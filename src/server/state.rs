//! Run state shared between the supervisor and its exit watcher.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

/// Externally visible status of the supervised server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServerStatus {
    Online,
    #[default]
    Offline,
}

impl ServerStatus {
    #[must_use]
    pub fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }
}

impl std::fmt::Display for ServerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => f.write_str("Online"),
            Self::Offline => f.write_str("Offline"),
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    running: bool,
    generation: u64,
}

/// The `running` flag plus the generation of the launch that set it.
///
/// Every successful start bumps the generation. An exit watcher only clears the
/// flag for the generation it was launched with, so the late exit of a killed
/// process cannot mark a newer process offline.
#[derive(Debug, Default)]
pub struct RunState {
    inner: Mutex<Inner>,
}

impl RunState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // The guarded data is two plain values, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    #[must_use]
    pub fn status(&self) -> ServerStatus {
        if self.is_running() {
            ServerStatus::Online
        } else {
            ServerStatus::Offline
        }
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Mark a new launch as running and return its generation.
    pub fn begin(&self) -> u64 {
        let mut inner = self.lock();
        inner.generation = inner.generation.wrapping_add(1);
        inner.running = true;
        tracing::debug!(generation = inner.generation, "Run state: online");
        inner.generation
    }

    /// Clear the running flag unconditionally (explicit stop/kill).
    pub fn clear(&self) {
        let mut inner = self.lock();
        if inner.running {
            tracing::debug!(generation = inner.generation, "Run state: offline");
        }
        inner.running = false;
    }

    /// Clear the running flag if `generation` is still the current launch.
    ///
    /// Returns `true` if this call observed the exit of the current launch.
    pub fn clear_if_current(&self, generation: u64) -> bool {
        let mut inner = self.lock();
        if inner.generation != generation {
            return false;
        }
        let was_running = inner.running;
        inner.running = false;
        was_running
    }
}
