//! Line channel between the pipe reader and poll-driven consumers.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

/// Where a console line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineOrigin {
    Stdout,
    Stderr,
    /// Diagnostic emitted by the supervisor itself.
    Supervisor,
}

/// One line of console output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleLine {
    pub text: String,
    pub origin: LineOrigin,
    pub received_at: DateTime<Utc>,
}

impl ConsoleLine {
    #[must_use]
    pub fn new(text: impl Into<String>, origin: LineOrigin) -> Self {
        Self {
            text: text.into(),
            origin,
            received_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn diagnostic(text: impl Into<String>) -> Self {
        Self::new(text, LineOrigin::Supervisor)
    }

    #[must_use]
    pub fn is_diagnostic(&self) -> bool {
        self.origin == LineOrigin::Supervisor
    }
}

/// Producer handle for the line channel.
///
/// Cheap to clone; pushing never blocks. Pushes after the channel has been
/// dropped are discarded.
#[derive(Debug, Clone)]
pub struct LineSender {
    tx: UnboundedSender<ConsoleLine>,
}

impl LineSender {
    pub fn push(&self, line: ConsoleLine) {
        if self.tx.send(line).is_err() {
            tracing::trace!("Line channel closed, dropping line");
        }
    }

    pub fn push_output(&self, text: impl Into<String>, origin: LineOrigin) {
        self.push(ConsoleLine::new(text, origin));
    }

    pub fn push_diagnostic(&self, text: impl Into<String>) {
        self.push(ConsoleLine::diagnostic(text));
    }
}

/// Unbounded FIFO of console lines.
///
/// The channel has no retention policy: anything pushed stays queued until a
/// consumer drains it. Capping history is the consumer's job (see
/// [`crate::console::ConsoleHistory`]).
#[derive(Debug)]
pub struct LineChannel {
    tx: UnboundedSender<ConsoleLine>,
    rx: Mutex<UnboundedReceiver<ConsoleLine>>,
}

impl Default for LineChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl LineChannel {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }

    /// Get a new producer handle.
    #[must_use]
    pub fn sender(&self) -> LineSender {
        LineSender {
            tx: self.tx.clone(),
        }
    }

    /// Remove and return every buffered line, oldest first. Never blocks.
    #[must_use]
    pub fn drain(&self) -> Vec<ConsoleLine> {
        let mut rx = self.rx.lock().unwrap_or_else(PoisonError::into_inner);
        let mut lines = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(line) => lines.push(line),
                // The channel holds its own sender, so it is never disconnected.
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        lines
    }

    /// Like [`drain`](Self::drain) but only the line texts.
    #[must_use]
    pub fn drain_text(&self) -> Vec<String> {
        self.drain().into_iter().map(|line| line.text).collect()
    }
}
