//! Caller-side retention for console output and performance samples.
//!
//! The supervisor's line channel never drops anything. Consumers that keep
//! history around decide how much of it to keep; these are bounded buffers
//! for that purpose.

use std::collections::VecDeque;

use crate::server::{ConsoleLine, PerformanceSample};

/// The most recent console lines, oldest first.
#[derive(Debug, Clone)]
pub struct ConsoleHistory {
    lines: VecDeque<ConsoleLine>,
    capacity: usize,
}

impl ConsoleHistory {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Append lines, dropping the oldest beyond capacity.
    pub fn extend(&mut self, lines: impl IntoIterator<Item = ConsoleLine>) {
        for line in lines {
            if self.capacity == 0 {
                return;
            }
            if self.lines.len() == self.capacity {
                self.lines.pop_front();
            }
            self.lines.push_back(line);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConsoleLine> {
        self.lines.iter()
    }

    /// The last `n` lines, oldest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &ConsoleLine> {
        self.lines.iter().skip(self.lines.len().saturating_sub(n))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A bounded series of performance samples.
#[derive(Debug, Clone)]
pub struct StatsHistory {
    samples: VecDeque<PerformanceSample>,
    capacity: usize,
}

impl StatsHistory {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    pub fn push(&mut self, sample: PerformanceSample) {
        if self.capacity == 0 {
            return;
        }
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    #[must_use]
    pub fn latest(&self) -> Option<PerformanceSample> {
        self.samples.back().copied()
    }

    /// Mean CPU over the retained samples; 0 when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_cpu(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let total: f32 = self.samples.iter().map(|s| s.cpu_percent).sum();
        total / self.samples.len() as f32
    }

    /// Highest resident memory over the retained samples, in megabytes.
    #[must_use]
    pub fn peak_memory_mb(&self) -> f64 {
        self.samples
            .iter()
            .map(PerformanceSample::memory_mb)
            .fold(0.0, f64::max)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
