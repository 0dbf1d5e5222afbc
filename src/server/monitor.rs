//! CPU and memory sampling for the supervised process.

use serde::{Deserialize, Serialize};
use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// One resource usage reading. Not cached, not historical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    /// CPU usage since the previous sample, as reported by the OS. May exceed
    /// 100 on multi-core machines.
    pub cpu_percent: f32,
    /// Resident set size.
    pub memory_bytes: u64,
}

impl PerformanceSample {
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn memory_mb(&self) -> f64 {
        self.memory_bytes as f64 / BYTES_PER_MB
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.cpu_percent.abs() < f32::EPSILON && self.memory_bytes == 0
    }
}

/// Samples a single process by pid.
///
/// Keeps one process table between calls so CPU usage is measured over the
/// interval since the previous sample. The first sample of a new pid reports
/// 0% CPU.
#[derive(Debug)]
pub struct ResourceMonitor {
    system: System,
}

impl Default for ResourceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceMonitor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    /// Sample `pid`, or return a zeroed sample if there is no such live
    /// process (including one that exited since the caller last looked).
    pub fn sample(&mut self, pid: u32) -> PerformanceSample {
        let pid = Pid::from_u32(pid);
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );

        match self.system.process(pid) {
            Some(process) if !matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead) => {
                PerformanceSample {
                    cpu_percent: process.cpu_usage(),
                    memory_bytes: process.memory(),
                }
            }
            _ => {
                tracing::debug!(pid = pid.as_u32(), "Process vanished before sampling");
                PerformanceSample::zero()
            }
        }
    }
}
