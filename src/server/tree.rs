//! Process tree discovery and forced termination.
//!
//! Descendants are enumerated from a fresh process table snapshot on every
//! call, since the server may spawn and reap helpers at any time.

use std::collections::{HashMap, HashSet};

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

/// Snapshot the process table and return every descendant of `root`,
/// deepest first. `root` itself is not included.
#[must_use]
pub fn find_descendants(root: u32) -> Vec<u32> {
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::All,
        true,
        ProcessRefreshKind::nothing(),
    );

    let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
    for (pid, process) in system.processes() {
        if let Some(parent) = process.parent() {
            children
                .entry(parent.as_u32())
                .or_default()
                .push(pid.as_u32());
        }
    }

    let mut result = Vec::new();
    let mut visited = HashSet::from([root]);
    collect_post_order(&children, root, &mut visited, &mut result);
    result
}

// Children before their parent, so a parent cannot respawn a killed child.
fn collect_post_order(
    children: &HashMap<u32, Vec<u32>>,
    parent: u32,
    visited: &mut HashSet<u32>,
    result: &mut Vec<u32>,
) {
    let Some(kids) = children.get(&parent) else {
        return;
    };
    for &child in kids {
        if visited.insert(child) {
            collect_post_order(children, child, visited, result);
            result.push(child);
        }
    }
}

/// Forcefully terminate a single process.
///
/// Returns `false` if the process was already gone or could not be signalled;
/// neither case is an error for callers tearing down a tree.
pub fn force_kill(pid: u32) -> bool {
    #[cfg(unix)]
    {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid as NixPid;

        let Ok(raw) = i32::try_from(pid) else {
            return false;
        };
        match kill(NixPid::from_raw(raw), Signal::SIGKILL) {
            Ok(()) => true,
            Err(Errno::ESRCH) => {
                tracing::debug!(pid, "Process already gone");
                false
            }
            Err(e) => {
                tracing::warn!(pid, error = %e, "Failed to kill process");
                false
            }
        }
    }

    #[cfg(not(unix))]
    {
        use sysinfo::Pid;

        let mut system = System::new();
        let target = Pid::from_u32(pid);
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[target]),
            true,
            ProcessRefreshKind::nothing(),
        );
        system.process(target).is_some_and(sysinfo::Process::kill)
    }
}

/// Kill every descendant of `root`, deepest first. Returns how many were
/// signalled. `root` itself is left for the caller, which owns its handle.
pub fn kill_descendants(root: u32) -> usize {
    let descendants = find_descendants(root);
    if descendants.is_empty() {
        tracing::debug!(pid = root, "No descendant processes");
        return 0;
    }

    tracing::info!(pid = root, count = descendants.len(), "Killing descendant processes");
    descendants.into_iter().filter(|&pid| force_kill(pid)).count()
}
