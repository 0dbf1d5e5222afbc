//! Server supervision tests.
//!
//! Process tests launch `sh` with a script from a temp directory standing in
//! for the server jar.

#[cfg(unix)]
mod tree_test;

use std::time::Duration;

use mcserver_manager::server::{LaunchConfig, ServerStatus, ServerSupervisor};
use sysinfo::{Pid, ProcessRefreshKind, ProcessStatus, ProcessesToUpdate, System};
use tempfile::TempDir;

/// How long any single wait in these tests may take.
pub const WAIT_LIMIT: Duration = Duration::from_secs(10);

/// Write `script` as the server artifact and launch it with `sh`.
pub fn script_server(script: &str) -> (TempDir, LaunchConfig) {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("server.sh"), script).unwrap();
    let launch = LaunchConfig::new(dir.path())
        .with_java_path("sh")
        .with_jar_name("server.sh")
        .with_launcher_args(&[])
        .with_artifact_flag(None)
        .with_server_args(&[]);
    (dir, launch)
}

/// Drain output until `pred` holds for everything drained so far.
pub async fn collect_until<F>(supervisor: &ServerSupervisor, mut pred: F) -> Vec<String>
where
    F: FnMut(&[String]) -> bool,
{
    let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
    let mut lines = Vec::new();
    loop {
        lines.extend(supervisor.drain_output());
        if pred(&lines) {
            return lines;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for output, got {lines:?}"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Drain output until a line equal to `needle` shows up.
pub async fn collect_until_line(supervisor: &ServerSupervisor, needle: &str) -> Vec<String> {
    collect_until(supervisor, |lines| lines.iter().any(|l| l == needle)).await
}

/// Poll until the supervisor reports offline.
pub async fn wait_until_offline(supervisor: &ServerSupervisor) {
    let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
    while supervisor.status() != ServerStatus::Offline {
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for the server to go offline"
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Pid from a `helper <pid>` line printed by a test script.
pub fn helper_pid(lines: &[String]) -> u32 {
    lines
        .iter()
        .find_map(|l| l.strip_prefix("helper "))
        .and_then(|pid| pid.trim().parse().ok())
        .expect("helper pid line")
}

/// Whether `pid` is gone or only a zombie.
pub fn is_gone(pid: u32) -> bool {
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[Pid::from_u32(pid)]),
        true,
        ProcessRefreshKind::nothing(),
    );
    match system.process(Pid::from_u32(pid)) {
        None => true,
        Some(process) => matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead),
    }
}

pub async fn wait_until_gone(pid: u32) -> bool {
    for _ in 0..100 {
        if is_gone(pid) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

/// Verify all public server types are exported from the library.
#[test]
fn test_all_server_types_exported() {
    use mcserver_manager::server::{
        CommandError, ConsoleLine, ExitSignal, ExitWatcher, KillOutcome, LineChannel, LineOrigin, PerformanceSample,
        ResourceMonitor, RunState, ServerStatus, StartError, Started, StopOutcome,
        DEFAULT_GRACE_PERIOD, DEFAULT_STOP_COMMAND, SERVER_KILLED, SERVER_STOPPED,
    };

    let _ = LineChannel::new();
    let _ = RunState::new();
    let _ = ResourceMonitor::new();
    let _ = ConsoleLine::new("x", LineOrigin::Stdout);
    let _ = PerformanceSample::zero();
    let _: Option<ExitSignal> = None;
    let _: Option<ExitWatcher> = None;
    let _ = ServerStatus::Offline;
    let _ = Started { pid: None };
    let _ = StopOutcome::NotRunning;
    let _ = KillOutcome::NoProcess;
    let _: fn() -> StartError = || StartError::AlreadyRunning;
    let _: fn() -> CommandError = || CommandError::NotRunning;

    assert_eq!(DEFAULT_GRACE_PERIOD, Duration::from_secs(5));
    assert_eq!(DEFAULT_STOP_COMMAND, "stop");
    assert_eq!(SERVER_KILLED, "Server killed.");
    assert_eq!(SERVER_STOPPED, "Server stopped.");
}
