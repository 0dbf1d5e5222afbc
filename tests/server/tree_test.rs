//! Process tree termination tests.

use std::time::Duration;

use mcserver_manager::server::tree::find_descendants;
use mcserver_manager::server::{KillOutcome, ServerStatus, ServerSupervisor, StopOutcome};

use super::{collect_until, collect_until_line, helper_pid, script_server, wait_until_gone};

/// Starts a long-lived helper, reports its pid, then waits on stdin.
const FORKING_SERVER: &str = r#"sleep 300 &
echo "helper $!"
echo READY
while read line; do :; done
"#;

#[tokio::test]
async fn descendants_include_background_helper() {
    let (_dir, launch) = script_server(FORKING_SERVER);
    let mut supervisor = ServerSupervisor::new(launch);
    supervisor.start().unwrap();
    let lines = collect_until_line(&supervisor, "READY").await;
    let helper = helper_pid(&lines);

    let root = supervisor.pid().unwrap();
    assert!(find_descendants(root).contains(&helper));

    supervisor.kill().await;
}

#[tokio::test]
async fn kill_terminates_descendants() {
    let (_dir, launch) = script_server(FORKING_SERVER);
    let mut supervisor = ServerSupervisor::new(launch);
    supervisor.start().unwrap();
    let lines = collect_until_line(&supervisor, "READY").await;
    let helper = helper_pid(&lines);

    let outcome = supervisor.kill().await;
    match outcome {
        KillOutcome::Killed { descendants } => assert!(descendants >= 1),
        KillOutcome::NoProcess => panic!("expected a process to kill"),
    }
    assert_eq!(supervisor.status(), ServerStatus::Offline);
    assert!(wait_until_gone(helper).await, "helper {helper} survived kill");
}

#[tokio::test]
async fn stop_escalation_terminates_descendants() {
    let (_dir, launch) = script_server(FORKING_SERVER);
    let mut supervisor =
        ServerSupervisor::new(launch).with_grace_period(Duration::from_millis(300));
    supervisor.start().unwrap();
    let lines = collect_until(&supervisor, |lines| lines.iter().any(|l| l == "READY")).await;
    let helper = helper_pid(&lines);

    assert_eq!(supervisor.stop().await, StopOutcome::Killed);
    assert!(wait_until_gone(helper).await, "helper {helper} survived stop");
}
