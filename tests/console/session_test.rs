//! `ConsoleSession` polling against a scripted server.

use std::time::Duration;

use mcserver_manager::commands::{ConsoleSession, Flow, OperatorInput};
use mcserver_manager::config::ConsoleSettings;
use mcserver_manager::server::{ServerStatus, ServerSupervisor, SERVER_KILLED};

use crate::server::{script_server, WAIT_LIMIT};

/// Prints twenty lines, then READY, then waits on stdin.
const CHATTY_SERVER: &str = r#"i=1
while [ $i -le 20 ]; do
  echo "line $i"
  i=$((i + 1))
done
echo READY
while read line; do :; done
"#;

fn settings() -> ConsoleSettings {
    ConsoleSettings {
        history_lines: 5,
        stats_every: 3,
        ..Default::default()
    }
}

fn history_texts(session: &ConsoleSession) -> Vec<String> {
    session.history().iter().map(|l| l.text.clone()).collect()
}

#[tokio::test]
async fn poll_tracks_status_samples_and_history() {
    let (_dir, launch) = script_server(CHATTY_SERVER);
    let mut session = ConsoleSession::new(ServerSupervisor::new(launch), settings());

    assert_eq!(session.handle(OperatorInput::Start).await, Flow::Continue);

    let first = session.poll();
    assert_eq!(first.status_change, Some(ServerStatus::Online));
    assert!(first.sample.is_none());

    for poll in 2..=9 {
        let report = session.poll();
        assert!(report.status_change.is_none(), "poll {poll}");
        assert_eq!(report.sample.is_some(), poll % 3 == 0, "poll {poll}");
    }
    assert_eq!(session.stats().len(), 3);

    let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
    while !history_texts(&session).iter().any(|t| t == "READY") {
        assert!(tokio::time::Instant::now() < deadline, "no READY in history");
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.poll();
    }
    assert_eq!(
        history_texts(&session),
        vec!["line 17", "line 18", "line 19", "line 20", "READY"]
    );

    assert_eq!(session.handle(OperatorInput::Kill).await, Flow::Continue);
    let report = session.poll();
    assert_eq!(report.status_change, Some(ServerStatus::Offline));
    assert!(report.sample.is_none());
    assert!(session.history().len() <= 5);
    assert!(history_texts(&session).contains(&SERVER_KILLED.to_string()));

    assert_eq!(session.handle(OperatorInput::History).await, Flow::Continue);
}

#[tokio::test]
async fn offline_polls_never_sample() {
    let (_dir, launch) = script_server("echo bye\n");
    let mut session = ConsoleSession::new(ServerSupervisor::new(launch), settings());
    session.handle(OperatorInput::Start).await;
    session.supervisor_mut().wait_for_output_closed().await;

    let report = session.poll();
    assert_eq!(report.status_change, None);
    assert_eq!(session.supervisor().status(), ServerStatus::Offline);

    for _ in 0..6 {
        assert!(session.poll().sample.is_none());
    }
    assert!(session.stats().is_empty());
}
