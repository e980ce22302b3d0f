//! Streaming session lifecycle against real `sh` processes.
#![cfg(unix)]

mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use codex_launcher::domain::models::{SessionOutcome, SessionState};
use codex_launcher::{CodexError, SessionController};
use common::{controller_with_grace, process_alive, read_pid, sh_request, temp_dir, wait_for};
use futures::StreamExt;

#[tokio::test]
async fn test_streams_lines_in_order_and_passes_prompt() {
    let controller = SessionController::default();
    let mut stream = controller
        .start(&sh_request(r#"echo first; echo second; echo "prompt=$1""#))
        .unwrap();

    assert_eq!(stream.next_line().await.unwrap().as_deref(), Some("first"));
    assert_eq!(stream.next_line().await.unwrap().as_deref(), Some("second"));
    assert_eq!(stream.next_line().await.unwrap().as_deref(), Some("prompt=prompt"));
    assert_eq!(stream.next_line().await.unwrap(), None);
    assert_eq!(stream.outcome(), Some(SessionOutcome::Completed { exit_code: 0 }));
    assert!(!controller.is_active());
}

#[tokio::test]
async fn test_second_start_fails_and_leaves_first_stream_intact() {
    let controller = SessionController::default();
    let mut first = controller
        .start(&sh_request("echo one; sleep 0.3; echo two"))
        .unwrap();

    let second = controller.start(&sh_request("echo intruder"));
    assert!(matches!(second, Err(CodexError::AlreadyRunning)));

    assert_eq!(first.next_line().await.unwrap().as_deref(), Some("one"));
    assert_eq!(first.next_line().await.unwrap().as_deref(), Some("two"));
    assert_eq!(first.next_line().await.unwrap(), None);
    assert_eq!(first.outcome(), Some(SessionOutcome::Completed { exit_code: 0 }));

    let mut third = controller.start(&sh_request("echo again")).unwrap();
    assert_eq!(third.next_line().await.unwrap().as_deref(), Some("again"));
    assert_eq!(third.next_line().await.unwrap(), None);
}

#[tokio::test]
async fn test_non_zero_exit_reports_code_and_stderr() {
    let controller = SessionController::default();
    let mut stream = controller
        .start(&sh_request("echo partial; echo boom >&2; echo again >&2; exit 3"))
        .unwrap();

    assert_eq!(stream.next_line().await.unwrap().as_deref(), Some("partial"));
    match stream.next_line().await {
        Err(CodexError::CliExit { exit_code, stderr }) => {
            assert_eq!(exit_code, 3);
            assert_eq!(stderr, "boom\nagain\n");
        }
        other => panic!("expected CliExit, got {other:?}"),
    }
    assert_eq!(stream.next_line().await.unwrap(), None);
    assert_eq!(controller.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_stop_on_idle_controller_is_noop() {
    let controller = SessionController::default();
    assert!(!controller.stop().await);
    assert!(!controller.stop().await);
    assert_eq!(controller.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_stop_suppresses_failure_exit() {
    let controller = Arc::new(SessionController::default());
    let mut stream = controller
        .start(&sh_request(
            "trap 'exit 7' TERM; echo ready; while true; do sleep 0.1; done",
        ))
        .unwrap();
    assert_eq!(stream.next_line().await.unwrap().as_deref(), Some("ready"));

    let stopper = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.stop().await })
    };

    assert_eq!(stream.next_line().await.unwrap(), None);
    assert_eq!(stream.outcome(), Some(SessionOutcome::Cancelled { exit_code: 7 }));
    assert!(stopper.await.unwrap());
    assert!(!controller.is_active());
}

#[tokio::test]
async fn test_stop_escalates_to_kill_after_grace_period() {
    let controller = Arc::new(controller_with_grace(Duration::from_millis(300)));
    let mut stream = controller
        .start(&sh_request(
            "trap '' TERM; echo ready; while true; do sleep 0.1; done",
        ))
        .unwrap();
    assert_eq!(stream.next_line().await.unwrap().as_deref(), Some("ready"));

    let started = Instant::now();
    let stopper = {
        let controller = Arc::clone(&controller);
        tokio::spawn(async move { controller.stop().await })
    };

    assert_eq!(stream.next_line().await.unwrap(), None);
    assert!(stopper.await.unwrap());
    assert!(started.elapsed() >= Duration::from_millis(300));
    assert_eq!(stream.outcome(), Some(SessionOutcome::Cancelled { exit_code: -9 }));
    assert!(!controller.is_active());
}

#[tokio::test]
async fn test_abandoned_stream_is_reaped_and_slot_freed() {
    let controller = SessionController::default();
    let mut stream = controller
        .start(&sh_request("echo one; sleep 0.3; echo two; sleep 0.3"))
        .unwrap();
    assert_eq!(stream.next_line().await.unwrap().as_deref(), Some("one"));
    drop(stream);

    assert!(controller.is_active(), "slot is held until the process exits");
    assert!(wait_for(|| !controller.is_active(), 5_000).await);

    let mut next = controller.start(&sh_request("echo next")).unwrap();
    assert_eq!(next.next_line().await.unwrap().as_deref(), Some("next"));
}

#[tokio::test]
async fn test_stop_reaches_abandoned_session() {
    let dir = temp_dir();
    let pid_file = dir.path().join("pid");
    let controller = SessionController::default();
    let script = format!("echo $$ > '{}'; exec sleep 30", pid_file.display());

    let stream = controller.start(&sh_request(&script)).unwrap();
    let pid = read_pid(&pid_file).await;
    drop(stream);

    assert!(controller.stop().await);
    assert!(!controller.is_active());
    assert!(wait_for(|| !process_alive(pid), 5_000).await);
}

#[tokio::test]
async fn test_dropping_controller_kills_running_child() {
    let dir = temp_dir();
    let pid_file = dir.path().join("pid");
    let controller = SessionController::default();
    let script = format!("echo $$ > '{}'; exec sleep 30", pid_file.display());

    let mut stream = controller.start(&sh_request(&script)).unwrap();
    let pid = read_pid(&pid_file).await;
    assert!(process_alive(pid));

    drop(controller);

    let finished = tokio::time::timeout(Duration::from_secs(5), stream.next_line())
        .await
        .expect("killed child should close its stdout");
    assert!(matches!(finished, Err(CodexError::CliExit { exit_code: -9, .. })));
    assert!(wait_for(|| !process_alive(pid), 5_000).await);
}

#[tokio::test]
async fn test_state_reports_streaming_then_idle() {
    let controller = SessionController::default();
    assert_eq!(controller.state(), SessionState::Idle);

    let mut stream = controller.start(&sh_request("echo hi")).unwrap();
    assert_eq!(controller.state(), SessionState::Streaming);
    assert!(controller.is_active());

    while stream.next_line().await.unwrap().is_some() {}
    assert_eq!(controller.state(), SessionState::Idle);
    assert!(stream.is_finished());
}

#[tokio::test]
async fn test_into_stream_yields_lines_then_error() {
    let controller = SessionController::default();
    let stream = controller
        .start(&sh_request("printf 'a\\nb\\n'; exit 2"))
        .unwrap();

    let items: Vec<_> = stream.into_stream().collect().await;
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_deref().unwrap(), "a");
    assert_eq!(items[1].as_deref().unwrap(), "b");
    assert!(matches!(items[2], Err(CodexError::CliExit { exit_code: 2, .. })));
}

#[tokio::test]
async fn test_working_directory_is_applied() {
    let dir = temp_dir();
    let controller = SessionController::default();
    let request = sh_request("pwd").with_cwd(dir.path());

    let mut stream = controller.start(&request).unwrap();
    let reported = stream.next_line().await.unwrap().unwrap();
    assert_eq!(
        std::fs::canonicalize(reported).unwrap(),
        std::fs::canonicalize(dir.path()).unwrap()
    );
}

#[tokio::test]
async fn test_invalid_utf8_is_replaced() {
    let controller = SessionController::default();
    let mut stream = controller
        .start(&sh_request(r"printf 'caf\351\n'"))
        .unwrap();
    assert_eq!(stream.next_line().await.unwrap().as_deref(), Some("caf\u{FFFD}"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_starts_admit_exactly_one() {
    let controller = Arc::new(SessionController::default());

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.start(&sh_request("exec sleep 5")) })
        })
        .collect();

    let mut winners = Vec::new();
    let mut rejected = 0;
    for attempt in attempts {
        match attempt.await.unwrap() {
            Ok(stream) => winners.push(stream),
            Err(CodexError::AlreadyRunning) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(winners.len(), 1);
    assert_eq!(rejected, 7);
    assert!(controller.stop().await);
    assert_eq!(winners[0].next_line().await.unwrap(), None);
}
