// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::event::InvocationId;
use crate::result::{CommandError, CommandStatus};

fn collect(rx: &mut mpsc::UnboundedReceiver<ProgressEvent>) -> Vec<ProgressEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn successful_command_returns_output() {
    let result = execute("echo", &["hello"], CommandOptions::new()).await;
    assert_eq!(result.status, CommandStatus::Ok);
    assert_eq!(result.exit_code, Some(0));
    assert_eq!(result.output, "hello\n");
    assert_eq!(result.reason, None);
}

#[tokio::test]
async fn stdout_and_stderr_are_merged() {
    let result = execute(
        "sh",
        &["-c", "echo out; echo err 1>&2; exit 3"],
        CommandOptions::new(),
    )
    .await;
    assert_eq!(result.status, CommandStatus::Error);
    assert_eq!(result.reason, Some(FailureReason::NonZeroExit));
    assert_eq!(result.exit_code, Some(3));
    assert!(result.output.contains("out\n"));
    assert!(result.output.contains("err\n"));
}

#[tokio::test]
async fn unresolvable_executable_is_reported_without_spawning() {
    let result = execute("no-such-binary-baton-test", &[] as &[&str], CommandOptions::new()).await;
    assert_eq!(result.reason, Some(FailureReason::ExecutableNotFound));
    assert_eq!(result.elapsed, Duration::ZERO);
    assert_eq!(result.exit_code, None);
    assert!(matches!(result.into_output(), Err(CommandError::NotFound { .. })));
}

#[tokio::test]
async fn timeout_kills_process_and_keeps_partial_output() {
    let options = CommandOptions::new().timeout(Duration::from_millis(300));
    let result = execute("sh", &["-c", "echo $$; exec sleep 30"], options).await;

    assert_eq!(result.reason, Some(FailureReason::Timeout));
    assert!(result.elapsed < Duration::from_secs(10));

    let pid: i32 = result.output.trim().parse().unwrap();
    assert!(
        kill(Pid::from_raw(pid), None).is_err(),
        "process {} should no longer be running",
        pid
    );
}

#[tokio::test]
async fn no_timeout_runs_to_completion() {
    let result = execute("sh", &["-c", "sleep 0.1; echo done"], CommandOptions::new().no_timeout())
        .await;
    assert!(result.is_ok());
    assert_eq!(result.output, "done\n");
}

#[tokio::test]
async fn exit_ends_run_while_background_child_holds_output() {
    let options = CommandOptions::new().no_timeout();
    let result = execute("sh", &["-c", "sleep 5 & echo hi"], options).await;

    assert_eq!(result.reason, None);
    assert_eq!(result.exit_code, Some(0));
    assert_eq!(result.output, "hi\n");
    assert!(result.elapsed < Duration::from_secs(2), "took {:?}", result.elapsed);
}

#[tokio::test]
async fn subscriber_sees_fragments_then_done() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let options = CommandOptions::new().subscriber(tx);
    let invocation = options.invocation.clone();
    let result = execute("sh", &["-c", "printf 'a\\nb\\nc'"], options).await;

    let events = collect(&mut rx);
    let (done, outputs) = events.split_last().unwrap();
    let fragments: Vec<Fragment> = outputs
        .iter()
        .map(|e| match e {
            ProgressEvent::Output { fragment, .. } => fragment.clone(),
            other => panic!("unexpected event {:?}", other),
        })
        .collect();
    assert_eq!(
        fragments,
        vec![
            Fragment::Line(b"a\n".to_vec()),
            Fragment::Line(b"b\n".to_vec()),
            Fragment::Partial(b"c".to_vec()),
        ]
    );
    assert!(events.iter().all(|e| e.invocation() == &invocation));
    match done {
        ProgressEvent::Done { result: notified, .. } => assert_eq!(notified, &result),
        other => panic!("expected done, got {:?}", other),
    }
}

#[tokio::test]
async fn long_lines_arrive_as_bounded_partials() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let script = "head -c 25000 /dev/zero | tr '\\0' a; echo";
    let result = execute("sh", &["-c", script], CommandOptions::new().subscriber(tx)).await;

    assert!(result.is_ok());
    assert_eq!(result.output.len(), 25_001);

    let mut joined = Vec::new();
    for event in collect(&mut rx) {
        if let ProgressEvent::Output { fragment, .. } = event {
            assert!(fragment.bytes().len() <= LINE_BUFFER_BYTES);
            joined.extend_from_slice(fragment.bytes());
        }
    }
    assert_eq!(joined, result.output.as_bytes());
}

#[tokio::test]
async fn cwd_and_env_overrides_apply() {
    let dir = tempfile::tempdir().unwrap();
    let canonical = dir.path().canonicalize().unwrap();
    let options = CommandOptions::new().cwd(&canonical).env("BATON_TEST_VAR", "bar");
    let result = execute("sh", &["-c", "pwd; echo $BATON_TEST_VAR"], options).await;
    assert_eq!(result.output, format!("{}\nbar\n", canonical.display()));
}

#[tokio::test]
async fn supervised_execution_matches_direct_result() {
    let result =
        execute_supervised("echo".into(), vec!["hi".into()], CommandOptions::new()).await;
    assert!(result.is_ok());
    assert_eq!(result.output, "hi\n");
}

#[tokio::test]
async fn releasing_twice_is_a_noop() {
    let task = tokio::spawn(async {});
    let mut handle = ProcessHandle::new(None);
    handle.track(task.abort_handle());
    handle.release();
    handle.release();
    handle.kill();
    assert!(handle.released);
}

#[yare::parameterized(
    non_zero  = { FailureReason::NonZeroExit, "non-zero-exit" },
    timeout   = { FailureReason::Timeout, "timeout" },
    not_found = { FailureReason::ExecutableNotFound, "executable-not-found" },
    crash     = { FailureReason::RuntimeCrash, "runtime-crash" },
)]
fn failure_reason_tags(reason: FailureReason, tag: &str) {
    assert_eq!(reason.to_string(), tag);
}

#[test]
fn into_output_maps_non_zero_exit() {
    let result = CommandResult::failure(
        InvocationId::from("cmd-test"),
        "docker",
        FailureReason::NonZeroExit,
        Some(125),
        "  no such image\n".to_string(),
        Duration::from_millis(5),
    );
    let err = result.into_output().unwrap_err();
    assert_eq!(err.reason(), FailureReason::NonZeroExit);
    assert_eq!(err.to_string(), "`docker` exited with code 125: no such image");
}
