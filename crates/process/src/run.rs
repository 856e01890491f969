// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process supervision: spawn, stream, time out, kill, release.

use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::Instrument;

use crate::event::{Fragment, ProgressEvent};
use crate::lines::{LineSplitter, LINE_BUFFER_BYTES};
use crate::options::CommandOptions;
use crate::resolve::resolve_executable;
use crate::result::{CommandResult, FailureReason};

/// How long a killed process gets to be reaped before its handle is dropped.
const KILL_GRACE: Duration = Duration::from_secs(5);

/// How long output may keep arriving after the process exits.
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Events driving the supervision loop, in arrival order.
enum LoopEvent {
    Output(Fragment),
    Exited(std::io::Result<ExitStatus>),
}

enum Terminal {
    Exited(Option<i32>),
    TimedOut,
    Crashed(String),
}

/// Run `command` with `args` until it exits, times out, or fails to start.
///
/// Emits an `Output` notification per fragment and a final `Done`
/// notification carrying the returned result.
pub async fn execute<S: AsRef<str>>(
    command: &str,
    args: &[S],
    options: CommandOptions,
) -> CommandResult {
    let args: Vec<String> = args.iter().map(|a| a.as_ref().to_string()).collect();
    let span = tracing::info_span!(
        "process.exec",
        cmd = %command,
        args = ?args,
        invocation = %options.invocation,
        exit_code = tracing::field::Empty,
        elapsed_ms = tracing::field::Empty,
    );

    let result = supervise(command, &args, &options).instrument(span.clone()).await;

    if let Some(code) = result.exit_code {
        span.record("exit_code", code);
    }
    span.record("elapsed_ms", result.elapsed.as_millis() as u64);
    match result.reason {
        None => tracing::debug!(parent: &span, "command succeeded"),
        Some(reason) => tracing::info!(parent: &span, %reason, "command failed"),
    }

    options.notify(ProgressEvent::Done {
        invocation: options.invocation.clone(),
        result: result.clone(),
    });
    result
}

/// Run [`execute`] inside a monitored task.
///
/// A panic or abort of the task surfaces as a `runtime-crash` result
/// instead of propagating to the caller.
pub async fn execute_supervised(
    command: String,
    args: Vec<String>,
    options: CommandOptions,
) -> CommandResult {
    let start = Instant::now();
    let fallback = options.clone();
    let name = command.clone();
    match tokio::spawn(async move { execute(&command, &args, options).await }).await {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(cmd = %name, error = %e, "process runtime task died");
            let result = CommandResult::failure(
                fallback.invocation.clone(),
                &name,
                FailureReason::RuntimeCrash,
                None,
                String::new(),
                start.elapsed(),
            );
            fallback.notify(ProgressEvent::Done {
                invocation: fallback.invocation.clone(),
                result: result.clone(),
            });
            result
        }
    }
}

async fn supervise(command: &str, args: &[String], options: &CommandOptions) -> CommandResult {
    let invocation = options.invocation.clone();

    let Some(program) =
        resolve_executable(command, options.path_override(), options.cwd.as_deref())
    else {
        return CommandResult::failure(
            invocation,
            command,
            FailureReason::ExecutableNotFound,
            None,
            String::new(),
            Duration::ZERO,
        );
    };

    let start = Instant::now();
    let mut process = tokio::process::Command::new(&program);
    process
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .process_group(0);
    if let Some(cwd) = &options.cwd {
        process.current_dir(cwd);
    }
    process.envs(options.env.iter().map(|(k, v)| (k.as_str(), v.as_str())));

    let mut child = match process.spawn() {
        Ok(child) => child,
        Err(e) => {
            let reason = match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    FailureReason::ExecutableNotFound
                }
                _ => FailureReason::RuntimeCrash,
            };
            tracing::warn!(error = %e, %reason, "spawn failed");
            return CommandResult::failure(
                invocation,
                command,
                reason,
                None,
                String::new(),
                start.elapsed(),
            );
        }
    };

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut handle = ProcessHandle::new(child.id());

    let mut readers = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        readers.push(tokio::spawn(pump(stdout, tx.clone())));
    }
    if let Some(stderr) = child.stderr.take() {
        readers.push(tokio::spawn(pump(stderr, tx.clone())));
    }
    for reader in &readers {
        handle.track(reader.abort_handle());
    }

    // The exit event follows the drained streams, so it is the last event of
    // a normal run. A background grandchild may keep a stream open past the
    // exit; its output is abandoned after the drain grace.
    let mut waiter: JoinHandle<()> = tokio::spawn(async move {
        let status = child.wait().await;
        let drained = tokio::time::timeout(DRAIN_GRACE, async {
            for reader in readers.iter_mut() {
                let _ = reader.await;
            }
        })
        .await;
        if drained.is_err() {
            tracing::debug!("output still open after exit, abandoning it");
            for reader in &readers {
                reader.abort();
            }
        }
        let _ = tx.send(LoopEvent::Exited(status));
    });
    handle.track(waiter.abort_handle());

    let deadline = options.timeout.map(|t| tokio::time::Instant::now() + t);
    let mut output = Vec::new();

    let terminal = loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(LoopEvent::Output(fragment)) => {
                    tracing::trace!(bytes = fragment.bytes().len(), partial = fragment.is_partial(), "output");
                    output.extend_from_slice(fragment.bytes());
                    options.notify(ProgressEvent::Output {
                        invocation: invocation.clone(),
                        fragment,
                    });
                }
                Some(LoopEvent::Exited(Ok(status))) => break Terminal::Exited(status.code()),
                Some(LoopEvent::Exited(Err(e))) => break Terminal::Crashed(e.to_string()),
                None => break Terminal::Crashed("event loop closed before process exit".to_string()),
            },
            _ = sleep_until(deadline) => break Terminal::TimedOut,
        }
    };

    if matches!(terminal, Terminal::TimedOut) {
        handle.kill();
        if tokio::time::timeout(KILL_GRACE, &mut waiter).await.is_err() {
            tracing::warn!("killed process was not reaped within grace period");
        }
    }
    handle.release();

    let elapsed = start.elapsed();
    let output = String::from_utf8_lossy(&output).into_owned();
    match terminal {
        Terminal::Exited(Some(0)) => CommandResult::success(invocation, command, output, elapsed),
        Terminal::Exited(code) => CommandResult::failure(
            invocation,
            command,
            FailureReason::NonZeroExit,
            code,
            output,
            elapsed,
        ),
        Terminal::TimedOut => CommandResult::failure(
            invocation,
            command,
            FailureReason::Timeout,
            None,
            output,
            elapsed,
        ),
        Terminal::Crashed(error) => {
            tracing::error!(%error, "process supervision failed");
            CommandResult::failure(
                invocation,
                command,
                FailureReason::RuntimeCrash,
                None,
                output,
                elapsed,
            )
        }
    }
}

async fn sleep_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

/// Read a stream to EOF, forwarding bounded line fragments.
async fn pump<R: AsyncRead + Unpin>(mut reader: R, tx: mpsc::UnboundedSender<LoopEvent>) {
    let mut splitter = LineSplitter::new(LINE_BUFFER_BYTES);
    let mut chunk = vec![0u8; LINE_BUFFER_BYTES];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                for fragment in splitter.push(&chunk[..n]) {
                    if tx.send(LoopEvent::Output(fragment)).is_err() {
                        return;
                    }
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "output stream read failed");
                break;
            }
        }
    }
    if let Some(fragment) = splitter.finish() {
        let _ = tx.send(LoopEvent::Output(fragment));
    }
}

/// Scoped ownership of one child process and its helper tasks.
///
/// Dropping or releasing the handle aborts the helper tasks; the waiter
/// task owns the child with `kill_on_drop`, so aborting it also kills a
/// still-running process. Releasing twice is a no-op.
struct ProcessHandle {
    pid: Option<u32>,
    tasks: Vec<AbortHandle>,
    released: bool,
}

impl ProcessHandle {
    fn new(pid: Option<u32>) -> Self {
        Self { pid, tasks: Vec::new(), released: false }
    }

    fn track(&mut self, task: AbortHandle) {
        self.tasks.push(task);
    }

    /// SIGKILL the process group, falling back to the process itself.
    /// Without a pid this is a no-op.
    fn kill(&self) {
        let Some(pid) = self.pid.and_then(|p| i32::try_from(p).ok()) else {
            return;
        };
        if let Err(group_err) = kill(Pid::from_raw(-pid), Signal::SIGKILL) {
            if let Err(e) = kill(Pid::from_raw(pid), Signal::SIGKILL) {
                tracing::debug!(pid, %group_err, error = %e, "kill failed, process already gone");
            }
        }
        tracing::info!(pid, "killed timed-out process");
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
