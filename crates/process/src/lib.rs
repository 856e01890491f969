// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! baton-process: runs one external command per invocation.
//!
//! Output from stdout and stderr is merged, split into lines through a
//! bounded buffer, streamed to an optional subscriber, and accumulated
//! into the final [`CommandResult`]. Every invocation owns its own timer
//! and process handle; the handle is released on every exit path.

mod event;
mod lines;
mod options;
mod resolve;
mod result;
mod run;

pub use event::{Fragment, InvocationId, ProgressEvent};
pub use lines::{LineSplitter, LINE_BUFFER_BYTES};
pub use options::{CommandOptions, Subscriber, DEFAULT_TIMEOUT};
pub use resolve::resolve_executable;
pub use result::{CommandError, CommandResult, CommandStatus, FailureReason};
pub use run::{execute, execute_supervised};
