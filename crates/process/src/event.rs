// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Progress notifications pushed to a subscriber.

use crate::result::CommandResult;

baton_core::define_id! {
    /// Identifies one command invocation in progress notifications.
    pub struct InvocationId("cmd-");
}

/// A unit of process output as delivered by the line splitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// A complete line, including its trailing `\n`.
    Line(Vec<u8>),
    /// Bytes without a terminating newline: either a line longer than the
    /// line buffer or the unterminated tail of the stream.
    Partial(Vec<u8>),
}

impl Fragment {
    pub fn bytes(&self) -> &[u8] {
        match self {
            Fragment::Line(b) | Fragment::Partial(b) => b,
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Fragment::Partial(_))
    }

    /// Lossy text view, without the trailing newline.
    pub fn text(&self) -> String {
        let bytes = self.bytes();
        let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);
        String::from_utf8_lossy(bytes).into_owned()
    }
}

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Output { invocation: InvocationId, fragment: Fragment },
    /// Final notification; carries the same result `execute` returns.
    Done { invocation: InvocationId, result: CommandResult },
}

impl ProgressEvent {
    pub fn invocation(&self) -> &InvocationId {
        match self {
            ProgressEvent::Output { invocation, .. } | ProgressEvent::Done { invocation, .. } => {
                invocation
            }
        }
    }
}
