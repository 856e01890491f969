// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded line splitting for raw process output.

use crate::event::Fragment;

/// Per-line buffer size. Longer lines are delivered as partial fragments.
pub const LINE_BUFFER_BYTES: usize = 10 * 1024;

/// Splits a byte stream into [`Fragment`]s.
///
/// The concatenation of every fragment returned by `push` and `finish`
/// equals the input exactly, and no fragment exceeds the buffer capacity.
#[derive(Debug)]
pub struct LineSplitter {
    buf: Vec<u8>,
    capacity: usize,
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::new(LINE_BUFFER_BYTES)
    }
}

impl LineSplitter {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { buf: Vec::with_capacity(capacity), capacity }
    }

    /// Feed bytes, returning every fragment that became complete.
    pub fn push(&mut self, mut bytes: &[u8]) -> Vec<Fragment> {
        let mut out = Vec::new();
        while !bytes.is_empty() {
            let room = self.capacity - self.buf.len();
            let (head, rest) = bytes.split_at(room.min(bytes.len()));
            bytes = rest;

            let mut start = 0;
            for (i, b) in head.iter().enumerate() {
                if *b == b'\n' {
                    self.buf.extend_from_slice(&head[start..=i]);
                    out.push(Fragment::Line(std::mem::take(&mut self.buf)));
                    start = i + 1;
                }
            }
            self.buf.extend_from_slice(&head[start..]);

            if self.buf.len() >= self.capacity {
                out.push(Fragment::Partial(std::mem::take(&mut self.buf)));
            }
        }
        out
    }

    /// Flush the unterminated tail, if any.
    pub fn finish(&mut self) -> Option<Fragment> {
        if self.buf.is_empty() {
            None
        } else {
            Some(Fragment::Partial(std::mem::take(&mut self.buf)))
        }
    }
}

#[cfg(test)]
#[path = "lines_tests.rs"]
mod tests;
