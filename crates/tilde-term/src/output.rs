// SPDX-License-Identifier: MIT
//
// Paint buffer — one frame, one write.
//
// A frame is built by appending control sequences and row content into
// memory, then handed to the terminal in a single `write()` call. Partial
// frames never reach the screen, so there is no visible tearing while the
// rows are repainted.
//
// Capacity is managed explicitly rather than left to `Vec`'s growth
// policy: it starts at a fixed size and doubles whenever an append would
// overflow it. It never shrinks, and `reset` keeps the allocation so the
// same buffer serves every frame.

use std::io::{self, Write};

use crate::ansi::Sequence;
use crate::error::{Result, TermError};

/// Initial capacity of a [`PaintBuffer`] in bytes.
pub const DEFAULT_CAPACITY: usize = 512;

/// Append-only byte buffer that grows by doubling.
#[derive(Debug)]
pub struct PaintBuffer {
    buf: Vec<u8>,
    /// Logical capacity. Always `initial << k` for some `k >= 0`.
    capacity: usize,
}

impl PaintBuffer {
    /// Create an empty buffer with [`DEFAULT_CAPACITY`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty buffer with the given initial capacity.
    ///
    /// A capacity of zero is bumped to one so doubling can make progress.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Current logical capacity.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append `data` to the end of the buffer, doubling capacity as needed.
    ///
    /// Allocation failure aborts the process, as with any `Vec`.
    pub fn append(&mut self, data: &[u8]) {
        self.grow_for(data.len());
        self.buf.extend_from_slice(data);
    }

    /// Append a control sequence.
    pub fn append_seq(&mut self, seq: Sequence) {
        // Writing into our own `Write` impl cannot fail.
        let _ = seq.write_to(self);
    }

    /// Append `n` copies of `byte`.
    pub fn append_repeated(&mut self, byte: u8, n: usize) {
        self.grow_for(n);
        self.buf.resize(self.buf.len() + n, byte);
    }

    /// Double the capacity until `extra` more bytes fit.
    fn grow_for(&mut self, extra: usize) {
        let needed = self.buf.len() + extra;
        if needed <= self.capacity {
            return;
        }
        while needed > self.capacity {
            self.capacity *= 2;
        }
        self.buf.reserve_exact(self.capacity - self.buf.len());
    }

    /// Drop the contents, keeping the allocation for the next frame.
    #[inline]
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Hand the whole buffer to `w` in one `write` call.
    ///
    /// The buffer is left untouched; call [`reset`](Self::reset) afterwards.
    /// A short write is reported, not retried.
    ///
    /// # Errors
    ///
    /// [`TermError::Write`] if the write fails, [`TermError::ShortWrite`]
    /// if it accepts fewer than [`len`](Self::len) bytes.
    pub fn flush_to(&self, w: &mut impl Write) -> Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let written = w.write(&self.buf).map_err(TermError::Write)?;
        w.flush().map_err(TermError::Write)?;
        if written != self.buf.len() {
            return Err(TermError::ShortWrite {
                written,
                expected: self.buf.len(),
            });
        }
        tracing::trace!(bytes = written, "frame flushed");
        Ok(())
    }
}

impl Write for PaintBuffer {
    #[inline]
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.append(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Nothing to do; real output goes through `PaintBuffer::flush_to`.
        Ok(())
    }
}

impl Default for PaintBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
