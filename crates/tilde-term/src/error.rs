// SPDX-License-Identifier: MIT
//
// Error type for everything that can go wrong talking to the terminal.
//
// Every variant names the operation that failed, because the binary turns
// these into a one-line diagnostic after restoring the terminal. A timed
// out read is not an error and never shows up here.

use std::io;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = TermError> = std::result::Result<T, E>;

/// A terminal control, probing, or I/O failure.
#[derive(Debug, Error)]
pub enum TermError {
    /// `tcgetattr` / `tcsetattr` failed.
    #[error("{op}: {source}")]
    Attr {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// Standard input is not connected to a terminal.
    #[error("stdin is not a terminal")]
    NotATerminal,

    /// The terminal's original mode was already captured in this process.
    #[error("terminal mode already captured")]
    AlreadyCaptured,

    /// Reading from the input stream failed (timeouts excluded).
    #[error("read: {0}")]
    Read(#[source] io::Error),

    /// Writing to the output stream failed.
    #[error("write: {0}")]
    Write(#[source] io::Error),

    /// A single write call accepted fewer bytes than the frame held.
    #[error("short write: {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    /// A cursor position report did not have the form `ESC [ row ; col R`.
    #[error("malformed cursor position report: {0:?}")]
    CursorReport(String),

    /// Neither the window-size query nor the cursor probe produced a size.
    #[error("could not determine terminal size")]
    Geometry,
}

impl TermError {
    /// Wrap the current OS error for a termios call.
    #[must_use]
    pub fn attr(op: &'static str) -> Self {
        Self::Attr {
            op,
            source: io::Error::last_os_error(),
        }
    }
}
