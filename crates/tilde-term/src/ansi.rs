// SPDX-License-Identifier: MIT
//
// Control sequence vocabulary.
//
// Every escape sequence tilde sends goes through the `Sequence` enum, so
// there is exactly one place that knows the byte-level encoding. Nothing
// else in the crate spells out `\x1b[` by hand.
//
// Coordinates are 1-based, the same as the terminal's own convention and
// the editor's cursor. No conversion happens here.

use std::fmt;
use std::io::{self, Write};

/// Upper bound used to push the cursor against the bottom-right corner.
///
/// Terminals clamp relative cursor movement to the screen edge, so moving
/// this far right and down always lands on the last cell.
pub const FAR_EDGE: u16 = 9999;

/// A terminal control sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sequence {
    /// Erase the entire screen (ED 2). The cursor does not move.
    ClearScreen,
    /// Move the cursor to (1, 1) (CUP with no parameters).
    MoveHome,
    /// Move the cursor to an explicit 1-based `(row, col)` (CUP).
    MoveTo { row: u16, col: u16 },
    /// Erase from the cursor to the end of the current line (EL 0).
    EraseLine,
    /// Move the cursor right by `n` cells, stopping at the right margin (CUF).
    CursorForward(u16),
    /// Move the cursor down by `n` rows, stopping at the bottom margin (CUD).
    CursorDown(u16),
    /// Ask the terminal to report the cursor position (DSR 6).
    ///
    /// The reply arrives on the input stream as `ESC [ row ; col R`.
    ReportCursorPosition,
}

impl Sequence {
    /// Write this sequence to `w`.
    ///
    /// # Errors
    ///
    /// Propagates any error from the underlying writer.
    #[inline]
    pub fn write_to(self, w: &mut (impl Write + ?Sized)) -> io::Result<()> {
        write!(w, "{self}")
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ClearScreen => f.write_str("\x1b[2J"),
            Self::MoveHome => f.write_str("\x1b[H"),
            Self::MoveTo { row, col } => write!(f, "\x1b[{row};{col}H"),
            Self::EraseLine => f.write_str("\x1b[K"),
            Self::CursorForward(n) => write!(f, "\x1b[{n}C"),
            Self::CursorDown(n) => write!(f, "\x1b[{n}B"),
            Self::ReportCursorPosition => f.write_str("\x1b[6n"),
        }
    }
}

/// Bytes that leave the screen blank with the cursor at home.
///
/// Written on every exit path, including the panic hook.
pub const CLEAR_AND_HOME: &[u8] = b"\x1b[2J\x1b[H";

// ─── Tests ───────────────────────────────────────────────────────────────────
