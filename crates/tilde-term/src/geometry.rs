// SPDX-License-Identifier: MIT
//
// Screen geometry discovery.
//
// The cheap path is the window-size ioctl. Some terminals (serial lines,
// certain emulators) answer it with zeros or not at all, so there is a
// fallback that asks the terminal itself:
//
//   1. ask where the cursor is (DSR 6, reply `ESC [ row ; col R`),
//   2. shove the cursor 9999 cells right and down, which the terminal
//      clamps to the bottom-right corner,
//   3. ask again: the clamped position is (rows, cols),
//   4. put the cursor back where step 1 found it.
//
// The reply comes back on the same stream as keystrokes. This only runs
// at startup, before any key is read, so nothing else competes for it.

use std::io::{Read, Write};

use crate::ansi::{FAR_EDGE, Sequence};
use crate::error::{Result, TermError};

/// Longest cursor report accepted, including `ESC [` and `R`.
const REPORT_MAX: usize = 32;

// ─── Types ──────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells. Both are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Number of rows (height).
    pub rows: u16,
    /// Number of columns (width).
    pub cols: u16,
}

impl Geometry {
    /// Build a geometry, or `None` if either dimension is zero.
    #[must_use]
    pub const fn new(rows: u16, cols: u16) -> Option<Self> {
        if rows == 0 || cols == 0 {
            None
        } else {
            Some(Self { rows, cols })
        }
    }
}

/// A 1-based cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    pub row: u16,
    pub col: u16,
}

impl CursorPosition {
    /// The top-left cell.
    pub const HOME: Self = Self { row: 1, col: 1 };
}

impl Default for CursorPosition {
    fn default() -> Self {
        Self::HOME
    }
}

// ─── Discovery ──────────────────────────────────────────────────────────────

/// Settle on a screen size.
///
/// `direct` is the result of the window-size ioctl. When it is `None`,
/// the cursor probe runs over `io`.
///
/// # Errors
///
/// Any probe failure. The caller treats it as fatal.
pub fn discover(direct: Option<Geometry>, io: &mut (impl Read + Write)) -> Result<Geometry> {
    if let Some(geometry) = direct {
        tracing::info!(rows = geometry.rows, cols = geometry.cols, "window size from ioctl");
        return Ok(geometry);
    }
    tracing::info!("window size ioctl unavailable, probing with cursor reports");
    let geometry = probe(io)?;
    tracing::info!(rows = geometry.rows, cols = geometry.cols, "window size from probe");
    Ok(geometry)
}

/// Infer the screen size from where the terminal clamps the cursor.
///
/// The cursor is returned to its starting cell even if the second query
/// fails.
///
/// # Errors
///
/// [`TermError::Write`] if a sequence cannot be sent,
/// [`TermError::CursorReport`] if a reply is malformed, and
/// [`TermError::Geometry`] if the clamped position is not a usable size.
pub fn probe(io: &mut (impl Read + Write)) -> Result<Geometry> {
    let start = query_cursor_position(io)?;

    send(io, &[Sequence::CursorForward(FAR_EDGE), Sequence::CursorDown(FAR_EDGE)])?;
    let corner = query_cursor_position(io);

    send(io, &[Sequence::MoveTo { row: start.row, col: start.col }])?;

    let corner = corner?;
    Geometry::new(corner.row, corner.col).ok_or(TermError::Geometry)
}

/// Ask the terminal where the cursor is.
///
/// Reads one byte at a time until `R`, a read that yields nothing, or
/// [`REPORT_MAX`] bytes, then parses what arrived.
///
/// # Errors
///
/// [`TermError::Write`] if the query cannot be sent,
/// [`TermError::CursorReport`] if the reply does not parse.
pub fn query_cursor_position(io: &mut (impl Read + Write)) -> Result<CursorPosition> {
    send(io, &[Sequence::ReportCursorPosition])?;

    let mut reply = Vec::with_capacity(REPORT_MAX);
    let mut byte = [0u8; 1];
    while reply.len() < REPORT_MAX {
        if !matches!(io.read(&mut byte), Ok(1)) {
            break;
        }
        reply.push(byte[0]);
        if byte[0] == b'R' {
            break;
        }
    }
    parse_cursor_report(&reply)
}

/// Parse `ESC [ row ; col R`.
///
/// The trailing `R` may be missing if the reply was cut short.
///
/// # Errors
///
/// [`TermError::CursorReport`] if the reply does not start with `ESC [`
/// or the two numbers do not parse.
pub fn parse_cursor_report(reply: &[u8]) -> Result<CursorPosition> {
    let malformed = || {
        tracing::warn!(reply = ?String::from_utf8_lossy(reply), "bad cursor report");
        TermError::CursorReport(String::from_utf8_lossy(reply).into_owned())
    };

    let body = reply.strip_prefix(b"\x1b[").ok_or_else(malformed)?;
    let body = body.strip_suffix(b"R").unwrap_or(body);
    let text = std::str::from_utf8(body).map_err(|_| malformed())?;
    let (row, col) = text.split_once(';').ok_or_else(malformed)?;
    let row = row.parse::<u16>().map_err(|_| malformed())?;
    let col = col.parse::<u16>().map_err(|_| malformed())?;
    Ok(CursorPosition { row, col })
}

/// Write and flush `seqs`.
fn send(io: &mut impl Write, seqs: &[Sequence]) -> Result<()> {
    for seq in seqs {
        seq.write_to(io).map_err(TermError::Write)?;
    }
    io.flush().map_err(TermError::Write)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
