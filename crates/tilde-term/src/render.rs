// SPDX-License-Identifier: MIT
//
// Frame composition.
//
// Every frame is a full repaint: home the cursor, then for each row erase
// to end of line and paint that row's content, then park the cursor where
// the editor says it is. The whole thing goes out in one flush.
//
// The last row gets no CRLF. Writing a newline on the bottom line would
// scroll the screen up by one.
//
// What goes *in* a row is not this module's business. A `FrameContent`
// provider paints it; `Splash` is the stock one (filler glyph on every row,
// a centered banner a third of the way down).

use std::io::Write;

use crate::ansi::Sequence;
use crate::error::Result;
use crate::geometry::{CursorPosition, Geometry};
use crate::output::PaintBuffer;

/// Glyph painted on rows with nothing else to show.
pub const DEFAULT_FILLER: u8 = b'~';

// ─── Content ────────────────────────────────────────────────────────────────

/// Supplies the visible content of each row.
pub trait FrameContent {
    /// Paint row `row` (1-based) into `out`.
    ///
    /// The row has already been erased. Content wider than
    /// `geometry.cols` will wrap, so providers should truncate.
    fn paint_row(&self, row: u16, geometry: Geometry, out: &mut PaintBuffer);
}

/// Filler glyphs with an optional centered banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splash {
    filler: u8,
    banner: Option<String>,
}

impl Splash {
    /// Filler on every row, no banner.
    #[must_use]
    pub const fn new(filler: u8) -> Self {
        Self {
            filler,
            banner: None,
        }
    }

    /// Show `text` centered on the banner row.
    #[must_use]
    pub fn with_banner(mut self, text: impl Into<String>) -> Self {
        self.banner = Some(text.into());
        self
    }

    /// The row the banner goes on: a third of the way down.
    ///
    /// Zero (no banner) on screens shorter than three rows.
    #[must_use]
    pub const fn banner_row(geometry: Geometry) -> u16 {
        geometry.rows / 3
    }
}

impl Default for Splash {
    fn default() -> Self {
        Self::new(DEFAULT_FILLER)
    }
}

impl FrameContent for Splash {
    fn paint_row(&self, row: u16, geometry: Geometry, out: &mut PaintBuffer) {
        match &self.banner {
            Some(text) if row == Self::banner_row(geometry) => {
                center_banner(text.as_bytes(), geometry.cols, out);
            }
            _ => out.append(&[self.filler]),
        }
    }
}

/// Append `text` horizontally centered in `width` columns.
///
/// Text at least as wide as the screen is cut to exactly `width` bytes.
/// Narrower text is left-padded with `(width - len) / 2` spaces; an odd
/// remainder leaves the extra column on the right.
pub fn center_banner(text: &[u8], width: u16, out: &mut PaintBuffer) {
    let width = usize::from(width);
    if text.len() >= width {
        out.append(&text[..width]);
    } else {
        out.append_repeated(b' ', (width - text.len()) / 2);
        out.append(text);
    }
}

// ─── Frame ──────────────────────────────────────────────────────────────────

/// Append one complete frame to `buf` without flushing it.
pub fn compose_frame(
    buf: &mut PaintBuffer,
    geometry: Geometry,
    cursor: CursorPosition,
    content: &impl FrameContent,
) {
    buf.append_seq(Sequence::MoveHome);
    for row in 1..=geometry.rows {
        buf.append_seq(Sequence::EraseLine);
        content.paint_row(row, geometry, buf);
        if row < geometry.rows {
            buf.append(b"\r\n");
        }
    }
    buf.append_seq(Sequence::MoveTo {
        row: cursor.row,
        col: cursor.col,
    });
}

/// Compose a frame, flush it to `out` in one write, and reset `buf`.
///
/// `buf` is reset whether or not the flush succeeded.
///
/// # Errors
///
/// Whatever [`PaintBuffer::flush_to`] reports.
pub fn render_frame(
    buf: &mut PaintBuffer,
    geometry: Geometry,
    cursor: CursorPosition,
    content: &impl FrameContent,
    out: &mut impl Write,
) -> Result<()> {
    compose_frame(buf, geometry, cursor, content);
    let result = buf.flush_to(out);
    buf.reset();
    result
}

// ─── Tests ───────────────────────────────────────────────────────────────────
