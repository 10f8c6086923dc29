// SPDX-License-Identifier: MIT
//
// The editor loop: paint, read a key, apply it, repeat.
//
// State is just the screen geometry and a cursor. Arrow keys move the
// cursor one cell, clamped to the screen (edges stop, they don't wrap).
// Ctrl-Q ends the loop. Every other key is ignored; there is no text to
// insert into yet.
//
// The loop itself never touches the terminal mode. It returns on quit or
// on the first error, and the caller does the cleanup for both.

use std::io::{Read, Write};

use tilde_term::Result;
use tilde_term::geometry::{CursorPosition, Geometry};
use tilde_term::input::{Key, KeyDecoder, ctrl};
use tilde_term::output::PaintBuffer;
use tilde_term::render::{FrameContent, render_frame};

/// Byte that ends the session.
pub const QUIT: u8 = ctrl(b'q');

/// What the loop does after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Keep going.
    Continue,
    /// Stop the loop and exit cleanly.
    Quit,
}

/// Cursor, geometry, and the paint buffer reused across frames.
pub struct Editor<C> {
    geometry: Geometry,
    cursor: CursorPosition,
    paint: PaintBuffer,
    content: C,
}

impl<C: FrameContent> Editor<C> {
    /// Start with the cursor at (1, 1).
    #[must_use]
    pub fn new(geometry: Geometry, content: C, paint: PaintBuffer) -> Self {
        Self {
            geometry,
            cursor: CursorPosition::HOME,
            paint,
            content,
        }
    }

    /// Current cursor position.
    #[must_use]
    pub const fn cursor(&self) -> CursorPosition {
        self.cursor
    }

    /// Apply one key.
    pub fn handle_key(&mut self, key: Key) -> Action {
        let CursorPosition { row, col } = &mut self.cursor;
        match key {
            Key::Up if *row > 1 => *row -= 1,
            Key::Down if *row < self.geometry.rows => *row += 1,
            Key::Left if *col > 1 => *col -= 1,
            Key::Right if *col < self.geometry.cols => *col += 1,
            Key::Byte(QUIT) => return Action::Quit,
            _ => {}
        }
        Action::Continue
    }

    /// Paint one frame to `out`.
    ///
    /// # Errors
    ///
    /// A failed or short frame write.
    pub fn refresh(&mut self, out: &mut impl Write) -> Result<()> {
        render_frame(&mut self.paint, self.geometry, self.cursor, &self.content, out)
    }

    /// Run until the quit key.
    ///
    /// # Errors
    ///
    /// The first frame write or key read that fails. The terminal is left
    /// as-is for the caller to clean up.
    pub fn run<R: Read>(&mut self, keys: &mut KeyDecoder<R>, out: &mut impl Write) -> Result<()> {
        loop {
            self.refresh(out)?;
            let key = keys.next_key()?;
            if self.handle_key(key) == Action::Quit {
                tracing::info!("quit requested");
                return Ok(());
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
